//! Mount slots and the isolation boundary around remote rendering.
//!
//! DESIGN
//! ======
//! A slot moves `NotLoaded -> Loading -> Mounted | Failed`. Activation of a
//! slot that is already `Loading` or `Mounted` returns it unchanged, so
//! selecting a capability again never triggers another load or render. A
//! `Failed` slot is retried on the next activation.
//!
//! Everything a remote does while being linked or rendered runs inside
//! `catch_unwind`; an `Err` or a panic becomes that capability's `Failed` slot
//! and never reaches the shell or a sibling slot. `reset()` bumps an epoch; an activation that
//! started under an older epoch drops its result.

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use federation::{MountContext, SharedScope};
use futures::FutureExt;
use url::Url;

use super::registry::RemoteRegistry;
use super::types::{LoadedRemote, MountedRemote, RemoteMountState};
use crate::capability::CapabilityDescriptor;

#[derive(Default)]
struct Slots {
    states: HashMap<String, RemoteMountState>,
    epoch: u64,
}

pub struct RemoteLoader {
    registry: Arc<dyn RemoteRegistry>,
    shared: Arc<SharedScope>,
    http: reqwest::Client,
    api_base: Url,
    slots: Mutex<Slots>,
}

impl RemoteLoader {
    #[must_use]
    pub fn new(registry: Arc<dyn RemoteRegistry>, shared: Arc<SharedScope>, http: reqwest::Client, api_base: Url) -> Self {
        Self { registry, shared, http, api_base, slots: Mutex::new(Slots::default()) }
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Placeholder shown while a capability's remote is loading.
    #[must_use]
    pub fn fallback_for(descriptor: &CapabilityDescriptor) -> String {
        format!("Loading {}...", descriptor.label)
    }

    #[must_use]
    pub fn state(&self, capability_id: &str) -> RemoteMountState {
        self.slots().states.get(capability_id).cloned().unwrap_or_default()
    }

    /// Ids of every currently mounted capability, sorted.
    #[must_use]
    pub fn mounted_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .slots()
            .states
            .iter()
            .filter(|(_, state)| state.is_mounted())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Load and mount the remote for `descriptor` unless it is already
    /// loading or mounted.
    pub async fn activate(&self, descriptor: &CapabilityDescriptor) -> RemoteMountState {
        let id = descriptor.id.as_str();
        let epoch = {
            let mut slots = self.slots();
            if let Some(state @ (RemoteMountState::Loading | RemoteMountState::Mounted(_))) = slots.states.get(id) {
                return state.clone();
            }
            slots.states.insert(id.to_owned(), RemoteMountState::Loading);
            slots.epoch
        };

        let resolved = AssertUnwindSafe(self.registry.resolve(id)).catch_unwind().await;
        let state = match resolved {
            Ok(Ok(remote)) => self.mount(remote).await,
            Ok(Err(e)) => RemoteMountState::Failed(e.to_string()),
            Err(panic) => {
                let message = format!("remote for {id} crashed while loading: {}", panic_message(&*panic));
                tracing::error!(capability = %id, %message, "remote panicked during load");
                RemoteMountState::Failed(message)
            }
        };

        let mut slots = self.slots();
        if slots.epoch != epoch {
            tracing::debug!(capability = %id, "discarding mount started before reset");
            return RemoteMountState::NotLoaded;
        }
        slots.states.insert(id.to_owned(), state.clone());
        state
    }

    async fn mount(&self, remote: Arc<LoadedRemote>) -> RemoteMountState {
        let ctx = MountContext {
            capability_id: remote.capability_id.clone(),
            shared: Arc::clone(&self.shared),
            http: self.http.clone(),
            api_base: self.api_base.clone(),
        };

        let outcome = AssertUnwindSafe(remote.component.render(&ctx)).catch_unwind().await;
        match outcome {
            Ok(Ok(view)) => {
                tracing::info!(capability = %remote.capability_id, component = remote.component.name(), "remote mounted");
                RemoteMountState::Mounted(MountedRemote { remote, view })
            }
            Ok(Err(e)) => {
                tracing::warn!(capability = %remote.capability_id, error = %e, "remote render failed");
                RemoteMountState::Failed(e.to_string())
            }
            Err(panic) => {
                let message = format!("remote {} crashed: {}", remote.component.name(), panic_message(&*panic));
                tracing::error!(capability = %remote.capability_id, %message, "remote panicked during render");
                RemoteMountState::Failed(message)
            }
        }
    }

    /// Unmount everything and forget every loaded remote.
    pub fn reset(&self) {
        {
            let mut slots = self.slots();
            slots.states.clear();
            slots.epoch = slots.epoch.wrapping_add(1);
        }
        self.registry.invalidate_all();
        tracing::debug!("remote slots reset");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
