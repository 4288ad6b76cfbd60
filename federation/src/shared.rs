//! Singleton shared scope.
//!
//! DESIGN
//! ======
//! The host builds one `SharedScope` at startup and hands the same `Arc` to
//! every remote it mounts. Each entry is a single running instance; `get`
//! hands out clones of the same `Arc`, never a fresh copy, so context set by
//! the shell is visible to every remote and vice versa.

#[cfg(test)]
#[path = "shared_test.rs"]
mod shared_test;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::ContractError;
use crate::view::ViewRenderer;

/// Federation name of the rendering library singleton.
pub const RENDER_LIB: &str = "react";
/// Federation name of the rendering library's output counterpart.
pub const RENDER_DOM: &str = "react-dom";
/// Version the host provides for both render singletons.
pub const RENDER_VERSION: &str = "18.3.1";

struct SharedEntry {
    version: String,
    instance: Arc<dyn Any + Send + Sync>,
}

/// Dependency name to the one instance every participant must use.
#[derive(Default)]
pub struct SharedScope {
    entries: BTreeMap<String, SharedEntry>,
}

impl fmt::Debug for SharedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, entry)| (name, &entry.version)))
            .finish()
    }
}

impl SharedScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The host scope: a fresh [`RenderContext`] and [`ViewRenderer`].
    #[must_use]
    pub fn host() -> Self {
        let mut scope = Self::new();
        scope.insert(RENDER_LIB, RENDER_VERSION, RenderContext::default());
        scope.insert(RENDER_DOM, RENDER_VERSION, ViewRenderer::default());
        scope
    }

    fn insert<T>(&mut self, name: &str, version: &str, instance: T)
    where
        T: Any + Send + Sync,
    {
        let instance: Arc<dyn Any + Send + Sync> = Arc::new(instance);
        self.entries
            .insert(name.to_owned(), SharedEntry { version: version.to_owned(), instance });
    }

    /// Shared instance under `name`, if provided with type `T`.
    #[must_use]
    pub fn get<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let entry = self.entries.get(name)?;
        Arc::clone(&entry.instance).downcast::<T>().ok()
    }

    /// Like [`SharedScope::get`], but explains why the instance is unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::NotProvided`] or [`ContractError::WrongType`].
    pub fn require<T>(&self, name: &str) -> Result<Arc<T>, ContractError>
    where
        T: Any + Send + Sync,
    {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| ContractError::NotProvided(name.to_owned()))?;
        Arc::clone(&entry.instance)
            .downcast::<T>()
            .map_err(|_| ContractError::WrongType(name.to_owned()))
    }

    #[must_use]
    pub fn version(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|entry| entry.version.as_str())
    }

    /// `(name, version)` for every provided dependency, in name order.
    pub fn versions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.version.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The host's render context, when this is a host scope.
    #[must_use]
    pub fn render_context(&self) -> Option<Arc<RenderContext>> {
        self.get(RENDER_LIB)
    }

    /// The host's view renderer, when this is a host scope.
    #[must_use]
    pub fn renderer(&self) -> Option<Arc<ViewRenderer>> {
        self.get(RENDER_DOM)
    }
}

/// Context values shared across the composition boundary.
///
/// The shell writes (e.g. `user.name`); remotes read.
#[derive(Debug, Default)]
pub struct RenderContext {
    values: RwLock<BTreeMap<String, String>>,
}

impl RenderContext {
    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn clear(&self) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
