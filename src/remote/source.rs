//! Where remote modules come from.
//!
//! ERROR HANDLING
//! ==============
//! Every failure on the way from origin to linked component is a
//! [`LoadError`]; the loader turns it into that capability's `Failed` slot.

#[cfg(test)]
#[path = "source_test.rs"]
mod source_test;

use std::sync::Arc;

use federation::{ModuleCatalog, RemoteManifest, SharedScope};
use url::Url;

use super::types::{LoadError, LoadedRemote};
use crate::capability::CapabilityDescriptor;

#[async_trait::async_trait]
pub trait ModuleSource: Send + Sync {
    /// Obtain and link the remote behind `descriptor`.
    async fn load(&self, descriptor: &CapabilityDescriptor) -> Result<LoadedRemote, LoadError>;
}

/// Loads remotes by fetching their published manifest over HTTP.
pub struct HttpModuleSource {
    client: reqwest::Client,
    remote_host: Url,
    entry_path: String,
    shared: Arc<SharedScope>,
    catalog: ModuleCatalog,
}

impl HttpModuleSource {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        remote_host: Url,
        entry_path: &str,
        shared: Arc<SharedScope>,
        catalog: ModuleCatalog,
    ) -> Self {
        Self { client, remote_host, entry_path: entry_path.to_owned(), shared, catalog }
    }

    /// Manifest URL for a capability: its origin joined with the entry path.
    ///
    /// # Errors
    ///
    /// [`LoadError::InvalidOrigin`] if the origin cannot serve as a base URL.
    pub fn entry_url(&self, descriptor: &CapabilityDescriptor) -> Result<Url, LoadError> {
        let invalid = || LoadError::InvalidOrigin(descriptor.id.clone());
        let origin = descriptor.remote.resolve(&self.remote_host).ok_or_else(invalid)?;
        origin
            .join(self.entry_path.trim_start_matches('/'))
            .map_err(|_| invalid())
    }
}

#[async_trait::async_trait]
impl ModuleSource for HttpModuleSource {
    async fn load(&self, descriptor: &CapabilityDescriptor) -> Result<LoadedRemote, LoadError> {
        let url = self.entry_url(descriptor)?;
        tracing::debug!(capability = %descriptor.id, %url, "fetching remote entry");

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LoadError::Unreachable { url: url.to_string(), message: e.to_string() })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Status { url: url.to_string(), status: status.as_u16() });
        }

        let manifest = resp
            .json::<RemoteManifest>()
            .await
            .map_err(|e| LoadError::Manifest { url: url.to_string(), message: e.to_string() })?;

        let export = manifest.validate(&self.shared)?.to_owned();
        let component = self.catalog.link(&manifest.name, &export, &self.shared)?;

        tracing::info!(
            capability = %descriptor.id,
            remote = %manifest.name,
            %export,
            "remote linked"
        );
        Ok(LoadedRemote { capability_id: descriptor.id.clone(), manifest, export, component })
    }
}
