//! Capability-keyed cache of loaded remotes.
//!
//! DESIGN
//! ======
//! Each capability id owns one `OnceCell`. Concurrent resolutions of the same
//! id wait on the same initialization, so a remote is fetched at most once per
//! shell session. A failed load leaves the cell empty and the next resolution
//! tries again. `invalidate` drops the cell; a load still running against the
//! dropped cell finishes into it and is forgotten.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::OnceCell;

use super::source::ModuleSource;
use super::types::{LoadError, LoadedRemote};
use crate::capability::CapabilityTable;

#[async_trait::async_trait]
pub trait RemoteRegistry: Send + Sync {
    /// The linked remote for `capability_id`, loading it on first use.
    async fn resolve(&self, capability_id: &str) -> Result<Arc<LoadedRemote>, LoadError>;

    /// Forget the cached remote for `capability_id`.
    fn invalidate(&self, capability_id: &str);

    fn invalidate_all(&self);

    fn is_cached(&self, capability_id: &str) -> bool;
}

type Cell = Arc<OnceCell<Arc<LoadedRemote>>>;

pub struct CachedRegistry {
    table: CapabilityTable,
    source: Arc<dyn ModuleSource>,
    cells: Mutex<HashMap<String, Cell>>,
}

impl CachedRegistry {
    #[must_use]
    pub fn new(table: CapabilityTable, source: Arc<dyn ModuleSource>) -> Self {
        Self { table, source, cells: Mutex::new(HashMap::new()) }
    }

    fn cells(&self) -> MutexGuard<'_, HashMap<String, Cell>> {
        self.cells.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl RemoteRegistry for CachedRegistry {
    async fn resolve(&self, capability_id: &str) -> Result<Arc<LoadedRemote>, LoadError> {
        let descriptor = self
            .table
            .get(capability_id)
            .cloned()
            .ok_or_else(|| LoadError::UnknownCapability(capability_id.to_owned()))?;

        let cell = Arc::clone(self.cells().entry(capability_id.to_owned()).or_default());

        let loaded = cell
            .get_or_try_init(|| async {
                tracing::info!(capability = %descriptor.id, "loading remote module");
                match self.source.load(&descriptor).await {
                    Ok(remote) => Ok(Arc::new(remote)),
                    Err(e) => {
                        tracing::warn!(capability = %descriptor.id, error = %e, "remote module load failed");
                        Err(e)
                    }
                }
            })
            .await?;
        Ok(Arc::clone(loaded))
    }

    fn invalidate(&self, capability_id: &str) {
        if self.cells().remove(capability_id).is_some() {
            tracing::debug!(capability = %capability_id, "remote cache entry dropped");
        }
    }

    fn invalidate_all(&self) {
        self.cells().clear();
    }

    fn is_cached(&self, capability_id: &str) -> bool {
        self.cells()
            .get(capability_id)
            .is_some_and(|cell| cell.initialized())
    }
}
