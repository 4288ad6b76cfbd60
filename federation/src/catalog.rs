//! Links a manifest's exposed module to the code that implements it.
//!
//! DESIGN
//! ======
//! A manifest names `(remote, export)`; the catalog maps that pair to a
//! factory which builds the component from the host's shared scope. The shell
//! receives a catalog at startup and never names a remote type itself.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ContractError;
use crate::component::RemoteComponent;
use crate::shared::SharedScope;

/// Builds a remote component from the host's shared scope.
pub type ComponentFactory =
    Arc<dyn Fn(&SharedScope) -> Result<Arc<dyn RemoteComponent>, ContractError> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ModuleCatalog {
    factories: HashMap<(String, String), ComponentFactory>,
}

impl fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self
            .factories
            .keys()
            .map(|(remote, export)| format!("{remote}/{export}"))
            .collect();
        keys.sort();
        f.debug_struct("ModuleCatalog").field("modules", &keys).finish()
    }
}

impl ModuleCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `remote`/`export`.
    pub fn register<F>(&mut self, remote: &str, export: &str, factory: F)
    where
        F: Fn(&SharedScope) -> Result<Arc<dyn RemoteComponent>, ContractError> + Send + Sync + 'static,
    {
        self.factories
            .insert((remote.to_owned(), export.to_owned()), Arc::new(factory));
    }

    #[must_use]
    pub fn contains(&self, remote: &str, export: &str) -> bool {
        self.factories
            .contains_key(&(remote.to_owned(), export.to_owned()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiate the component for `remote`/`export`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Unlinked`] when nothing is registered for the
    /// pair, or whatever the factory reports (e.g. a missing singleton).
    pub fn link(&self, remote: &str, export: &str, scope: &SharedScope) -> Result<Arc<dyn RemoteComponent>, ContractError> {
        let factory = self
            .factories
            .get(&(remote.to_owned(), export.to_owned()))
            .ok_or_else(|| ContractError::Unlinked { remote: remote.to_owned(), export: export.to_owned() })?;
        factory(scope)
    }
}
