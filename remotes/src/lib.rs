//! Remote dashboards published to the shell.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each remote is built and deployed on its own; it reaches the shell only
//! through its published [`RemoteManifest`] and the factory it registers in a
//! [`ModuleCatalog`]. The shell library never depends on this crate; only the
//! host binary links [`catalog`].

pub mod analytics;
pub mod data_proxy;
pub mod format;
pub mod metrics;

use federation::{ModuleCatalog, RemoteManifest};

/// Catalog linking every bundled remote's exposed module.
#[must_use]
pub fn catalog() -> ModuleCatalog {
    let mut catalog = ModuleCatalog::new();
    metrics::register(&mut catalog);
    analytics::register(&mut catalog);
    catalog
}

/// Manifest a bundled remote publishes, looked up by capability id.
#[must_use]
pub fn manifest_for(capability_id: &str) -> Option<RemoteManifest> {
    match capability_id {
        metrics::CAPABILITY_ID => Some(metrics::manifest()),
        analytics::CAPABILITY_ID => Some(analytics::manifest()),
        _ => None,
    }
}
