//! Runtime loading of remote modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! A [`ModuleSource`] turns a capability descriptor into a linked component
//! (fetch manifest, check the shared-singleton contract, link the export).
//! The [`CachedRegistry`] keeps at most one successful load per capability id.
//! The [`RemoteLoader`] owns the per-capability mount slots the composer shows.

pub mod loader;
pub mod registry;
pub mod source;
pub mod types;

pub use loader::RemoteLoader;
pub use registry::{CachedRegistry, RemoteRegistry};
pub use source::{HttpModuleSource, ModuleSource};
pub use types::{LoadError, LoadedRemote, MountedRemote, RemoteMountState};
