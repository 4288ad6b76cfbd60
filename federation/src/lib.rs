//! Remote module contract shared by the shell and every remote.
//!
//! This crate owns everything both sides of the composition boundary must
//! agree on: the published manifest format, the singleton shared scope, the
//! component trait a remote exports, and the view tree it renders into. The
//! shell compiles against this crate only; it never names a remote's types.

pub mod catalog;
pub mod component;
pub mod manifest;
pub mod shared;
pub mod view;

pub use catalog::{ComponentFactory, ModuleCatalog};
pub use component::{MountContext, RemoteComponent, RenderError};
pub use manifest::{DEFAULT_ENTRY_PATH, RemoteManifest, SharedDecl};
pub use shared::{RENDER_DOM, RENDER_LIB, RENDER_VERSION, RenderContext, SharedScope};
pub use view::{Tone, View, ViewRenderer};

/// Violations of the loading contract between shell and remote.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    /// The manifest is structurally unusable.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// A remote must expose exactly one module.
    #[error("remote {remote} exposes {count} modules; exactly one is required")]
    ExposeCount { remote: String, count: usize },

    /// The remote does not declare a dependency the host shares as a singleton.
    #[error("remote {remote} does not declare shared dependency {dependency}")]
    MissingShared { remote: String, dependency: String },

    /// The remote declares a host singleton without marking it singleton.
    #[error("remote {remote} declares {dependency} without singleton sharing")]
    NotSingleton { remote: String, dependency: String },

    /// The remote's version requirement does not accept the host's instance.
    #[error("remote {remote} requires {dependency} {required}, host provides {provided}")]
    VersionMismatch { remote: String, dependency: String, required: String, provided: String },

    /// A version string whose major component cannot be read.
    #[error("unparsable version for {dependency}: {raw}")]
    InvalidVersion { dependency: String, raw: String },

    /// A remote asked for a dependency the host does not provide.
    #[error("shared dependency {0} is not provided by the host")]
    NotProvided(String),

    /// The provided instance is not of the requested type.
    #[error("shared dependency {0} has an unexpected type")]
    WrongType(String),

    /// No factory is linked for the exposed module.
    #[error("no module linked for {remote}/{export}")]
    Unlinked { remote: String, export: String },
}
