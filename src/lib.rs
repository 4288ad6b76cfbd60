//! Shell core for a composable frontend.
//!
//! SYSTEM CONTEXT
//! ==============
//! The shell signs a user in against the identity backend, derives a menu of
//! capabilities from the user's roles, and loads the remote module behind the
//! selected capability at runtime. Remotes are compiled and published on
//! their own; the shell only sees them through the `federation` contract.
//!
//! Leaves first: [`capability`] (authorization mapper), [`net`] (identity
//! backend client), [`session`], [`remote`] (loader and registry), and
//! [`composer`], which wires them together.

pub mod capability;
pub mod composer;
pub mod config;
pub mod navigation;
pub mod net;
pub mod remote;
pub mod render;
pub mod session;

pub use capability::{CapabilityDescriptor, CapabilityTable, MenuState, RemoteOrigin};
pub use composer::{ContentView, MenuEntry, ShellComposer, ShellError, ShellView};
pub use config::{ConfigError, HttpTimeouts, ShellConfig};
pub use navigation::{Navigation, Navigator, RecordingNavigator};
pub use net::api::{ApiError, AuthApi, HttpAuthApi};
pub use net::types::{IdentityOutcome, RefreshOutcome, UserIdentity};
pub use remote::{CachedRegistry, HttpModuleSource, LoadError, ModuleSource, RemoteLoader, RemoteMountState, RemoteRegistry};
pub use session::{Session, SessionController, SessionError, SessionStatus};

#[cfg(test)]
pub(crate) mod test_helpers;
