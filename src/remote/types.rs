use std::fmt;
use std::sync::Arc;

use federation::{ContractError, RemoteComponent, RemoteManifest, View};

/// Why a capability's remote could not be obtained.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("unknown capability {0}")]
    UnknownCapability(String),

    #[error("capability {0} has no usable remote origin")]
    InvalidOrigin(String),

    #[error("remote entry {url} is unreachable: {message}")]
    Unreachable { url: String, message: String },

    #[error("remote entry {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("remote entry {url} is not a valid manifest: {message}")]
    Manifest { url: String, message: String },

    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// A remote whose manifest passed validation and whose export is linked.
pub struct LoadedRemote {
    pub capability_id: String,
    pub manifest: RemoteManifest,
    pub export: String,
    pub component: Arc<dyn RemoteComponent>,
}

impl fmt::Debug for LoadedRemote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedRemote")
            .field("capability_id", &self.capability_id)
            .field("remote", &self.manifest.name)
            .field("export", &self.export)
            .field("component", &self.component.name())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct MountedRemote {
    pub remote: Arc<LoadedRemote>,
    pub view: View,
}

/// Per-capability mount slot.
#[derive(Clone, Debug, Default)]
pub enum RemoteMountState {
    #[default]
    NotLoaded,
    Loading,
    Mounted(MountedRemote),
    Failed(String),
}

impl RemoteMountState {
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        matches!(self, Self::Mounted(_))
    }

    #[must_use]
    pub fn view(&self) -> Option<&View> {
        match self {
            Self::Mounted(mounted) => Some(&mounted.view),
            _ => None,
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}
