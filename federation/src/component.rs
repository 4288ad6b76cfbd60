//! The component contract a remote exposes.

use std::sync::Arc;

use url::Url;

use crate::ContractError;
use crate::shared::SharedScope;
use crate::view::View;

/// Failure raised by a remote while rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("render failed: {0}")]
    Failed(String),
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Everything a remote receives from the shell when it is mounted.
#[derive(Clone, Debug)]
pub struct MountContext {
    pub capability_id: String,
    /// The host's singleton scope. Remotes must pull shared instances from
    /// here instead of constructing their own.
    pub shared: Arc<SharedScope>,
    /// HTTP client carrying the shell's cookie store (ambient credentials).
    pub http: reqwest::Client,
    /// Base URL of the backend the remote's data proxy calls go to.
    pub api_base: Url,
}

impl MountContext {
    /// Absolute URL for a backend path, keeping any path prefix of `api_base`.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.as_str().trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

/// The single named export a remote publishes.
#[async_trait::async_trait]
pub trait RemoteComponent: Send + Sync {
    /// Component name used in logs.
    fn name(&self) -> &str;

    /// Mount the component and produce its view.
    async fn render(&self, ctx: &MountContext) -> Result<View, RenderError>;
}
