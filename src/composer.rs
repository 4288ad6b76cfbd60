//! Shell composer: session, menu, selection and content area.
//!
//! SYSTEM CONTEXT
//! ==============
//! Top-level orchestration. The composer asks the session controller who the
//! user is, the capability table what they may open, and the remote loader
//! what the selected capability currently shows. It owns the selection and is
//! the only component that resets everything at once on logout.
//!
//! DESIGN
//! ======
//! `view()` is a pure read of current state into a [`ShellView`]. The
//! authenticated layout is only produced once the session holds an identity,
//! so the menu never renders from a partial or stale user.

#[cfg(test)]
#[path = "composer_test.rs"]
mod composer_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use federation::{ModuleCatalog, SharedScope, View};

use crate::capability::{CapabilityTable, MenuState};
use crate::config::{ConfigError, ShellConfig};
use crate::navigation::Navigator;
use crate::net::api::{ApiError, HttpAuthApi};
use crate::net::types::RefreshOutcome;
use crate::remote::{CachedRegistry, HttpModuleSource, RemoteLoader, RemoteMountState};
use crate::session::{SessionController, SessionError, SessionStatus};

/// Render-context key holding the signed-in user's display name.
pub const USER_NAME_KEY: &str = "user.name";
pub const EMPTY_SELECTION: &str = "Select an item from the menu to begin";
pub const EMPTY_MENU: &str = "No items available for your roles";
const ROOT_PATH: &str = "/";

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("capability {0} is not in the current menu")]
    NotPermitted(String),

    #[error("not signed in")]
    NotAuthenticated,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// One navigation entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub id: String,
    pub label: String,
    pub active: bool,
}

/// What the content area shows. Exactly one at a time.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentView {
    Empty { message: String },
    Pending { fallback: String },
    Mounted(View),
    Failed { message: String },
}

/// The whole page.
#[derive(Clone, Debug, PartialEq)]
pub enum ShellView {
    Loading,
    SignedOut { error: Option<String> },
    Dashboard { user_name: String, menu: Vec<MenuEntry>, content: ContentView, error: Option<String> },
}

pub struct ShellComposer {
    table: CapabilityTable,
    session: Arc<SessionController>,
    loader: Arc<RemoteLoader>,
    navigator: Arc<dyn Navigator>,
    shared: Arc<SharedScope>,
    selected: Mutex<Option<String>>,
}

impl ShellComposer {
    #[must_use]
    pub fn new(
        table: CapabilityTable,
        session: Arc<SessionController>,
        loader: Arc<RemoteLoader>,
        navigator: Arc<dyn Navigator>,
        shared: Arc<SharedScope>,
    ) -> Self {
        Self { table, session, loader, navigator, shared, selected: Mutex::new(None) }
    }

    /// Wire the HTTP identity client, the HTTP module source and the loader
    /// from configuration.
    ///
    /// # Errors
    ///
    /// [`ShellError::Api`] if the HTTP client cannot be built or the session
    /// cookie cannot be scoped, [`ShellError::Config`] for an invalid backend URL.
    pub fn from_config(
        config: &ShellConfig,
        catalog: ModuleCatalog,
        navigator: Arc<dyn Navigator>,
        session_cookie: Option<&str>,
    ) -> Result<Self, ShellError> {
        let api = HttpAuthApi::new(&config.bff_url, config.timeouts)?;
        if let Some(value) = session_cookie {
            api.seed_cookie(&config.session_cookie_name, value)?;
        }
        let api_base = config.bff_base()?;
        let shared = Arc::new(SharedScope::host());

        let source = HttpModuleSource::new(
            api.client().clone(),
            config.remote_host.clone(),
            &config.entry_path,
            Arc::clone(&shared),
            catalog,
        );
        let registry = CachedRegistry::new(config.capabilities.clone(), Arc::new(source));
        let loader = RemoteLoader::new(Arc::new(registry), Arc::clone(&shared), api.client().clone(), api_base);
        let session = SessionController::new(Arc::new(api), Arc::clone(&navigator));

        Ok(Self::new(config.capabilities.clone(), Arc::new(session), Arc::new(loader), navigator, shared))
    }

    fn selection(&self) -> MutexGuard<'_, Option<String>> {
        self.selected.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn session(&self) -> &SessionController {
        &self.session
    }

    #[must_use]
    pub fn loader(&self) -> &RemoteLoader {
        &self.loader
    }

    #[must_use]
    pub fn selected(&self) -> Option<String> {
        self.selection().clone()
    }

    /// Menu for the current identity; empty when signed out.
    #[must_use]
    pub fn menu(&self) -> MenuState {
        match self.session.identity() {
            Some(identity) if self.session.status() == SessionStatus::Authenticated => {
                self.table.menu_for(&identity.roles)
            }
            _ => MenuState::default(),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Initialize the session; once authenticated, publish the user into the
    /// render context and select the first capability the user qualifies for.
    pub async fn start(&self) -> SessionStatus {
        let status = self.session.initialize().await;
        if status != SessionStatus::Authenticated {
            return status;
        }
        let Some(identity) = self.session.identity() else {
            return status;
        };

        if let Some(context) = self.shared.render_context() {
            context.set(USER_NAME_KEY, identity.name.as_str());
        }

        if self.selected().is_none() {
            match self.table.first_for(&identity.roles) {
                Some(first) => {
                    tracing::info!(capability = %first.id, "auto-selecting first capability");
                    let id = first.id.clone();
                    if let Err(e) = self.select(&id).await {
                        tracing::warn!(capability = %id, error = %e, "auto-selection failed");
                    }
                }
                None => tracing::info!(user = %identity.name, "no capabilities for user roles"),
            }
        }
        status
    }

    /// Select a capability from the current menu and load its remote.
    ///
    /// # Errors
    ///
    /// [`ShellError::NotAuthenticated`] when signed out,
    /// [`ShellError::NotPermitted`] for an id outside the menu; the selection
    /// is unchanged in both cases.
    pub async fn select(&self, capability_id: &str) -> Result<RemoteMountState, ShellError> {
        if self.session.status() != SessionStatus::Authenticated {
            return Err(ShellError::NotAuthenticated);
        }
        let descriptor = self
            .menu()
            .get(capability_id)
            .cloned()
            .ok_or_else(|| ShellError::NotPermitted(capability_id.to_owned()))?;

        *self.selection() = Some(descriptor.id.clone());
        tracing::debug!(capability = %descriptor.id, "capability selected");
        Ok(self.loader.activate(&descriptor).await)
    }

    /// Start the identity provider login.
    ///
    /// # Errors
    ///
    /// [`ShellError::Session`] when the login URL cannot be obtained.
    pub async fn login(&self) -> Result<String, ShellError> {
        Ok(self.session.login().await?)
    }

    /// Clear the session, reset all shell state and reload at the root path.
    ///
    /// # Errors
    ///
    /// [`ShellError::Session`] when the backend refuses; local state is kept.
    pub async fn logout(&self) -> Result<Option<String>, ShellError> {
        let logout_url = self.session.logout().await?;
        self.reset_local();
        self.navigator.reload(ROOT_PATH);
        Ok(logout_url)
    }

    /// Refresh the backend session; an expired session resets the shell.
    ///
    /// # Errors
    ///
    /// [`ShellError::Session`] when signed out or the refresh call fails.
    pub async fn refresh(&self) -> Result<RefreshOutcome, ShellError> {
        let outcome = self.session.refresh().await?;
        if outcome == RefreshOutcome::Expired {
            self.reset_local();
        }
        Ok(outcome)
    }

    fn reset_local(&self) {
        *self.selection() = None;
        self.loader.reset();
        if let Some(context) = self.shared.render_context() {
            context.clear();
        }
    }

    // =========================================================================
    // View
    // =========================================================================

    #[must_use]
    pub fn view(&self) -> ShellView {
        let session = self.session.snapshot();
        match session.status {
            SessionStatus::Loading => ShellView::Loading,
            SessionStatus::Unauthenticated | SessionStatus::Errored => {
                ShellView::SignedOut { error: session.last_error }
            }
            SessionStatus::Authenticated => {
                let Some(identity) = session.identity else {
                    return ShellView::SignedOut { error: session.last_error };
                };
                let menu = self.table.menu_for(&identity.roles);
                let selected = self.selected();
                let entries = menu
                    .iter()
                    .map(|d| MenuEntry {
                        id: d.id.clone(),
                        label: d.label.clone(),
                        active: selected.as_deref() == Some(d.id.as_str()),
                    })
                    .collect();
                let content = self.content(&menu, selected.as_deref());
                ShellView::Dashboard { user_name: identity.name, menu: entries, content, error: session.last_error }
            }
        }
    }

    fn content(&self, menu: &MenuState, selected: Option<&str>) -> ContentView {
        let Some(descriptor) = selected.and_then(|id| menu.get(id)) else {
            let message = if menu.is_empty() { EMPTY_MENU } else { EMPTY_SELECTION };
            return ContentView::Empty { message: message.to_owned() };
        };
        match self.loader.state(&descriptor.id) {
            RemoteMountState::NotLoaded | RemoteMountState::Loading => {
                ContentView::Pending { fallback: RemoteLoader::fallback_for(descriptor) }
            }
            RemoteMountState::Mounted(mounted) => ContentView::Mounted(mounted.view),
            RemoteMountState::Failed(message) => ContentView::Failed { message },
        }
    }

    /// The current view as text, drawn with the host's shared renderer.
    #[must_use]
    pub fn render(&self) -> String {
        let view = self.view();
        match self.shared.renderer() {
            Some(renderer) => crate::render::render_shell(&view, &renderer),
            None => view.to_string(),
        }
    }
}
