//! Scripted collaborators shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use federation::{
    MountContext, RENDER_DOM, RENDER_LIB, RemoteComponent, RemoteManifest, RenderError, SharedScope, View,
};
use url::Url;

use crate::capability::{CapabilityDescriptor, CapabilityTable};
use crate::composer::ShellComposer;
use crate::navigation::RecordingNavigator;
use crate::net::api::{ApiError, AuthApi};
use crate::net::types::{IdentityOutcome, RefreshOutcome, UserIdentity};
use crate::remote::{CachedRegistry, LoadError, LoadedRemote, ModuleSource, RemoteLoader};
use crate::session::SessionController;

// =========================================================================
// MockAuthApi
// =========================================================================

/// [`AuthApi`] returning scripted results in order, then a default.
///
/// Every call yields to the scheduler once before answering, so tests can
/// interleave a second call or a reset while the first is in flight.
#[derive(Default)]
pub struct MockAuthApi {
    identity: Mutex<Vec<Result<IdentityOutcome, ApiError>>>,
    login: Mutex<Vec<Result<String, ApiError>>>,
    clear: Mutex<Vec<Result<Option<String>, ApiError>>>,
    refresh: Mutex<Vec<Result<RefreshOutcome, ApiError>>>,
    pub identity_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub clear_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
}

pub const LOGIN_URL: &str = "https://idp.test/authorize";

fn next<T>(script: &Mutex<Vec<T>>) -> Option<T> {
    let mut script = script.lock().unwrap();
    if script.is_empty() { None } else { Some(script.remove(0)) }
}

impl MockAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(name: &str, roles: &[&str]) -> Self {
        Self::new().with_identity(Ok(IdentityOutcome::Authenticated(UserIdentity::new(name, roles.iter().copied()))))
    }

    pub fn with_identity(self, result: Result<IdentityOutcome, ApiError>) -> Self {
        self.identity.lock().unwrap().push(result);
        self
    }

    pub fn with_login(self, result: Result<String, ApiError>) -> Self {
        self.login.lock().unwrap().push(result);
        self
    }

    pub fn with_clear(self, result: Result<Option<String>, ApiError>) -> Self {
        self.clear.lock().unwrap().push(result);
        self
    }

    pub fn with_refresh(self, result: Result<RefreshOutcome, ApiError>) -> Self {
        self.refresh.lock().unwrap().push(result);
        self
    }
}

#[async_trait::async_trait]
impl AuthApi for MockAuthApi {
    async fn fetch_identity(&self) -> Result<IdentityOutcome, ApiError> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        next(&self.identity).unwrap_or(Ok(IdentityOutcome::NoSession))
    }

    async fn fetch_login_url(&self) -> Result<String, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        next(&self.login).unwrap_or_else(|| Ok(LOGIN_URL.to_owned()))
    }

    async fn clear_session(&self) -> Result<Option<String>, ApiError> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        next(&self.clear).unwrap_or(Ok(None))
    }

    async fn refresh_session(&self) -> Result<RefreshOutcome, ApiError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        next(&self.refresh).unwrap_or(Ok(RefreshOutcome::Refreshed))
    }
}

// =========================================================================
// Components
// =========================================================================

/// Renders a fixed heading.
pub struct StaticComponent {
    pub title: String,
}

#[async_trait::async_trait]
impl RemoteComponent for StaticComponent {
    fn name(&self) -> &str {
        &self.title
    }

    async fn render(&self, _ctx: &MountContext) -> Result<View, RenderError> {
        Ok(View::heading(self.title.clone()))
    }
}

pub struct FailingComponent;

#[async_trait::async_trait]
impl RemoteComponent for FailingComponent {
    fn name(&self) -> &str {
        "failing"
    }

    async fn render(&self, _ctx: &MountContext) -> Result<View, RenderError> {
        Err(RenderError::Failed("widget exploded".to_owned()))
    }
}

pub struct PanickingComponent;

#[async_trait::async_trait]
impl RemoteComponent for PanickingComponent {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn render(&self, _ctx: &MountContext) -> Result<View, RenderError> {
        panic!("index out of bounds")
    }
}

// =========================================================================
// StaticSource
// =========================================================================

/// [`ModuleSource`] serving in-process components and counting loads per id.
#[derive(Default)]
pub struct StaticSource {
    components: HashMap<String, Arc<dyn RemoteComponent>>,
    failures: Mutex<HashMap<String, LoadError>>,
    loads: Mutex<HashMap<String, usize>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both built-in capabilities with static components.
    pub fn builtin() -> Self {
        Self::new()
            .with_component("metrics", Arc::new(StaticComponent { title: "Metrics Dashboard".to_owned() }))
            .with_component("analytics", Arc::new(StaticComponent { title: "Analytics Dashboard".to_owned() }))
    }

    pub fn with_component(mut self, id: &str, component: Arc<dyn RemoteComponent>) -> Self {
        self.components.insert(id.to_owned(), component);
        self
    }

    /// Make loads of `id` fail until [`StaticSource::heal`] is called.
    pub fn with_failure(self, id: &str, error: LoadError) -> Self {
        self.failures.lock().unwrap().insert(id.to_owned(), error);
        self
    }

    pub fn heal(&self, id: &str) {
        self.failures.lock().unwrap().remove(id);
    }

    pub fn loads(&self, id: &str) -> usize {
        self.loads.lock().unwrap().get(id).copied().unwrap_or(0)
    }
}

pub fn manifest_for(id: &str) -> RemoteManifest {
    RemoteManifest::new(format!("remote_{id}"))
        .expose("./App", "./src/App")
        .share_singleton(RENDER_LIB, "^18.2.0")
        .share_singleton(RENDER_DOM, "^18.2.0")
}

#[async_trait::async_trait]
impl ModuleSource for StaticSource {
    async fn load(&self, descriptor: &CapabilityDescriptor) -> Result<LoadedRemote, LoadError> {
        *self.loads.lock().unwrap().entry(descriptor.id.clone()).or_default() += 1;
        tokio::task::yield_now().await;

        if let Some(error) = self.failures.lock().unwrap().get(&descriptor.id).cloned() {
            return Err(error);
        }
        let component = self
            .components
            .get(&descriptor.id)
            .cloned()
            .ok_or_else(|| LoadError::UnknownCapability(descriptor.id.clone()))?;
        Ok(LoadedRemote {
            capability_id: descriptor.id.clone(),
            manifest: manifest_for(&descriptor.id),
            export: "./App".to_owned(),
            component,
        })
    }
}

pub fn unreachable(id: &str) -> LoadError {
    LoadError::Unreachable { url: format!("http://localhost:1/{id}"), message: "connection refused".to_owned() }
}

// =========================================================================
// Wiring
// =========================================================================

pub struct TestShell {
    pub shell: ShellComposer,
    pub api: Arc<MockAuthApi>,
    pub source: Arc<StaticSource>,
    pub navigator: Arc<RecordingNavigator>,
    pub shared: Arc<SharedScope>,
}

pub fn loader_with(source: Arc<StaticSource>, shared: Arc<SharedScope>) -> RemoteLoader {
    let registry = CachedRegistry::new(CapabilityTable::builtin(), source);
    RemoteLoader::new(Arc::new(registry), shared, reqwest::Client::new(), Url::parse("http://localhost:3001").unwrap())
}

/// A composer over the built-in table with mock identity and static remotes.
pub fn test_shell(api: MockAuthApi, source: StaticSource) -> TestShell {
    let api = Arc::new(api);
    let source = Arc::new(source);
    let navigator = Arc::new(RecordingNavigator::new());
    let shared = Arc::new(SharedScope::host());

    let session = Arc::new(SessionController::new(api.clone(), navigator.clone()));
    let loader = Arc::new(loader_with(Arc::clone(&source), Arc::clone(&shared)));
    let shell = ShellComposer::new(CapabilityTable::builtin(), session, loader, navigator.clone(), Arc::clone(&shared));

    TestShell { shell, api, source, navigator, shared }
}
