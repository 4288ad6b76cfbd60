use std::sync::atomic::Ordering;

use super::*;
use crate::navigation::{Navigation, RecordingNavigator};
use crate::test_helpers::{LOGIN_URL, MockAuthApi};

fn controller(api: MockAuthApi) -> (SessionController, Arc<MockAuthApi>, Arc<RecordingNavigator>) {
    let api = Arc::new(api);
    let navigator = Arc::new(RecordingNavigator::new());
    let session = SessionController::new(api.clone(), navigator.clone());
    (session, api, navigator)
}

fn server_error() -> ApiError {
    ApiError::Status { path: crate::net::api::ME_PATH, status: 500 }
}

// =========================================================================
// initialize
// =========================================================================

#[test]
fn new_session_is_unauthenticated() {
    let (session, _, _) = controller(MockAuthApi::new());
    assert_eq!(session.snapshot(), Session::default());
    assert!(!session.is_redirecting());
}

#[tokio::test]
async fn initialize_authenticates_with_identity() {
    let (session, _, _) = controller(MockAuthApi::signed_in("Ada", &["role.alpha"]));

    assert_eq!(session.initialize().await, SessionStatus::Authenticated);
    let snapshot = session.snapshot();
    assert!(snapshot.is_authenticated());
    assert_eq!(snapshot.identity.unwrap().name, "Ada");
    assert_eq!(snapshot.last_error, None);
}

#[tokio::test]
async fn initialize_no_session_is_not_an_error() {
    let (session, _, _) = controller(MockAuthApi::new().with_identity(Ok(IdentityOutcome::NoSession)));

    assert_eq!(session.initialize().await, SessionStatus::Unauthenticated);
    assert_eq!(session.snapshot(), Session::default());
}

#[tokio::test]
async fn initialize_server_error_is_errored_with_status() {
    let (session, _, _) = controller(MockAuthApi::new().with_identity(Err(server_error())));

    assert_eq!(session.initialize().await, SessionStatus::Errored);
    let snapshot = session.snapshot();
    assert!(snapshot.identity.is_none());
    assert!(snapshot.last_error.unwrap().contains("500"));
}

#[tokio::test]
async fn initialize_runs_once() {
    let (session, api, _) = controller(MockAuthApi::signed_in("Ada", &["role.alpha"]));

    session.initialize().await;
    session.initialize().await;
    assert_eq!(api.identity_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_initialize_is_deduplicated() {
    let (session, api, _) = controller(MockAuthApi::signed_in("Ada", &["role.alpha"]));

    let (first, second) = tokio::join!(session.initialize(), session.initialize());
    assert_eq!(first, SessionStatus::Authenticated);
    assert_eq!(second, SessionStatus::Loading);
    assert_eq!(api.identity_calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.status(), SessionStatus::Authenticated);
}

#[tokio::test]
async fn reset_discards_in_flight_identity() {
    let (session, _, _) = controller(MockAuthApi::signed_in("Ada", &["role.alpha"]));

    let (status, ()) = tokio::join!(session.initialize(), async { session.reset() });
    assert_eq!(status, SessionStatus::Unauthenticated);
    assert_eq!(session.snapshot(), Session::default());
}

#[tokio::test]
async fn reset_rearms_initialize() {
    let (session, api, _) = controller(
        MockAuthApi::new()
            .with_identity(Ok(IdentityOutcome::NoSession))
            .with_identity(Ok(IdentityOutcome::Authenticated(UserIdentity::new("Bo", ["role.beta"])))),
    );

    assert_eq!(session.initialize().await, SessionStatus::Unauthenticated);
    session.reset();
    assert_eq!(session.initialize().await, SessionStatus::Authenticated);
    assert_eq!(api.identity_calls.load(Ordering::SeqCst), 2);
}

// =========================================================================
// login
// =========================================================================

#[tokio::test]
async fn login_redirects_and_freezes() {
    let (session, api, navigator) = controller(MockAuthApi::new());
    session.initialize().await;

    let url = session.login().await.unwrap();
    assert_eq!(url, LOGIN_URL);
    assert_eq!(navigator.history(), vec![Navigation::External(LOGIN_URL.to_owned())]);
    assert!(session.is_redirecting());

    assert!(matches!(session.login().await, Err(SessionError::Redirecting)));
    assert_eq!(api.login_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn frozen_session_ignores_initialize() {
    let (session, api, _) = controller(MockAuthApi::new());
    session.login().await.unwrap();

    assert_eq!(session.initialize().await, SessionStatus::Unauthenticated);
    assert_eq!(api.identity_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn login_waits_for_identity_check() {
    let (session, api, navigator) = controller(MockAuthApi::signed_in("Ada", &["role.alpha"]));

    let (status, login) = tokio::join!(session.initialize(), session.login());
    assert_eq!(status, SessionStatus::Authenticated);
    assert!(matches!(login, Err(SessionError::Initializing)));
    assert!(navigator.history().is_empty());
    assert!(!session.is_redirecting());
    assert_eq!(api.login_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn identity_answer_after_redirect_is_dropped() {
    let (session, _, navigator) = controller(MockAuthApi::signed_in("Ada", &["role.alpha"]));

    let (login, status) = tokio::join!(session.login(), session.initialize());
    assert_eq!(login.unwrap(), LOGIN_URL);
    assert_eq!(status, SessionStatus::Unauthenticated);
    assert_eq!(session.identity(), None);
    assert!(session.is_redirecting());
    assert_eq!(navigator.history(), vec![Navigation::External(LOGIN_URL.to_owned())]);
}

#[tokio::test]
async fn login_failure_sets_errored_and_stays() {
    let (session, _, navigator) = controller(
        MockAuthApi::new().with_login(Err(ApiError::Status { path: crate::net::api::CODE_URL_PATH, status: 503 })),
    );

    let err = session.login().await.unwrap_err();
    assert!(matches!(err, SessionError::Api(ApiError::Status { status: 503, .. })));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Errored);
    assert!(snapshot.last_error.unwrap().contains("503"));
    assert!(navigator.history().is_empty());
    assert!(!session.is_redirecting());
}

#[tokio::test]
async fn login_when_signed_in_is_refused() {
    let (session, api, _) = controller(MockAuthApi::signed_in("Ada", &["role.alpha"]));
    session.initialize().await;

    assert!(matches!(session.login().await, Err(SessionError::AlreadyAuthenticated)));
    assert_eq!(api.login_calls.load(Ordering::SeqCst), 0);
}

// =========================================================================
// logout / refresh
// =========================================================================

#[tokio::test]
async fn logout_resets_session() {
    let (session, _, _) = controller(
        MockAuthApi::signed_in("Ada", &["role.alpha"]).with_clear(Ok(Some("https://idp.test/logout".to_owned()))),
    );
    session.initialize().await;

    let logout_url = session.logout().await.unwrap();
    assert_eq!(logout_url.as_deref(), Some("https://idp.test/logout"));
    assert_eq!(session.snapshot(), Session::default());
}

#[tokio::test]
async fn logout_failure_keeps_state() {
    let (session, _, _) = controller(
        MockAuthApi::signed_in("Ada", &["role.alpha"])
            .with_clear(Err(ApiError::Status { path: crate::net::api::CLEAR_PATH, status: 500 })),
    );
    session.initialize().await;

    assert!(session.logout().await.is_err());
    let snapshot = session.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Authenticated);
    assert_eq!(snapshot.identity.unwrap().name, "Ada");
    assert!(snapshot.last_error.unwrap().contains("500"));
}

#[tokio::test]
async fn refresh_requires_session() {
    let (session, api, _) = controller(MockAuthApi::new());
    session.initialize().await;

    assert!(matches!(session.refresh().await, Err(SessionError::NotAuthenticated)));
    assert_eq!(api.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn refresh_keeps_session() {
    let (session, _, _) = controller(MockAuthApi::signed_in("Ada", &["role.alpha"]));
    session.initialize().await;

    assert_eq!(session.refresh().await.unwrap(), RefreshOutcome::Refreshed);
    assert_eq!(session.status(), SessionStatus::Authenticated);
}

#[tokio::test]
async fn refresh_expired_resets() {
    let (session, _, _) =
        controller(MockAuthApi::signed_in("Ada", &["role.alpha"]).with_refresh(Ok(RefreshOutcome::Expired)));
    session.initialize().await;

    assert_eq!(session.refresh().await.unwrap(), RefreshOutcome::Expired);
    assert_eq!(session.snapshot(), Session::default());
}

#[tokio::test]
async fn refresh_failure_sets_last_error() {
    let (session, _, _) = controller(
        MockAuthApi::signed_in("Ada", &["role.alpha"])
            .with_refresh(Err(ApiError::Transport { path: crate::net::api::REFRESH_PATH, message: "timed out".to_owned() })),
    );
    session.initialize().await;

    assert!(session.refresh().await.is_err());
    let snapshot = session.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Authenticated);
    assert!(snapshot.last_error.unwrap().contains("timed out"));
}
