//! Session controller: the authenticated-user lifecycle.
//!
//! SYSTEM CONTEXT
//! ==============
//! One controller exists per shell instance. It is the only writer of the
//! [`Session`]; the composer reads snapshots of it to decide which view to
//! show and which menu to build.
//!
//! DESIGN
//! ======
//! State lives behind a `std::sync::Mutex` that is never held across an
//! await. Each network call captures the current generation before it
//! suspends; `reset()` bumps the generation, and a response that comes back
//! under an older generation is dropped instead of applied. That covers both
//! duplicate `initialize()` calls racing a logout and a late identity answer
//! arriving after the user already left.
//!
//! After a successful `login()` the controller is frozen: the page is on its
//! way to the identity provider, so nothing else may change the session
//! until `reset()`. `login()` is refused while the identity check is in
//! flight, and an identity answer that lands after a redirect started is
//! dropped.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::navigation::Navigator;
use crate::net::api::{ApiError, AuthApi};
use crate::net::types::{IdentityOutcome, RefreshOutcome, UserIdentity};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Unauthenticated,
    Loading,
    Authenticated,
    Errored,
}

/// Current user lifecycle state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub identity: Option<UserIdentity>,
    pub status: SessionStatus,
    pub last_error: Option<String>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated && self.identity.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("a login redirect is already in progress")]
    Redirecting,

    #[error("already signed in")]
    AlreadyAuthenticated,

    #[error("session check still in progress")]
    Initializing,

    #[error("not signed in")]
    NotAuthenticated,

    /// The session was reset while the request was in flight.
    #[error("session was reset before the request completed")]
    Superseded,
}

#[derive(Default)]
struct Inner {
    session: Session,
    generation: u64,
    initializing: bool,
    initialized: bool,
    redirecting: bool,
}

pub struct SessionController {
    api: Arc<dyn AuthApi>,
    navigator: Arc<dyn Navigator>,
    inner: Mutex<Inner>,
}

impl SessionController {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, navigator: Arc<dyn Navigator>) -> Self {
        Self { api, navigator, inner: Mutex::new(Inner::default()) }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.lock().session.clone()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.lock().session.status
    }

    #[must_use]
    pub fn identity(&self) -> Option<UserIdentity> {
        self.lock().session.identity.clone()
    }

    /// True once `login()` has handed the page to the identity provider.
    #[must_use]
    pub fn is_redirecting(&self) -> bool {
        self.lock().redirecting
    }

    // =========================================================================
    // initialize
    // =========================================================================

    /// Fetch the current identity once.
    ///
    /// A call made while a fetch is in flight, after one has completed, or
    /// while redirecting returns the current status without another request.
    pub async fn initialize(&self) -> SessionStatus {
        let generation = {
            let mut inner = self.lock();
            if inner.initializing || inner.initialized || inner.redirecting {
                return inner.session.status;
            }
            inner.initializing = true;
            inner.session.status = SessionStatus::Loading;
            inner.session.last_error = None;
            inner.generation
        };

        let result = self.api.fetch_identity().await;

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!(generation, current = inner.generation, "discarding stale identity response");
            return inner.session.status;
        }
        inner.initializing = false;
        inner.initialized = true;
        if inner.redirecting {
            tracing::debug!("discarding identity response received during login redirect");
            inner.session = Session::default();
            return inner.session.status;
        }

        match result {
            Ok(IdentityOutcome::Authenticated(identity)) => {
                tracing::info!(user = %identity.name, roles = identity.roles.len(), "session authenticated");
                inner.session = Session { identity: Some(identity), status: SessionStatus::Authenticated, last_error: None };
            }
            Ok(IdentityOutcome::NoSession) => {
                tracing::info!("no active session");
                inner.session = Session::default();
            }
            Err(e) => {
                tracing::warn!(error = %e, "identity fetch failed");
                inner.session = Session { identity: None, status: SessionStatus::Errored, last_error: Some(e.to_string()) };
            }
        }
        inner.session.status
    }

    // =========================================================================
    // login / logout / refresh
    // =========================================================================

    /// Ask the backend for the identity provider URL and redirect the page to it.
    ///
    /// # Errors
    ///
    /// [`SessionError::Api`] if the backend call fails (the session becomes
    /// `Errored`), or a guard error when a redirect is pending, the identity
    /// check has not finished, or the user is already signed in.
    pub async fn login(&self) -> Result<String, SessionError> {
        let generation = {
            let inner = self.lock();
            if inner.redirecting {
                return Err(SessionError::Redirecting);
            }
            if inner.initializing {
                return Err(SessionError::Initializing);
            }
            if inner.session.status == SessionStatus::Authenticated {
                return Err(SessionError::AlreadyAuthenticated);
            }
            inner.generation
        };

        let result = self.api.fetch_login_url().await;

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!("discarding stale login response");
            return Err(SessionError::Superseded);
        }
        match result {
            Ok(url) => {
                inner.redirecting = true;
                drop(inner);
                tracing::info!(%url, "redirecting to identity provider");
                self.navigator.redirect(&url);
                Ok(url)
            }
            Err(e) => {
                tracing::warn!(error = %e, "login url request failed");
                inner.session.status = SessionStatus::Errored;
                inner.session.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Clear the server-side session and reset local state.
    ///
    /// Returns the identity provider's end-session URL when the backend sent one.
    ///
    /// # Errors
    ///
    /// [`SessionError::Api`] when the clear request fails. Local state is then
    /// kept, since the server may still hold the session; only `last_error` changes.
    pub async fn logout(&self) -> Result<Option<String>, SessionError> {
        let generation = {
            let inner = self.lock();
            if inner.redirecting {
                return Err(SessionError::Redirecting);
            }
            inner.generation
        };

        match self.api.clear_session().await {
            Ok(logout_url) => {
                tracing::info!(logout_url = logout_url.as_deref().unwrap_or("-"), "session cleared");
                self.reset();
                Ok(logout_url)
            }
            Err(e) => {
                tracing::warn!(error = %e, "session clear failed");
                let mut inner = self.lock();
                if inner.generation == generation {
                    inner.session.last_error = Some(e.to_string());
                }
                Err(e.into())
            }
        }
    }

    /// Refresh the server-side access token.
    ///
    /// An expired session resets to `Unauthenticated`.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotAuthenticated`] without a session, or
    /// [`SessionError::Api`] on failure (state kept, `last_error` set).
    pub async fn refresh(&self) -> Result<RefreshOutcome, SessionError> {
        let generation = {
            let inner = self.lock();
            if inner.redirecting {
                return Err(SessionError::Redirecting);
            }
            if inner.session.status != SessionStatus::Authenticated {
                return Err(SessionError::NotAuthenticated);
            }
            inner.generation
        };

        let result = self.api.refresh_session().await;

        if self.lock().generation != generation {
            return Err(SessionError::Superseded);
        }
        match result {
            Ok(RefreshOutcome::Refreshed) => {
                tracing::debug!("session refreshed");
                Ok(RefreshOutcome::Refreshed)
            }
            Ok(RefreshOutcome::Expired) => {
                tracing::info!("session expired");
                self.reset();
                Ok(RefreshOutcome::Expired)
            }
            Err(e) => {
                tracing::warn!(error = %e, "session refresh failed");
                self.lock().session.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Return to startup values and re-arm `initialize()`.
    ///
    /// Responses to requests started before the reset are discarded.
    pub fn reset(&self) {
        let mut inner = self.lock();
        let generation = inner.generation.wrapping_add(1);
        *inner = Inner { generation, ..Inner::default() };
        tracing::debug!(generation, "session reset");
    }
}
