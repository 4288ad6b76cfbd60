//! REST client for the identity backend.
//!
//! Every call goes through one `reqwest::Client` whose cookie jar holds the
//! backend session, so credentials are attached the way a browser attaches
//! cookies: implicitly, with no bearer token in the shell.
//!
//! ERROR HANDLING
//! ==============
//! 401/403 on the identity and refresh endpoints are outcomes, not errors.
//! Everything else that is not a success becomes an [`ApiError`] whose message
//! carries the status code, for the session controller to surface inline.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::cookie::Jar;
use reqwest::header::ACCEPT;
use url::Url;

use super::types::{ClearSessionResponse, CodeUrlResponse, IdentityOutcome, RefreshOutcome, UserIdentity};
use crate::config::HttpTimeouts;

pub const ME_PATH: &str = "/v1/auth/me";
pub const CODE_URL_PATH: &str = "/v1/auth/session/codeUrl";
pub const CLEAR_PATH: &str = "/v1/auth/session/clear";
pub const REFRESH_PATH: &str = "/v1/auth/session/refreshToken";

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("request to {path} failed: {message}")]
    Transport { path: &'static str, message: String },

    /// The backend answered with a non-success status.
    #[error("{path} returned status {status}")]
    Status { path: &'static str, status: u16 },

    /// The backend answered 2xx with a body we cannot use.
    #[error("invalid response from {path}: {message}")]
    Body { path: &'static str, message: String },

    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    #[error("invalid backend URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

/// Identity backend operations the session controller depends on.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// `GET /v1/auth/me`.
    async fn fetch_identity(&self) -> Result<IdentityOutcome, ApiError>;

    /// `GET /v1/auth/session/codeUrl`: the identity provider URL to send the page to.
    async fn fetch_login_url(&self) -> Result<String, ApiError>;

    /// `POST /v1/auth/session/clear`. Returns the provider's end-session URL when given.
    async fn clear_session(&self) -> Result<Option<String>, ApiError>;

    /// `GET /v1/auth/session/refreshToken`.
    async fn refresh_session(&self) -> Result<RefreshOutcome, ApiError>;
}

/// [`AuthApi`] over HTTP with a shared cookie jar.
#[derive(Clone, Debug)]
pub struct HttpAuthApi {
    client: reqwest::Client,
    jar: Arc<Jar>,
    base_url: String,
}

impl HttpAuthApi {
    /// Build a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] for an unparsable base URL or
    /// [`ApiError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl { url: base_url.clone(), message: e.to_string() })?;

        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;

        Ok(Self { client, jar, base_url })
    }

    /// The credentialed client. Remotes mount with a clone of it.
    #[must_use]
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Put an existing backend session cookie into the jar.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the base URL cannot scope the cookie.
    pub fn seed_cookie(&self, name: &str, value: &str) -> Result<(), ApiError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidUrl { url: self.base_url.clone(), message: e.to_string() })?;
        self.jar.add_cookie_str(&format!("{name}={value}; Path=/"), &url);
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn transport(path: &'static str, e: &reqwest::Error) -> ApiError {
    ApiError::Transport { path, message: e.to_string() }
}

fn body(path: &'static str, e: &reqwest::Error) -> ApiError {
    ApiError::Body { path, message: e.to_string() }
}

fn is_no_session(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

#[async_trait::async_trait]
impl AuthApi for HttpAuthApi {
    async fn fetch_identity(&self) -> Result<IdentityOutcome, ApiError> {
        let resp = self
            .client
            .get(self.endpoint(ME_PATH))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport(ME_PATH, &e))?;

        let status = resp.status();
        if is_no_session(status) {
            return Ok(IdentityOutcome::NoSession);
        }
        if !status.is_success() {
            return Err(ApiError::Status { path: ME_PATH, status: status.as_u16() });
        }

        let identity = resp
            .json::<UserIdentity>()
            .await
            .map_err(|e| body(ME_PATH, &e))?;
        Ok(IdentityOutcome::Authenticated(identity))
    }

    async fn fetch_login_url(&self) -> Result<String, ApiError> {
        let resp = self
            .client
            .get(self.endpoint(CODE_URL_PATH))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport(CODE_URL_PATH, &e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status { path: CODE_URL_PATH, status: status.as_u16() });
        }

        let payload = resp
            .json::<CodeUrlResponse>()
            .await
            .map_err(|e| body(CODE_URL_PATH, &e))?;
        if payload.url.trim().is_empty() {
            return Err(ApiError::Body { path: CODE_URL_PATH, message: "empty redirect url".to_owned() });
        }
        Ok(payload.url)
    }

    async fn clear_session(&self) -> Result<Option<String>, ApiError> {
        let resp = self
            .client
            .post(self.endpoint(CLEAR_PATH))
            .send()
            .await
            .map_err(|e| transport(CLEAR_PATH, &e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status { path: CLEAR_PATH, status: status.as_u16() });
        }

        // The body is optional; a missing or odd body does not undo the logout.
        let raw = resp.text().await.unwrap_or_default();
        let parsed: ClearSessionResponse = serde_json::from_str(&raw).unwrap_or_default();
        Ok(parsed.logout_url)
    }

    async fn refresh_session(&self) -> Result<RefreshOutcome, ApiError> {
        let resp = self
            .client
            .get(self.endpoint(REFRESH_PATH))
            .send()
            .await
            .map_err(|e| transport(REFRESH_PATH, &e))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(RefreshOutcome::Expired);
        }
        if !status.is_success() {
            return Err(ApiError::Status { path: REFRESH_PATH, status: status.as_u16() });
        }
        Ok(RefreshOutcome::Refreshed)
    }
}
