//! Wire types for the identity backend.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The signed-in user as reported by `GET /v1/auth/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub name: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl UserIdentity {
    #[must_use]
    pub fn new<I, S>(name: &str, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { name: name.to_owned(), roles: roles.into_iter().map(Into::into).collect() }
    }
}

/// Result of an identity fetch that reached the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityOutcome {
    Authenticated(UserIdentity),
    /// 401/403: there is no session. Not an error.
    NoSession,
}

/// Result of a token refresh that reached the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    /// The server no longer holds a session for us.
    Expired,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CodeUrlResponse {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ClearSessionResponse {
    #[serde(default, rename = "logoutUrl")]
    pub logout_url: Option<String>,
}
