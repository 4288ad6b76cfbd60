//! Remote entry manifest.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every remote publishes one manifest at a well-known path under its origin.
//! The shell fetches it lazily, validates it against the host's shared scope,
//! and only then links the exposed module. A remote that would bring its own
//! copy of a host singleton is rejected here, before anything is mounted.

#[cfg(test)]
#[path = "manifest_test.rs"]
mod manifest_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ContractError;
use crate::shared::SharedScope;

/// Path of the manifest relative to a remote's origin.
pub const DEFAULT_ENTRY_PATH: &str = "/assets/remoteEntry.json";

/// How a remote declares one of its shared dependencies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedDecl {
    #[serde(default)]
    pub singleton: bool,
    #[serde(default, rename = "requiredVersion", skip_serializing_if = "Option::is_none")]
    pub required_version: Option<String>,
}

/// The document a remote publishes next to its bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteManifest {
    /// Federation name of the remote, e.g. `react_metrics`.
    pub name: String,
    /// Exposed module key (e.g. `./App`) to module source.
    pub exposes: BTreeMap<String, String>,
    #[serde(default)]
    pub shared: BTreeMap<String, SharedDecl>,
}

impl RemoteManifest {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), exposes: BTreeMap::new(), shared: BTreeMap::new() }
    }

    #[must_use]
    pub fn expose(mut self, key: impl Into<String>, module: impl Into<String>) -> Self {
        self.exposes.insert(key.into(), module.into());
        self
    }

    #[must_use]
    pub fn share_singleton(mut self, dependency: impl Into<String>, required_version: &str) -> Self {
        self.shared.insert(
            dependency.into(),
            SharedDecl { singleton: true, required_version: Some(required_version.to_owned()) },
        );
        self
    }

    /// Check the manifest against the host scope and return the exposed key.
    ///
    /// # Errors
    ///
    /// Returns the first [`ContractError`] found: empty name, an exposes count
    /// other than one, or any host singleton that is undeclared, declared
    /// without `singleton`, or required at an incompatible major version.
    pub fn validate(&self, scope: &SharedScope) -> Result<&str, ContractError> {
        if self.name.trim().is_empty() {
            return Err(ContractError::InvalidManifest("remote name is empty".to_owned()));
        }

        let mut exposed = self.exposes.keys();
        let (Some(export), None) = (exposed.next(), exposed.next()) else {
            return Err(ContractError::ExposeCount { remote: self.name.clone(), count: self.exposes.len() });
        };

        for (dependency, provided) in scope.versions() {
            let Some(decl) = self.shared.get(dependency) else {
                return Err(ContractError::MissingShared {
                    remote: self.name.clone(),
                    dependency: dependency.to_owned(),
                });
            };
            if !decl.singleton {
                return Err(ContractError::NotSingleton {
                    remote: self.name.clone(),
                    dependency: dependency.to_owned(),
                });
            }
            if let Some(required) = &decl.required_version {
                check_major(&self.name, dependency, required, provided)?;
            }
        }

        Ok(export.as_str())
    }
}

fn check_major(remote: &str, dependency: &str, required: &str, provided: &str) -> Result<(), ContractError> {
    if accepts_any_version(required) {
        return Ok(());
    }
    let invalid = |raw: &str| ContractError::InvalidVersion { dependency: dependency.to_owned(), raw: raw.to_owned() };
    let want = major_version(required).ok_or_else(|| invalid(required))?;
    let have = major_version(provided).ok_or_else(|| invalid(provided))?;
    if want != have {
        return Err(ContractError::VersionMismatch {
            remote: remote.to_owned(),
            dependency: dependency.to_owned(),
            required: required.to_owned(),
            provided: provided.to_owned(),
        });
    }
    Ok(())
}

/// `*`, `x` and an empty requirement match any provided version.
fn accepts_any_version(required: &str) -> bool {
    matches!(required.trim(), "" | "*" | "x" | "X")
}

/// Major component of a version or simple requirement (`18.3.1`, `^18.2.0`, `~18`, `>=18`).
#[must_use]
pub fn major_version(raw: &str) -> Option<u64> {
    let trimmed = raw.trim().trim_start_matches(['^', '~', '=', '>', 'v', ' ']);
    trimmed
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .and_then(|digits| digits.parse().ok())
}
