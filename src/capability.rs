//! Capability table and the role-to-menu mapping.
//!
//! DESIGN
//! ======
//! The table is configuration: built once, injected into the mapper, the
//! registry and the composer, and never mutated. `menu_for` is a pure filter
//! over it that keeps declaration order, so the same role set always yields
//! the same menu and "first qualifying capability" is well defined.

#[cfg(test)]
#[path = "capability_test.rs"]
mod capability_test;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

/// Where a capability's remote is served from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteOrigin {
    /// Port on the configured remote host (`http://localhost:5177`).
    Port(u16),
    /// Absolute origin, optionally with a path prefix.
    Url(Url),
}

impl RemoteOrigin {
    /// Absolute origin URL, always ending in `/` so entry paths join under it.
    #[must_use]
    pub fn resolve(&self, remote_host: &Url) -> Option<Url> {
        let mut url = match self {
            Self::Port(port) => {
                let mut url = remote_host.clone();
                url.set_port(Some(*port)).ok()?;
                url
            }
            Self::Url(url) => url.clone(),
        };
        if url.cannot_be_a_base() {
            return None;
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Some(url)
    }
}

/// One entry of the capability table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    pub id: String,
    #[serde(alias = "role")]
    pub required_role: String,
    pub label: String,
    #[serde(alias = "port")]
    pub remote: RemoteOrigin,
}

impl CapabilityDescriptor {
    #[must_use]
    pub fn new(id: &str, required_role: &str, label: &str, remote: RemoteOrigin) -> Self {
        Self { id: id.to_owned(), required_role: required_role.to_owned(), label: label.to_owned(), remote }
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("capability #{index} has an empty id")]
    EmptyId { index: usize },
    #[error("capability id {0} is declared more than once")]
    DuplicateId(String),
    #[error("capability {0} has an empty required role")]
    EmptyRole(String),
    #[error("capability table parse failed: {0}")]
    Parse(String),
}

#[derive(Deserialize)]
struct TableFile {
    capabilities: Vec<CapabilityDescriptor>,
}

/// Immutable, cheaply clonable capability table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilityTable {
    entries: Arc<[CapabilityDescriptor]>,
}

impl CapabilityTable {
    /// Build a validated table.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] for empty ids, duplicate ids, or empty roles.
    pub fn new(entries: Vec<CapabilityDescriptor>) -> Result<Self, TableError> {
        let mut seen = BTreeSet::new();
        for (index, entry) in entries.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(TableError::EmptyId { index });
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(TableError::DuplicateId(entry.id.clone()));
            }
            if entry.required_role.trim().is_empty() {
                return Err(TableError::EmptyRole(entry.id.clone()));
            }
        }
        Ok(Self { entries: entries.into() })
    }

    /// The two dashboards every deployment ships with.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = vec![
            CapabilityDescriptor::new("metrics", "role.alpha", "Metrics", RemoteOrigin::Port(5177)),
            CapabilityDescriptor::new("analytics", "role.beta", "Analytics", RemoteOrigin::Port(5178)),
        ];
        Self { entries: entries.into() }
    }

    /// Parse a `capabilities:` YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Parse`] for malformed YAML, or any validation error.
    pub fn from_yaml(raw: &str) -> Result<Self, TableError> {
        let file: TableFile = serde_yaml::from_str(raw).map_err(|e| TableError::Parse(e.to_string()))?;
        Self::new(file.capabilities)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapabilityDescriptor> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CapabilityDescriptor> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Capabilities whose required role is in `roles`, in table order.
    #[must_use]
    pub fn menu_for(&self, roles: &BTreeSet<String>) -> MenuState {
        let entries = self
            .entries
            .iter()
            .filter(|entry| roles.contains(&entry.required_role))
            .cloned()
            .collect();
        MenuState { entries }
    }

    /// First capability in table order the roles qualify for.
    #[must_use]
    pub fn first_for(&self, roles: &BTreeSet<String>) -> Option<&CapabilityDescriptor> {
        self.entries
            .iter()
            .find(|entry| roles.contains(&entry.required_role))
    }
}

/// Menu derived from the table and the current identity's roles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MenuState {
    entries: Vec<CapabilityDescriptor>,
}

impl MenuState {
    pub fn iter(&self) -> impl Iterator<Item = &CapabilityDescriptor> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&CapabilityDescriptor> {
        self.entries.first()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CapabilityDescriptor> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.id.as_str()).collect()
    }
}
