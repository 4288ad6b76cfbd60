//! Shell configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::Path;

use url::Url;

use crate::capability::{CapabilityTable, TableError};

pub const DEFAULT_BFF_URL: &str = "http://localhost:3001";
pub const DEFAULT_REMOTE_HOST: &str = "http://localhost";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SESSION_COOKIE_NAME: &str = "JSESSIONID";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL in {var}: {value} ({message})")]
    InvalidUrl { var: &'static str, value: String, message: String },

    #[error("cannot read capability file {path}: {message}")]
    ReadCapabilities { path: String, message: String },

    #[error("invalid capability table: {0}")]
    Capabilities(#[from] TableError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    /// Identity backend base URL, without trailing `/`.
    pub bff_url: String,
    /// Host that port-addressed remotes are served from.
    pub remote_host: Url,
    /// Manifest path under each remote's origin.
    pub entry_path: String,
    pub capabilities: CapabilityTable,
    pub timeouts: HttpTimeouts,
    pub session_cookie_name: String,
}

impl ShellConfig {
    /// Config with every default and the built-in capability table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if a default URL does not parse.
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            bff_url: DEFAULT_BFF_URL.to_owned(),
            remote_host: parse_url("SHELL_REMOTE_HOST", DEFAULT_REMOTE_HOST)?,
            entry_path: federation::DEFAULT_ENTRY_PATH.to_owned(),
            capabilities: CapabilityTable::builtin(),
            timeouts: HttpTimeouts::default(),
            session_cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_owned(),
        })
    }

    /// Build typed shell config from environment variables.
    ///
    /// Optional:
    /// - `SHELL_BFF_URL`: identity backend, default `http://localhost:3001`
    /// - `SHELL_REMOTE_HOST`: host for port-addressed remotes, default `http://localhost`
    /// - `SHELL_REMOTE_ENTRY_PATH`: default `/assets/remoteEntry.json`
    /// - `SHELL_CAPABILITIES_FILE`: YAML capability table; built-in table when absent
    /// - `SHELL_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SHELL_CONNECT_TIMEOUT_SECS`: default 10
    /// - `SHELL_SESSION_COOKIE_NAME`: default `JSESSIONID`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for invalid URLs or an unusable capability file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new()?;

        if let Ok(raw) = std::env::var("SHELL_BFF_URL") {
            config = config.with_bff_url(&raw)?;
        }
        if let Ok(raw) = std::env::var("SHELL_REMOTE_HOST") {
            config.remote_host = parse_url("SHELL_REMOTE_HOST", &raw)?;
        }
        if let Ok(raw) = std::env::var("SHELL_REMOTE_ENTRY_PATH") {
            config.entry_path = normalize_entry_path(&raw);
        }
        if let Ok(path) = std::env::var("SHELL_CAPABILITIES_FILE") {
            config = config.with_capabilities_file(Path::new(&path))?;
        }
        config.timeouts = HttpTimeouts {
            request_secs: env_parse_u64("SHELL_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("SHELL_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        if let Ok(name) = std::env::var("SHELL_SESSION_COOKIE_NAME") {
            if !name.trim().is_empty() {
                config.session_cookie_name = name.trim().to_owned();
            }
        }

        Ok(config)
    }

    /// Replace the backend URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `raw` does not parse.
    pub fn with_bff_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim().trim_end_matches('/');
        parse_url("SHELL_BFF_URL", trimmed)?;
        self.bff_url = trimmed.to_owned();
        Ok(self)
    }

    /// Replace the capability table with the one in a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadCapabilities`] or [`ConfigError::Capabilities`].
    pub fn with_capabilities_file(mut self, path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadCapabilities {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.capabilities = CapabilityTable::from_yaml(&raw)?;
        Ok(self)
    }

    /// The backend URL as a parsed [`Url`], for building mount contexts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `bff_url` was edited into an invalid value.
    pub fn bff_base(&self) -> Result<Url, ConfigError> {
        parse_url("SHELL_BFF_URL", &self.bff_url)
    }
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl { var, value: raw.to_owned(), message: e.to_string() })
}

fn normalize_entry_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('/');
    format!("/{trimmed}")
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
