//! Page-level navigation performed by the shell.
//!
//! A headless shell has no location bar. Redirects and reloads go through a
//! [`Navigator`] so the host decides what they mean (open a browser, print a
//! URL, record it in a test).

use std::sync::{Mutex, PoisonError};

/// A navigation the shell asked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// Leave the shell for an external URL (identity provider login).
    External(String),
    /// Full reload at a shell path; all in-memory state is dropped.
    Reload(String),
}

pub trait Navigator: Send + Sync {
    fn redirect(&self, url: &str);
    fn reload(&self, path: &str);
}

/// Navigator that records every request and logs it.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn history(&self) -> Vec<Navigation> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<Navigation> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }

    fn push(&self, nav: Navigation) {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).push(nav);
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, url: &str) {
        tracing::info!(%url, "navigate: external redirect");
        self.push(Navigation::External(url.to_owned()));
    }

    fn reload(&self, path: &str) {
        tracing::info!(%path, "navigate: reload");
        self.push(Navigation::Reload(path.to_owned()));
    }
}
