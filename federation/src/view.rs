//! View tree produced by remote components and its text renderer.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Visual emphasis of a notice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Info,
    Healthy,
    Warning,
    Critical,
    Error,
}

impl Tone {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Healthy => "ok",
            Self::Warning => "warn",
            Self::Critical => "crit",
            Self::Error => "error",
        }
    }
}

/// A renderable node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    Heading { text: String },
    Text { text: String },
    Field { label: String, value: String },
    Notice { tone: Tone, text: String },
    Group { children: Vec<View> },
}

impl View {
    #[must_use]
    pub fn heading(text: impl Into<String>) -> Self {
        Self::Heading { text: text.into() }
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    #[must_use]
    pub fn field(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Field { label: label.into(), value: value.into() }
    }

    #[must_use]
    pub fn notice(tone: Tone, text: impl Into<String>) -> Self {
        Self::Notice { tone, text: text.into() }
    }

    #[must_use]
    pub fn group(children: Vec<View>) -> Self {
        Self::Group { children }
    }

    /// Depth-first search for any text containing `needle`.
    #[must_use]
    pub fn contains_text(&self, needle: &str) -> bool {
        match self {
            Self::Heading { text } | Self::Text { text } | Self::Notice { text, .. } => text.contains(needle),
            Self::Field { label, value } => label.contains(needle) || value.contains(needle),
            Self::Group { children } => children.iter().any(|child| child.contains_text(needle)),
        }
    }
}

/// Turns a [`View`] into indented plain text. Shared as a host singleton.
#[derive(Debug, Default)]
pub struct ViewRenderer {
    renders: AtomicU64,
}

impl ViewRenderer {
    #[must_use]
    pub fn render(&self, view: &View) -> String {
        self.renders.fetch_add(1, Ordering::Relaxed);
        let mut out = String::new();
        write_view(&mut out, view, 0);
        out
    }

    /// Number of `render` calls served by this instance.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.renders.load(Ordering::Relaxed)
    }
}

fn write_view(out: &mut String, view: &View, depth: usize) {
    let indent = "  ".repeat(depth);
    match view {
        View::Heading { text } => out.push_str(&format!("{indent}== {text} ==\n")),
        View::Text { text } => out.push_str(&format!("{indent}{text}\n")),
        View::Field { label, value } => out.push_str(&format!("{indent}{label}: {value}\n")),
        View::Notice { tone, text } => out.push_str(&format!("{indent}[{}] {text}\n", tone.label())),
        View::Group { children } => {
            // Nested groups indent one level; the root group's items do not.
            for child in children {
                let child_depth = if matches!(child, View::Group { .. }) { depth + 1 } else { depth };
                write_view(out, child, child_depth);
            }
        }
    }
}
