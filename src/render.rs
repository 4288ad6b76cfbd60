//! Text rendering of the shell page.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt;
use std::fmt::Write as _;

use federation::{Tone, ViewRenderer};

use crate::composer::{ContentView, ShellView};

pub const TITLE: &str = "Composable Shell";
const RULE: &str = "----------------------------------------";

/// Draw `view`, passing mounted remote content through `renderer`.
#[must_use]
pub fn render_shell(view: &ShellView, renderer: &ViewRenderer) -> String {
    let mut out = format!("== {TITLE} ==\n");
    match view {
        ShellView::Loading => out.push_str("Loading session...\n"),
        ShellView::SignedOut { error } => {
            push_error(&mut out, error.as_deref());
            out.push_str("You are not signed in. Log in to continue.\n");
        }
        ShellView::Dashboard { user_name, menu, content, error } => {
            let _ = writeln!(out, "Welcome, {user_name}");
            push_error(&mut out, error.as_deref());
            out.push_str(RULE);
            out.push('\n');
            for entry in menu {
                let marker = if entry.active { '>' } else { ' ' };
                let _ = writeln!(out, "{marker} {} ({})", entry.label, entry.id);
            }
            out.push_str(RULE);
            out.push('\n');
            match content {
                ContentView::Empty { message } => {
                    let _ = writeln!(out, "{message}");
                }
                ContentView::Pending { fallback } => {
                    let _ = writeln!(out, "{fallback}");
                }
                ContentView::Mounted(remote) => out.push_str(&renderer.render(remote)),
                ContentView::Failed { message } => {
                    let _ = writeln!(out, "[{}] Failed to load: {message}", Tone::Error.label());
                }
            }
        }
    }
    out
}

fn push_error(out: &mut String, error: Option<&str>) {
    if let Some(message) = error {
        let _ = writeln!(out, "[{}] {message}", Tone::Error.label());
    }
}

impl fmt::Display for ShellView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_shell(self, &ViewRenderer::default()))
    }
}
