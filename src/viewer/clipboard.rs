//! Clipboard access and the per-view copy cache
//!
//! `SystemClipboard` uses the `arboard` crate for cross-platform support
//! (Windows, macOS, Linux). The clipboard is created fresh for each write to
//! avoid holding resources.

use anyhow::{Context, Result};
use std::collections::HashMap;

/// Label a copy control shows after a successful copy
pub const COPIED_LABEL: &str = "Copied!";

/// Somewhere text can be copied to
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// The system clipboard
///
/// Common failure cases: no display server (headless Linux), permission denied.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().context("Failed to access clipboard")?;
        clipboard
            .set_text(text)
            .context("Failed to set clipboard text")?;
        Ok(())
    }
}

/// Raw text behind copyable elements, keyed by element id
#[derive(Debug, Default, Clone)]
pub struct CopyCache {
    entries: HashMap<String, String>,
}

impl CopyCache {
    pub fn from_sources(sources: Vec<(String, String)>) -> Self {
        Self {
            entries: sources.into_iter().collect(),
        }
    }

    /// Text to copy for `element_id`
    ///
    /// A cache miss falls back to the element's text as reported by the page,
    /// which is cached for next time. Empty text counts as nothing to copy.
    pub fn resolve(&mut self, element_id: &str, fallback: Option<&str>) -> Option<String> {
        if let Some(text) = self.entries.get(element_id).filter(|t| !t.is_empty()) {
            return Some(text.clone());
        }

        let fallback = fallback.filter(|t| !t.is_empty())?;
        self.entries
            .insert(element_id.to_string(), fallback.to_string());
        self.entries.get(element_id).cloned()
    }
}
