// Action registry - what the page's `data-action` ids do
//
// Built from the bindings a render produced. Each installed proof gets its own
// registry, so ids from a previous proof resolve to nothing.

use crate::render::{Binding, BindingKind, COLLAPSE_ALL, EXPAND_ALL};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Result of dispatching an action, as the page applies it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// Show `label` on `feedback_element` for `restore_after_ms`, then restore it
    Copied {
        feedback_element: String,
        label: String,
        restore_after_ms: u64,
    },
    /// Set every step's open state and relabel the toggle control
    Toggled { open: bool, label: String },
    /// Nothing to do
    Nothing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionError {
    /// No proof is on screen
    NoProof,
    /// The id isn't bound in the current view
    Unknown(String),
    /// Writing to the clipboard failed; `alert` is the user-facing message
    Copy { alert: &'static str, message: String },
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProof => write!(f, "No proof is loaded"),
            Self::Unknown(id) => write!(f, "Unknown action: {}", id),
            Self::Copy { alert, .. } => write!(f, "{}", alert),
        }
    }
}

impl std::error::Error for ActionError {}

#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, BindingKind>,
}

impl ActionRegistry {
    pub fn new(bindings: &[Binding]) -> Self {
        Self {
            actions: bindings
                .iter()
                .map(|b| (b.id.clone(), b.kind.clone()))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&BindingKind> {
        self.actions.get(id)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> Vec<(String, BindingKind)> {
        self.actions
            .iter()
            .map(|(id, kind)| (id.clone(), kind.clone()))
            .collect()
    }
}

/// Element whose text shows copy feedback, and the alert for a failed copy
///
/// Code and query copies relabel their button; the proof id relabels itself and
/// fails silently.
pub(crate) fn copy_feedback(action_id: &str, kind: &BindingKind) -> Option<(String, Option<&'static str>)> {
    match kind {
        BindingKind::CopyCode { .. } => Some((action_id.to_string(), Some("Failed to copy code"))),
        BindingKind::CopyQuery { .. } => Some((action_id.to_string(), Some("Failed to copy query"))),
        BindingKind::CopyProofId { target } => Some((target.clone(), None)),
        BindingKind::ToggleAllSteps => None,
    }
}

/// Expand every step unless all are already expanded, in which case collapse them
pub fn toggle_all(expanded: &mut [bool]) -> ActionOutcome {
    let open = !expanded.iter().all(|&open| open);
    expanded.iter_mut().for_each(|state| *state = open);

    ActionOutcome::Toggled {
        open,
        label: if open { COLLAPSE_ALL } else { EXPAND_ALL }.to_string(),
    }
}
