// Viewer - the interactive session behind the web UI
//
// Owns the discovered proof list, the proof on screen and everything the page
// can act on: navigation, copy actions, expand/collapse state. State lives
// behind a std Mutex that is never held across an await; loads run unlocked
// and are fenced by the navigator's epoch when they come back.

pub mod actions;
pub mod clipboard;
pub mod keys;
pub mod navigator;

use crate::discovery::ProofSource;
use crate::proof::ProofDocument;
use crate::render::{self, page, BindingKind};
use actions::{copy_feedback, toggle_all, ActionError, ActionOutcome, ActionRegistry};
use chrono::Utc;
use clipboard::{Clipboard, CopyCache, COPIED_LABEL};
use keys::Focus;
use navigator::{Direction, Navigator, Ticket};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shown when discovery finds nothing
pub const NO_PROOFS_MESSAGE: &str = "No proofs found. Run a proof session first.";

const LOADING_MESSAGE: &str = "Loading proofs...";

/// Everything the page needs to redraw after an interaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewUpdate {
    pub html: String,
    pub counter: String,
    pub prev_disabled: bool,
    pub next_disabled: bool,
    pub scroll_to_top: bool,
    pub epoch: u64,
}

/// The discovered list and where we are in it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProofList {
    pub source: String,
    pub proofs: Vec<String>,
    pub current: Option<usize>,
    /// Id of the proof on screen; `None` while a message is shown
    pub showing: Option<String>,
}

/// A proof on screen
struct Installed {
    id: String,
    doc: ProofDocument,
    registry: ActionRegistry,
    cache: CopyCache,
    expanded: Vec<bool>,
}

enum Content {
    Message(String),
    Proof(Box<Installed>),
}

struct ViewerState {
    navigator: Navigator,
    content: Content,
}

#[derive(Clone)]
pub struct Viewer {
    source: Arc<ProofSource>,
    clipboard: Arc<dyn Clipboard>,
    state: Arc<Mutex<ViewerState>>,
    copied_feedback_ms: u64,
}

impl Viewer {
    pub fn new(source: ProofSource, clipboard: Arc<dyn Clipboard>, copied_feedback_ms: u64) -> Self {
        Self {
            source: Arc::new(source),
            clipboard,
            state: Arc::new(Mutex::new(ViewerState {
                navigator: Navigator::new(),
                content: Content::Message(LOADING_MESSAGE.to_string()),
            })),
            copied_feedback_ms,
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewerState> {
        // A panic mid-update leaves nothing half-written that matters here
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run discovery and show the newest proof
    pub async fn reload(&self) -> ViewUpdate {
        let ticket = match self.source.discover().await {
            Ok(ids) if ids.is_empty() => {
                let mut state = self.state();
                state.navigator.reset(Vec::new());
                state.content = Content::Message(NO_PROOFS_MESSAGE.to_string());
                return snapshot(&state, true);
            }
            Ok(ids) => self.state().navigator.reset(ids),
            Err(e) => {
                tracing::error!("Discovery failed at {}: {}", self.source.describe(), e);
                let mut state = self.state();
                state.navigator.reset(Vec::new());
                state.content = Content::Message(format!("Error loading proofs: {}", e));
                return snapshot(&state, true);
            }
        };

        match ticket {
            Some(ticket) => self.load(ticket).await,
            None => snapshot(&self.state(), true),
        }
    }

    /// Move one proof back or forward; a no-op (and no fetch) at either end
    pub async fn navigate(&self, direction: Direction) -> ViewUpdate {
        let ticket = self.state().navigator.begin(direction);
        match ticket {
            Some(ticket) => self.load(ticket).await,
            None => self.current_view(),
        }
    }

    /// Arrow-key navigation; `None` when the key doesn't navigate
    pub async fn handle_key(&self, key: &str, focus: Focus) -> Option<ViewUpdate> {
        let direction = keys::direction_for_key(key, focus)?;
        Some(self.navigate(direction).await)
    }

    async fn load(&self, ticket: Ticket) -> ViewUpdate {
        tracing::debug!("Loading proof {} (epoch {})", ticket.id, ticket.epoch);
        let result = self.source.load(&ticket.id).await;

        let mut state = self.state();
        if !state.navigator.is_current(&ticket) {
            tracing::debug!("Discarding stale load of {}", ticket.id);
            return snapshot(&state, false);
        }

        match result {
            Ok(doc) => {
                state.navigator.commit(&ticket);
                state.content = Content::Proof(Box::new(install(ticket.id, doc)));
                snapshot(&state, true)
            }
            Err(e) => {
                tracing::warn!("Failed to load proof {}: {}", ticket.id, e);
                state.navigator.abandon(&ticket);
                state.content = Content::Message(format!("Error loading proof: {}", e));
                snapshot(&state, false)
            }
        }
    }

    /// Run the action bound to `action_id` in the current view
    ///
    /// `fallback_text` is the target element's text as the page sees it, used
    /// when the copy cache has no entry for it.
    pub async fn dispatch(
        &self,
        action_id: &str,
        fallback_text: Option<&str>,
    ) -> Result<ActionOutcome, ActionError> {
        let (text, feedback_element, alert) = {
            let mut state = self.state();
            let Content::Proof(installed) = &mut state.content else {
                return Err(ActionError::NoProof);
            };
            let kind = installed
                .registry
                .get(action_id)
                .cloned()
                .ok_or_else(|| ActionError::Unknown(action_id.to_string()))?;

            let target = match &kind {
                BindingKind::ToggleAllSteps => return Ok(toggle_all(&mut installed.expanded)),
                BindingKind::CopyCode { target }
                | BindingKind::CopyQuery { target }
                | BindingKind::CopyProofId { target } => target.clone(),
            };
            let Some(text) = installed.cache.resolve(&target, fallback_text) else {
                tracing::debug!("Nothing to copy for {}", action_id);
                return Ok(ActionOutcome::Nothing);
            };
            let Some((feedback_element, alert)) = copy_feedback(action_id, &kind) else {
                return Ok(ActionOutcome::Nothing);
            };
            (text, feedback_element, alert)
        };

        // arboard blocks on the display server
        let clipboard = self.clipboard.clone();
        let written = tokio::task::spawn_blocking(move || clipboard.write_text(&text))
            .await
            .map_err(anyhow::Error::from)
            .and_then(|result| result);

        match written {
            Ok(()) => Ok(ActionOutcome::Copied {
                feedback_element,
                label: COPIED_LABEL.to_string(),
                restore_after_ms: self.copied_feedback_ms,
            }),
            Err(e) => {
                tracing::error!("Failed to copy to clipboard ({}): {:#}", action_id, e);
                match alert {
                    Some(alert) => Err(ActionError::Copy {
                        alert,
                        message: format!("{:#}", e),
                    }),
                    None => Ok(ActionOutcome::Nothing),
                }
            }
        }
    }

    /// Record a single step being opened or closed on the page
    pub fn set_step_open(&self, index: usize, open: bool) -> bool {
        let mut state = self.state();
        let Content::Proof(installed) = &mut state.content else {
            return false;
        };
        match installed.expanded.get_mut(index) {
            Some(state) => {
                *state = open;
                true
            }
            None => false,
        }
    }

    /// Full interactive page for the current state
    pub fn page(&self) -> String {
        let state = self.state();
        let counter = state.navigator.counter_label();
        let chrome = page::PageChrome {
            counter: &counter,
            prev_disabled: state.navigator.prev_disabled(),
            next_disabled: state.navigator.next_disabled(),
            epoch: state.navigator.epoch(),
            source: self.source.describe(),
        };
        page::interactive_page(&chrome, &content_html(&state.content))
    }

    /// Current state as a view update (no scrolling)
    pub fn current_view(&self) -> ViewUpdate {
        snapshot(&self.state(), false)
    }

    pub fn proof_list(&self) -> ProofList {
        let state = self.state();
        let proofs = state.navigator.proofs().to_vec();
        let current = (!proofs.is_empty()).then(|| state.navigator.current());
        drop(state);
        ProofList {
            source: self.source.describe().to_string(),
            proofs,
            current,
            showing: self.current_proof(),
        }
    }

    /// Id of the proof on screen
    pub fn current_proof(&self) -> Option<String> {
        match &self.state().content {
            Content::Proof(installed) => Some(installed.id.clone()),
            Content::Message(_) => None,
        }
    }
}

fn install(id: String, doc: ProofDocument) -> Installed {
    let view = render::render_proof(&doc, &[], Utc::now());
    let registry = ActionRegistry::new(&view.bindings);
    tracing::info!(
        "Showing proof {} ({} steps, verdict {}, {} actions)",
        id,
        view.step_count,
        view.verdict,
        registry.len()
    );

    Installed {
        id,
        doc,
        registry,
        cache: CopyCache::from_sources(view.copy_sources),
        expanded: vec![false; view.step_count],
    }
}

fn content_html(content: &Content) -> String {
    match content {
        Content::Message(text) => page::message(text),
        // Element ids are deterministic per document, so a re-render matches the registry
        Content::Proof(installed) => {
            render::render_proof(&installed.doc, &installed.expanded, Utc::now()).html
        }
    }
}

fn snapshot(state: &ViewerState, scroll_to_top: bool) -> ViewUpdate {
    ViewUpdate {
        html: content_html(&state.content),
        counter: state.navigator.counter_label(),
        prev_disabled: state.navigator.prev_disabled(),
        next_disabled: state.navigator.next_disabled(),
        scroll_to_top,
        epoch: state.navigator.epoch(),
    }
}
