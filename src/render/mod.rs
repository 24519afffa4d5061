// Render module - turns a proof document into HTML
//
// Rendering is a pure function of the document (plus the wall clock for relative
// timestamps and the caller's record of which steps are expanded). It produces
// a `ProofView`: the markup, and a structured list of the interactive elements
// in it. The markup carries only `data-action` ids; what each id does is
// described by its `Binding`, which the viewer turns into handlers.

pub mod format;
pub mod highlight;
pub mod html;
pub mod markdown;
pub mod page;
mod proof;
mod step;

pub use proof::render_proof;

/// Raw model output shown in error panels is cut to this many bytes
pub(crate) const RAW_PREVIEW_BYTES: usize = 500;

/// Toggle-all label while at least one step is collapsed
pub const EXPAND_ALL: &str = "Expand All";

/// Toggle-all label once every step is expanded
pub const COLLAPSE_ALL: &str = "Collapse All";

/// Action id of the expand/collapse-all button (one per page)
pub const TOGGLE_ALL_ID: &str = "toggleAllBtn";

/// What an interactive element in the rendered markup does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    /// Copy the Python source shown in element `target`
    CopyCode { target: String },
    /// Copy the search query shown in element `target`
    CopyQuery { target: String },
    /// Copy the proof id shown in element `target`
    CopyProofId { target: String },
    /// Expand or collapse every step
    ToggleAllSteps,
}

/// An interactive element: `id` is both its element id and its `data-action` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub id: String,
    pub kind: BindingKind,
}

/// Rendered proof, ready to be installed by the viewer
#[derive(Debug, Clone, Default)]
pub struct ProofView {
    pub html: String,
    pub step_count: usize,
    pub verdict: String,
    pub bindings: Vec<Binding>,
    /// element id -> raw text, for elements whose text a copy action reads
    pub copy_sources: Vec<(String, String)>,
}

/// Mutable state threaded through one render pass
///
/// Generates element ids (unique within the view) and records bindings and
/// copy sources as the markup is produced.
#[derive(Debug, Default)]
pub(crate) struct RenderContext {
    next_id: usize,
    bindings: Vec<Binding>,
    copy_sources: Vec<(String, String)>,
}

impl RenderContext {
    pub(crate) fn element_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    /// Register an interactive element with a generated id
    pub(crate) fn bind(&mut self, kind: BindingKind) -> String {
        let id = self.element_id("action");
        self.bind_as(id.clone(), kind);
        id
    }

    pub(crate) fn bind_as(&mut self, id: String, kind: BindingKind) {
        self.bindings.push(Binding { id, kind });
    }

    /// Remember the raw text behind an element so copies don't re-read markup
    pub(crate) fn cache_text(&mut self, element_id: &str, text: &str) {
        self.copy_sources
            .push((element_id.to_string(), text.to_string()));
    }

    pub(crate) fn finish(self, html: String, step_count: usize, verdict: String) -> ProofView {
        ProofView {
            html,
            step_count,
            verdict,
            bindings: self.bindings,
            copy_sources: self.copy_sources,
        }
    }
}
