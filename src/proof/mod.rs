// Proof module - recorded proof sessions and their step structure
//
// `model` maps the proof JSON written by the proving agent; `steps` folds the
// event trace into the step sequence the renderer walks.

pub mod model;
pub mod steps;

pub use model::ProofDocument;
pub use steps::{build_steps, Step};
