// Step reconstruction - folds a proof's flat event trace into steps
//
// Each `model_output` event opens a step; the `tool_result` events that follow
// are correlated with the tool calls that step requested, the same way the
// proxy's parser pairs tool_use blocks with their tool_result blocks.

use super::model::{Derivation, Event, Evidence, StepContent, ToolResult};
use std::collections::HashMap;

/// One model turn plus the tool results that answered it
#[derive(Debug, Clone, Default)]
pub struct Step {
    pub content: StepContent,
    /// tool_call_id -> result, for ids found in this step's tool calls
    pub tool_results: HashMap<String, ToolResult>,
    /// Results that arrived while this step was current but matched none of its calls
    pub unmatched: Vec<ToolResult>,
}

impl Step {
    fn open(content: StepContent) -> Self {
        Self {
            content,
            ..Default::default()
        }
    }

    pub fn result_for(&self, tool_call_id: &str) -> Option<&ToolResult> {
        self.tool_results.get(tool_call_id)
    }

    /// Attach a result to this step, keyed by id when one of our calls requested it
    fn attach(&mut self, result: &ToolResult) {
        if self.content.tool_call(&result.tool_call_id).is_some() {
            self.tool_results
                .insert(result.tool_call_id.clone(), result.clone());
        } else {
            tracing::debug!(
                "Tool result {} matches no call of the current step",
                result.tool_call_id
            );
            self.unmatched.push(result.clone());
        }
    }
}

/// Build the step sequence for an event trace
///
/// The output has exactly one step per `model_output` event, in order. After the
/// fold, `derivation` and `evidence` from every step are concatenated (in step
/// order) into the final step's content; earlier steps keep their own lists.
pub fn build_steps(events: &[Event]) -> Vec<Step> {
    let mut steps: Vec<Step> = Vec::new();

    for event in events {
        match event {
            Event::ModelOutput { content } => steps.push(Step::open(content.clone())),
            Event::ToolResult(result) => match steps.last_mut() {
                Some(current) => current.attach(result),
                None => {
                    tracing::debug!(
                        "Dropping tool result {} seen before any model output",
                        result.tool_call_id
                    );
                }
            },
            _ => {}
        }
    }

    accumulate_into_final(&mut steps);
    steps
}

/// Concatenate every step's derivation/evidence into the last step
fn accumulate_into_final(steps: &mut [Step]) {
    let Some((last, earlier)) = steps.split_last_mut() else {
        return;
    };

    let mut derivation: Vec<Derivation> = earlier
        .iter()
        .flat_map(|step| step.content.derivation.iter().cloned())
        .collect();
    derivation.append(&mut last.content.derivation);
    last.content.derivation = derivation;

    let mut evidence: Vec<Evidence> = earlier
        .iter()
        .flat_map(|step| step.content.evidence.iter().cloned())
        .collect();
    evidence.append(&mut last.content.evidence);
    last.content.evidence = evidence;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::model::ProofDocument;

    fn events(json: &str) -> Vec<Event> {
        let doc = ProofDocument::from_slice(format!(r#"{{"events": {}}}"#, json).as_bytes())
            .expect("test events should parse");
        doc.events
    }

    #[test]
    fn test_one_step_per_model_output() {
        let events = events(
            r#"[
            {"type": "tool_result", "tool_call_id": "early", "result": {"success": true}},
            {"type": "model_output", "content": {"current_step": "A"}},
            {"type": "iteration_error", "error": "timeout"},
            {"type": "model_output", "content": {"current_step": "B"}},
            {"type": "something_else"},
            {"type": "model_output", "content": {}}
        ]"#,
        );
        let steps = build_steps(&events);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].content.current_step.as_deref(), Some("A"));
        assert_eq!(steps[1].content.current_step.as_deref(), Some("B"));
        assert!(steps[2].content.current_step.is_none());
    }

    #[test]
    fn test_results_before_first_model_output_are_dropped() {
        let events = events(
            r#"[
            {"type": "tool_result", "tool_call_id": "x", "result": {"success": true}},
            {"type": "model_output", "content": {"tool_calls": [
                {"id": "x", "function": {"name": "web_search", "arguments": "{}"}}
            ]}}
        ]"#,
        );
        let steps = build_steps(&events);
        assert_eq!(steps.len(), 1);
        assert!(steps[0].tool_results.is_empty());
        assert!(steps[0].unmatched.is_empty());
    }

    #[test]
    fn test_result_attaches_to_step_that_requested_it() {
        let events = events(
            r#"[
            {"type": "model_output", "content": {"current_step": "A"}},
            {"type": "model_output", "content": {"current_step": "B", "tool_calls": [
                {"id": "x", "function": {"name": "python_execute", "arguments": "{}"}}
            ]}},
            {"type": "tool_result", "tool_call_id": "x", "duration": 1.5,
             "result": {"success": true, "output": "ok"}}
        ]"#,
        );
        let steps = build_steps(&events);
        assert_eq!(steps.len(), 2);
        assert!(steps[0].tool_results.is_empty());
        let result = steps[1].result_for("x").expect("x should be attached to step 2");
        assert_eq!(result.result.output.as_deref(), Some("ok"));
    }

    #[test]
    fn test_reused_id_in_later_step_does_not_steal_earlier_result() {
        let events = events(
            r#"[
            {"type": "model_output", "content": {"tool_calls": [
                {"id": "call_1", "function": {"name": "web_search", "arguments": {"query": "first"}}}
            ]}},
            {"type": "tool_result", "tool_call_id": "call_1", "result": {"success": true, "content": "one"}},
            {"type": "model_output", "content": {"tool_calls": [
                {"id": "call_1", "function": {"name": "web_search", "arguments": {"query": "second"}}}
            ]}},
            {"type": "tool_result", "tool_call_id": "call_1", "result": {"success": false, "content": "two"}}
        ]"#,
        );
        let steps = build_steps(&events);
        assert_eq!(
            steps[0].result_for("call_1").unwrap().result.content.as_deref(),
            Some("one")
        );
        assert_eq!(
            steps[1].result_for("call_1").unwrap().result.content.as_deref(),
            Some("two")
        );
    }

    #[test]
    fn test_unmatched_results_are_kept_on_current_step() {
        let events = events(
            r#"[
            {"type": "model_output", "content": {"tool_calls": [
                {"id": "a", "function": {"name": "python_execute", "arguments": "{}"}}
            ]}},
            {"type": "tool_result", "tool_call_id": "zzz", "result": {"success": false}}
        ]"#,
        );
        let steps = build_steps(&events);
        assert!(steps[0].tool_results.is_empty());
        assert_eq!(steps[0].unmatched.len(), 1);
        assert_eq!(steps[0].unmatched[0].tool_call_id, "zzz");
    }

    #[test]
    fn test_evidence_and_derivation_accumulate_on_final_step() {
        let events = events(
            r#"[
            {"type": "model_output", "content": {
                "evidence": [{"source": "s1", "content": "c1"}],
                "derivation": [{"principle": "p1", "calculation": "1+1"}]}},
            {"type": "model_output", "content": {}},
            {"type": "model_output", "content": {
                "evidence": [{"source": "s2", "content": "c2"}, {"source": "s3", "content": "c3"}]}},
            {"type": "model_output", "content": {
                "evidence": [{"source": "s4", "content": "c4"}],
                "derivation": [{"principle": "p2", "calculation": "2*2"}]}}
        ]"#,
        );
        let steps = build_steps(&events);
        let last = &steps[3].content;

        let sources: Vec<&str> = last.evidence.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, vec!["s1", "s2", "s3", "s4"]);
        let principles: Vec<&str> = last.derivation.iter().map(|d| d.principle.as_str()).collect();
        assert_eq!(principles, vec!["p1", "p2"]);

        // Earlier steps keep only their own fragments
        assert_eq!(steps[0].content.evidence.len(), 1);
        assert_eq!(steps[1].content.evidence.len(), 0);
        assert_eq!(steps[2].content.evidence.len(), 2);
    }

    #[test]
    fn test_empty_trace_has_no_steps() {
        assert!(build_steps(&[]).is_empty());
    }
}
