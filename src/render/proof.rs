// Proof renderer - the full walkthrough for one document
//
// Claim and verdict, the falsifiable test, every step, the session's
// diagnostic events and the metadata panel.

use super::format::{
    format_number, format_relative_time, format_seconds, format_timestamp, format_usd,
};
use super::html::escape_html;
use super::step::render_step;
use super::{
    BindingKind, ProofView, RenderContext, COLLAPSE_ALL, EXPAND_ALL, RAW_PREVIEW_BYTES, TOGGLE_ALL_ID,
};
use crate::proof::model::Metadata;
use crate::proof::{build_steps, ProofDocument};
use crate::util::truncate_utf8_safe;
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Render a proof document
///
/// `open_steps[i]` says whether step `i` is expanded; steps past the end of the
/// slice are collapsed. `now` anchors the relative timestamp.
pub fn render_proof(doc: &ProofDocument, open_steps: &[bool], now: DateTime<Utc>) -> ProofView {
    let steps = build_steps(&doc.events);
    let verdict = doc.verdict_label();
    let mut ctx = RenderContext::default();
    let mut out = String::new();

    let _ = write!(
        out,
        r#"<div class="proof-section claim-section"><h2>Claim <span class="verdict verdict-{}">{}</span></h2><p class="claim">{}</p></div>"#,
        verdict_class(&verdict),
        escape_html(&verdict),
        escape_html(&doc.claim)
    );

    if let Some(test) = steps.last().and_then(|s| s.content.falsifiable_test_text()) {
        let _ = write!(
            out,
            r#"<div class="proof-section"><h2>Falsifiable Test</h2><p>{}</p></div>"#,
            escape_html(&test)
        );
    }

    let is_open = |i: usize| open_steps.get(i).copied().unwrap_or(false);
    let all_open = !steps.is_empty() && (0..steps.len()).all(is_open);
    ctx.bind_as(TOGGLE_ALL_ID.to_string(), BindingKind::ToggleAllSteps);
    let _ = write!(
        out,
        r#"<div class="proof-section steps-section"><div class="section-header"><h2>Steps ({})</h2><button class="toggle-btn" id="{id}" data-action="{id}">{}</button></div>"#,
        steps.len(),
        if all_open { COLLAPSE_ALL } else { EXPAND_ALL },
        id = TOGGLE_ALL_ID
    );
    for (i, step) in steps.iter().enumerate() {
        out.push_str(&render_step(step, i, steps.len(), is_open(i), &mut ctx));
    }
    out.push_str("</div>");

    out.push_str(&render_session_errors(doc));

    if let Some(metadata) = &doc.metadata {
        out.push_str(&render_metadata(doc, metadata, now, &mut ctx));
    }

    ctx.finish(out, steps.len(), verdict)
}

/// CSS-safe form of a verdict label (`PROVEN` -> `proven`)
fn verdict_class(verdict: &str) -> String {
    verdict
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn render_session_errors(doc: &ProofDocument) -> String {
    let mut errors = doc.session_errors().peekable();
    if errors.peek().is_none() {
        return String::new();
    }

    let mut out = String::from(
        r#"<div class="proof-section session-errors"><h2>Session Errors</h2><ul>"#,
    );
    for (label, error) in errors {
        let _ = write!(out, "<li><strong>{}</strong>", label);
        let origin: Vec<&str> = [error.tool_name.as_deref(), error.tool_call_id.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if !origin.is_empty() {
            let _ = write!(out, " <code>{}</code>", escape_html(&origin.join(" ")));
        }
        if let Some(message) = error.error.as_deref() {
            let _ = write!(out, ": {}", escape_html(message));
        }
        if let Some(raw) = error.content.as_deref().filter(|c| !c.is_empty()) {
            let preview = truncate_utf8_safe(raw, RAW_PREVIEW_BYTES);
            let _ = write!(
                out,
                r#"<pre class="raw-content">{}{}</pre>"#,
                escape_html(preview),
                if preview.len() < raw.len() { "..." } else { "" }
            );
        }
        out.push_str("</li>");
    }
    out.push_str("</ul></div>");
    out
}

fn render_metadata(
    doc: &ProofDocument,
    metadata: &Metadata,
    now: DateTime<Utc>,
    ctx: &mut RenderContext,
) -> String {
    let mut out = String::from(
        r#"<div class="proof-section metadata-section"><h2>Metadata</h2><div class="metadata-grid">"#,
    );

    match doc.proof_id.as_deref().filter(|id| !id.is_empty()) {
        Some(proof_id) => {
            let value_id = ctx.element_id("proof-id");
            ctx.cache_text(&value_id, proof_id);
            let action = ctx.bind(BindingKind::CopyProofId {
                target: value_id.clone(),
            });
            let _ = write!(
                out,
                r#"<div class="metadata-item copyable" id="{action}" data-action="{action}" data-target="{value_id}" title="Click to copy"><div class="metadata-label">Proof ID</div><div class="metadata-value" id="{value_id}">{}</div></div>"#,
                escape_html(proof_id),
                action = action,
                value_id = value_id
            );
        }
        None => metadata_item(&mut out, "Proof ID", "Unknown", None),
    }

    let timestamp = doc
        .timestamp
        .as_deref()
        .or(metadata.timestamp.as_deref())
        .filter(|t| !t.is_empty());
    metadata_item(
        &mut out,
        "Timestamp",
        &format_timestamp(timestamp),
        Some(&format_relative_time(timestamp, now)),
    );

    metadata_item(
        &mut out,
        "Time Elapsed",
        &format!("{}s", format_seconds(metadata.time_seconds)),
        None,
    );

    let tokens = metadata.tokens.clone().unwrap_or_default();
    let token_split = match (tokens.prompt, tokens.completion) {
        (Some(prompt), Some(completion)) => Some(format!(
            "{} prompt / {} completion",
            format_number(prompt),
            format_number(completion)
        )),
        _ => None,
    };
    metadata_item(
        &mut out,
        "Total Tokens",
        &format_number(tokens.total.unwrap_or(0)),
        token_split.as_deref(),
    );

    let cost = metadata.cost.clone().unwrap_or_default();
    let cost_split = match (cost.input_usd, cost.output_usd) {
        (Some(input), Some(output)) => Some(format!(
            "${} input / ${} output",
            format_usd(Some(input)),
            format_usd(Some(output))
        )),
        _ => None,
    };
    metadata_item(
        &mut out,
        "Total Cost",
        &format!("${}", format_usd(cost.total_usd)),
        cost_split.as_deref(),
    );

    out.push_str("</div></div>");
    out
}

fn metadata_item(out: &mut String, label: &str, value: &str, detail: Option<&str>) {
    let _ = write!(
        out,
        r#"<div class="metadata-item"><div class="metadata-label">{}</div><div class="metadata-value">{}</div>"#,
        label,
        escape_html(value)
    );
    if let Some(detail) = detail {
        let _ = write!(out, r#"<div class="metadata-detail">{}</div>"#, escape_html(detail));
    }
    out.push_str("</div>");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: &str) -> ProofDocument {
        ProofDocument::from_slice(json.as_bytes()).expect("test document should parse")
    }

    fn sample() -> ProofDocument {
        doc(r#"{
            "claim": "Light is <fast>",
            "timestamp": "2025-01-15T10:30:00Z",
            "proof_id": "proof_abc",
            "metadata": {
                "time_seconds": 12.5,
                "tokens": {"prompt": 1000, "completion": 234, "total": 1234},
                "cost": {"input_usd": 0.001, "output_usd": 0.002, "total_usd": 0.003}
            },
            "events": [
                {"type": "model_output", "content": {"current_step": "Look it up", "verdict": null}},
                {"type": "model_output", "content": {
                    "current_step": "Conclude",
                    "verdict": "PROVEN",
                    "falsifiable_test": "Measure it"
                }}
            ]
        }"#)
    }

    #[test]
    fn test_claim_and_verdict() {
        let view = render_proof(&sample(), &[], Utc::now());
        assert_eq!(view.verdict, "PROVEN");
        assert_eq!(view.step_count, 2);
        assert!(view.html.contains(r#"<span class="verdict verdict-proven">PROVEN</span>"#));
        assert!(view.html.contains("Light is &lt;fast&gt;"));
        assert!(view.html.contains("Measure it"));
    }

    #[test]
    fn test_unknown_verdict_without_any() {
        let view = render_proof(&doc(r#"{"claim": "c"}"#), &[], Utc::now());
        assert_eq!(view.verdict, "UNKNOWN");
        assert!(view.html.contains("verdict-unknown"));
        assert!(!view.html.contains("Metadata"));
    }

    #[test]
    fn test_toggle_label_reflects_open_steps() {
        let doc = sample();
        let collapsed = render_proof(&doc, &[], Utc::now());
        assert!(collapsed.html.contains(">Expand All</button>"));

        let partial = render_proof(&doc, &[true, false], Utc::now());
        assert!(partial.html.contains(">Expand All</button>"));

        let expanded = render_proof(&doc, &[true, true], Utc::now());
        assert!(expanded.html.contains(">Collapse All</button>"));
        assert!(expanded
            .bindings
            .iter()
            .any(|b| b.id == TOGGLE_ALL_ID && b.kind == BindingKind::ToggleAllSteps));
    }

    #[test]
    fn test_metadata_panel() {
        let view = render_proof(&sample(), &[], Utc::now());
        assert!(view.html.contains("12.5s"));
        assert!(view.html.contains("1,234"));
        assert!(view.html.contains("1,000 prompt / 234 completion"));
        assert!(view.html.contains("$0.003000"));
        assert!(view.html.contains("$0.001000 input / $0.002000 output"));

        let binding = view
            .bindings
            .iter()
            .find(|b| matches!(b.kind, BindingKind::CopyProofId { .. }))
            .expect("proof id should be copyable");
        let BindingKind::CopyProofId { target } = &binding.kind else {
            unreachable!();
        };
        assert!(view
            .copy_sources
            .contains(&(target.clone(), "proof_abc".to_string())));
    }

    #[test]
    fn test_missing_cost_reads_zero() {
        let view = render_proof(
            &doc(r#"{"claim": "c", "metadata": {"time_seconds": 1}}"#),
            &[],
            Utc::now(),
        );
        assert!(view.html.contains("$0.000000"));
        assert!(view.html.contains(">Unknown<"));
    }

    #[test]
    fn test_session_errors_panel() {
        let view = render_proof(
            &doc(r#"{"claim": "c", "events": [
                {"type": "model_output", "content": {}},
                {"type": "tool_result_error", "tool_call_id": "c9",
                 "tool_name": "python_execute", "error": "bad <args>"}
            ]}"#),
            &[],
            Utc::now(),
        );
        assert!(view.html.contains("Session Errors"));
        assert!(view.html.contains("<code>python_execute c9</code>: bad &lt;args&gt;"));
    }

    #[test]
    fn test_element_ids_are_unique() {
        let view = render_proof(
            &doc(r#"{"claim": "c", "proof_id": "p", "metadata": {}, "events": [
                {"type": "model_output", "content": {"tool_calls": [
                    {"id": "a", "function": {"name": "python_execute", "arguments": {"code": "1"}}},
                    {"id": "b", "function": {"name": "web_search", "arguments": {"query": "q"}}}
                ]}},
                {"type": "tool_result", "tool_call_id": "a", "result": {"success": true}},
                {"type": "tool_result", "tool_call_id": "b", "result": {"success": true}}
            ]}"#),
            &[],
            Utc::now(),
        );
        let mut ids: Vec<&str> = view.bindings.iter().map(|b| b.id.as_str()).collect();
        ids.extend(view.copy_sources.iter().map(|(id, _)| id.as_str()));
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert_eq!(view.bindings.len(), 4);
    }
}
