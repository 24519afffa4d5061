// Step renderer - one reconstructed step as a collapsible <details> block
//
// Tool-call cards are specialised for the two tools the proving agent uses:
// python_execute shows highlighted code with its output, web_search shows the
// query and the markdown answer. Any other tool gets its header and metadata line.

use super::format::format_seconds;
use super::highlight::highlight_python;
use super::html::escape_html;
use super::markdown::{is_safe_url, render_markdown};
use super::{BindingKind, RenderContext, RAW_PREVIEW_BYTES};
use crate::proof::model::{ToolCall, ToolResult, PYTHON_EXECUTE, WEB_SEARCH};
use crate::proof::Step;
use crate::util::truncate_utf8_safe;
use std::fmt::Write;

/// Header text: the step's `current_step`, or `Step N` (1-based) when absent or empty
pub fn step_header(step: &Step, index: usize) -> String {
    match step.content.current_step.as_deref() {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => format!("Step {}", index + 1),
    }
}

/// Render one step; `index` is 0-based, derivation and evidence only appear on the last step
pub(crate) fn render_step(
    step: &Step,
    index: usize,
    total: usize,
    open: bool,
    ctx: &mut RenderContext,
) -> String {
    let mut out = String::new();
    let content = &step.content;

    let _ = write!(
        out,
        r#"<details class="step-collapsible" data-step-index="{}"{}><summary class="step-header">{}</summary><div class="step-body">"#,
        index,
        if open { " open" } else { "" },
        escape_html(&step_header(step, index))
    );

    if let Some(error) = content.error_text() {
        let _ = write!(
            out,
            r#"<div class="step-section step-error"><h4>Model Error</h4><p>{}</p>"#,
            escape_html(&error)
        );
        if let Some(raw) = content.raw_content() {
            let preview = truncate_utf8_safe(&raw, RAW_PREVIEW_BYTES);
            let _ = write!(
                out,
                r#"<pre class="raw-content">{}{}</pre>"#,
                escape_html(preview),
                if preview.len() < raw.len() { "..." } else { "" }
            );
        }
        out.push_str("</div>");
    }

    if !content.assumptions.is_empty() {
        out.push_str(r#"<div class="step-section"><h4>Assumptions</h4><ul>"#);
        for assumption in &content.assumptions {
            let _ = write!(out, "<li>{}</li>", escape_html(assumption));
        }
        out.push_str("</ul></div>");
    }

    if !content.tool_calls.is_empty() {
        out.push_str(r#"<div class="step-section tool-calls-section"><h4>Tool Calls</h4>"#);
        for call in &content.tool_calls {
            out.push_str(&render_tool_call(call, step.result_for(&call.id), ctx));
        }
        out.push_str("</div>");
    }

    if !step.unmatched.is_empty() {
        out.push_str(
            r#"<div class="step-section unmatched-section"><h4>Unmatched Tool Results</h4><ul>"#,
        );
        for result in &step.unmatched {
            let _ = write!(
                out,
                "<li><code>{}</code>{} {}</li>",
                escape_html(&result.tool_call_id),
                result
                    .tool_name
                    .as_deref()
                    .map(|name| format!(" {}", escape_html(name)))
                    .unwrap_or_default(),
                meta_line(result)
            );
        }
        out.push_str("</ul></div>");
    }

    if let Some(reasoning) = content.reasoning.as_deref().filter(|r| !r.is_empty()) {
        let _ = write!(
            out,
            r#"<details class="reasoning"><summary>Reasoning</summary><div class="reasoning-text">{}</div></details>"#,
            escape_html(reasoning)
        );
    }

    if index + 1 == total {
        if !content.derivation.is_empty() {
            out.push_str(r#"<div class="step-section derivation"><h4>Derivation</h4><ol>"#);
            for d in &content.derivation {
                let _ = write!(
                    out,
                    "<li><strong>{}</strong>: {}</li>",
                    escape_html(&d.principle),
                    escape_html(&d.calculation)
                );
            }
            out.push_str("</ol></div>");
        }

        if !content.evidence.is_empty() {
            out.push_str(r#"<div class="step-section evidence"><h4>Evidence</h4><ul>"#);
            for e in &content.evidence {
                let _ = write!(
                    out,
                    "<li><strong>{}</strong>: {}</li>",
                    escape_html(&e.source),
                    escape_html(&e.content)
                );
            }
            out.push_str("</ul></div>");
        }
    }

    out.push_str("</div></details>");
    out
}

fn render_tool_call(call: &ToolCall, result: Option<&ToolResult>, ctx: &mut RenderContext) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<div class="tool-call"><h5>{} ({})</h5>"#,
        escape_html(&call.function.name),
        escape_html(&call.id)
    );

    if let Some(result) = result {
        match call.function.name.as_str() {
            PYTHON_EXECUTE => out.push_str(&python_card(call, result, ctx)),
            WEB_SEARCH => out.push_str(&search_card(call, result, ctx)),
            _ => {}
        }
        let _ = write!(out, r#"<div class="tool-meta">{}</div>"#, meta_line(result));
    }

    out.push_str("</div>");
    out
}

fn python_card(call: &ToolCall, result: &ToolResult, ctx: &mut RenderContext) -> String {
    let code = call.string_argument("code");
    let code_id = ctx.element_id("code");
    ctx.cache_text(&code_id, &code);
    let button_id = ctx.bind(BindingKind::CopyCode {
        target: code_id.clone(),
    });

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<div class="code-wrapper"><div class="code-input"><button class="copy-btn" id="{btn}" data-action="{btn}" data-target="{code_id}">Copy</button><pre><code class="language-python" id="{code_id}">{code}</code></pre></div>"#,
        btn = button_id,
        code_id = code_id,
        code = highlight_python(&code)
    );
    let _ = write!(
        out,
        r#"<div class="output-label">Output:</div><pre class="code-output">{}</pre>"#,
        escape_html(result.result.output.as_deref().unwrap_or_default())
    );
    if let Some(warnings) = result.result.warnings.as_deref().filter(|w| !w.is_empty()) {
        let _ = write!(
            out,
            r#"<div class="output-label">Warnings:</div><pre class="code-output code-warnings">{}</pre>"#,
            escape_html(warnings)
        );
    }
    if let Some(error) = result.result.error.as_deref().filter(|e| !e.is_empty()) {
        let _ = write!(
            out,
            r#"<div class="output-label">Error:</div><pre class="code-output code-error">{}</pre>"#,
            escape_html(error)
        );
    }
    out.push_str("</div>");
    out
}

fn search_card(call: &ToolCall, result: &ToolResult, ctx: &mut RenderContext) -> String {
    let query = call.string_argument("query");
    let query_id = ctx.element_id("query");
    ctx.cache_text(&query_id, &query);
    let button_id = ctx.bind(BindingKind::CopyQuery {
        target: query_id.clone(),
    });

    let rendered = render_markdown(result.result.content.as_deref().unwrap_or_default());
    let summary = rendered
        .first_heading
        .clone()
        .unwrap_or_else(|| format!("Search Results for: {}", query));

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<div class="search-wrapper"><div class="search-query"><textarea readonly rows="2" id="{query_id}">{query}</textarea><button class="copy-btn" id="{btn}" data-action="{btn}" data-target="{query_id}">Copy</button></div>"#,
        query_id = query_id,
        query = escape_html(&query),
        btn = button_id
    );
    let _ = write!(
        out,
        r#"<details class="search-results"><summary>{}</summary><div class="markdown-content">{}</div></details>"#,
        escape_html(&summary),
        rendered.html
    );

    if !result.result.results.is_empty() {
        out.push_str(r#"<ul class="search-citations">"#);
        for citation in &result.result.results {
            let label = citation
                .title
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(citation.url.as_str());
            if is_safe_url(&citation.url) && !citation.url.is_empty() {
                let _ = write!(
                    out,
                    r#"<li><a href="{}" target="_blank" rel="noopener noreferrer">{}</a></li>"#,
                    escape_html(&citation.url),
                    escape_html(label)
                );
            } else {
                let _ = write!(out, "<li>{}</li>", escape_html(label));
            }
        }
        out.push_str("</ul>");
    }

    out.push_str("</div>");
    out
}

fn meta_line(result: &ToolResult) -> String {
    format!(
        "Duration: {}s | Success: {}",
        format_seconds(result.duration),
        if result.result.success { "Yes" } else { "No" }
    )
}
