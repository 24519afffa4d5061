// Page shell - the HTML document around a rendered proof
//
// The interactive page carries the navigation chrome and a small script that
// forwards clicks and arrow keys to the viewer API, then applies the JSON view
// updates it gets back. All behaviour lives server-side; the script only
// moves data between the DOM and the API.

use super::html::escape_html;
use std::fmt::Write;

/// Navigation chrome state for the interactive page
#[derive(Debug, Clone)]
pub struct PageChrome<'a> {
    pub counter: &'a str,
    pub prev_disabled: bool,
    pub next_disabled: bool,
    pub epoch: u64,
    pub source: &'a str,
}

/// Page-level message in place of a proof (loading, empty, errors)
pub fn message(text: &str) -> String {
    format!(r#"<div class="message">{}</div>"#, escape_html(text))
}

/// Full interactive page: navigation chrome, content container and script
pub fn interactive_page(chrome: &PageChrome<'_>, content: &str) -> String {
    let mut out = String::with_capacity(content.len() + STYLE.len() + SCRIPT.len() + 1024);
    out.push_str(&head("Proof Viewer"));
    let _ = write!(
        out,
        r#"<body><header class="viewer-header"><div><h1>Proof Viewer</h1><div class="source">{source}</div></div><nav class="nav"><button id="prevBtn"{prev}>&larr; Previous</button><span id="proofCounter">{counter}</span><button id="nextBtn"{next}>Next &rarr;</button></nav></header><main id="proofContainer" data-epoch="{epoch}">{content}</main><script>{script}</script></body></html>"#,
        source = escape_html(chrome.source),
        prev = disabled_attr(chrome.prev_disabled),
        counter = escape_html(chrome.counter),
        next = disabled_attr(chrome.next_disabled),
        epoch = chrome.epoch,
        content = content,
        script = SCRIPT
    );
    out
}

/// Self-contained page for one proof, no navigation or script
pub fn standalone_page(title: &str, content: &str) -> String {
    let mut out = head(title);
    let _ = write!(
        out,
        r#"<body><header class="viewer-header"><h1>{}</h1></header><main>{}</main></body></html>"#,
        escape_html(title),
        content
    );
    out
}

fn head(title: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>{}</title><style>{}</style></head>"#,
        escape_html(title),
        STYLE
    )
}

fn disabled_attr(disabled: bool) -> &'static str {
    if disabled {
        " disabled"
    } else {
        ""
    }
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f6f7f9; color: #1d2330; }
.viewer-header { display: flex; justify-content: space-between; align-items: center; padding: 12px 24px; background: #1d2330; color: #fff; }
.viewer-header h1 { font-size: 1.2rem; margin: 0; }
.source { font-size: 0.8rem; opacity: 0.7; }
.nav button { margin: 0 8px; }
main { max-width: 960px; margin: 0 auto; padding: 16px 24px; }
.message { padding: 48px; text-align: center; color: #667; }
.proof-section { background: #fff; border-radius: 6px; padding: 12px 16px; margin-bottom: 16px; }
.section-header { display: flex; justify-content: space-between; align-items: center; }
.verdict { font-size: 0.8rem; padding: 2px 8px; border-radius: 4px; background: #ccd; margin-left: 8px; }
.verdict-proven { background: #c7f0d1; }
.verdict-disproven { background: #f6c9c9; }
.step-collapsible { border: 1px solid #dde; border-radius: 4px; margin: 8px 0; padding: 4px 8px; }
.step-header { font-weight: 600; cursor: pointer; }
.tool-call { border-left: 3px solid #99a; padding-left: 8px; margin: 8px 0; }
.code-input { position: relative; }
.copy-btn { position: absolute; right: 4px; top: 4px; }
pre { background: #f0f1f4; padding: 8px; overflow-x: auto; }
.code-error { color: #a00; }
.step-error h4 { color: #a00; }
.search-query textarea { width: 85%; }
.tool-meta, .metadata-detail { font-size: 0.8rem; color: #667; }
.metadata-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(180px, 1fr)); gap: 12px; }
.metadata-label { font-size: 0.75rem; text-transform: uppercase; color: #667; }
.copyable { cursor: pointer; }
.token.keyword { color: #07a; } .token.string { color: #690; } .token.comment { color: #708090; }
.token.number, .token.boolean { color: #905; } .token.function, .token.class-name { color: #dd4a68; }
.token.builtin { color: #e90; } .token.operator { color: #9a6e3a; } .token.decorator { color: #b36; }
"#;

const SCRIPT: &str = r#"
(() => {
  const el = {};
  for (const id of ['prevBtn', 'nextBtn', 'proofCounter', 'proofContainer']) {
    const node = document.getElementById(id);
    if (!node) throw new Error(`Required element #${id} not found`);
    el[id] = node;
  }
  let epoch = Number(el.proofContainer.dataset.epoch || 0);

  async function post(path, body) {
    const res = await fetch(path, {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(body || {}),
    });
    const data = await res.json().catch(() => null);
    if (!res.ok) {
      const message = (data && data.error) || res.statusText;
      if (data && data.alert) alert(message); else console.error(message);
      return null;
    }
    return data;
  }

  function apply(update) {
    if (!update || update.epoch < epoch) return;
    epoch = update.epoch;
    el.proofContainer.dataset.epoch = String(epoch);
    el.proofContainer.innerHTML = update.html;
    el.proofCounter.textContent = update.counter;
    el.prevBtn.disabled = update.prev_disabled;
    el.nextBtn.disabled = update.next_disabled;
    if (update.scroll_to_top) window.scrollTo(0, 0);
  }

  const navigate = async (path, body) => apply(await post(path, body));
  el.prevBtn.addEventListener('click', () => navigate('/api/nav/prev'));
  el.nextBtn.addEventListener('click', () => navigate('/api/nav/next'));

  document.addEventListener('keydown', (e) => {
    if (e.key !== 'ArrowLeft' && e.key !== 'ArrowRight') return;
    const t = e.target;
    let focus = 'other';
    if (t.tagName === 'INPUT') focus = 'input';
    else if (t.tagName === 'TEXTAREA') focus = 'textarea';
    else if (t.isContentEditable) focus = 'editable';
    navigate('/api/key', { key: e.key, focus });
  });

  el.proofContainer.addEventListener('click', async (e) => {
    const trigger = e.target.closest('[data-action]');
    if (!trigger) return;
    const source = trigger.dataset.target && document.getElementById(trigger.dataset.target);
    const fallback_text = source ? (source.value !== undefined ? source.value : source.textContent) : null;
    const outcome = await post(`/api/action/${encodeURIComponent(trigger.dataset.action)}`, { fallback_text });
    if (!outcome) return;
    if (outcome.kind === 'copied') {
      const feedback = document.getElementById(outcome.feedback_element);
      if (!feedback) return;
      const original = feedback.textContent;
      feedback.textContent = outcome.label;
      setTimeout(() => { feedback.textContent = original; }, outcome.restore_after_ms);
    } else if (outcome.kind === 'toggled') {
      el.proofContainer.querySelectorAll('details.step-collapsible').forEach((d) => { d.open = outcome.open; });
      trigger.textContent = outcome.label;
    }
  });

  el.proofContainer.addEventListener('toggle', (e) => {
    const d = e.target;
    if (!d.classList || !d.classList.contains('step-collapsible')) return;
    post(`/api/steps/${d.dataset.stepIndex}`, { open: d.open });
  }, true);
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn chrome() -> PageChrome<'static> {
        PageChrome {
            counter: "2 / 5",
            prev_disabled: false,
            next_disabled: true,
            epoch: 7,
            source: "./proofs",
        }
    }

    #[test]
    fn test_interactive_page_has_required_elements() {
        let page = interactive_page(&chrome(), "<p>body</p>");
        for id in ["prevBtn", "nextBtn", "proofCounter", "proofContainer"] {
            assert!(page.contains(&format!(r#"id="{}""#, id)), "missing #{}", id);
        }
        assert!(page.contains(r#"<span id="proofCounter">2 / 5</span>"#));
        assert!(page.contains(r#"<button id="nextBtn" disabled>"#));
        assert!(page.contains(r#"<button id="prevBtn">"#));
        assert!(page.contains(r#"data-epoch="7""#));
        assert!(page.contains("<p>body</p>"));
    }

    #[test]
    fn test_standalone_page_has_no_script() {
        let page = standalone_page("Proof <1>", "<p>x</p>");
        assert!(!page.contains("<script>"));
        assert!(page.contains("<title>Proof &lt;1&gt;</title>"));
    }

    #[test]
    fn test_message_is_escaped() {
        assert_eq!(
            message("Error loading proof: <bad>"),
            r#"<div class="message">Error loading proof: &lt;bad&gt;</div>"#
        );
    }
}
