// Markdown rendering for web search results
//
// Uses pulldown-cmark to turn the search tool's markdown answer into HTML.
// Search content comes from a remote model, so raw HTML blocks are demoted to
// text and script-capable link targets are neutralized before rendering.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

/// Rendered markdown plus the text of its first heading (if any)
#[derive(Debug, Clone, Default)]
pub struct RenderedMarkdown {
    pub html: String,
    pub first_heading: Option<String>,
}

/// Render markdown to sanitized HTML
pub fn render_markdown(markdown: &str) -> RenderedMarkdown {
    // Enable extensions: strikethrough (~~text~~) and tables (| col | col |)
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;

    let mut first_heading: Option<String> = None;
    let mut heading_text: Option<String> = None;
    let mut events: Vec<Event> = Vec::new();

    for event in Parser::new_ext(markdown, options) {
        match &event {
            // Only the first heading is captured
            Event::Start(Tag::Heading { .. }) if first_heading.is_none() => {
                heading_text = Some(String::new());
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(text) = heading_text.take() {
                    first_heading = Some(text);
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = heading_text.as_mut() {
                    heading.push_str(text);
                }
            }
            _ => {}
        }

        events.push(sanitize(event));
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());

    RenderedMarkdown {
        html: out,
        first_heading,
    }
}

/// Demote raw HTML to text and drop dangerous URL schemes
fn sanitize(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&url) {
        url
    } else {
        CowStr::Borrowed("#")
    }
}

/// Relative URLs and http(s)/mailto are allowed; any other scheme is not
pub fn is_safe_url(url: &str) -> bool {
    let trimmed = url.trim_start().to_ascii_lowercase();
    match trimmed.split_once(':') {
        Some((scheme, _)) if !scheme.contains('/') && !scheme.contains('?') && !scheme.contains('#') => {
            matches!(scheme, "http" | "https" | "mailto")
        }
        _ => true,
    }
}
