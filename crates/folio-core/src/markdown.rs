//! Markdown rendering and HTML sanitization.
//!
//! Uses pulldown-cmark for CommonMark parsing and ammonia for whitelist
//! sanitization. Raw HTML in the source is never passed through as markup:
//! it is re-emitted as text before rendering, and the rendered HTML is then
//! cleaned, so script-bearing markup cannot reach a preview or a published
//! post body.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

const PARSE_OPTIONS: Options = Options::ENABLE_TABLES
    .union(Options::ENABLE_STRIKETHROUGH)
    .union(Options::ENABLE_TASKLISTS);

/// Render markdown to HTML.
///
/// Raw HTML blocks and inline HTML are emitted as escaped text. The output is
/// not sanitized; use [`render_safe`] for anything shown to a reader.
#[tracing::instrument(skip_all, fields(input_len = text.len()))]
pub fn render(text: &str) -> String {
    let parser = Parser::new_ext(text, PARSE_OPTIONS).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Strip everything outside the HTML whitelist.
///
/// Removes scripts, event-handler attributes and unsafe URL schemes. Links
/// get `rel="noopener noreferrer"`. Running it on its own output is a no-op.
#[tracing::instrument(skip_all, fields(input_len = html.len()))]
pub fn sanitize(html: &str) -> String {
    sanitizer().clean(html).to_string()
}

/// Render and sanitize in one step.
pub fn render_safe(text: &str) -> String {
    sanitize(&render(text))
}

fn sanitizer() -> ammonia::Builder<'static> {
    let mut builder = ammonia::Builder::default();
    builder
        .link_rel(Some("noopener noreferrer"))
        .add_tags(["input"])
        .add_tag_attributes("input", ["type", "checked", "disabled"])
        .add_tag_attributes("code", ["class"]);
    builder
}

/// Extract headings from markdown text.
///
/// Returns a list of `(level, text)` pairs where level is 1-6.
#[tracing::instrument(skip_all, fields(input_len = text.len()))]
pub fn extract_headings(text: &str) -> Vec<(u8, String)> {
    let parser = Parser::new_ext(text, PARSE_OPTIONS);

    let mut headings = Vec::new();
    let mut in_heading: Option<u8> = None;
    let mut heading_text = String::new();

    for event in parser {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                in_heading = Some(level as u8);
                heading_text.clear();
            }
            Event::Text(t) | Event::Code(t) if in_heading.is_some() => {
                heading_text.push_str(&t);
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(level) = in_heading.take() {
                    headings.push((level, std::mem::take(&mut heading_text)));
                }
            }
            _ => {}
        }
    }

    headings
}
