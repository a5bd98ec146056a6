// ABOUTME: Output format converters for normalized article bodies.
// ABOUTME: Resolves sentinel tags and media marks, then renders HTML, Markdown or plain text.

//! Output format conversion module.
//!
//! Normalized bodies still carry the pipeline's internal vocabulary: the
//! `unwrap` and `else` sentinels and media-marked tag names. [`render_html`]
//! turns them back into ordinary HTML before any other conversion.

use dom_query::{Document, NodeRef, Selection};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::normalize::Sentinel;
use crate::dom::{descendant_elements, is_media_marked, tag_name, unmarked_name};

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap());
static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static NEWLINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());
static SPACES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());

/// Elements that start a new line in plain text output.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "table", "tr", "blockquote",
    "quote", "figure", "br", "pre",
];

/// Void elements a body-level fragment parse accepts.
const VOID_TAGS: &[&str] = &[
    "area", "br", "embed", "hr", "img", "input", "source", "track", "wbr",
];

/// Attribute added to media elements restored from their marked names.
pub const MEDIA_ATTR: &str = "data-media";

/// Resolves sentinels and media marks in a normalized fragment.
///
/// `unwrap` elements are removed with their children kept in place, `else`
/// elements become `span`, and marked elements get their original name back
/// plus `data-media="true"`.
pub fn render_html(fragment: &str) -> String {
    let doc = Document::from(fragment);
    let body = doc.select("body");
    let Some(body_node) = body.nodes().first().copied() else {
        return String::new();
    };

    for node in descendant_elements(&body_node) {
        let Some(name) = tag_name(&node) else {
            continue;
        };
        let sel = Selection::from(node);
        if name == Sentinel::Else.as_str() {
            sel.rename("span");
        } else if is_media_marked(&name) {
            let original = unmarked_name(&name);
            if VOID_TAGS.contains(&original) {
                restore_void(&node, original);
            } else {
                sel.rename(original);
                sel.set_attr(MEDIA_ATTR, "true");
            }
        }
    }
    body.strip_elements(&[Sentinel::Unwrap.as_str()]);

    body.inner_html().to_string()
}

/// Replaces a marked void element with a parsed one of the original name.
///
/// Renamed elements fall outside the HTML namespace and would be written
/// with an end tag, which parsers read as a second element. Stray children
/// are moved out in front of the replacement's following siblings.
fn restore_void(node: &NodeRef, name: &str) {
    if let Some(child) = node.first_child() {
        node.insert_siblings_after(&child);
    }
    let mut tag = format!("<{}", name);
    for attr in node.attrs() {
        if &*attr.name.local == MEDIA_ATTR {
            continue;
        }
        tag.push_str(&format!(" {}=\"{}\"", attr.name.local, escape_attr(&attr.value)));
    }
    tag.push_str(&format!(" {}=\"true\">", MEDIA_ATTR));
    node.replace_with_html(tag);
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// Preprocess HTML before conversion: replace <br> tags with newlines.
fn preprocess_br_tags(html: &str) -> String {
    BR_RE.replace_all(html, "\n").to_string()
}

/// Collapse more than 2 consecutive blank lines to exactly 2.
fn collapse_blank_lines_to_two(text: &str) -> String {
    BLANK_LINES_RE.replace_all(text, "\n\n").to_string()
}

/// Collapse multiple consecutive newlines to a single newline.
fn collapse_newlines_to_one(text: &str) -> String {
    NEWLINES_RE.replace_all(text, "\n").to_string()
}

/// Convert HTML to Markdown using htmd.
///
/// Skips script and style tags during conversion, preserves links and images,
/// and normalizes consecutive blank lines to max 2.
/// On conversion error, returns the original HTML string unchanged.
pub fn html_to_markdown(html: &str) -> String {
    let preprocessed = preprocess_br_tags(html);

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript"])
        .build();

    let md = converter
        .convert(&preprocessed)
        .unwrap_or_else(|_| preprocessed.clone());

    collapse_blank_lines_to_two(&md).trim().to_string()
}

/// Convert HTML to plain text.
///
/// Block elements start new lines, script and style content is dropped,
/// horizontal whitespace is collapsed and blank lines are removed.
pub fn html_to_text(html: &str) -> String {
    let doc = Document::from(html);
    let mut raw = String::new();
    for node in doc.select("body").nodes() {
        collect_text(node, &mut raw);
    }

    let normalized = SPACES_RE.replace_all(&raw, " ");
    let lines: Vec<&str> = normalized.lines().map(str::trim).collect();
    collapse_newlines_to_one(&lines.join("\n")).trim().to_string()
}

fn collect_text(node: &NodeRef, out: &mut String) {
    for child in node.children() {
        if child.is_text() {
            out.push_str(&child.text());
            continue;
        }
        let Some(name) = tag_name(&child) else {
            continue;
        };
        if matches!(name.as_str(), "script" | "style" | "noscript") {
            continue;
        }
        let block = BLOCK_TAGS.contains(&name.as_str());
        if block {
            out.push('\n');
        }
        collect_text(&child, out);
        if block {
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn render_removes_unwrap_and_keeps_children() {
        assert_eq!(
            render_html("<unwrap><p>Egy <unwrap>kettő</unwrap></p></unwrap>"),
            "<p>Egy kettő</p>"
        );
    }

    #[test]
    fn render_turns_else_into_span() {
        assert_eq!(
            render_html("<else><p>a</p><else>b</else></else>"),
            "<span><p>a</p><span>b</span></span>"
        );
    }

    #[test]
    fn render_restores_media_elements() {
        let html = render_html(r#"<p>x</p><mdesc-figure><mdesc-img src="a.jpg"></mdesc-img></mdesc-figure>"#);
        assert_eq!(
            html,
            r#"<p>x</p><figure data-media="true"><img src="a.jpg" data-media="true"></figure>"#
        );
    }

    #[test]
    fn render_writes_void_media_without_end_tags() {
        let html = render_html(
            r#"<unwrap><p>x</p><mdesc-img src="a.jpg" alt="&quot;k&quot; &amp; b"></mdesc-img><mdesc-br></mdesc-br></unwrap>"#,
        );
        assert_eq!(
            html,
            r#"<p>x</p><img src="a.jpg" alt="&quot;k&quot; &amp; b" data-media="true"><br data-media="true">"#
        );
        assert!(!html.contains("</img>"));
        assert!(!html.contains("</br>"));
    }

    #[test]
    fn restored_br_yields_one_line_break() {
        let html = render_html("<p>egy<mdesc-br></mdesc-br>kettő</p>");
        assert_eq!(html_to_text(&html), "egy\nkettő");
    }

    #[test]
    fn html_to_markdown_converts_heading_and_paragraph() {
        let md = html_to_markdown("<h2>Alcím</h2><p>Szöveg <strong>kiemelt</strong>.</p>");
        assert!(md.starts_with("## Alcím"), "got: {md}");
        assert!(md.contains("**kiemelt**"));
    }

    #[test]
    fn html_to_markdown_skips_scripts() {
        let md = html_to_markdown("<p>a</p><script>alert(1)</script>");
        assert!(!md.contains("alert"));
    }

    #[test]
    fn html_to_text_breaks_blocks() {
        let text = html_to_text("<div><p>Első   bekezdés</p><p>Második</p></div><script>x()</script>");
        assert_eq!(text, "Első bekezdés\nMásodik");
    }

    #[test]
    fn html_to_text_handles_br() {
        assert_eq!(html_to_text("<p>egy<br>kettő</p>"), "egy\nkettő");
    }
}
