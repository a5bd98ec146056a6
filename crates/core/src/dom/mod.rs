// ABOUTME: DOM utilities for the extraction core built on dom_query.
// ABOUTME: Includes node helpers, the declarative matcher, the decomposer and the tag normalizer.

pub mod decompose;
pub mod matcher;
pub mod normalize;

use dom_query::{Document, NodeRef, Selection};

/// Tag-name prefix used to mark an element as a preserved media node.
///
/// Marked elements keep their original name after the prefix, so `img`
/// becomes `mdesc-img`. The prefix keeps the name a valid custom element
/// name, which lets serialized fragments be parsed again without loss.
pub const MEDIA_MARK_PREFIX: &str = "mdesc-";

/// Returns a selection spanning the whole document, including `<html>`.
pub fn document_scope(doc: &Document) -> Selection<'_> {
    Selection::from(doc.root())
}

/// Lowercased tag name of an element node.
pub fn tag_name(node: &NodeRef) -> Option<String> {
    node.node_name().map(|n| n.to_ascii_lowercase())
}

/// All element descendants of a node in document (pre-)order, excluding the node itself.
pub fn descendant_elements<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    Selection::from(*node).select("*").nodes().to_vec()
}

/// The node itself followed by its element descendants, in pre-order.
pub fn subtree_elements<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    let mut all = Vec::new();
    if node.is_element() {
        all.push(*node);
    }
    all.extend(descendant_elements(node));
    all
}

/// Returns true if the tag name carries the media mark.
pub fn is_media_marked(name: &str) -> bool {
    name.starts_with(MEDIA_MARK_PREFIX)
}

/// Marks an element as a preserved media node. Idempotent.
pub fn mark_media(node: &NodeRef) -> bool {
    match tag_name(node) {
        Some(name) if !is_media_marked(&name) => {
            Selection::from(*node).rename(&format!("{}{}", MEDIA_MARK_PREFIX, name));
            true
        }
        _ => false,
    }
}

/// The tag name an element had before it was marked.
pub fn unmarked_name(name: &str) -> &str {
    name.strip_prefix(MEDIA_MARK_PREFIX).unwrap_or(name)
}

/// Normalizes whitespace in a string by collapsing runs of whitespace into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Attribute names currently present on an element.
pub fn attribute_names(node: &NodeRef) -> Vec<String> {
    node.attrs()
        .iter()
        .map(|attr| attr.name.local.to_string())
        .collect()
}
