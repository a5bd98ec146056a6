// ABOUTME: Declarative (tag-name-set, attribute-filter) matching against a dom_query tree.
// ABOUTME: Supports find-all over a spec list and the first-non-empty root fallback chain.

//! Element matching.
//!
//! An [`ElementMatchSpec`] pairs a set of tag names with an attribute filter.
//! Filter values follow the conventions the portal rules were written in:
//!
//! - an empty value requires the attribute to be absent or empty;
//! - a `class` value without whitespace matches one token of the class list;
//! - a `class` value with whitespace matches the whole class list, token by
//!   token in order, so runs of spaces on either side do not matter;
//! - any other attribute is compared with the raw value exactly.

use std::collections::{BTreeMap, HashSet};

use dom_query::{NodeRef, Selection};
use serde::{Deserialize, Serialize};

use super::{descendant_elements, tag_name};

/// A `(tag-name-set, attribute-filter)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMatchSpec {
    /// Accepted tag names. Empty accepts any element.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Required attributes and their expected values.
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

impl ElementMatchSpec {
    /// Creates a spec accepting any of the given tag names.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            attrs: BTreeMap::new(),
        }
    }

    /// Creates a spec for a single tag name.
    pub fn tag(name: impl Into<String>) -> Self {
        Self::new([name])
    }

    /// Adds an attribute filter.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Shorthand for `with_attr("class", value)`.
    pub fn with_class(self, value: impl Into<String>) -> Self {
        self.with_attr("class", value)
    }

    /// Returns true if the element satisfies the tag set and every attribute filter.
    pub fn matches(&self, node: &NodeRef) -> bool {
        if !node.is_element() {
            return false;
        }
        let Some(name) = tag_name(node) else {
            return false;
        };
        if !self.tags.is_empty() && !self.tags.iter().any(|t| t.eq_ignore_ascii_case(&name)) {
            return false;
        }
        self.attrs.iter().all(|(attr, expected)| {
            let actual = node.attr(attr);
            attr_matches(attr, expected, actual.as_deref())
        })
    }
}

/// Evaluates one attribute filter entry.
fn attr_matches(attr: &str, expected: &str, actual: Option<&str>) -> bool {
    if expected.is_empty() {
        return actual.map_or(true, str::is_empty);
    }
    let Some(actual) = actual else {
        return false;
    };
    if attr.eq_ignore_ascii_case("class") {
        if !expected.chars().any(char::is_whitespace) {
            return actual.split_whitespace().any(|token| token == expected);
        }
        return actual.split_whitespace().eq(expected.split_whitespace());
    }
    actual == expected
}

/// All descendants of `root` matching any spec, in spec order and then document order.
///
/// Each element appears once even when several specs match it.
pub fn match_all<'a>(root: &Selection<'a>, specs: &[ElementMatchSpec]) -> Vec<NodeRef<'a>> {
    if specs.is_empty() {
        return Vec::new();
    }
    let candidates = root.select("*").nodes().to_vec();
    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    for spec in specs {
        for node in &candidates {
            if spec.matches(node) && seen.insert(node.id) {
                matched.push(*node);
            }
        }
    }
    matched
}

/// Same as [`match_all`], rooted at a single node.
pub fn match_all_under<'a>(node: &NodeRef<'a>, specs: &[ElementMatchSpec]) -> Vec<NodeRef<'a>> {
    let mut seen = HashSet::new();
    let candidates = descendant_elements(node);
    let mut matched = Vec::new();
    for spec in specs {
        for candidate in &candidates {
            if spec.matches(candidate) && seen.insert(candidate.id) {
                matched.push(*candidate);
            }
        }
    }
    matched
}

/// Template fallback chain: the matches of the first spec that yields any.
///
/// Returns an empty vector when no spec matches.
pub fn locate_roots<'a>(root: &Selection<'a>, specs: &[ElementMatchSpec]) -> Vec<NodeRef<'a>> {
    let candidates = root.select("*").nodes().to_vec();
    for spec in specs {
        let found: Vec<NodeRef<'a>> = candidates
            .iter()
            .filter(|node| spec.matches(node))
            .copied()
            .collect();
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

/// First descendant (document order) matching the spec.
pub fn find_first<'a>(root: &Selection<'a>, spec: &ElementMatchSpec) -> Option<NodeRef<'a>> {
    root.select("*")
        .nodes()
        .iter()
        .find(|node| spec.matches(node))
        .copied()
}
