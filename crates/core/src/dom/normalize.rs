// ABOUTME: Reduces a decomposed tree to a site's structural tag vocabulary.
// ABOUTME: Renames non-whitelisted tags to the site sentinel and strips attributes outside the link policy.

use std::collections::BTreeSet;

use dom_query::{NodeRef, Selection};
use serde::{Deserialize, Serialize};

use super::{attribute_names, is_media_marked, subtree_elements, tag_name, MEDIA_MARK_PREFIX};

/// Replacement tag name for elements outside the structural whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentinel {
    /// Drop the wrapper when rendering but keep its children in place.
    #[default]
    Unwrap,
    /// Keep the element as a neutral generic container.
    Else,
}

impl Sentinel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentinel::Unwrap => "unwrap",
            Sentinel::Else => "else",
        }
    }
}

/// Tags whose link attributes survive normalization, and which attributes those are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPolicy {
    pub tags: BTreeSet<String>,
    pub attributes: BTreeSet<String>,
}

impl LinkPolicy {
    /// Anchors, images and iframes, plain or media-marked, keeping `href` and `src`.
    pub fn basic() -> Self {
        let mut tags = BTreeSet::new();
        for tag in ["a", "img", "iframe"] {
            tags.insert(tag.to_string());
            tags.insert(format!("{}{}", MEDIA_MARK_PREFIX, tag));
        }
        Self {
            tags,
            attributes: ["href", "src"].iter().map(|s| s.to_string()).collect(),
        }
    }

    /// A policy keeping no attributes anywhere.
    pub fn none() -> Self {
        Self {
            tags: BTreeSet::new(),
            attributes: BTreeSet::new(),
        }
    }

    /// Returns true if the tag keeps its link attributes.
    pub fn covers(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self::basic()
    }
}

/// Per-site normalization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPolicy {
    /// Structurally meaningful tag names.
    pub structural_tags: BTreeSet<String>,
    #[serde(default)]
    pub sentinel: Sentinel,
    #[serde(default)]
    pub links: LinkPolicy,
}

impl TagPolicy {
    pub fn new<I, S>(structural_tags: I, sentinel: Sentinel) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            structural_tags: structural_tags.into_iter().map(Into::into).collect(),
            sentinel,
            links: LinkPolicy::basic(),
        }
    }

    pub fn with_links(mut self, links: LinkPolicy) -> Self {
        self.links = links;
        self
    }

    /// Tag name an element should carry after normalization.
    ///
    /// Media-marked elements and sentinels keep their names.
    fn target_name<'n>(&self, name: &'n str) -> &'n str {
        if is_media_marked(name)
            || self.structural_tags.contains(name)
            || name == Sentinel::Unwrap.as_str()
            || name == Sentinel::Else.as_str()
        {
            name
        } else {
            self.sentinel.as_str()
        }
    }
}

/// Counts of what a normalization pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub renamed: usize,
    pub attributes_removed: usize,
}

/// Normalizes the root and every element below it, in pre-order.
pub fn normalize(root: &NodeRef, policy: &TagPolicy) -> NormalizeReport {
    let mut report = NormalizeReport::default();
    for node in subtree_elements(root) {
        normalize_element(&node, policy, &mut report);
    }
    report
}

fn normalize_element(node: &NodeRef, policy: &TagPolicy, report: &mut NormalizeReport) {
    let Some(name) = tag_name(node) else {
        return;
    };
    let sel = Selection::from(*node);
    let target = policy.target_name(&name);

    // link attributes survive only if the element is still a link tag after renaming
    let keep_links = policy.links.covers(target);
    for attr in attribute_names(node) {
        if keep_links && policy.links.attributes.contains(&attr) {
            continue;
        }
        sel.remove_attr(&attr);
        report.attributes_removed += 1;
    }

    if target != name {
        sel.rename(target);
        report.renamed += 1;
    }
}
