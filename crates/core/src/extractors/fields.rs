// ABOUTME: Evaluates field rules against a parsed page to produce cleaned text values.
// ABOUTME: Walks match-spec paths, reads text or attributes, strips subtrees and applies captures.

//! Field rule evaluation.
//!
//! Key behaviors:
//! - Each path step searches the descendants of every node reached so far.
//! - Text is gathered from text nodes, skipping `strip` subtrees.
//! - Whitespace is normalized before and after the `replace` pairs run.
//! - Empty strings are treated as no match.

use std::collections::HashSet;

use dom_query::{Document, NodeRef};

use crate::dom::matcher::ElementMatchSpec;
use crate::dom::{descendant_elements, normalize_whitespace};
use crate::extractors::rules::{FieldRule, Pick, Scope, Step};

/// Starting points for field paths: the whole document and the template marker.
#[derive(Clone)]
pub struct FieldScope<'a> {
    document: NodeRef<'a>,
    template: Option<NodeRef<'a>>,
}

impl<'a> FieldScope<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self {
            document: doc.root(),
            template: None,
        }
    }

    pub fn with_template(mut self, marker: NodeRef<'a>) -> Self {
        self.template = Some(marker);
        self
    }

    fn start(&self, scope: Scope) -> NodeRef<'a> {
        match scope {
            Scope::Document => self.document,
            Scope::Template => self.template.unwrap_or(self.document),
        }
    }
}

/// Elements reached by a rule's path. An empty path yields the start node.
pub fn select_nodes<'a>(scope: &FieldScope<'a>, rule: &FieldRule) -> Vec<NodeRef<'a>> {
    let mut current = vec![scope.start(rule.scope)];
    for step in &rule.path {
        let mut seen = HashSet::new();
        current = current
            .iter()
            .flat_map(|node| apply_step(node, step))
            .filter(|node| seen.insert(node.id))
            .collect();
        if current.is_empty() {
            break;
        }
    }
    current
}

fn apply_step<'a>(node: &NodeRef<'a>, step: &Step) -> Vec<NodeRef<'a>> {
    let mut matches: Vec<NodeRef<'a>> = descendant_elements(node)
        .into_iter()
        .filter(|candidate| step.spec.matches(candidate))
        .filter(|candidate| !step.exclude.iter().any(|ex| ex.matches(candidate)))
        .filter(|candidate| match &step.text {
            Some(pattern) => pattern.is_match(&normalize_whitespace(&candidate.text())),
            None => true,
        })
        .collect();

    match step.pick {
        Pick::All => matches,
        Pick::First => matches.into_iter().take(1).collect(),
        Pick::Last => matches.pop().into_iter().collect(),
        Pick::Nth(n) => matches.into_iter().nth(n).into_iter().collect(),
    }
}

/// All non-empty values the rule yields, in document order.
pub fn extract_values(scope: &FieldScope, rule: &FieldRule) -> Vec<String> {
    select_nodes(scope, rule)
        .iter()
        .filter_map(|node| {
            let raw = match &rule.attr {
                Some(name) => node.attr(name)?.to_string(),
                None => element_text(node, &rule.strip),
            };
            clean_value(&raw, rule)
        })
        .collect()
}

/// The first non-empty value the rule yields.
pub fn extract_value(scope: &FieldScope, rule: &FieldRule) -> Option<String> {
    extract_values(scope, rule).into_iter().next()
}

/// Concatenated text of a subtree, leaving out subtrees matching any `strip` spec.
pub fn element_text(node: &NodeRef, strip: &[ElementMatchSpec]) -> String {
    if strip.is_empty() {
        return node.text().to_string();
    }
    let mut out = String::new();
    collect_text(node, strip, &mut out);
    out
}

fn collect_text(node: &NodeRef, strip: &[ElementMatchSpec], out: &mut String) {
    for child in node.children() {
        if child.is_text() {
            out.push_str(&child.text());
        } else if child.is_element() && !strip.iter().any(|spec| spec.matches(&child)) {
            collect_text(&child, strip, out);
        }
    }
}

/// Applies normalization, replacements and the capture pattern to a raw value.
fn clean_value(raw: &str, rule: &FieldRule) -> Option<String> {
    let mut text = normalize_whitespace(raw);
    if !rule.replace.is_empty() {
        for (from, to) in &rule.replace {
            if !from.is_empty() {
                text = text.replace(from.as_str(), to);
            }
        }
        text = normalize_whitespace(&text);
    }

    if let Some(pattern) = &rule.capture {
        let captured = {
            let caps = pattern.captures(&text)?;
            let group = caps.iter().skip(1).flatten().next().or_else(|| caps.get(0))?;
            normalize_whitespace(group.as_str())
        };
        text = captured;
    }

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
