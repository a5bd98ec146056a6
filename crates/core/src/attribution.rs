// ABOUTME: Splits byline strings and sorts the tokens into authors and sources.
// ABOUTME: Uses a per-site known-source list, a single-word heuristic and conjunction splitting.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::dom::normalize_whitespace;

/// Per-site attribution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributionRules {
    /// Byline values that always name a source (news agencies, the portal itself).
    pub known_sources: BTreeSet<String>,
    /// Treat single-word tokens (acronyms, handles) as sources.
    pub single_word_sources: bool,
    /// Word joining two co-authors under one byline, with its surrounding spaces.
    pub conjunction: Option<String>,
}

impl Default for AttributionRules {
    fn default() -> Self {
        Self {
            known_sources: BTreeSet::new(),
            single_word_sources: true,
            conjunction: Some(" és ".to_string()),
        }
    }
}

impl AttributionRules {
    pub fn with_known_sources<I, S>(known_sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_sources: known_sources.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Role of one byline token after reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Author,
    Source,
}

/// Reconciled byline: persons and organizations, disjoint, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attribution {
    pub authors: Vec<String>,
    pub sources: Vec<String>,
}

impl Attribution {
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty() && self.sources.is_empty()
    }

    /// Records a token under a role. A token already recorded is left where it is.
    pub fn push(&mut self, token: String, role: Role) {
        if self.authors.contains(&token) || self.sources.contains(&token) {
            return;
        }
        match role {
            Role::Author => self.authors.push(token),
            Role::Source => self.sources.push(token),
        }
    }
}

/// Applies a site's attribution rules to raw byline tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reconciler {
    rules: AttributionRules,
}

impl Reconciler {
    pub fn new(rules: AttributionRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &AttributionRules {
        &self.rules
    }

    /// Classifies a single cleaned token.
    pub fn classify(&self, token: &str) -> Role {
        if self.rules.known_sources.contains(token) {
            Role::Source
        } else if self.rules.single_word_sources && !token.contains(char::is_whitespace) {
            Role::Source
        } else {
            Role::Author
        }
    }

    /// Splits a token joining two co-authors. Known sources are never split.
    fn split_conjunction(&self, token: String) -> Vec<String> {
        let Some(conjunction) = self.rules.conjunction.as_deref() else {
            return vec![token];
        };
        if self.rules.known_sources.contains(&token) || !token.contains(conjunction) {
            return vec![token];
        }
        token
            .split(conjunction)
            .map(normalize_whitespace)
            .filter(|part| !part.is_empty())
            .collect()
    }

    /// Sorts byline tokens into authors and sources.
    ///
    /// Tokens are whitespace-normalized and empty ones dropped. The two output
    /// lists never share a value and together hold every distinct token.
    pub fn reconcile<I, S>(&self, tokens: I) -> Attribution
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Attribution::default();
        for raw in tokens {
            let token = normalize_whitespace(raw.as_ref());
            if token.is_empty() {
                continue;
            }
            for part in self.split_conjunction(token) {
                let role = self.classify(&part);
                out.push(part, role);
            }
        }
        out
    }
}

/// Reconciles tokens with the default rules and the given known sources.
pub fn reconcile<I, S>(tokens: I, known_sources: &BTreeSet<String>) -> Attribution
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Reconciler::new(AttributionRules {
        known_sources: known_sources.clone(),
        ..AttributionRules::default()
    })
    .reconcile(tokens)
}

/// Splits raw byline text on any of the delimiters.
///
/// Bylines equal to one of `verbatim` (after trimming) are returned whole,
/// which keeps names that contain a delimiter in one piece.
pub fn split_byline(text: &str, delimiters: &[String], verbatim: &[String]) -> Vec<String> {
    let trimmed = normalize_whitespace(text);
    if trimmed.is_empty() {
        return Vec::new();
    }
    if verbatim.iter().any(|v| *v == trimmed) {
        return vec![trimmed];
    }

    let mut parts = vec![trimmed];
    for delimiter in delimiters.iter().filter(|d| !d.is_empty()) {
        parts = parts
            .iter()
            .flat_map(|part| part.split(delimiter.as_str()))
            .map(normalize_whitespace)
            .collect();
    }

    let mut seen = HashSet::new();
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
