// ABOUTME: Declarative metadata rule model for per-portal extraction templates.
// ABOUTME: Field paths, date, byline and keyword rules are plain serde data evaluated by one engine.

//! Metadata rule definitions.
//!
//! A portal describes its metadata with one or more [`MetadataTemplate`]s
//! (regular article, video page, gallery, blog post, ...). Each template
//! names a marker element and a set of field rules. A field rule walks a
//! path of [`Step`]s from the document or from the marker element, then
//! reads text or an attribute and cleans it up.

use std::fmt;
use std::ops::Deref;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dom::matcher::ElementMatchSpec;

/// A regular expression that (de)serializes as its source string.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Pattern)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for Pattern {
    type Target = Regex;

    fn deref(&self) -> &Regex {
        &self.0
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.0.as_str())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}

/// Which of a step's matches to continue with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pick {
    #[default]
    First,
    Last,
    /// Zero-based index into the matches.
    Nth(usize),
    All,
}

/// Where a field path starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    Document,
    /// The template's marker element.
    Template,
}

/// One hop of a field path: descendants matching `spec`, filtered, then picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub spec: ElementMatchSpec,
    #[serde(default)]
    pub pick: Pick,
    /// Matches that also satisfy one of these specs are skipped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<ElementMatchSpec>,
    /// Keeps only matches whose normalized text contains this pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Pattern>,
}

impl Step {
    pub fn new(spec: ElementMatchSpec) -> Self {
        Self {
            spec,
            pick: Pick::First,
            exclude: Vec::new(),
            text: None,
        }
    }

    pub fn pick(mut self, pick: Pick) -> Self {
        self.pick = pick;
        self
    }
}

/// How to obtain one textual value (or a list of them) from a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRule {
    pub scope: Scope,
    pub path: Vec<Step>,
    /// Read this attribute instead of the element text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
    /// Subtrees left out of the text.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub strip: Vec<ElementMatchSpec>,
    /// Literal `(from, to)` replacements applied to the raw text in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replace: Vec<(String, String)>,
    /// Keeps the first participating group of the first match, or the whole match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture: Option<Pattern>,
    /// Absence is expected and logged at debug level.
    pub optional: bool,
}

impl FieldRule {
    pub fn path(steps: Vec<Step>) -> Self {
        Self {
            path: steps,
            ..Self::default()
        }
    }

    pub fn in_template(mut self) -> Self {
        self.scope = Scope::Template;
        self
    }
}

/// A date field: text parsed with a locale pattern, or a machine date when no format is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRule {
    #[serde(flatten)]
    pub field: FieldRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// How byline tokens of one rule are classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BylineRole {
    /// Use the site's attribution rules.
    #[default]
    Reconcile,
    Author,
    Source,
}

/// A byline field and how to split and classify it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BylineRule {
    #[serde(flatten)]
    pub field: FieldRule,
    #[serde(default)]
    pub delimiters: Vec<String>,
    /// Bylines kept whole even when they contain a delimiter.
    #[serde(default)]
    pub verbatim: Vec<String>,
    #[serde(default)]
    pub role: BylineRole,
}

/// A tag list field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    #[serde(flatten)]
    pub field: FieldRule,
    /// The first tag names the subsection; the rest are keywords.
    #[serde(default)]
    pub first_is_subsection: bool,
}

/// One page layout of a portal and the rules for its metadata fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataTemplate {
    pub name: String,
    /// The template applies when the first element matching this spec exists.
    pub marker: ElementMatchSpec,
    /// Blocks that must exist as well, otherwise the page yields no metadata.
    #[serde(default)]
    pub requires: Vec<ElementMatchSpec>,
    #[serde(default)]
    pub title: Option<FieldRule>,
    #[serde(default)]
    pub subtitle: Option<FieldRule>,
    #[serde(default)]
    pub date_published: Option<DateRule>,
    #[serde(default)]
    pub date_modified: Option<DateRule>,
    #[serde(default)]
    pub bylines: Vec<BylineRule>,
    #[serde(default)]
    pub section: Option<FieldRule>,
    #[serde(default)]
    pub subsection: Option<FieldRule>,
    #[serde(default)]
    pub keywords: Option<KeywordRule>,
}
