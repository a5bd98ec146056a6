// ABOUTME: Site adapters (per-portal rule sets) and the registry that resolves them by id or URL.
// ABOUTME: Adapters are serde data: root chain, tag policy, removal/media rules, templates and blacklist.

//! Portal site adapters.
//!
//! A [`SiteAdapter`] holds everything the generic pipeline needs to know
//! about one portal. Adapters are immutable once loaded and shared by
//! reference through a [`SiteRegistry`].

pub mod loader;

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use dom_query::{Document, NodeRef};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::attribution::Reconciler;
use crate::dom::decompose::{decompose, DecomposeReport};
use crate::dom::matcher::ElementMatchSpec;
use crate::dom::normalize::{normalize, NormalizeReport, TagPolicy};
use crate::error::ExtractError;
use crate::extractors::fields::{extract_value, FieldScope};
use crate::extractors::metadata::MetadataRules;
use crate::extractors::rules::{FieldRule, MetadataTemplate, Pattern};

/// URLs a portal must never yield an article for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blacklist {
    urls: HashSet<String>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one URL per line, ignoring blank lines and `#` comments.
    pub fn from_lines(text: &str) -> Self {
        let mut list = Self::new();
        list.extend_lines(text);
        list
    }

    /// Reads a blacklist file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ExtractError::io(path.display().to_string(), "read blacklist", e))?;
        Ok(Self::from_lines(&text))
    }

    pub fn extend_lines(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim();
            if !line.is_empty() && !line.starts_with('#') {
                self.urls.insert(line.to_string());
            }
        }
    }

    pub fn insert(&mut self, url: impl Into<String>) {
        self.urls.insert(url.into().trim().to_string());
    }

    /// Exact membership after trimming surrounding whitespace.
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url.trim())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Where to find the link to the next page of a multi-page article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationRule {
    /// Only pages whose URL matches are followed. Absent means every page.
    #[serde(default)]
    pub url_pattern: Option<Pattern>,
    /// Field yielding the (possibly relative) next page link.
    pub next: FieldRule,
}

/// Everything the pipeline knows about one portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAdapter {
    pub id: String,
    pub url_prefix: String,
    /// Article root candidates, tried in order until one matches.
    pub article_roots: Vec<ElementMatchSpec>,
    #[serde(flatten)]
    pub tags: TagPolicy,
    #[serde(default)]
    pub removal: Vec<ElementMatchSpec>,
    #[serde(default)]
    pub media: Vec<ElementMatchSpec>,
    #[serde(default, rename = "attribution")]
    pub reconciler: Reconciler,
    #[serde(default)]
    pub templates: Vec<MetadataTemplate>,
    #[serde(default)]
    pub pagination: Option<PaginationRule>,
    #[serde(default)]
    pub blacklist: Blacklist,
    /// Extra blacklist file, relative to the site file it is declared in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blacklist_file: Option<PathBuf>,
}

impl SiteAdapter {
    /// Checks the invariants loaders rely on.
    pub fn validate(&self) -> Result<(), ExtractError> {
        let fail = |msg: &str| {
            Err(ExtractError::config(
                self.id.clone(),
                "validate site",
                Some(anyhow::anyhow!(msg.to_string())),
            ))
        };
        if self.id.trim().is_empty() {
            return fail("empty site id");
        }
        if self.article_roots.is_empty() {
            return fail("no article root specs");
        }
        if self.tags.structural_tags.is_empty() {
            return fail("empty structural tag whitelist");
        }
        Ok(())
    }

    pub fn is_blacklisted(&self, url: &str) -> bool {
        self.blacklist.contains(url)
    }

    /// Whether the URL belongs to this portal.
    pub fn handles(&self, url: &str) -> bool {
        !self.url_prefix.is_empty() && url.trim().starts_with(&self.url_prefix)
    }

    /// View used by the metadata engine.
    pub fn metadata_rules(&self) -> MetadataRules<'_> {
        MetadataRules {
            portal: &self.id,
            templates: &self.templates,
            reconciler: &self.reconciler,
        }
    }

    /// Prunes and normalizes one article root in place.
    pub fn clean(&self, root: &NodeRef) -> (DecomposeReport, NormalizeReport) {
        let decomposed = decompose(root, &self.removal, &self.media);
        let normalized = normalize(root, &self.tags);
        (decomposed, normalized)
    }

    /// Absolute URL of the next page, if the portal paginates and the page links one.
    pub fn next_page(&self, url: &str, doc: &Document) -> Option<String> {
        let rule = self.pagination.as_ref()?;
        if let Some(pattern) = &rule.url_pattern {
            if !pattern.is_match(url) {
                return None;
            }
        }
        let href = extract_value(&FieldScope::new(doc), &rule.next)?;
        let base = Url::parse(url).ok()?;
        let next = base.join(&href).ok()?;
        if next.as_str() == base.as_str() {
            return None;
        }
        Some(next.to_string())
    }
}

/// Site adapters keyed by portal id.
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    sites: BTreeMap<String, SiteAdapter>,
}

/// A site file holds one adapter or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum SiteFile {
    One(Box<SiteAdapter>),
    Many(Vec<SiteAdapter>),
}

impl SiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter, replacing any adapter with the same id.
    pub fn register(&mut self, site: SiteAdapter) {
        self.sites.insert(site.id.clone(), site);
    }

    pub fn get(&self, id: &str) -> Option<&SiteAdapter> {
        self.sites.get(id)
    }

    /// Looks up an adapter by portal id.
    pub fn lookup(&self, id: &str) -> Result<&SiteAdapter, ExtractError> {
        self.get(id)
            .ok_or_else(|| ExtractError::unknown_portal(id, "lookup portal"))
    }

    /// The adapter with the longest URL prefix that the URL starts with.
    pub fn resolve(&self, url: &str) -> Option<&SiteAdapter> {
        self.sites
            .values()
            .filter(|site| site.handles(url))
            .max_by_key(|site| site.url_prefix.len())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }

    pub fn sites(&self) -> impl Iterator<Item = &SiteAdapter> {
        self.sites.values()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Parses site JSON (one adapter or a list) and registers the result.
    ///
    /// `base_dir` resolves relative `blacklist_file` paths.
    pub fn load_json(
        &mut self,
        json: &str,
        origin: &str,
        base_dir: Option<&Path>,
    ) -> Result<usize, ExtractError> {
        let parsed: SiteFile = serde_json::from_str(json)
            .map_err(|e| ExtractError::config(origin, "parse site file", Some(e.into())))?;
        let sites = match parsed {
            SiteFile::One(site) => vec![*site],
            SiteFile::Many(sites) => sites,
        };

        let count = sites.len();
        for mut site in sites {
            site.validate()?;
            if let Some(file) = &site.blacklist_file {
                let path = match base_dir {
                    Some(dir) if file.is_relative() => dir.join(file),
                    _ => file.clone(),
                };
                let text = fs::read_to_string(&path)
                    .map_err(|e| ExtractError::io(path.display().to_string(), "read blacklist", e))?;
                site.blacklist.extend_lines(&text);
            }
            debug!(portal = %site.id, origin, "site registered");
            self.register(site);
        }
        Ok(count)
    }

    /// Loads a JSON site file.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize, ExtractError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let json = fs::read_to_string(path)
            .map_err(|e| ExtractError::io(origin.clone(), "read site file", e))?;
        self.load_json(&json, &origin, path.parent())
    }

    /// Loads every `*.json` file of a directory in file name order.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, ExtractError> {
        let dir = dir.as_ref();
        let origin = dir.display().to_string();
        let entries =
            fs::read_dir(dir).map_err(|e| ExtractError::io(origin.clone(), "read site dir", e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ExtractError::io(origin.clone(), "read site dir", e))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut count = 0;
        for path in paths {
            count += self.load_file(&path)?;
        }
        Ok(count)
    }

    /// Loads a site file or a directory of them.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<usize, ExtractError> {
        let path = path.as_ref();
        if path.is_dir() {
            self.load_dir(path)
        } else {
            self.load_file(path)
        }
    }
}
