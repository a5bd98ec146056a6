// ABOUTME: The Extractor runs one page through its site adapter: metadata, roots, cleanup, pagination.
// ABOUTME: Only an unknown portal is an error; structural absences are logged and yield no article.

use std::collections::HashSet;

use dom_query::{Document, NodeRef, Selection};
use tracing::{debug, warn};

use crate::dom::document_scope;
use crate::dom::matcher::locate_roots;
use crate::error::ExtractError;
use crate::extractors::metadata::extract_metadata;
use crate::options::{ContentType, ExtractorBuilder, Options};
use crate::result::ExtractedArticle;
use crate::sites::loader::load_builtin_registry;
use crate::sites::{SiteAdapter, SiteRegistry};

/// Article extractor bound to a site registry.
///
/// Immutable after construction; one instance can serve many threads.
#[derive(Debug, Clone)]
pub struct Extractor {
    opts: Options,
    registry: SiteRegistry,
}

impl Extractor {
    /// Create a new ExtractorBuilder for configuring the extractor.
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::new()
    }

    /// Create a new Extractor with the given options.
    ///
    /// Falls back to the builtin registry when none is set.
    pub fn new(mut opts: Options) -> Self {
        let registry = opts.registry.take().unwrap_or_else(load_builtin_registry);
        Self { opts, registry }
    }

    /// Same extractor, forced to use one portal's adapter.
    pub fn with_portal(mut self, id: impl Into<String>) -> Result<Self, ExtractError> {
        let id = id.into();
        self.registry.lookup(&id)?;
        self.opts.portal = Some(id);
        Ok(self)
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    pub fn content_type(&self) -> ContentType {
        self.opts.content_type
    }

    /// The adapter responsible for a URL.
    pub fn site_for(&self, url: &str) -> Result<&SiteAdapter, ExtractError> {
        match &self.opts.portal {
            Some(id) => self.registry.lookup(id),
            None => self
                .registry
                .resolve(url)
                .ok_or_else(|| ExtractError::unknown_portal(url, "resolve portal")),
        }
    }

    /// Parses the HTML and extracts the article.
    pub fn extract_html(&self, html: &str, url: &str) -> Result<Option<ExtractedArticle>, ExtractError> {
        let doc = Document::from(html);
        self.extract_document(&doc, url)
    }

    /// Extracts the article of an already parsed page.
    ///
    /// Metadata is read from the untouched page first; the located article
    /// roots are then pruned and normalized in place.
    pub fn extract_document(
        &self,
        doc: &Document,
        url: &str,
    ) -> Result<Option<ExtractedArticle>, ExtractError> {
        let site = self.site_for(url)?;
        let portal = site.id.as_str();

        if site.is_blacklisted(url) {
            debug!(portal, url, "blacklisted url skipped");
            return Ok(None);
        }

        let Some(metadata) = extract_metadata(doc, url, site.metadata_rules()) else {
            return Ok(None);
        };
        let next_page = site.next_page(url, doc);

        let roots = outermost(locate_roots(&document_scope(doc), &site.article_roots));
        if roots.is_empty() {
            warn!(portal, url, "article root not found");
            return Ok(None);
        }

        let mut body = Vec::with_capacity(roots.len());
        for root in &roots {
            let (decomposed, normalized) = site.clean(root);
            debug!(
                portal,
                url,
                removed = decomposed.removed,
                marked = decomposed.marked,
                renamed = normalized.renamed,
                "article root cleaned"
            );
            body.push(Selection::from(*root).html().to_string());
        }

        Ok(Some(ExtractedArticle {
            portal: portal.to_string(),
            metadata,
            body,
            next_page,
        }))
    }

    /// Extracts the article and renders its body in the configured format.
    pub fn extract_content(&self, html: &str, url: &str) -> Result<Option<String>, ExtractError> {
        Ok(self
            .extract_html(html, url)?
            .map(|article| article.content(self.opts.content_type)))
    }
}

/// Drops roots nested inside other roots so no subtree is emitted twice.
fn outermost(roots: Vec<NodeRef<'_>>) -> Vec<NodeRef<'_>> {
    let ids: HashSet<_> = roots.iter().map(|r| r.id).collect();
    roots
        .into_iter()
        .filter(|root| !root.ancestors(None).iter().any(|a| ids.contains(&a.id)))
        .collect()
}
