// ABOUTME: Configuration options for the extractor including ContentType, Options, and ExtractorBuilder.
// ABOUTME: ExtractorBuilder provides a fluent API for constructing Extractor instances with custom site data.

use std::fmt;
use std::path::PathBuf;

use crate::error::ExtractError;
use crate::extractor::Extractor;
use crate::sites::loader::try_load_builtin_registry;
use crate::sites::{SiteAdapter, SiteRegistry};

/// The content type format for rendered article bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Html,
    Markdown,
    Text,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentType::Html => "html",
            ContentType::Markdown => "markdown",
            ContentType::Text => "text",
        };
        write!(f, "{}", s)
    }
}

impl From<&str> for ContentType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => ContentType::Markdown,
            "text" | "txt" => ContentType::Text,
            _ => ContentType::Html,
        }
    }
}

/// Configuration options for the extractor.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub content_type: ContentType,
    /// Site registry to use instead of the builtin one.
    pub registry: Option<SiteRegistry>,
    /// Skip the builtin portals entirely.
    pub skip_builtin: bool,
    /// Site files or directories merged over the registry, in order.
    pub site_paths: Vec<PathBuf>,
    /// Extra adapters registered last.
    pub sites: Vec<SiteAdapter>,
    /// Portal forced for every page instead of resolving by URL.
    pub portal: Option<String>,
}

/// Builder for constructing Extractor instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct ExtractorBuilder {
    opts: Options,
}

impl ExtractorBuilder {
    /// Create a new ExtractorBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the content type for rendered output.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.opts.content_type = content_type;
        self
    }

    /// Set a custom site registry.
    pub fn registry(mut self, registry: SiteRegistry) -> Self {
        self.opts.registry = Some(registry);
        self
    }

    /// Start from an empty registry instead of the builtin portals.
    pub fn without_builtin(mut self) -> Self {
        self.opts.skip_builtin = true;
        self
    }

    /// Merge a site file or a directory of site files.
    pub fn site_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.opts.site_paths.push(path.into());
        self
    }

    /// Register one more adapter.
    pub fn site(mut self, site: SiteAdapter) -> Self {
        self.opts.sites.push(site);
        self
    }

    /// Force one portal for every page.
    pub fn portal(mut self, id: impl Into<String>) -> Self {
        self.opts.portal = Some(id.into());
        self
    }

    /// Build the Extractor with the configured options.
    ///
    /// Site files are read here; a forced portal must exist in the final registry.
    pub fn build(self) -> Result<Extractor, ExtractError> {
        let mut opts = self.opts;
        let mut registry = match opts.registry.take() {
            Some(registry) => registry,
            None if opts.skip_builtin => SiteRegistry::new(),
            None => try_load_builtin_registry()?,
        };
        for path in &opts.site_paths {
            registry.load_path(path)?;
        }
        for site in opts.sites.drain(..) {
            site.validate()?;
            registry.register(site);
        }
        if let Some(id) = &opts.portal {
            registry.lookup(id)?;
        }
        opts.registry = Some(registry);
        Ok(Extractor::new(opts))
    }
}
