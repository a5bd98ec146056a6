// ABOUTME: Main library entry point for the hirek portal article extractor.
// ABOUTME: Re-exports the public API: Extractor, ExtractorBuilder, ExtractedArticle, ExtractError, SiteRegistry.

//! hirek - structured article extraction for Hungarian news portals.
//!
//! Each portal is described by a declarative site adapter: where the article
//! roots are, which subtrees are boilerplate, which are embedded media, which
//! tags survive normalization and where the metadata fields live. One engine
//! evaluates every adapter.
//!
//! # Example
//!
//! ```no_run
//! use hirek_core::{ContentType, ExtractError, Extractor};
//!
//! fn main() -> Result<(), ExtractError> {
//!     let extractor = Extractor::builder().content_type(ContentType::Markdown).build()?;
//!     let html = std::fs::read_to_string("cikk.html").unwrap_or_default();
//!     if let Some(article) = extractor.extract_html(&html, "https://hvg.hu/itthon/20210704_cikk")? {
//!         println!("{}", article.format_markdown());
//!     }
//!     Ok(())
//! }
//! ```

pub mod attribution;
pub mod dates;
pub mod dom;
pub mod error;
pub mod extractor;
pub mod extractors;
pub mod formats;
pub mod options;
pub mod resource;
pub mod result;
pub mod sites;

pub use crate::attribution::{reconcile, Attribution, AttributionRules, Reconciler, Role};
pub use crate::dates::{format_date, parse_date, DateFormatError};
pub use crate::dom::matcher::ElementMatchSpec;
pub use crate::dom::normalize::{LinkPolicy, Sentinel, TagPolicy};
pub use crate::error::{ErrorCode, ExtractError};
pub use crate::extractor::Extractor;
pub use crate::options::{ContentType, ExtractorBuilder, Options};
pub use crate::resource::decode_html;
pub use crate::result::{ArticleMetadata, ExtractedArticle};
pub use crate::sites::loader::load_builtin_registry;
pub use crate::sites::{Blacklist, SiteAdapter, SiteRegistry};
