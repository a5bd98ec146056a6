// ABOUTME: ArticleMetadata and ExtractedArticle, the records handed to downstream serializers.
// ABOUTME: Includes the author/source disjointness rule, dedup helpers and a markdown summary.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::attribution::Attribution;
use crate::formats::{html_to_markdown, html_to_text, render_html};
use crate::options::ContentType;

/// Structured article metadata using schema.org property names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetadata {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_published: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsection: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl ArticleMetadata {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Adds authors that are neither recorded yet nor listed as sources.
    pub fn add_authors<I: IntoIterator<Item = String>>(&mut self, authors: I) {
        for author in authors {
            if !self.author.contains(&author) && !self.source.contains(&author) {
                self.author.push(author);
            }
        }
    }

    /// Adds sources. A value already recorded as an author moves to the sources.
    pub fn add_sources<I: IntoIterator<Item = String>>(&mut self, sources: I) {
        for source in sources {
            self.author.retain(|a| *a != source);
            if !self.source.contains(&source) {
                self.source.push(source);
            }
        }
    }

    /// Merges a reconciled byline.
    pub fn add_attribution(&mut self, attribution: Attribution) {
        self.add_sources(attribution.sources);
        self.add_authors(attribution.authors);
    }

    /// Adds keywords, skipping duplicates.
    pub fn add_keywords<I: IntoIterator<Item = String>>(&mut self, keywords: I) {
        for keyword in keywords {
            if !self.keywords.contains(&keyword) {
                self.keywords.push(keyword);
            }
        }
    }

    /// Returns true if nothing beyond the URL was found.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.alternate_name.is_none()
            && self.date_published.is_none()
            && self.date_modified.is_none()
            && self.author.is_empty()
            && self.source.is_empty()
            && self.article_section.is_none()
            && self.subsection.is_none()
            && self.keywords.is_empty()
    }

    pub fn has_author(&self) -> bool {
        !self.author.is_empty()
    }

    pub fn has_date(&self) -> bool {
        self.date_published.is_some()
    }

    /// Format the metadata as a markdown header block.
    pub fn format_markdown(&self) -> String {
        let mut parts = Vec::new();

        if let Some(ref name) = self.name {
            parts.push(format!("# {}", name));
        }
        if let Some(ref alt) = self.alternate_name {
            parts.push(format!("## {}", alt));
        }

        let mut meta = Vec::new();
        if !self.author.is_empty() {
            meta.push(self.author.join(", "));
        }
        if !self.source.is_empty() {
            meta.push(format!("Forrás: {}", self.source.join(", ")));
        }
        if let Some(date) = self.date_published {
            meta.push(date.format("%Y-%m-%d %H:%M").to_string());
        }
        if !meta.is_empty() {
            parts.push(meta.join(" | "));
        }

        let sections: Vec<&str> = [&self.article_section, &self.subsection]
            .iter()
            .filter_map(|s| s.as_deref())
            .collect();
        if !sections.is_empty() {
            parts.push(sections.join(" / "));
        }
        if !self.keywords.is_empty() {
            parts.push(format!("Címkék: {}", self.keywords.join(", ")));
        }
        if !self.url.is_empty() {
            parts.push(format!("Source: {}", self.url));
        }

        parts.join("\n\n")
    }
}

/// The outcome of extracting one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedArticle {
    /// Id of the site adapter that handled the page.
    pub portal: String,
    pub metadata: ArticleMetadata,
    /// Normalized article roots as HTML, sentinels and media marks intact.
    pub body: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
}

impl ExtractedArticle {
    /// Renders the body in the requested format, one root after another.
    pub fn content(&self, content_type: ContentType) -> String {
        let html: String = self.body.iter().map(|b| render_html(b)).collect();
        match content_type {
            ContentType::Html => html,
            ContentType::Markdown => html_to_markdown(&html),
            ContentType::Text => html_to_text(&html),
        }
    }

    /// Metadata header followed by the markdown body.
    pub fn format_markdown(&self) -> String {
        let header = self.metadata.format_markdown();
        let body = self.content(ContentType::Markdown);
        match (header.is_empty(), body.is_empty()) {
            (true, _) => body,
            (_, true) => header,
            _ => format!("{}\n\n---\n\n{}", header, body),
        }
    }

    /// Word count of the plain-text body.
    pub fn word_count(&self) -> usize {
        word_count(&self.content(ContentType::Text))
    }
}

/// Count words in a text string using whitespace splitting.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
