// ABOUTME: Metadata engine that picks a portal template and fills an ArticleMetadata record.
// ABOUTME: Every field is attempted independently; only a missing template or required block aborts.

use chrono::NaiveDateTime;
use dom_query::Document;
use tracing::{debug, warn};

use crate::attribution::{split_byline, Reconciler};
use crate::dates::{parse_date, parse_machine_date};
use crate::dom::document_scope;
use crate::dom::matcher::find_first;
use crate::extractors::fields::{extract_value, extract_values, FieldScope};
use crate::extractors::rules::{BylineRole, BylineRule, DateRule, FieldRule, MetadataTemplate};
use crate::result::ArticleMetadata;

/// Borrowed view of everything a portal needs for metadata extraction.
#[derive(Debug, Clone, Copy)]
pub struct MetadataRules<'a> {
    pub portal: &'a str,
    pub templates: &'a [MetadataTemplate],
    pub reconciler: &'a Reconciler,
}

/// Extracts the metadata record of a page.
///
/// Returns `None` when no template marker is present or a required block of
/// the chosen template is missing. Missing or malformed fields are logged and
/// left out of the record.
pub fn extract_metadata(doc: &Document, url: &str, rules: MetadataRules<'_>) -> Option<ArticleMetadata> {
    let portal = rules.portal;
    let root = document_scope(doc);

    let Some((template, marker)) = rules
        .templates
        .iter()
        .find_map(|t| find_first(&root, &t.marker).map(|m| (t, m)))
    else {
        warn!(portal, url, "article body not found or unknown article scheme");
        return None;
    };

    if let Some(missing) = template.requires.iter().find(|spec| find_first(&root, spec).is_none()) {
        warn!(
            portal,
            url,
            template = %template.name,
            block = ?missing.tags,
            "required metadata block not found"
        );
        return None;
    }

    let scope = FieldScope::new(doc).with_template(marker);
    let ctx = FieldContext { portal, url, scope: &scope };
    let mut meta = ArticleMetadata::new(url);

    meta.name = ctx.text("title", template.title.as_ref());
    meta.alternate_name = ctx.text("subtitle", template.subtitle.as_ref());
    meta.date_published = ctx.date("date_published", template.date_published.as_ref());
    meta.date_modified = ctx.date("date_modified", template.date_modified.as_ref());
    meta.article_section = ctx.text("section", template.section.as_ref());
    meta.subsection = ctx.text("subsection", template.subsection.as_ref());

    for byline in &template.bylines {
        ctx.byline(byline, rules.reconciler, &mut meta);
    }

    if let Some(rule) = &template.keywords {
        let mut tags = ctx.values("keywords", &rule.field);
        if rule.first_is_subsection && !tags.is_empty() {
            let first = tags.remove(0);
            if meta.subsection.is_none() {
                meta.subsection = Some(first);
            }
        }
        meta.add_keywords(tags);
    }

    debug!(
        portal,
        url,
        template = %template.name,
        authors = meta.author.len(),
        sources = meta.source.len(),
        keywords = meta.keywords.len(),
        "metadata extracted"
    );
    Some(meta)
}

struct FieldContext<'c, 'a> {
    portal: &'c str,
    url: &'c str,
    scope: &'c FieldScope<'a>,
}

impl FieldContext<'_, '_> {
    fn missing(&self, field: &str, optional: bool) {
        if optional {
            debug!(portal = self.portal, url = self.url, field, "optional field not found");
        } else {
            warn!(portal = self.portal, url = self.url, field, "field not found");
        }
    }

    fn text(&self, field: &str, rule: Option<&FieldRule>) -> Option<String> {
        let rule = rule?;
        let value = extract_value(self.scope, rule);
        if value.is_none() {
            self.missing(field, rule.optional);
        }
        value
    }

    fn values(&self, field: &str, rule: &FieldRule) -> Vec<String> {
        let values = extract_values(self.scope, rule);
        if values.is_empty() {
            self.missing(field, rule.optional);
        }
        values
    }

    fn date(&self, field: &str, rule: Option<&DateRule>) -> Option<NaiveDateTime> {
        let rule = rule?;
        let text = self.text(field, Some(&rule.field))?;
        let parsed = match &rule.format {
            Some(pattern) => parse_date(&text, pattern),
            None => parse_machine_date(&text),
        };
        match parsed {
            Ok(ts) => Some(ts),
            Err(err) => {
                warn!(portal = self.portal, url = self.url, field, error = %err, "date format error");
                None
            }
        }
    }

    fn byline(&self, rule: &BylineRule, reconciler: &Reconciler, meta: &mut ArticleMetadata) {
        let tokens: Vec<String> = self
            .values("author", &rule.field)
            .iter()
            .flat_map(|raw| split_byline(raw, &rule.delimiters, &rule.verbatim))
            .collect();
        match rule.role {
            BylineRole::Reconcile => meta.add_attribution(reconciler.reconcile(&tokens)),
            BylineRole::Author => meta.add_authors(tokens),
            BylineRole::Source => meta.add_sources(tokens),
        }
    }
}
