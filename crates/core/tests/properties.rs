// ABOUTME: Scenario tests for the cleanup, attribution and date guarantees across modules.
// ABOUTME: Exercises decompose, normalize, reconcile and the date parser through the public API.

use std::collections::{BTreeSet, HashSet};

use dom_query::Document;
use hirek_core::dom::decompose::decompose;
use hirek_core::dom::matcher::locate_roots;
use hirek_core::dom::normalize::normalize;
use hirek_core::dom::{document_scope, is_media_marked, tag_name};
use hirek_core::{format_date, parse_date, reconcile, ElementMatchSpec, Sentinel, TagPolicy};
use pretty_assertions::assert_eq;

const PAGE: &str = r#"
<div id="root">
  <p>Bevezető</p>
  <div class="ad">Hirdetés <span>kattints</span></div>
  <figure class="media">
    <div class="ad"><img src="banner.jpg"></div>
    <figcaption>Kép</figcaption>
  </figure>
  <div class="box"><div class="ad">még egy</div><iframe src="https://video.example/1"></iframe></div>
  <script>track()</script>
</div>"#;

fn root_of(doc: &Document) -> dom_query::NodeRef<'_> {
    doc.select("#root").nodes()[0]
}

fn removal() -> Vec<ElementMatchSpec> {
    vec![
        ElementMatchSpec::tag("div").with_class("ad"),
        ElementMatchSpec::tag("script"),
        ElementMatchSpec::tag("div").with_class("box"),
    ]
}

#[test]
fn media_matches_and_their_descendants_survive_decompose() {
    let doc = Document::from(PAGE);
    let root = root_of(&doc);
    let media = vec![ElementMatchSpec::tag("figure"), ElementMatchSpec::tag("iframe")];

    let report = decompose(&root, &removal(), &media);

    let html = doc.select("#root").html().to_string();
    assert!(html.contains(r#"<mdesc-img src="banner.jpg">"#), "got: {html}");
    assert!(html.contains("<mdesc-figcaption>Kép</mdesc-figcaption>"));
    assert!(!html.contains("Hirdetés"));
    assert!(!html.contains("track()"));
    // a media match inside a removed ancestor goes with it
    assert!(!html.contains("video.example"));
    assert!(report.protected >= 1);

    let marked: Vec<String> = doc
        .select("#root *")
        .nodes()
        .iter()
        .filter_map(tag_name)
        .filter(|name| is_media_marked(name))
        .collect();
    assert_eq!(
        marked,
        vec!["mdesc-figure", "mdesc-div", "mdesc-img", "mdesc-figcaption"]
    );
}

#[test]
fn empty_media_specs_delete_every_removal_match() {
    let doc = Document::from(PAGE);
    let root = root_of(&doc);
    decompose(&root, &removal(), &[]);

    let html = doc.select("#root").html().to_string();
    assert!(!html.contains("class=\"ad\""));
    assert!(!html.contains("banner.jpg"));
    assert!(!html.contains("<script"));
    assert!(html.contains("<figcaption>Kép</figcaption>"));
}

#[test]
fn normalize_is_idempotent() {
    let doc = Document::from(PAGE);
    let root = root_of(&doc);
    decompose(&root, &removal(), &[ElementMatchSpec::tag("figure")]);
    let policy = TagPolicy::new(["p", "figure", "a", "iframe"], Sentinel::Else);

    normalize(&root, &policy);
    let once = doc.select("body").inner_html().to_string();
    let second = normalize(&root, &policy);
    let twice = doc.select("body").inner_html().to_string();

    assert_eq!(once, twice);
    assert_eq!(second.renamed, 0);
    assert_eq!(second.attributes_removed, 0);
}

#[test]
fn root_fallback_returns_first_matching_spec() {
    let doc = Document::from(r#"<body><article class="article"><p>x</p></article></body>"#);
    let specs = vec![
        ElementMatchSpec::tag("div").with_class("articleContent"),
        ElementMatchSpec::tag("article").with_class("article"),
    ];
    let roots = locate_roots(&document_scope(&doc), &specs);
    assert_eq!(roots.len(), 1);
    assert_eq!(tag_name(&roots[0]).as_deref(), Some("article"));
}

#[test]
fn reconcile_partitions_distinct_tokens() {
    let known: BTreeSet<String> = ["MTI", "Reuters"].iter().map(|s| s.to_string()).collect();
    let tokens = ["MTI", "Kovács János", "  Kovács   János ", "Reuters", "Szabó Éva", "MTI", ""];
    let out = reconcile(tokens, &known);

    let authors: HashSet<&String> = out.authors.iter().collect();
    let sources: HashSet<&String> = out.sources.iter().collect();
    assert!(authors.is_disjoint(&sources));

    let union: BTreeSet<String> = out.authors.iter().chain(&out.sources).cloned().collect();
    let expected: BTreeSet<String> = ["MTI", "Kovács János", "Reuters", "Szabó Éva"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(union, expected);
    assert_eq!(out.authors.len() + out.sources.len(), expected.len());
}

#[test]
fn byline_with_known_source() {
    let known: BTreeSet<String> = ["MTI".to_string()].into_iter().collect();
    let out = reconcile(["MTI", "Kovács János"], &known);
    assert_eq!(out.authors, vec!["Kovács János".to_string()]);
    assert_eq!(out.sources, vec!["MTI".to_string()]);
}

#[test]
fn hungarian_date_round_trip() {
    let pattern = "%Y. %B %d. %H:%M";
    let ts = parse_date("2021. július 4. 14:30", pattern).unwrap();
    assert_eq!(format_date(&ts, pattern), "2021. július 04. 14:30");
    assert_eq!(parse_date(&format_date(&ts, pattern), pattern).unwrap(), ts);
}
