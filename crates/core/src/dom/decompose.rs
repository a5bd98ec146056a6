// ABOUTME: Removes boilerplate subtrees while marking media matches and their descendants.
// ABOUTME: Media protection propagates downward only; removal of unprotected ancestors still wins.

use std::collections::HashSet;

use dom_query::{NodeId, NodeRef, Selection};

use super::matcher::{match_all_under, ElementMatchSpec};
use super::{descendant_elements, mark_media};

/// Counts of what a decomposition pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecomposeReport {
    /// Outermost subtrees detached from the tree.
    pub removed: usize,
    /// Removal matches kept because they sit inside a media subtree.
    pub protected: usize,
    /// Elements newly marked as media nodes.
    pub marked: usize,
}

/// Prunes `root` in place using the removal and media rule lists.
///
/// Every element matching a media spec, and every descendant of one, is
/// marked and never deleted. Other removal matches are detached together
/// with their subtrees. The root itself is never detached.
pub fn decompose(
    root: &NodeRef,
    removal: &[ElementMatchSpec],
    media: &[ElementMatchSpec],
) -> DecomposeReport {
    let mut report = DecomposeReport::default();

    let mut media_nodes: Vec<NodeRef> = Vec::new();
    let mut media_ids: HashSet<NodeId> = HashSet::new();
    for node in match_all_under(root, media) {
        if media_ids.insert(node.id) {
            media_nodes.push(node);
        }
        for desc in descendant_elements(&node) {
            if media_ids.insert(desc.id) {
                media_nodes.push(desc);
            }
        }
    }

    let mut doomed: Vec<NodeRef> = Vec::new();
    for node in match_all_under(root, removal) {
        if media_ids.contains(&node.id) {
            report.protected += 1;
        } else {
            doomed.push(node);
        }
    }

    // matches nested in another doomed match go with their ancestor
    let doomed_ids: HashSet<NodeId> = doomed.iter().map(|n| n.id).collect();
    let mut removed_ids: HashSet<NodeId> = HashSet::new();
    for node in doomed {
        if has_ancestor_in(&node, &doomed_ids) {
            continue;
        }
        Selection::from(node).remove();
        removed_ids.insert(node.id);
        report.removed += 1;
    }

    for node in &media_nodes {
        if has_removed_ancestor(node, &removed_ids) {
            continue;
        }
        if mark_media(node) {
            report.marked += 1;
        }
    }

    report
}

/// True if the node or one of its ancestors has already been detached.
fn has_removed_ancestor(node: &NodeRef, removed: &HashSet<NodeId>) -> bool {
    if removed.is_empty() {
        return false;
    }
    removed.contains(&node.id) || has_ancestor_in(node, removed)
}

/// True if a proper ancestor of the node is in `ids`.
fn has_ancestor_in(node: &NodeRef, ids: &HashSet<NodeId>) -> bool {
    node.ancestors(None).iter().any(|a| ids.contains(&a.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_query::Document;

    use crate::dom::{tag_name, MEDIA_MARK_PREFIX};

    fn root_of(doc: &Document) -> NodeRef<'_> {
        doc.select("#root").nodes()[0]
    }

    #[test]
    fn plain_removal_without_media_rules() {
        let doc = Document::from(
            r#"<div id="root"><p>keep</p><div class="ad">ad<script>x()</script></div><script>y()</script></div>"#,
        );
        let removal = [
            ElementMatchSpec::tag("script"),
            ElementMatchSpec::tag("div").with_class("ad"),
        ];
        let report = decompose(&root_of(&doc), &removal, &[]);
        assert_eq!(report.removed, 2);
        assert_eq!(report.marked, 0);
        assert_eq!(doc.select("#root").html().to_string(), r#"<div id="root"><p>keep</p></div>"#);
    }

    #[test]
    fn media_descendants_survive_removal_rules() {
        let doc = Document::from(
            r#"<div id="root"><div class="embed-container"><iframe src="https://v.example/1"></iframe><script>embed()</script></div><script>tracker()</script></div>"#,
        );
        let removal = [ElementMatchSpec::tag("script"), ElementMatchSpec::tag("iframe")];
        let media = [ElementMatchSpec::tag("div").with_class("embed-container")];
        let report = decompose(&root_of(&doc), &removal, &media);

        assert_eq!(report.removed, 1);
        assert_eq!(report.protected, 2);
        assert_eq!(report.marked, 3);
        assert_eq!(doc.select("mdesc-iframe").length(), 1);
        assert_eq!(doc.select("mdesc-script").length(), 1);
        assert_eq!(doc.select("script").length(), 0);
    }

    #[test]
    fn removal_of_unprotected_ancestor_wins() {
        let doc = Document::from(
            r#"<div id="root"><aside class="related"><img src="a.jpg"></aside><p>text</p></div>"#,
        );
        let removal = [ElementMatchSpec::tag("aside").with_class("related")];
        let media = [ElementMatchSpec::tag("img")];
        let report = decompose(&root_of(&doc), &removal, &media);

        assert_eq!(report.removed, 1);
        assert_eq!(report.marked, 0);
        assert_eq!(doc.select("img").length(), 0);
        assert_eq!(doc.select("mdesc-img").length(), 0);
    }

    #[test]
    fn media_only_matches_are_marked() {
        let doc = Document::from(r#"<div id="root"><figure><img src="a.jpg"></figure></div>"#);
        let media = [ElementMatchSpec::tag("figure")];
        let report = decompose(&root_of(&doc), &[], &media);
        assert_eq!(report.marked, 2);
        let names: Vec<String> = doc
            .select("#root")
            .select("*")
            .nodes()
            .iter()
            .filter_map(tag_name)
            .collect();
        assert!(names.iter().all(|n| n.starts_with(MEDIA_MARK_PREFIX)));
    }

    #[test]
    fn root_is_never_removed() {
        let doc = Document::from(r#"<div id="root" class="ad"><p>x</p></div>"#);
        let removal = [ElementMatchSpec::tag("div").with_class("ad")];
        let report = decompose(&root_of(&doc), &removal, &[]);
        assert_eq!(report.removed, 0);
        assert_eq!(doc.select("#root").length(), 1);
    }

    #[test]
    fn nested_removals_count_once() {
        let doc = Document::from(
            r#"<div id="root"><div class="box"><div class="box"><p>a</p></div></div></div>"#,
        );
        let removal = [ElementMatchSpec::tag("div").with_class("box")];
        let report = decompose(&root_of(&doc), &removal, &[]);
        assert_eq!(report.removed, 1);
        assert_eq!(doc.select("#root").inner_html().to_string(), "");
    }

    #[test]
    fn second_pass_changes_nothing() {
        let doc = Document::from(
            r#"<div id="root"><div class="embed"><img src="a.jpg"></div><script></script></div>"#,
        );
        let removal = [ElementMatchSpec::tag("script")];
        let media = [ElementMatchSpec::tag("div").with_class("embed")];
        decompose(&root_of(&doc), &removal, &media);
        let once = doc.select("#root").html().to_string();
        let report = decompose(&root_of(&doc), &removal, &media);
        assert_eq!(report, DecomposeReport::default());
        assert_eq!(doc.select("#root").html().to_string(), once);
    }
}
