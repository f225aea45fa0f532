// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Queries over parsed trees: path resolution and content matching.

use smallvec::SmallVec;

use super::node::{DomTree, NodeIndex, NodePath};

/// Resolves an element path (element-child ordinals from the root) to a node
/// index in `tree`. Returns `None` when the path walks off the tree.
pub fn resolve_path(tree: &DomTree, path: &NodePath) -> Option<NodeIndex> {
    let mut current: Option<NodeIndex> = None;
    for &ordinal in path.iter() {
        let children = tree.element_children(current);
        current = Some(*children.get(ordinal as usize)?);
    }
    current
}

/// Computes the element path of `index`; the inverse of [`resolve_path`].
pub fn path_of(tree: &DomTree, index: NodeIndex) -> Option<NodePath> {
    tree.node(index)?.is_element().then_some(())?;

    let mut reversed: SmallVec<[u32; 8]> = SmallVec::new();
    let mut current = index;
    loop {
        let parent = tree.node(current)?.parent();
        let siblings = tree.element_children(parent);
        let ordinal = siblings.iter().position(|&sibling| sibling == current)?;
        reversed.push(ordinal as u32);
        match parent {
            Some(parent_index) => current = parent_index,
            None => break,
        }
    }
    reversed.reverse();
    Some(reversed)
}

/// All elements with the given tag whose inner source content equals
/// `content` byte-for-byte, in document order.
pub fn find_by_tag_and_content(
    tree: &DomTree,
    source: &str,
    tag: &str,
    content: &str,
) -> Vec<NodeIndex> {
    tree.elements()
        .into_iter()
        .filter(|&index| {
            let Some(node) = tree.node(index) else {
                return false;
            };
            node.tag() == Some(tag)
                && node
                    .content_span()
                    .is_some_and(|span| span.slice(source) == content)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::{find_by_tag_and_content, path_of, resolve_path};
    use crate::dom::parse_document;
    use crate::dom::NodePath;

    const SOURCE: &str = "\
<html><body>\
<h1>Title</h1>\
<p>Hello</p>\
<div><p>Hello</p><p>Other</p></div>\
</body></html>";

    #[test]
    fn path_round_trips_through_resolution() {
        let tree = parse_document(SOURCE);
        for index in tree.elements() {
            let path = path_of(&tree, index).expect("path");
            assert_eq!(resolve_path(&tree, &path), Some(index));
        }
    }

    #[test]
    fn resolve_rejects_out_of_range_ordinals() {
        let tree = parse_document(SOURCE);
        let missing: NodePath = smallvec![0, 0, 9];
        assert_eq!(resolve_path(&tree, &missing), None);
    }

    #[test]
    fn content_match_is_in_document_order() {
        let tree = parse_document(SOURCE);
        let matches = find_by_tag_and_content(&tree, SOURCE, "p", "Hello");
        assert_eq!(matches.len(), 2);
        let first = tree.node(matches[0]).expect("node").span().start;
        let second = tree.node(matches[1]).expect("node").span().start;
        assert!(first < second, "matches must be in document order");
    }

    #[test]
    fn content_match_requires_exact_bytes() {
        let tree = parse_document(SOURCE);
        assert!(find_by_tag_and_content(&tree, SOURCE, "p", "hello").is_empty());
        assert!(find_by_tag_and_content(&tree, SOURCE, "span", "Hello").is_empty());
    }
}
