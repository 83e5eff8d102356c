//! Outline cleanup: unresolved subtrees and duplicate page links.
//!
//! Some producers link a page both to the fine-grained section it belongs to
//! and to a coarse ancestor. Leaves are fingerprinted by start page and leaf
//! count; within a colliding group only the deepest members survive.

use std::collections::BTreeMap;

use crate::model::{NodeIndex, OutlineTree};

/// Number of nodes removed by [`clean`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct CleanReport {
    /// Nodes in subtrees whose start page did not resolve.
    pub invalid: usize,
    /// Shallower duplicates of a deeper leaf.
    pub duplicates: usize,
}

impl CleanReport {
    pub fn dropped(&self) -> usize {
        self.invalid + self.duplicates
    }
}

/// Remove unresolved subtrees, then duplicate leaves until none remain.
///
/// Cleaning an already clean tree removes nothing.
pub fn clean(mut tree: OutlineTree) -> (OutlineTree, CleanReport) {
    let root = tree.root();
    if let Some(node) = tree.node_mut(root)
        && !node.is_resolved()
    {
        tracing::warn!(logical_id = node.id.as_str(), "outline root has no page, using page 1");
        node.start_page = 1;
    }

    let mut report = CleanReport {
        invalid: prune_invalid(&mut tree, root),
        duplicates: 0,
    };

    // Dropping a leaf can turn its parent into a colliding leaf.
    loop {
        let dropped = drop_duplicates(&mut tree);
        if dropped == 0 {
            break;
        }
        report.duplicates += dropped;
    }

    if report.dropped() > 0 {
        tracing::debug!(
            invalid = report.invalid,
            duplicates = report.duplicates,
            "cleaned outline"
        );
    }
    (tree.compact(), report)
}

/// Detach children without a resolved page, recursively. Returns the number
/// of nodes removed.
fn prune_invalid(tree: &mut OutlineTree, index: NodeIndex) -> usize {
    let mut removed = 0;
    for child in tree.children(index).to_vec() {
        let resolved = tree.node(child).is_some_and(|n| n.is_resolved());
        if resolved {
            removed += prune_invalid(tree, child);
            continue;
        }
        let size = subtree_size(tree, child);
        if tree.detach(child) {
            if let Some(node) = tree.node(child) {
                tracing::warn!(
                    logical_id = node.id.as_str(),
                    nodes = size,
                    "dropping outline entry without a resolved page"
                );
            }
            removed += size;
        }
    }
    removed
}

fn subtree_size(tree: &OutlineTree, index: NodeIndex) -> usize {
    1 + tree
        .children(index)
        .iter()
        .map(|&child| subtree_size(tree, child))
        .sum::<usize>()
}

/// One deduplication round. Returns the number of leaves detached.
fn drop_duplicates(tree: &mut OutlineTree) -> usize {
    let root = tree.root();
    let mut groups: BTreeMap<(u32, usize), Vec<(NodeIndex, usize)>> = BTreeMap::new();
    for (index, depth) in tree.walk() {
        if index == root || !tree.children(index).is_empty() {
            continue;
        }
        let Some(node) = tree.node(index) else {
            continue;
        };
        groups
            .entry((node.start_page, tree.leaf_count(index)))
            .or_default()
            .push((index, depth));
    }

    let mut dropped = 0;
    for ((page, _), members) in groups {
        if members.len() < 2 {
            continue;
        }
        let deepest = members.iter().map(|&(_, depth)| depth).max().unwrap_or(0);
        for (index, depth) in members {
            if depth < deepest && tree.detach(index) {
                tracing::debug!(page, depth, deepest, "dropping duplicate page link");
                dropped += 1;
            }
        }
    }
    dropped
}
