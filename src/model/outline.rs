//! Outline tree: the logical structure annotated with start pages.
//!
//! Nodes live in a flat arena and refer to each other by [`NodeIndex`].
//! Each child is owned by exactly one parent's child list; the `parent` field
//! is a non-owning back reference used when detaching nodes. Detached nodes
//! stay in the arena but are no longer reachable from the root.

use super::structure_type::StructureType;

/// Index of a node within an [`OutlineTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

/// Whether a node stands for a logical section or a single linked page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "snake_case"))]
pub enum NodeKind {
    /// A logical div.
    Section,
    /// A page linked directly to its parent section.
    Page,
}

/// A node of the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureNode {
    /// `ID` of the logical div, or of the physical div for page leaves.
    pub id: String,
    /// Raw `TYPE` code.
    pub type_code: String,
    /// Parsed type, `None` for codes outside the vocabulary.
    pub structure_type: Option<StructureType>,
    pub label: String,
    pub kind: NodeKind,
    /// 1-based start page; 0 marks a target without a page in the paging group.
    pub start_page: u32,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
}

impl StructureNode {
    pub fn new(id: impl Into<String>, type_code: impl Into<String>, kind: NodeKind) -> Self {
        let type_code = type_code.into();
        Self {
            id: id.into(),
            structure_type: StructureType::from_code(&type_code),
            type_code,
            label: String::new(),
            kind,
            start_page: 0,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_start_page(mut self, page: u32) -> Self {
        self.start_page = page;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the start page points at a real page.
    pub fn is_resolved(&self) -> bool {
        self.start_page >= 1
    }
}

/// Owned, nested view of an outline, as consumed by bookmark writers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct OutlineEntry {
    pub id: String,
    #[cfg_attr(feature = "cli", serde(rename = "type"))]
    pub type_code: String,
    pub kind: NodeKind,
    pub label: String,
    pub page: u32,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<OutlineEntry>,
}

/// Arena-backed outline tree with a single root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineTree {
    nodes: Vec<StructureNode>,
}

impl OutlineTree {
    /// Create a tree holding only `root`.
    pub fn new(root: StructureNode) -> Self {
        let mut root = root;
        root.parent = None;
        root.children.clear();
        Self { nodes: vec![root] }
    }

    /// The root node index (always 0).
    pub fn root(&self) -> NodeIndex {
        NodeIndex(0)
    }

    pub fn node(&self, index: NodeIndex) -> Option<&StructureNode> {
        self.nodes.get(index.0 as usize)
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> Option<&mut StructureNode> {
        self.nodes.get_mut(index.0 as usize)
    }

    /// Children of a node in insertion (document) order.
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self.node(index).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.node(index).and_then(|n| n.parent)
    }

    /// Allocate `node` and append it to `parent`'s child list.
    pub fn append(&mut self, parent: NodeIndex, node: StructureNode) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        let mut node = node;
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        if let Some(p) = self.node_mut(parent) {
            p.children.push(index);
        }
        index
    }

    /// Remove a node (and with it its subtree) from its parent's child list.
    ///
    /// Returns false for the root and for nodes already detached.
    pub fn detach(&mut self, index: NodeIndex) -> bool {
        let Some(parent) = self.parent(index) else {
            return false;
        };
        let Some(p) = self.node_mut(parent) else {
            return false;
        };
        let Some(pos) = p.children.iter().position(|&c| c == index) else {
            return false;
        };
        p.children.remove(pos);
        if let Some(node) = self.node_mut(index) {
            node.parent = None;
        }
        true
    }

    /// Distance from the root (root = 0).
    pub fn depth(&self, index: NodeIndex) -> usize {
        let mut depth = 0;
        let mut current = self.parent(index);
        while let Some(p) = current {
            depth += 1;
            current = self.parent(p);
        }
        depth
    }

    /// Reachable nodes in depth-first pre-order, with their depth.
    pub fn walk(&self) -> Vec<(NodeIndex, usize)> {
        let mut out = Vec::new();
        let mut stack = vec![(self.root(), 0)];
        while let Some((index, depth)) = stack.pop() {
            out.push((index, depth));
            for &child in self.children(index).iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }

    /// Reachable nodes without children, in pre-order.
    pub fn leaves(&self) -> Vec<NodeIndex> {
        self.walk()
            .into_iter()
            .map(|(index, _)| index)
            .filter(|&index| self.children(index).is_empty())
            .collect()
    }

    /// Number of leaves in the subtree rooted at `index` (1 for a leaf).
    pub fn leaf_count(&self, index: NodeIndex) -> usize {
        let children = self.children(index);
        if children.is_empty() {
            1
        } else {
            children.iter().map(|&c| self.leaf_count(c)).sum()
        }
    }

    /// Number of reachable nodes.
    pub fn node_count(&self) -> usize {
        self.walk().len()
    }

    /// Nested owned copy of the reachable tree.
    pub fn to_entries(&self) -> OutlineEntry {
        self.entry(self.root())
    }

    fn entry(&self, index: NodeIndex) -> OutlineEntry {
        let node = &self.nodes[index.0 as usize];
        OutlineEntry {
            id: node.id.clone(),
            type_code: node.type_code.clone(),
            kind: node.kind,
            label: node.label.clone(),
            page: node.start_page,
            children: node.children.iter().map(|&c| self.entry(c)).collect(),
        }
    }

    /// Copy of the reachable tree with detached nodes dropped from the arena.
    ///
    /// Indices are renumbered in pre-order.
    pub fn compact(&self) -> OutlineTree {
        let mut out = OutlineTree::new(self.nodes[0].clone());
        self.copy_children(self.root(), &mut out, NodeIndex(0));
        out
    }

    fn copy_children(&self, from: NodeIndex, out: &mut OutlineTree, to: NodeIndex) {
        for &child in self.children(from) {
            let copied = out.append(to, self.nodes[child.0 as usize].clone());
            self.copy_children(child, out, copied);
        }
    }
}
