//! Core tree types
//!
//! The tree is an arena: nodes live in one `Vec` and refer to each other by
//! [`NodeId`]. Parent links are plain ids; children are ordered id lists.
//! A node's descendants sit in exactly one of `children` (expanded) or
//! `collapsed_children` (collapsed).

use std::fmt;

use crate::rows::RowAttributes;

use super::text_fit::NodeMetrics;

/// Index of a node in its [`Tree`] arena. Stable for the tree's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a node's identity comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceId {
    /// Synthesized to unify several top-level nodes; not present in the data
    Synthetic,
    /// Child-id value from the source row
    Row(String),
}

impl SourceId {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SourceId::Synthetic => None,
            SourceId::Row(id) => Some(id),
        }
    }
}

// =============================================================================
// TREE NODE
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub id: NodeId,
    pub source_id: SourceId,
    pub name: String,
    /// Rich html of the name cell, if the host supplied one
    pub html: Option<String>,
    pub linkable: bool,
    pub depth: usize,
    /// Direct children attached during build
    pub child_count: usize,
    pub value_lines: Vec<String>,
    /// Whether this node and its subtree render to the right of the parent
    pub right: bool,
    pub attributes: RowAttributes,

    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub collapsed_children: Vec<NodeId>,

    // Layout fields, rewritten on every pass. `x` runs across siblings,
    // `y` along the depth axis.
    pub x: f32,
    pub y: f32,
    pub x0: f32,
    pub y0: f32,
    /// Cached text fit + badge measurements
    pub metrics: Option<NodeMetrics>,
}

impl TreeNode {
    pub fn new(id: NodeId, source_id: SourceId) -> Self {
        Self {
            id,
            source_id,
            name: String::new(),
            html: None,
            linkable: false,
            depth: 0,
            child_count: 0,
            value_lines: Vec::new(),
            right: true,
            attributes: RowAttributes::default(),
            parent: None,
            children: Vec::new(),
            collapsed_children: Vec::new(),
            x: 0.0,
            y: 0.0,
            x0: 0.0,
            y0: 0.0,
            metrics: None,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source_id == SourceId::Synthetic
    }

    pub fn is_load_more(&self) -> bool {
        self.attributes.is_load_more()
    }

    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Has descendants, visible or not
    pub fn has_descendants(&self) -> bool {
        !self.children.is_empty() || !self.collapsed_children.is_empty()
    }

    /// Only data nodes can be clicked
    pub fn is_interactive(&self) -> bool {
        !self.is_synthetic()
    }

    /// Top-level nodes that are not oriented right are drawn fully transparent.
    /// This hides the synthetic root while keeping its links' anchor.
    pub fn is_hidden(&self) -> bool {
        self.depth == 0 && !self.right
    }
}

// =============================================================================
// TREE
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(nodes: Vec<TreeNode>, root: Option<NodeId>) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut TreeNode> {
        self.nodes.iter_mut()
    }

    /// Look up a node by its source child id
    pub fn find_by_source(&self, source_id: &str) -> Option<&TreeNode> {
        self.nodes
            .iter()
            .find(|n| n.source_id.as_str() == Some(source_id))
    }

    /// Pre-order walk over nodes reachable through `children` only
    pub fn visible(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(root) = self.root else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.get(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Swap `children` and `collapsed_children`. Returns false for unknown ids.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                std::mem::swap(&mut node.children, &mut node.collapsed_children);
                true
            }
            None => false,
        }
    }

    /// Collapse a node and everything below it
    pub fn collapse_all(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get_mut(id) else {
                continue;
            };
            if !node.children.is_empty() {
                node.collapsed_children = std::mem::take(&mut node.children);
            }
            stack.extend(node.collapsed_children.iter().copied());
        }
    }

    /// Initial view: the root stays open, each of its children is collapsed
    pub fn collapse_below_root(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        let children = self.get(root).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.collapse_all(child);
        }
    }

    /// Commit current positions as the anchor for the next pass
    pub fn stash_positions(&mut self) {
        for node in &mut self.nodes {
            node.x0 = node.x;
            node.y0 = node.y;
        }
    }
}
