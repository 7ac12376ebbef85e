//! Tree builder - flat parent/child rows to an arena tree
//!
//! Two passes over the rows: the first creates one node per distinct child
//! id (a repeated child id replaces the earlier row), the second attaches
//! each winning row's node under its parent. Rows whose parent id matches
//! no node become roots; several roots are gathered under a synthetic root.
//! Nodes caught in a parent cycle are unreachable from every root and are
//! dropped from the tree.

use std::collections::{HashMap, VecDeque};

use crate::error::HierarchyError;
use crate::rows::{Cell, Row, RowSchema};

use super::types::{NodeId, SourceId, Tree, TreeNode};

/// Diagnostics gathered while building
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Child ids that appeared on more than one row (later rows won)
    pub duplicate_ids: Vec<String>,
    /// Child ids whose row named themselves as parent
    pub self_references: Vec<String>,
    /// Top-level nodes found in the data
    pub roots: usize,
    /// Whether a synthetic root was added above them
    pub synthetic_root: bool,
    /// Child ids dropped because no root reaches them (parent cycles)
    pub unreachable: Vec<String>,
}

pub struct TreeBuilder<'a> {
    schema: &'a RowSchema,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(schema: &'a RowSchema) -> Self {
        Self { schema }
    }

    pub fn build(&self, rows: &[Row]) -> Result<(Tree, BuildReport), HierarchyError> {
        let mut report = BuildReport::default();

        // Pass 1: one node per child id, last row wins
        let mut keys: Vec<(String, Option<String>)> = Vec::with_capacity(rows.len());
        let mut winners: HashMap<String, usize> = HashMap::new();
        let mut order: Vec<String> = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            let parent = self.required(row, i, &self.schema.parent)?.value.key();
            let child = self
                .required(row, i, &self.schema.child)?
                .value
                .key()
                .ok_or(HierarchyError::MissingChildId { row: i })?;

            if winners.insert(child.clone(), i).is_some() {
                tracing::warn!(child_id = %child, row = i, "duplicate child id; later row wins");
                report.duplicate_ids.push(child.clone());
            } else {
                order.push(child.clone());
            }
            keys.push((child, parent));
        }

        let index: HashMap<&str, NodeId> = order
            .iter()
            .enumerate()
            .map(|(i, key)| (key.as_str(), NodeId(i)))
            .collect();

        let mut nodes: Vec<TreeNode> = order
            .iter()
            .enumerate()
            .map(|(i, key)| self.node_from_row(NodeId(i), key, &rows[winners[key]]))
            .collect();

        // Pass 2: attach in row order
        for (i, (child_key, parent_key)) in keys.iter().enumerate() {
            if winners[child_key] != i {
                continue;
            }
            let Some(parent_key) = parent_key else {
                continue;
            };
            if parent_key == child_key {
                tracing::warn!(child_id = %child_key, "row names itself as parent; treated as root");
                report.self_references.push(child_key.clone());
                continue;
            }
            let (Some(&parent), Some(&child)) =
                (index.get(parent_key.as_str()), index.get(child_key.as_str()))
            else {
                continue;
            };
            nodes[child.0].parent = Some(parent);
            let parent_node = &mut nodes[parent.0];
            parent_node.child_count += 1;
            parent_node.children.push(child);
        }

        let roots: Vec<NodeId> = nodes
            .iter()
            .filter(|n| n.parent.is_none())
            .map(|n| n.id)
            .collect();
        report.roots = roots.len();

        let root = match roots.as_slice() {
            [] => None,
            [single] => Some(*single),
            _ => {
                let synthetic = NodeId(nodes.len());
                let mut node = TreeNode::new(synthetic, SourceId::Synthetic);
                node.right = false;
                node.child_count = roots.len();
                node.children = roots.clone();
                for &r in &roots {
                    nodes[r.0].parent = Some(synthetic);
                }
                nodes.push(node);
                report.synthetic_root = true;
                Some(synthetic)
            }
        };

        let reached = match root {
            Some(root) => Self::assign_depths(&mut nodes, root),
            None => 0,
        };
        let mut root = root;
        if reached < nodes.len() {
            report.unreachable = nodes
                .iter()
                .filter(|n| root.is_none() || n.depth == usize::MAX)
                .filter_map(|n| n.source_id.as_str().map(str::to_string))
                .collect();
            tracing::warn!(
                count = report.unreachable.len(),
                ids = ?report.unreachable,
                "nodes unreachable from any root; dropped"
            );
            match root {
                Some(r) => {
                    let (kept, new_root) = Self::retain_reachable(nodes, r);
                    nodes = kept;
                    root = Some(new_root);
                }
                None => nodes.clear(),
            }
        }

        tracing::debug!(
            nodes = nodes.len(),
            roots = report.roots,
            duplicates = report.duplicate_ids.len(),
            "hierarchy built"
        );

        Ok((Tree::from_parts(nodes, root), report))
    }

    fn required<'r>(
        &self,
        row: &'r Row,
        index: usize,
        dimension: &str,
    ) -> Result<&'r Cell, HierarchyError> {
        row.get(dimension).ok_or_else(|| HierarchyError::MissingCell {
            row: index,
            dimension: dimension.to_string(),
        })
    }

    fn node_from_row(&self, id: NodeId, key: &str, row: &Row) -> TreeNode {
        let mut node = TreeNode::new(id, SourceId::Row(key.to_string()));
        match self.schema.name.as_deref().and_then(|dim| row.get(dim)) {
            Some(cell) => {
                node.name = cell.value.to_string();
                node.html = cell.html.clone();
                node.linkable = cell.html.is_some() && cell.linkable.unwrap_or(true);
            }
            None if self.schema.name.is_none() => node.name = key.to_string(),
            None => {}
        }
        node.value_lines = self
            .schema
            .values
            .iter()
            .map(|dim| row.get(dim).map(|c| c.value.to_string()).unwrap_or_default())
            .collect();
        node.attributes = row.attributes.clone();
        node
    }

    /// Breadth-first depth assignment from the root. Unreached nodes keep
    /// `usize::MAX`. Returns the number of nodes reached.
    fn assign_depths(nodes: &mut [TreeNode], root: NodeId) -> usize {
        for node in nodes.iter_mut() {
            node.depth = usize::MAX;
        }
        let mut queue = VecDeque::from([(root, 0usize)]);
        let mut reached = 0;
        while let Some((id, depth)) = queue.pop_front() {
            let node = &mut nodes[id.0];
            node.depth = depth;
            reached += 1;
            for &child in &node.children {
                queue.push_back((child, depth + 1));
            }
        }
        reached
    }

    /// Drop nodes that depth assignment did not reach and renumber the
    /// rest. Reached nodes only ever point at reached nodes.
    fn retain_reachable(nodes: Vec<TreeNode>, root: NodeId) -> (Vec<TreeNode>, NodeId) {
        let mut remap: Vec<Option<NodeId>> = vec![None; nodes.len()];
        let mut next = 0;
        for node in &nodes {
            if node.depth != usize::MAX {
                remap[node.id.0] = Some(NodeId(next));
                next += 1;
            }
        }
        let new_root = remap[root.0].unwrap_or(NodeId(0));
        let kept = nodes
            .into_iter()
            .filter_map(|mut node| {
                node.id = remap[node.id.0]?;
                node.parent = node.parent.and_then(|p| remap[p.0]);
                node.children = node.children.iter().filter_map(|c| remap[c.0]).collect();
                Some(node)
            })
            .collect();
        (kept, new_root)
    }
}

/// Build a tree from rows with the given schema
pub fn build_tree(rows: &[Row], schema: &RowSchema) -> Result<(Tree, BuildReport), HierarchyError> {
    TreeBuilder::new(schema).build(rows)
}
