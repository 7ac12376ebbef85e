//! Layout - tidy tree positioning
//!
//! Nodes are placed with the Buchheim/Walker linear-time tidy tree algorithm
//! (the same variant d3's `tree()` uses): siblings are one `breadth_step`
//! apart, cousins two, and subtrees are packed as tightly as their contours
//! allow. The depth-axis coordinate is always `depth * depth_step`.
//!
//! Coordinates follow the tree's own axes: `x` runs across siblings and `y`
//! along the depth axis. The renderer maps `y` to screen x.

use egui::{Pos2, Rect, Vec2};

use crate::config::HierarchySettings;

use super::types::{NodeId, Tree};

// =============================================================================
// LAYOUT CONTEXT
// =============================================================================

/// Box and text geometry shared by fitting, layout and link generation for
/// one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutContext {
    pub text_size: f32,
    pub value_text_size: f32,
    pub count_text_size: f32,
    pub leading: f32,
    pub max_label_lines: usize,
    pub node_width: f32,
    pub radius: f32,
    pub count_border: f32,
    pub selection_stroke: f32,
    pub spacing_depth: f32,
    pub spacing_breadth: f32,
    /// Text lines every node box is sized for
    pub line_count: usize,
}

/// Space kept around the outermost node centers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl LayoutContext {
    pub fn new(settings: &HierarchySettings, line_count: usize) -> Self {
        Self {
            text_size: settings.text.size,
            value_text_size: settings.text.value_size,
            count_text_size: settings.text.count_size,
            leading: settings.text.leading,
            max_label_lines: settings.text.max_label_lines,
            node_width: settings.node.width,
            radius: settings.node.radius,
            count_border: settings.node.count_border,
            selection_stroke: settings.node.selection_stroke,
            spacing_depth: settings.spacing.depth,
            spacing_breadth: settings.spacing.breadth,
            line_count: line_count.max(1),
        }
    }

    pub fn with_line_count(mut self, line_count: usize) -> Self {
        self.line_count = line_count.max(1);
        self
    }

    /// Cross-axis size of a node box
    pub fn node_height(&self) -> f32 {
        let lines = self.line_count as f32;
        self.text_size * lines + self.leading * (lines + 1.0)
    }

    /// Distance between sibling centers
    pub fn breadth_step(&self) -> f32 {
        self.node_height() + self.spacing_breadth
    }

    /// Distance between depth levels
    pub fn depth_step(&self) -> f32 {
        self.node_width + self.spacing_depth
    }

    pub fn margin(&self) -> Margin {
        let vertical = self.spacing_breadth + self.node_height() / 2.0;
        let horizontal = self.spacing_depth + self.node_width / 2.0;
        Margin {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// Node box in screen orientation, centered on the origin
    pub fn node_rect(&self) -> Rect {
        Rect::from_center_size(Pos2::ZERO, Vec2::new(self.node_width, self.node_height()))
    }

    /// Node box inset for the selection overlay
    pub fn selection_rect(&self) -> Rect {
        self.node_rect().shrink(self.selection_stroke * 0.8 / 2.0)
    }

    pub fn count_left(&self) -> f32 {
        -self.node_width / 2.0 + self.count_border
    }

    pub fn count_right(&self) -> f32 {
        self.node_width / 2.0 - self.count_border
    }

    pub fn count_top(&self) -> f32 {
        -self.radius + self.count_border
    }

    pub fn count_height(&self) -> f32 {
        self.radius * 2.0 - self.count_border * 2.0
    }

    /// Smallest measured count width a badge pill is sized for
    pub fn min_count_length(&self) -> f32 {
        self.count_height() - self.count_border * 2.0
    }

    /// Horizontal extent of the text column, given the measured badge
    /// lengths on either side.
    pub fn text_column(&self, left_badge: Option<f32>, right_badge: Option<f32>) -> (f32, f32) {
        let left = -self.node_width / 2.0
            + left_badge.map_or(self.radius, |len| len + self.count_border * 4.0);
        let right = match right_badge {
            Some(len) => self.count_right() - (len + self.count_border * 2.0) - self.count_border,
            None => self.node_width / 2.0 - self.radius,
        };
        (left, right)
    }
}

// =============================================================================
// BOUNDS
// =============================================================================

/// Extremes of node centers over the visible tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl LayoutBounds {
    fn point(x: f32, y: f32) -> Self {
        Self {
            min_x: x,
            max_x: x,
            min_y: y,
            max_y: y,
        }
    }

    fn include(&mut self, x: f32, y: f32) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    /// Visible nodes in pre-order
    pub visible: Vec<NodeId>,
    pub bounds: LayoutBounds,
}

// =============================================================================
// TIDY TREE
// =============================================================================

/// Per-node working state of the tidy tree walk
#[derive(Debug, Clone)]
struct Walker {
    node: Option<NodeId>,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Position among siblings
    number: usize,
    prelim: f32,
    modifier: f32,
    change: f32,
    shift: f32,
    thread: Option<usize>,
    ancestor: usize,
    default_ancestor: Option<usize>,
}

impl Walker {
    fn new(index: usize, node: Option<NodeId>, parent: Option<usize>, number: usize) -> Self {
        Self {
            node,
            parent,
            children: Vec::new(),
            number,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            ancestor: index,
            default_ancestor: None,
        }
    }
}

pub struct TidyTree {
    breadth_step: f32,
    depth_step: f32,
}

impl TidyTree {
    pub fn new(ctx: &LayoutContext) -> Self {
        Self {
            breadth_step: ctx.breadth_step(),
            depth_step: ctx.depth_step(),
        }
    }

    pub fn with_steps(breadth_step: f32, depth_step: f32) -> Self {
        Self {
            breadth_step,
            depth_step,
        }
    }

    /// Position every visible node of `tree`. Collapsed subtrees are skipped
    /// and keep their previous coordinates.
    pub fn layout(&self, tree: &mut Tree) -> Option<LayoutResult> {
        let root = tree.root()?;

        // Index 0 is a virtual parent above the root
        let mut walkers = vec![Walker::new(0, None, None, 0), Walker::new(1, Some(root), Some(0), 0)];
        walkers[0].children.push(1);
        let mut stack = vec![1usize];
        while let Some(w) = stack.pop() {
            let Some(node) = walkers[w].node.and_then(|id| tree.get(id)) else {
                continue;
            };
            for (number, &child) in node.children.iter().enumerate() {
                let index = walkers.len();
                walkers.push(Walker::new(index, Some(child), Some(w), number));
                walkers[w].children.push(index);
                stack.push(index);
            }
        }

        let pre_order = Self::pre_order(&walkers);
        let mut post_order = Self::right_first_pre_order(&walkers);
        post_order.reverse();

        for &v in &post_order {
            self.first_walk(v, &mut walkers);
        }
        walkers[0].modifier = -walkers[1].prelim;

        let mut final_x = vec![0.0f32; walkers.len()];
        for &v in &pre_order {
            let Some(parent) = walkers[v].parent else {
                continue;
            };
            let parent_mod = walkers[parent].modifier;
            final_x[v] = walkers[v].prelim + parent_mod;
            walkers[v].modifier += parent_mod;
        }

        let mut visible = Vec::with_capacity(pre_order.len());
        let mut bounds: Option<LayoutBounds> = None;
        for &v in &pre_order {
            let Some(id) = walkers[v].node else {
                continue;
            };
            let Some(node) = tree.get_mut(id) else {
                continue;
            };
            node.x = final_x[v] * self.breadth_step;
            node.y = node.depth as f32 * self.depth_step;
            match bounds.as_mut() {
                Some(b) => b.include(node.x, node.y),
                None => bounds = Some(LayoutBounds::point(node.x, node.y)),
            }
            visible.push(id);
        }

        tracing::debug!(visible = visible.len(), "layout pass");
        bounds.map(|bounds| LayoutResult { visible, bounds })
    }

    /// Pre-order from the root, left to right
    fn pre_order(walkers: &[Walker]) -> Vec<usize> {
        let mut out = Vec::with_capacity(walkers.len());
        let mut stack = vec![1usize];
        while let Some(v) = stack.pop() {
            out.push(v);
            stack.extend(walkers[v].children.iter().rev().copied());
        }
        out
    }

    /// Root, then children right to left; reversed it is a left-to-right
    /// post-order.
    fn right_first_pre_order(walkers: &[Walker]) -> Vec<usize> {
        let mut out = Vec::with_capacity(walkers.len());
        let mut stack = vec![1usize];
        while let Some(v) = stack.pop() {
            out.push(v);
            stack.extend(walkers[v].children.iter().copied());
        }
        out
    }

    /// Siblings sit one unit apart, cousins two
    fn separation(walkers: &[Walker], a: usize, b: usize) -> f32 {
        if walkers[a].parent == walkers[b].parent {
            1.0
        } else {
            2.0
        }
    }

    fn next_left(walkers: &[Walker], v: usize) -> Option<usize> {
        walkers[v].children.first().copied().or(walkers[v].thread)
    }

    fn next_right(walkers: &[Walker], v: usize) -> Option<usize> {
        walkers[v].children.last().copied().or(walkers[v].thread)
    }

    fn first_walk(&self, v: usize, walkers: &mut [Walker]) {
        let Some(parent) = walkers[v].parent else {
            return;
        };
        let number = walkers[v].number;
        let left_sibling = (number > 0).then(|| walkers[parent].children[number - 1]);

        if let (Some(&first), Some(&last)) =
            (walkers[v].children.first(), walkers[v].children.last())
        {
            Self::execute_shifts(v, walkers);
            let midpoint = (walkers[first].prelim + walkers[last].prelim) / 2.0;
            match left_sibling {
                Some(w) => {
                    walkers[v].prelim = walkers[w].prelim + Self::separation(walkers, v, w);
                    walkers[v].modifier = walkers[v].prelim - midpoint;
                }
                None => walkers[v].prelim = midpoint,
            }
        } else if let Some(w) = left_sibling {
            walkers[v].prelim = walkers[w].prelim + Self::separation(walkers, v, w);
        }

        let default = walkers[parent]
            .default_ancestor
            .unwrap_or(walkers[parent].children[0]);
        walkers[parent].default_ancestor = Some(Self::apportion(v, left_sibling, default, walkers));
    }

    fn apportion(
        v: usize,
        left_sibling: Option<usize>,
        mut ancestor: usize,
        walkers: &mut [Walker],
    ) -> usize {
        let Some(w) = left_sibling else {
            return ancestor;
        };
        let Some(parent) = walkers[v].parent else {
            return ancestor;
        };

        // inner/outer contours on the right (p) and left (m) side
        let mut vip = v;
        let mut vop = v;
        let mut vim = w;
        let mut vom = walkers[parent].children[0];
        let mut sip = walkers[vip].modifier;
        let mut sop = walkers[vop].modifier;
        let mut sim = walkers[vim].modifier;
        let mut som = walkers[vom].modifier;

        let mut next_im = Self::next_right(walkers, vim);
        let mut next_ip = Self::next_left(walkers, vip);
        while let (Some(im), Some(ip)) = (next_im, next_ip) {
            vim = im;
            vip = ip;
            if let Some(n) = Self::next_left(walkers, vom) {
                vom = n;
            }
            if let Some(n) = Self::next_right(walkers, vop) {
                vop = n;
            }
            walkers[vop].ancestor = v;

            let shift = walkers[vim].prelim + sim - walkers[vip].prelim - sip
                + Self::separation(walkers, vim, vip);
            if shift > 0.0 {
                let wm = Self::next_ancestor(walkers, vim, v, ancestor);
                Self::move_subtree(walkers, wm, v, shift);
                sip += shift;
                sop += shift;
            }

            sim += walkers[vim].modifier;
            sip += walkers[vip].modifier;
            som += walkers[vom].modifier;
            sop += walkers[vop].modifier;

            next_im = Self::next_right(walkers, vim);
            next_ip = Self::next_left(walkers, vip);
        }

        if let Some(im) = next_im {
            if Self::next_right(walkers, vop).is_none() {
                walkers[vop].thread = Some(im);
                walkers[vop].modifier += sim - sop;
            }
        }
        if let Some(ip) = next_ip {
            if Self::next_left(walkers, vom).is_none() {
                walkers[vom].thread = Some(ip);
                walkers[vom].modifier += sip - som;
                ancestor = v;
            }
        }
        ancestor
    }

    fn next_ancestor(walkers: &[Walker], vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = walkers[vim].ancestor;
        if walkers[candidate].parent == walkers[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    fn move_subtree(walkers: &mut [Walker], wm: usize, wp: usize, shift: f32) {
        let subtrees = (walkers[wp].number as f32 - walkers[wm].number as f32).max(1.0);
        let change = shift / subtrees;
        walkers[wp].change -= change;
        walkers[wp].shift += shift;
        walkers[wm].change += change;
        walkers[wp].prelim += shift;
        walkers[wp].modifier += shift;
    }

    fn execute_shifts(v: usize, walkers: &mut [Walker]) {
        let mut shift = 0.0f32;
        let mut change = 0.0f32;
        let children = walkers[v].children.clone();
        for &child in children.iter().rev() {
            let w = &mut walkers[child];
            w.prelim += shift;
            w.modifier += shift;
            change += w.change;
            shift += w.shift + change;
        }
    }
}
