//! Render reconciler
//!
//! Diffs the previously rendered node and link sets against a fresh layout
//! and animates the difference on one shared clock:
//! - entering: newly visible, starts at the pass source's previous anchor
//!   and fades in
//! - updating: moves from its committed position to the new one
//! - exiting: moves to the pass source's new anchor, fades out, and is
//!   dropped when the clock completes
//!
//! Nodes are keyed by [`NodeId`], links by their target's id. A new pass
//! always starts from committed end states: any in-flight batch is finished
//! first.

use std::collections::{BTreeMap, BTreeSet};

use egui::{Pos2, Rect, Vec2};

use super::animation::{TransitionClock, Tween};
use super::colors::LinkStyle;
use super::edges::{arrow_right, cascade_flag, LinkPath};
use super::layout::{LayoutContext, LayoutResult};
use super::types::{NodeId, Tree, TreeNode};
use super::viewport_fit::{to_world, view_box};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Entering,
    Updating,
    Exiting,
}

// =============================================================================
// SPRITES
// =============================================================================

#[derive(Debug, Clone)]
struct NodeSprite {
    phase: Phase,
    pos: Tween<Pos2>,
    opacity: Tween<f32>,
}

#[derive(Debug, Clone)]
struct LinkSprite {
    phase: Phase,
    source: Tween<Pos2>,
    target: Tween<Pos2>,
    arrow_right: bool,
    cascade: bool,
    style: LinkStyle,
}

impl NodeSprite {
    fn settle(&mut self) {
        self.pos = Tween::still(self.pos.to);
        self.opacity = Tween::still(self.opacity.to);
        self.phase = Phase::Updating;
    }
}

impl LinkSprite {
    fn settle(&mut self) {
        self.source = Tween::still(self.source.to);
        self.target = Tween::still(self.target.to);
        self.phase = Phase::Updating;
    }
}

// =============================================================================
// FRAME
// =============================================================================

/// A node sampled at the current clock time, in world coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFrame {
    pub id: NodeId,
    pub phase: Phase,
    pub center: Pos2,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkFrame {
    pub target: NodeId,
    pub phase: Phase,
    pub path: LinkPath,
    pub style: LinkStyle,
}

/// Everything needed to paint one animation frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub nodes: Vec<NodeFrame>,
    pub links: Vec<LinkFrame>,
    pub view: Rect,
    /// Eased clock progress 0..=1
    pub progress: f32,
}

impl Frame {
    pub fn node(&self, id: NodeId) -> Option<&NodeFrame> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn link(&self, target: NodeId) -> Option<&LinkFrame> {
        self.links.iter().find(|l| l.target == target)
    }
}

/// Keys touched by one pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PassSummary {
    pub entering: Vec<NodeId>,
    pub updating: Vec<NodeId>,
    pub exiting: Vec<NodeId>,
    pub links_entering: Vec<NodeId>,
    pub links_exiting: Vec<NodeId>,
}

// =============================================================================
// RECONCILER
// =============================================================================

#[derive(Debug, Clone)]
pub struct Reconciler {
    nodes: BTreeMap<NodeId, NodeSprite>,
    links: BTreeMap<NodeId, LinkSprite>,
    view: Option<Tween<Rect>>,
    clock: TransitionClock,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::with_clock(TransitionClock::default())
    }
}

impl Reconciler {
    pub fn new(duration_secs: f32) -> Self {
        Self::with_clock(TransitionClock::new(duration_secs))
    }

    fn with_clock(clock: TransitionClock) -> Self {
        Self {
            nodes: BTreeMap::new(),
            links: BTreeMap::new(),
            view: None,
            clock,
        }
    }

    /// Forget everything rendered so far
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.view = None;
        self.clock.finish();
    }

    pub fn is_animating(&self) -> bool {
        self.clock.is_running()
    }

    /// Run one reconciliation pass against a fresh layout. `source` is the
    /// node whose toggle caused the pass (the root on a refresh); its
    /// previous and new positions anchor entering and exiting elements.
    pub fn pass(
        &mut self,
        tree: &Tree,
        layout: &LayoutResult,
        source: NodeId,
        ctx: &LayoutContext,
        container: Vec2,
    ) -> PassSummary {
        self.finish();

        let half = ctx.node_width / 2.0;
        let (enter_at, exit_at, link_enter_at, link_exit_at) = match tree.get(source) {
            Some(s) => (
                to_world(s.x0, s.y0 + ctx.node_width),
                to_world(s.x, s.y + ctx.node_width),
                to_world(s.x0, s.y0 + half),
                to_world(s.x, s.y + half),
            ),
            None => (Pos2::ZERO, Pos2::ZERO, Pos2::ZERO, Pos2::ZERO),
        };

        let mut summary = PassSummary::default();
        let visible: BTreeSet<NodeId> = layout.visible.iter().copied().collect();

        // Nodes
        for &id in &layout.visible {
            let Some(node) = tree.get(id) else {
                continue;
            };
            let target = to_world(node.x, node.y);
            let opacity = if node.is_hidden() { 0.0 } else { 1.0 };
            match self.nodes.get_mut(&id) {
                Some(sprite) => {
                    sprite.phase = Phase::Updating;
                    sprite.pos = Tween::new(sprite.pos.to, target);
                    sprite.opacity = Tween::new(sprite.opacity.to, opacity);
                    summary.updating.push(id);
                }
                None => {
                    self.nodes.insert(
                        id,
                        NodeSprite {
                            phase: Phase::Entering,
                            pos: Tween::new(enter_at, target),
                            opacity: Tween::new(0.0, opacity),
                        },
                    );
                    summary.entering.push(id);
                }
            }
        }
        for (&id, sprite) in self.nodes.iter_mut() {
            if !visible.contains(&id) {
                sprite.phase = Phase::Exiting;
                sprite.pos = Tween::new(sprite.pos.to, exit_at);
                sprite.opacity = Tween::new(sprite.opacity.to, 0.0);
                summary.exiting.push(id);
            }
        }

        // Links, keyed by target
        let mut linked = BTreeSet::new();
        for &id in &layout.visible {
            let Some((parent, node)) = tree
                .get(id)
                .and_then(|n| n.parent.and_then(|p| tree.get(p)).map(|p| (p, n)))
            else {
                continue;
            };
            linked.insert(id);
            let from = to_world(parent.x, parent.y + half);
            let to = to_world(node.x, node.y - half);
            let (arrow, cascade, style) = Self::link_shape(parent, node);
            match self.links.get_mut(&id) {
                Some(sprite) => {
                    sprite.phase = Phase::Updating;
                    sprite.source = Tween::new(sprite.source.to, from);
                    sprite.target = Tween::new(sprite.target.to, to);
                    sprite.arrow_right = arrow;
                    sprite.cascade = cascade;
                    sprite.style = style;
                }
                None => {
                    self.links.insert(
                        id,
                        LinkSprite {
                            phase: Phase::Entering,
                            source: Tween::new(link_enter_at, from),
                            target: Tween::new(link_enter_at, to),
                            arrow_right: arrow,
                            cascade,
                            style,
                        },
                    );
                    summary.links_entering.push(id);
                }
            }
        }
        for (&id, sprite) in self.links.iter_mut() {
            if !linked.contains(&id) {
                sprite.phase = Phase::Exiting;
                sprite.source = Tween::new(sprite.source.to, link_exit_at);
                sprite.target = Tween::new(sprite.target.to, link_exit_at);
                summary.links_exiting.push(id);
            }
        }

        // Viewport
        let view = view_box(&layout.bounds, ctx.margin(), container);
        self.view = Some(match self.view {
            Some(current) => Tween::new(current.to, view),
            None => Tween::still(view),
        });

        self.clock.restart();
        tracing::debug!(
            source = %source,
            entering = summary.entering.len(),
            updating = summary.updating.len(),
            exiting = summary.exiting.len(),
            "reconcile pass"
        );
        summary
    }

    fn link_shape(source: &TreeNode, target: &TreeNode) -> (bool, bool, LinkStyle) {
        let cascade = cascade_flag(source, target);
        (
            arrow_right(target.right, target.attributes.direction),
            cascade,
            LinkStyle::for_target(target, cascade),
        )
    }

    /// Advance the shared clock. Exiting elements are removed on the tick
    /// that completes the batch.
    pub fn tick(&mut self, dt: f32) -> bool {
        let done = self.clock.tick(dt);
        if done {
            self.settle();
        }
        done
    }

    /// Jump the in-flight batch to its end state
    pub fn finish(&mut self) {
        self.clock.finish();
        self.settle();
    }

    fn settle(&mut self) {
        self.nodes.retain(|_, s| s.phase != Phase::Exiting);
        self.links.retain(|_, s| s.phase != Phase::Exiting);
        self.nodes.values_mut().for_each(NodeSprite::settle);
        self.links.values_mut().for_each(LinkSprite::settle);
        if let Some(view) = self.view.as_mut() {
            *view = Tween::still(view.to);
        }
    }

    /// Sample every element at the current clock time
    pub fn frame(&self) -> Frame {
        let t = self.clock.progress();
        let nodes = self
            .nodes
            .iter()
            .map(|(&id, s)| NodeFrame {
                id,
                phase: s.phase,
                center: s.pos.sample(t),
                opacity: s.opacity.sample(t),
            })
            .collect();
        let links = self
            .links
            .iter()
            .map(|(&target, s)| LinkFrame {
                target,
                phase: s.phase,
                path: LinkPath::new(s.source.sample(t), s.target.sample(t), s.arrow_right, s.cascade),
                style: s.style,
            })
            .collect();
        let view = self
            .view
            .map(|v| v.sample(t))
            .unwrap_or(Rect::NOTHING);
        Frame {
            nodes,
            links,
            view,
            progress: t,
        }
    }
}
