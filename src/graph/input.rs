//! Input handling - pointer interaction with the tree
//!
//! Hit testing works on the sampled [`Frame`], so it matches what is on
//! screen mid-animation. Clicking a label that carries a link navigates;
//! any other click on an interactive node toggles it.

use std::sync::OnceLock;

use egui::{Pos2, Rect, Vec2};
use regex::Regex;

use super::layout::LayoutContext;
use super::reconcile::{Frame, Phase};
use super::text_fit::FragmentKind;
use super::types::{NodeId, Tree, TreeNode};

// =============================================================================
// HIT TESTING
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePart {
    /// One of the label lines
    Label,
    /// Anywhere else inside the node box
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: NodeId,
    pub part: NodePart,
}

/// What a click resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Toggled(NodeId),
    Navigate { id: NodeId, url: String },
    Ignored,
}

/// Tracks pointer state for the tree view
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub hovered: Option<Hit>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered_node(&self) -> Option<NodeId> {
        self.hovered.as_ref().map(|hit| hit.id)
    }
}

pub struct InputHandler;

impl InputHandler {
    /// Topmost interactive node under `world`, with the part that was hit
    pub fn hit_test(frame: &Frame, tree: &Tree, ctx: &LayoutContext, world: Pos2) -> Option<Hit> {
        let half = Vec2::new(ctx.node_width, ctx.node_height()) / 2.0;
        frame
            .nodes
            .iter()
            .rev()
            .filter(|n| n.phase != Phase::Exiting)
            .find_map(|n| {
                let node = tree.get(n.id).filter(|node| node.is_interactive())?;
                let rect = Rect::from_center_size(n.center, half * 2.0);
                if !rect.contains(world) {
                    return None;
                }
                let local = world - n.center.to_vec2();
                let part = if Self::on_label(node, ctx, local) {
                    NodePart::Label
                } else {
                    NodePart::Body
                };
                Some(Hit { id: n.id, part })
            })
    }

    /// Whether a node-local point falls on a label line
    fn on_label(node: &TreeNode, ctx: &LayoutContext, local: Pos2) -> bool {
        let Some(metrics) = node.metrics.as_ref() else {
            return false;
        };
        let (_, right) = ctx.text_column(
            metrics.left_badge.as_ref().map(|b| b.length),
            metrics.right_badge.as_ref().map(|b| b.length),
        );
        metrics
            .text
            .fragments
            .iter()
            .filter(|f| f.kind == FragmentKind::Label)
            .any(|f| {
                Rect::from_min_max(Pos2::new(f.x, f.y), Pos2::new(right, f.y + f.font_size))
                    .contains(local)
            })
    }

    /// Decide what a click does; the caller applies it
    pub fn resolve_click(tree: &Tree, hit: Hit) -> ClickOutcome {
        let Some(node) = tree.get(hit.id).filter(|n| n.is_interactive()) else {
            return ClickOutcome::Ignored;
        };
        if hit.part == NodePart::Label && node.linkable && !node.is_load_more() {
            if let Some(url) = node.html.as_deref().and_then(extract_href) {
                return ClickOutcome::Navigate { id: hit.id, url };
            }
        }
        if node.has_descendants() {
            ClickOutcome::Toggled(hit.id)
        } else {
            ClickOutcome::Ignored
        }
    }
}

// =============================================================================
// LINK EXTRACTION
// =============================================================================

fn href_regex() -> Option<&'static Regex> {
    static HREF: OnceLock<Option<Regex>> = OnceLock::new();
    HREF.get_or_init(|| {
        Regex::new(r#"(?i)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).ok()
    })
    .as_ref()
}

/// First anchor target in an html fragment, with common entities decoded
pub fn extract_href(html: &str) -> Option<String> {
    let caps = href_regex()?.captures(html.trim())?;
    let raw = caps.get(1).or(caps.get(2)).or(caps.get(3))?.as_str().trim();
    if raw.is_empty() {
        return None;
    }
    Some(
        raw.replace("&amp;", "&")
            .replace("&quot;", "\"")
            .replace("&#39;", "'"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HierarchySettings;
    use crate::graph::reconcile::NodeFrame;
    use crate::graph::text_fit::{FittedText, NodeMetrics, TextFragment};
    use crate::graph::types::SourceId;

    fn ctx() -> LayoutContext {
        LayoutContext::new(&HierarchySettings::default(), 1)
    }

    fn tree_with(node: TreeNode) -> Tree {
        let mut child = TreeNode::new(NodeId(1), SourceId::Row("child".into()));
        child.parent = Some(NodeId(0));
        let mut node = node;
        node.collapsed_children.push(NodeId(1));
        Tree::from_parts(vec![node, child], Some(NodeId(0)))
    }

    fn labelled(html: Option<&str>) -> TreeNode {
        let mut node = TreeNode::new(NodeId(0), SourceId::Row("a".into()));
        node.name = "Alpha".into();
        node.html = html.map(str::to_owned);
        node.linkable = html.is_some();
        node.metrics = Some(NodeMetrics {
            left_badge: None,
            right_badge: None,
            text: FittedText {
                fragments: vec![TextFragment {
                    text: "Alpha".into(),
                    line: 0,
                    kind: FragmentKind::Label,
                    font_size: 13.0,
                    x: -81.0,
                    y: -6.5,
                    truncated: false,
                }],
                line_count: 1,
            },
        });
        node
    }

    fn frame_at(center: Pos2) -> Frame {
        Frame {
            nodes: vec![NodeFrame {
                id: NodeId(0),
                phase: Phase::Updating,
                center,
                opacity: 1.0,
            }],
            links: Vec::new(),
            view: Rect::NOTHING,
            progress: 1.0,
        }
    }

    #[test]
    fn hovered_node_follows_hit() {
        let mut state = InputState::new();
        assert_eq!(state.hovered_node(), None);
        state.hovered = Some(Hit {
            id: NodeId(4),
            part: NodePart::Body,
        });
        assert_eq!(state.hovered_node(), Some(NodeId(4)));
    }

    #[test]
    fn extracts_quoted_and_bare_hrefs() {
        assert_eq!(
            extract_href(r#"<a href="/dashboards/1?a=1&amp;b=2" target="_self">x</a>"#),
            Some("/dashboards/1?a=1&b=2".into())
        );
        assert_eq!(extract_href("<a href='https://x.io'>x</a>"), Some("https://x.io".into()));
        assert_eq!(extract_href("<A HREF=/plain>x</A>"), Some("/plain".into()));
        assert_eq!(extract_href("<span>no link</span>"), None);
        assert_eq!(extract_href(r#"<a href="">empty</a>"#), None);
    }

    #[test]
    fn hit_test_distinguishes_label_and_body() {
        let tree = tree_with(labelled(None));
        let frame = frame_at(Pos2::new(100.0, 50.0));
        let ctx = ctx();

        let label = InputHandler::hit_test(&frame, &tree, &ctx, Pos2::new(30.0, 50.0));
        assert_eq!(label, Some(Hit { id: NodeId(0), part: NodePart::Label }));

        let body = InputHandler::hit_test(&frame, &tree, &ctx, Pos2::new(195.0, 50.0));
        assert_eq!(body, Some(Hit { id: NodeId(0), part: NodePart::Body }));

        assert_eq!(InputHandler::hit_test(&frame, &tree, &ctx, Pos2::new(300.0, 50.0)), None);
    }

    #[test]
    fn label_click_with_link_navigates() {
        let tree = tree_with(labelled(Some(r#"<a href="/explore/x">Alpha</a>"#)));
        let label = Hit { id: NodeId(0), part: NodePart::Label };
        assert_eq!(
            InputHandler::resolve_click(&tree, label),
            ClickOutcome::Navigate { id: NodeId(0), url: "/explore/x".into() }
        );
        let body = Hit { id: NodeId(0), part: NodePart::Body };
        assert_eq!(InputHandler::resolve_click(&tree, body), ClickOutcome::Toggled(NodeId(0)));
    }

    #[test]
    fn load_more_labels_toggle_instead_of_navigating() {
        let mut node = labelled(Some(r#"<a href="/explore/x">Alpha</a>"#));
        node.attributes.row_offset = Some(500);
        let tree = tree_with(node);
        let label = Hit { id: NodeId(0), part: NodePart::Label };
        assert_eq!(InputHandler::resolve_click(&tree, label), ClickOutcome::Toggled(NodeId(0)));
    }

    #[test]
    fn synthetic_root_is_not_interactive() {
        let root = TreeNode::new(NodeId(0), SourceId::Synthetic);
        let tree = tree_with(root);
        let frame = frame_at(Pos2::ZERO);
        assert_eq!(InputHandler::hit_test(&frame, &tree, &ctx(), Pos2::ZERO), None);
        let hit = Hit { id: NodeId(0), part: NodePart::Body };
        assert_eq!(InputHandler::resolve_click(&tree, hit), ClickOutcome::Ignored);
    }
}
