//! Color palette for the hierarchy visualization
//!
//! Node fills come from host options (or a per-row `color` attribute); link
//! strokes depend on the link kind of the target row.

use egui::{Color32, Stroke};

use crate::config::{VisOptions, DEFAULT_COLOR_EMPTY, DEFAULT_COLOR_WITH_CHILDREN};
use crate::rows::LinkKind;

use super::types::TreeNode;

// =============================================================================
// FIXED COLORS
// =============================================================================

pub const TEXT: Color32 = Color32::from_rgb(0x1b, 0x53, 0x97);
pub const TEXT_SELECTED: Color32 = Color32::WHITE;
pub const SELECTION: Color32 = Color32::from_rgb(0x1b, 0x53, 0x97);
pub const COUNT_TEXT: Color32 = Color32::from_rgb(0x00, 0x61, 0xc2);
/// White at 75%
pub const COUNT_BACKGROUND: Color32 = Color32::from_rgba_premultiplied(191, 191, 191, 191);
pub const LOAD_MORE_FILL: Color32 = Color32::from_rgb(0xe9, 0xe9, 0xe9);
pub const LOAD_MORE_STROKE: Color32 = Color32::from_rgb(0xd9, 0xd9, 0xd9);
pub const LINK_CASCADE: Color32 = Color32::from_rgb(0x00, 0x80, 0x00);
pub const LINK_GREY: Color32 = Color32::from_rgb(0x59, 0x59, 0x59);
/// Outline of the node under the pointer
pub const HOVER: Color32 = Color32::from_rgb(0x00, 0x61, 0xc2);
/// Blue-tinted drop shadow under expanded nodes
pub const SHADOW: Color32 = Color32::from_rgba_premultiplied(37, 61, 110, 150);

// =============================================================================
// HEX PARSING
// =============================================================================

/// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` (leading `#` optional)
pub fn parse_hex(input: &str) -> Option<Color32> {
    let hex = input.trim().trim_start_matches('#');
    if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Color32::from_hex(&format!("#{hex}")).ok()
}

/// Parse `input`, falling back to `default` (which must be valid hex)
pub fn color_or(input: &str, default: &str) -> Color32 {
    parse_hex(input).unwrap_or_else(|| {
        tracing::warn!(color = input, fallback = default, "unparsable color");
        parse_hex(default).unwrap_or(Color32::WHITE)
    })
}

// =============================================================================
// NODE STYLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub fill: Color32,
    pub stroke: Stroke,
    /// Dash and gap lengths for a dashed outline
    pub dash: Option<(f32, f32)>,
}

impl NodeStyle {
    /// Same fill with a solid hover outline
    pub fn hovered(self) -> Self {
        Self {
            stroke: Stroke::new(self.stroke.width.max(1.5), HOVER),
            dash: None,
            ..self
        }
    }
}

/// Node fills resolved from host options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub with_children: Color32,
    pub empty: Color32,
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_options(&VisOptions::default())
    }
}

impl Palette {
    pub fn from_options(options: &VisOptions) -> Self {
        Self {
            with_children: color_or(&options.color_with_children, DEFAULT_COLOR_WITH_CHILDREN),
            empty: color_or(&options.color_empty, DEFAULT_COLOR_EMPTY),
        }
    }

    pub fn node_style(&self, node: &TreeNode) -> NodeStyle {
        if node.is_load_more() {
            return NodeStyle {
                fill: LOAD_MORE_FILL,
                stroke: Stroke::new(0.5, LOAD_MORE_STROKE),
                dash: Some((4.0, 1.0)),
            };
        }
        let fill = node
            .attributes
            .color
            .as_deref()
            .and_then(parse_hex)
            .unwrap_or(if node.has_descendants() {
                self.with_children
            } else {
                self.empty
            });
        NodeStyle {
            fill,
            stroke: Stroke::NONE,
            dash: None,
        }
    }
}

// =============================================================================
// LINK STYLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
    Cascade,
    Default,
    Weak,
    Strong,
    /// Not stroked (links into load-more placeholders)
    Clear,
}

impl LinkStyle {
    /// Cascade wins; otherwise the target row decides
    pub fn for_target(target: &TreeNode, cascade: bool) -> Self {
        if cascade {
            LinkStyle::Cascade
        } else if target.is_load_more() {
            LinkStyle::Clear
        } else {
            match target.attributes.link {
                Some(LinkKind::Weak) => LinkStyle::Weak,
                Some(LinkKind::Strong) => LinkStyle::Strong,
                None => LinkStyle::Default,
            }
        }
    }

    pub fn stroke(&self) -> Option<Stroke> {
        match self {
            LinkStyle::Cascade => Some(Stroke::new(1.5, LINK_CASCADE.gamma_multiply(0.8))),
            LinkStyle::Default => Some(Stroke::new(1.5, LINK_GREY.gamma_multiply(0.4))),
            LinkStyle::Weak => Some(Stroke::new(1.0, LINK_GREY.gamma_multiply(0.25))),
            LinkStyle::Strong => Some(Stroke::new(1.5, LINK_GREY.gamma_multiply(0.8))),
            LinkStyle::Clear => None,
        }
    }

    pub fn dash(&self) -> Option<(f32, f32)> {
        match self {
            LinkStyle::Weak => Some((2.0, 1.0)),
            _ => None,
        }
    }
}
