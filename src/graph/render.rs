//! Rendering - draws links, node boxes, badges and text with egui::Painter
//!
//! Everything is painted from a sampled [`Frame`] in world coordinates and
//! mapped to screen through a [`ScreenTransform`].

use egui::epaint::Shadow;
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use super::colors::{
    Palette, COUNT_BACKGROUND, COUNT_TEXT, SELECTION, SHADOW, TEXT, TEXT_SELECTED,
};
use super::layout::LayoutContext;
use super::reconcile::{Frame, LinkFrame, NodeFrame};
use super::text_fit::CountBadge;
use super::types::{NodeId, Tree, TreeNode};
use super::viewport_fit::ScreenTransform;

pub struct HierarchyRenderer {
    pub palette: Palette,
}

impl HierarchyRenderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn render(
        &self,
        painter: &Painter,
        frame: &Frame,
        tree: &Tree,
        ctx: &LayoutContext,
        transform: &ScreenTransform,
        hovered: Option<NodeId>,
    ) {
        for link in &frame.links {
            Self::render_link(painter, link, transform);
        }
        for node_frame in &frame.nodes {
            if let Some(node) = tree.get(node_frame.id) {
                let is_hovered = hovered == Some(node_frame.id);
                self.render_node(painter, node_frame, node, ctx, transform, is_hovered);
            }
        }
    }

    // =========================================================================
    // LINKS
    // =========================================================================

    fn render_link(painter: &Painter, link: &LinkFrame, transform: &ScreenTransform) {
        let Some(stroke) = link.style.stroke() else {
            return;
        };
        let stroke = Stroke::new(stroke.width * transform.scale, stroke.color);
        let points: Vec<Pos2> = link
            .path
            .polyline()
            .into_iter()
            .map(|p| transform.to_screen(p))
            .collect();

        match link.style.dash() {
            Some((dash, gap)) => {
                painter.extend(Shape::dashed_line(
                    &points,
                    stroke,
                    dash * transform.scale,
                    gap * transform.scale,
                ));
            }
            None => {
                painter.add(Shape::line(points, stroke));
            }
        }

        for head in &link.path.arrowheads {
            let corners = head.points.iter().map(|&p| transform.to_screen(p)).collect();
            painter.add(Shape::closed_line(corners, stroke));
        }
    }

    // =========================================================================
    // NODES
    // =========================================================================

    fn render_node(
        &self,
        painter: &Painter,
        frame: &NodeFrame,
        node: &TreeNode,
        ctx: &LayoutContext,
        transform: &ScreenTransform,
        hovered: bool,
    ) {
        let opacity = frame.opacity.clamp(0.0, 1.0);
        if opacity <= f32::EPSILON {
            return;
        }
        let scale = transform.scale;
        let offset = frame.center.to_vec2();
        let to_screen = |r: Rect| transform.rect_to_screen(r.translate(offset));
        let fade = |c: Color32| c.gamma_multiply(opacity);

        let rect = to_screen(ctx.node_rect());
        let rounding = ctx.radius * scale;
        let style = self.palette.node_style(node);
        let style = if hovered { style.hovered() } else { style };
        let expanded = node.is_expanded();

        if expanded {
            let shadow = Shadow {
                offset: Vec2::new(1.0, 3.0) * scale,
                blur: 5.0 * scale,
                spread: 0.0,
                color: fade(SHADOW),
            };
            painter.add(shadow.as_shape(rect, rounding));
        }

        painter.rect_filled(rect, rounding, fade(style.fill));
        match style.dash {
            Some((dash, gap)) => {
                let outline = vec![
                    rect.left_top(),
                    rect.right_top(),
                    rect.right_bottom(),
                    rect.left_bottom(),
                    rect.left_top(),
                ];
                let stroke = Stroke::new(style.stroke.width * scale, fade(style.stroke.color));
                painter.extend(Shape::dashed_line(&outline, stroke, dash * scale, gap * scale));
            }
            None if style.stroke.width > 0.0 => {
                let stroke = Stroke::new(style.stroke.width * scale, fade(style.stroke.color));
                painter.rect_stroke(rect, rounding, stroke);
            }
            None => {}
        }

        if expanded {
            let selection = to_screen(ctx.selection_rect());
            let inset = ctx.selection_stroke * 0.8 / 2.0;
            let rounding = (ctx.radius - inset).max(0.0) * scale;
            painter.rect_filled(selection, rounding, fade(SELECTION));
        }

        let Some(metrics) = node.metrics.as_ref() else {
            return;
        };

        if let Some(badge) = metrics.left_badge.as_ref() {
            let pill = Self::badge_rect(ctx, ctx.count_left(), badge);
            self.render_badge(painter, to_screen(pill), badge, ctx, scale, opacity);
        }
        if let Some(badge) = metrics.right_badge.as_ref() {
            let width = badge.length + ctx.count_border * 2.0;
            let pill = Self::badge_rect(ctx, ctx.count_right() - width, badge);
            self.render_badge(painter, to_screen(pill), badge, ctx, scale, opacity);
        }

        let text_color = fade(if expanded { TEXT_SELECTED } else { TEXT });
        for fragment in &metrics.text.fragments {
            let pos = transform.to_screen(Pos2::new(fragment.x, fragment.y) + offset);
            painter.text(
                pos,
                Align2::LEFT_TOP,
                &fragment.text,
                FontId::proportional(fragment.font_size * scale),
                text_color,
            );
        }
    }

    fn badge_rect(ctx: &LayoutContext, left: f32, badge: &CountBadge) -> Rect {
        Rect::from_min_size(
            Pos2::new(left, ctx.count_top()),
            Vec2::new(badge.length + ctx.count_border * 2.0, ctx.count_height()),
        )
    }

    fn render_badge(
        &self,
        painter: &Painter,
        pill: Rect,
        badge: &CountBadge,
        ctx: &LayoutContext,
        scale: f32,
        opacity: f32,
    ) {
        painter.rect_filled(pill, pill.height() / 2.0, COUNT_BACKGROUND.gamma_multiply(opacity));
        painter.text(
            pill.center(),
            Align2::CENTER_CENTER,
            &badge.text,
            FontId::proportional(ctx.count_text_size * scale),
            COUNT_TEXT.gamma_multiply(opacity),
        );
    }
}
