//! Viewport fit
//!
//! Computes the view box around the laid-out tree and maps it into the
//! widget's screen rect. The view box never shrinks below the container:
//! it is widened symmetrically and heightened downward.

use egui::{Pos2, Rect, Vec2};

use super::layout::{LayoutBounds, Margin};

/// Tree coordinates `(x, y)` to world coordinates, with the depth axis horizontal
pub fn to_world(x: f32, y: f32) -> Pos2 {
    Pos2::new(y, x)
}

/// View box over all visible node centers plus margins, expanded to at
/// least `container`.
pub fn view_box(bounds: &LayoutBounds, margin: Margin, container: Vec2) -> Rect {
    let view_width = (bounds.max_y - bounds.min_y) + margin.left + margin.right;
    let view_height = (bounds.max_x - bounds.min_x) + margin.top + margin.bottom;

    let width_diff = (container.x - view_width).max(0.0);
    let min = Pos2::new(
        bounds.min_y - margin.left - width_diff / 2.0,
        bounds.min_x - margin.top,
    );
    let size = Vec2::new(view_width + width_diff, view_height.max(container.y));
    Rect::from_min_size(min, size)
}

// =============================================================================
// SCREEN TRANSFORM
// =============================================================================

/// Uniform-scale, centered mapping of a view box into a screen rect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTransform {
    pub scale: f32,
    /// Screen position of world origin
    pub offset: Vec2,
}

impl Default for ScreenTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl ScreenTransform {
    /// Fit `view` inside `screen`, preserving aspect ratio
    pub fn fit(view: Rect, screen: Rect) -> Self {
        if view.width() <= 0.0 || view.height() <= 0.0 || !view.is_finite() {
            return Self {
                scale: 1.0,
                offset: screen.center().to_vec2() - view.center().to_vec2(),
            };
        }
        let scale = (screen.width() / view.width()).min(screen.height() / view.height());
        let offset = screen.center().to_vec2() - view.center().to_vec2() * scale;
        Self { scale, offset }
    }

    pub fn to_screen(&self, world: Pos2) -> Pos2 {
        Pos2::new(world.x * self.scale, world.y * self.scale) + self.offset
    }

    pub fn to_world(&self, screen: Pos2) -> Pos2 {
        let p = screen - self.offset;
        Pos2::new(p.x / self.scale, p.y / self.scale)
    }

    pub fn rect_to_screen(&self, world: Rect) -> Rect {
        Rect::from_min_max(self.to_screen(world.min), self.to_screen(world.max))
    }
}
