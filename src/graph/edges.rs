//! Link path geometry
//!
//! A link is a horizontal cubic bezier from the source anchor to a point just
//! short of the target, followed by one arrowhead (two for cascade links)
//! and a closing segment into the target. All points are in screen
//! orientation: `x` is the depth axis, `y` runs across siblings.

use std::fmt::Write as _;

use egui::{Pos2, Vec2};

use crate::rows::Direction;

use super::types::TreeNode;

/// Number of segments to use when flattening the bezier
pub const BEZIER_SEGMENTS: usize = 20;

// =============================================================================
// BEZIER CURVE
// =============================================================================

/// Cubic bezier with both control points at the horizontal midpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkCurve {
    pub from: Pos2,
    pub ctrl1: Pos2,
    pub ctrl2: Pos2,
    pub to: Pos2,
}

impl LinkCurve {
    pub fn horizontal(from: Pos2, to: Pos2) -> Self {
        let mid_x = (from.x + to.x) / 2.0;
        Self {
            from,
            ctrl1: Pos2::new(mid_x, from.y),
            ctrl2: Pos2::new(mid_x, to.y),
            to,
        }
    }

    /// Point on curve at parameter t (0.0 to 1.0), by de Casteljau
    /// subdivision so coincident control points yield exactly that point
    pub fn point_at(&self, t: f32) -> Pos2 {
        let ab = mix(self.from, self.ctrl1, t);
        let bc = mix(self.ctrl1, self.ctrl2, t);
        let cd = mix(self.ctrl2, self.to, t);
        mix(mix(ab, bc, t), mix(bc, cd, t), t)
    }

    pub fn points(&self) -> Vec<Pos2> {
        (0..=BEZIER_SEGMENTS)
            .map(|i| self.point_at(i as f32 / BEZIER_SEGMENTS as f32))
            .collect()
    }
}

fn mix(a: Pos2, b: Pos2, t: f32) -> Pos2 {
    a + (b - a) * t
}

// =============================================================================
// ARROW HEAD
// =============================================================================

/// Triangular notch drawn on the link just before the target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrowhead {
    /// Apex first, then the two base corners
    pub points: [Pos2; 3],
    /// Extent along the travel axis and half-height across it
    pub size: Vec2,
}

impl Arrowhead {
    /// Triangle occupying `[start.x, start.x + size.x]` along the travel axis.
    /// `apex_first` puts the apex at `start`, otherwise at the far end.
    fn new(start: Pos2, size: Vec2, apex_first: bool) -> Self {
        let near = start.x;
        let far = start.x + size.x;
        let (apex_x, base_x) = if apex_first { (near, far) } else { (far, near) };
        Self {
            points: [
                Pos2::new(apex_x, start.y),
                Pos2::new(base_x, start.y - size.y),
                Pos2::new(base_x, start.y + size.y),
            ],
            size,
        }
    }
}

/// Arrow orientation for a target: right-oriented subtrees point with the
/// data direction, left-oriented ones against it.
pub fn arrow_right(right: bool, direction: Direction) -> bool {
    if right {
        direction == Direction::Down
    } else {
        direction != Direction::Down
    }
}

/// Whether the link into `target` is drawn as a cascade (double arrow).
/// When the source has no measured right badge, the source's own cascade
/// attribute decides instead.
pub fn cascade_flag(source: &TreeNode, target: &TreeNode) -> bool {
    let source_has_right_badge = source
        .metrics
        .as_ref()
        .is_some_and(|m| m.right_badge.is_some());
    if source_has_right_badge {
        target.attributes.is_cascade()
    } else {
        source.attributes.is_cascade()
    }
}

// =============================================================================
// LINK PATH
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LinkPath {
    pub curve: LinkCurve,
    /// One arrowhead, or two for cascade links
    pub arrowheads: Vec<Arrowhead>,
    /// Where the path finally ends (the target anchor)
    pub end: Pos2,
    arrow_right: bool,
}

impl LinkPath {
    /// Build the path from `source` to `target`. A zero-length link
    /// (source == target) degenerates to a single point.
    pub fn new(source: Pos2, target: Pos2, arrow_right: bool, cascade: bool) -> Self {
        let dx = target.x - source.x;
        let triangle = Vec2::new(dx / 8.0, dx / 8.0 * 2.0 / 3.0);
        let curve_end = Pos2::new(target.x - triangle.x * 2.0, target.y);
        let curve = LinkCurve::horizontal(source, curve_end);

        let count = if cascade { 2 } else { 1 };
        let arrowheads = (0..count)
            .map(|i| {
                let start = Pos2::new(curve_end.x + triangle.x * i as f32, curve_end.y);
                Arrowhead::new(start, triangle, arrow_right)
            })
            .collect();

        Self {
            curve,
            arrowheads,
            end: target,
            arrow_right,
        }
    }

    pub fn is_cascade(&self) -> bool {
        self.arrowheads.len() > 1
    }

    /// Net displacement from the path's first point to its last
    pub fn displacement(&self) -> Vec2 {
        self.end - self.curve.from
    }

    /// Flattened line from source through every arrowhead base to the target
    pub fn polyline(&self) -> Vec<Pos2> {
        let mut points = self.curve.points();
        points.push(self.end);
        points
    }

    /// SVG path data equivalent of this link
    pub fn to_svg(&self) -> String {
        let c = &self.curve;
        let mut d = format!(
            "M{},{}C{},{},{},{},{},{}",
            c.from.x, c.from.y, c.ctrl1.x, c.ctrl1.y, c.ctrl2.x, c.ctrl2.y, c.to.x, c.to.y
        );
        for head in &self.arrowheads {
            let (tx, ty) = (head.size.x, head.size.y);
            if self.arrow_right {
                let _ = write!(d, "l{},{}l0,{}l{},{}m{},0", tx, -ty, ty * 2.0, -tx, -ty, tx);
            } else {
                let _ = write!(d, "m{},0l{},{}l0,{}l{},{}", tx, -tx, -ty, ty * 2.0, tx, -ty);
            }
        }
        let _ = write!(d, "L{},{}", self.end.x, self.end.y);
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::text_fit::{CountBadge, NodeMetrics};
    use crate::graph::types::{NodeId, SourceId};
    use crate::rows::RowAttributes;

    fn node(cascade: Option<i64>) -> TreeNode {
        let mut node = TreeNode::new(NodeId(0), SourceId::Row("n".into()));
        node.attributes = RowAttributes {
            cascade,
            ..RowAttributes::default()
        };
        node
    }

    #[test]
    fn degenerate_link_has_no_displacement() {
        let p = Pos2::new(125.0, -40.0);
        for cascade in [false, true] {
            let path = LinkPath::new(p, p, true, cascade);
            assert_eq!(path.displacement(), Vec2::ZERO);
            for point in path.polyline() {
                assert_eq!(point, p);
            }
            assert!(path.to_svg().chars().all(|c| c != 'N'), "no NaN in {}", path.to_svg());
        }
    }

    #[test]
    fn curve_samples_stay_on_a_flat_link() {
        let curve = LinkCurve::horizontal(Pos2::new(0.3, 7.1), Pos2::new(90.7, 7.1));
        let points = curve.points();
        assert_eq!(points[0], curve.from);
        assert!(points.iter().all(|p| p.y == 7.1));
        assert!(points.windows(2).all(|w| w[0].x <= w[1].x));
        let end = points[BEZIER_SEGMENTS];
        assert!((end.x - curve.to.x).abs() < 1e-4);
    }

    #[test]
    fn cascade_emits_two_arrowheads() {
        let path = LinkPath::new(Pos2::new(0.0, 0.0), Pos2::new(80.0, 20.0), true, true);
        assert_eq!(path.arrowheads.len(), 2);
        assert_eq!(path.to_svg().matches("l0,").count(), 2);

        let single = LinkPath::new(Pos2::new(0.0, 0.0), Pos2::new(80.0, 20.0), true, false);
        assert_eq!(single.arrowheads.len(), 1);
        assert_eq!(single.to_svg().matches("l0,").count(), 1);
    }

    #[test]
    fn curve_stops_short_of_target() {
        let path = LinkPath::new(Pos2::new(0.0, 0.0), Pos2::new(80.0, 20.0), true, false);
        assert_eq!(path.curve.to, Pos2::new(60.0, 20.0));
        assert_eq!(path.curve.ctrl1, Pos2::new(30.0, 0.0));
        assert_eq!(path.curve.ctrl2, Pos2::new(30.0, 20.0));
        assert_eq!(path.end, Pos2::new(80.0, 20.0));
        let svg = path.to_svg();
        assert!(svg.starts_with("M0,0C30,0,30,20,60,20l10,"), "{svg}");
        assert!(svg.ends_with("m10,0L80,20"), "{svg}");
    }

    #[test]
    fn arrow_orientation_flips_with_side_and_direction() {
        assert!(arrow_right(true, Direction::Down));
        assert!(!arrow_right(true, Direction::Up));
        assert!(!arrow_right(false, Direction::Down));
        assert!(arrow_right(false, Direction::Up));

        let right = LinkPath::new(Pos2::ZERO, Pos2::new(80.0, 0.0), true, false);
        let left = LinkPath::new(Pos2::ZERO, Pos2::new(80.0, 0.0), false, false);
        assert_eq!(right.arrowheads[0].points[0].x, 60.0);
        assert_eq!(left.arrowheads[0].points[0].x, 70.0);
    }

    #[test]
    fn cascade_falls_back_to_source_without_right_badge() {
        let source = node(Some(0));
        let target = node(None);
        assert!(cascade_flag(&source, &target));

        let mut measured = node(None);
        measured.metrics = Some(NodeMetrics {
            right_badge: Some(CountBadge {
                text: "3".into(),
                length: 6.0,
            }),
            ..NodeMetrics::default()
        });
        assert!(!cascade_flag(&measured, &target));
        assert!(cascade_flag(&measured, &node(Some(2))));
        assert!(!cascade_flag(&measured, &node(Some(-1))));
    }
}
