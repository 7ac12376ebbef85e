//! Collapsible tree visualization
//!
//! # Architecture
//!
//! ```text
//! rows + dimensions (from host)
//!        │
//!        ▼
//! TreeBuilder (arena tree, synthetic root for many roots)
//!        │
//!        ▼
//! TextFitter (badges, wrapped/truncated lines per node)
//!        │
//!        ▼
//! TidyTree (positions for visible nodes, on every toggle)
//!        │
//!        ▼
//! Reconciler (enter/update/exit on one clock, view box)
//!        │
//!        ├──► HierarchyRenderer (draws to egui::Painter)
//!        │         └──► LinkPath (curves, arrowheads)
//!        │
//!        └──► InputHandler (hit test, toggle or navigate)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut widget = HierarchyWidget::new();
//! widget.update(&rows, &dimensions, &options, container)?;
//! widget.ui(ui);
//! ```

pub mod animation;
pub mod builder;
pub mod colors;
pub mod edges;
pub mod input;
pub mod layout;
pub mod reconcile;
pub mod render;
pub mod text_fit;
pub mod types;
pub mod viewport_fit;

pub use builder::{build_tree, BuildReport, TreeBuilder};
pub use input::{ClickOutcome, Hit, InputHandler, InputState, NodePart};
pub use layout::{LayoutBounds, LayoutContext, LayoutResult, TidyTree};
pub use reconcile::{Frame, PassSummary, Phase, Reconciler};
pub use render::HierarchyRenderer;
pub use text_fit::{FontMeasurer, TextFitter, TextMeasure};
pub use types::{NodeId, SourceId, Tree, TreeNode};

use egui::{CursorIcon, Pos2, Sense, Vec2};

use crate::config::{global_config, HierarchySettings, VisOptions};
use crate::error::HierarchyError;
use crate::rows::{Dimension, Row, RowSchema};

use colors::Palette;
use viewport_fit::ScreenTransform;

// =============================================================================
// WIDGET
// =============================================================================

/// One render session: the tree, its layout and its running transitions
pub struct HierarchyWidget<M: TextMeasure = FontMeasurer> {
    measure: M,
    settings: HierarchySettings,
    tree: Tree,
    ctx: LayoutContext,
    reconciler: Reconciler,
    renderer: HierarchyRenderer,
    input: InputState,
    container: Vec2,
    report: BuildReport,
}

impl HierarchyWidget<FontMeasurer> {
    /// Widget measuring text with egui's bundled fonts and the embedded settings
    pub fn new() -> Self {
        Self::with_measure(FontMeasurer::new(), global_config().clone())
    }
}

impl Default for HierarchyWidget<FontMeasurer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: TextMeasure> HierarchyWidget<M> {
    pub fn with_measure(measure: M, settings: HierarchySettings) -> Self {
        let ctx = LayoutContext::new(&settings, 1);
        let reconciler = Reconciler::new(settings.animation.duration_secs());
        let renderer = HierarchyRenderer::new(Palette::from_options(&settings.options));
        Self {
            measure,
            settings,
            tree: Tree::new(),
            ctx,
            reconciler,
            renderer,
            input: InputState::new(),
            container: Vec2::ZERO,
            report: BuildReport::default(),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn context(&self) -> &LayoutContext {
        &self.ctx
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn is_animating(&self) -> bool {
        self.reconciler.is_animating()
    }

    /// Rebuild from a new query result. On a validation error nothing is
    /// kept from the previous tree.
    pub fn update(
        &mut self,
        rows: &[Row],
        dimensions: &[Dimension],
        options: &VisOptions,
        container: Vec2,
    ) -> Result<PassSummary, HierarchyError> {
        self.reconciler.clear();
        self.tree = Tree::new();
        self.report = BuildReport::default();

        let schema = RowSchema::from_dimensions(dimensions)?;
        let (tree, report) = TreeBuilder::new(&schema).build(rows)?;
        self.tree = tree;
        self.report = report;
        self.container = container;
        self.renderer.palette = Palette::from_options(options);

        self.tree.collapse_below_root();
        self.fit_text(schema.content_lines());

        let Some(root) = self.tree.root() else {
            return Ok(PassSummary::default());
        };
        if let Some(node) = self.tree.get_mut(root) {
            node.x0 = self.ctx.depth_step() / 2.0;
            node.y0 = 0.0;
        }
        Ok(self.relayout(root))
    }

    /// Fit text for every node and size node boxes for the tallest result
    fn fit_text(&mut self, schema_lines: usize) {
        let ctx = LayoutContext::new(&self.settings, schema_lines);
        let fitted: Vec<_> = {
            let fitter = TextFitter::new(&self.measure, &ctx);
            self.tree.nodes().map(|n| fitter.fit_node(n)).collect()
        };
        let lines = fitted
            .iter()
            .map(|m| m.text.line_count)
            .fold(schema_lines, usize::max);
        for (node, metrics) in self.tree.nodes_mut().zip(fitted) {
            node.metrics = Some(metrics);
        }
        self.ctx = ctx.with_line_count(lines);
    }

    /// Lay out the visible tree and run one reconciliation pass anchored on `source`
    fn relayout(&mut self, source: NodeId) -> PassSummary {
        let Some(layout) = TidyTree::new(&self.ctx).layout(&mut self.tree) else {
            return PassSummary::default();
        };
        let summary = self
            .reconciler
            .pass(&self.tree, &layout, source, &self.ctx, self.container);
        self.tree.stash_positions();
        summary
    }

    /// Resize the drawing surface; re-lays out from the root when it changed
    pub fn set_container(&mut self, container: Vec2) -> Option<PassSummary> {
        if container == self.container {
            return None;
        }
        self.container = container;
        let root = self.tree.root()?;
        Some(self.relayout(root))
    }

    /// Expand or collapse a node and animate the change
    pub fn toggle(&mut self, id: NodeId) -> Option<PassSummary> {
        let interactive = self.tree.get(id).is_some_and(TreeNode::is_interactive);
        if !interactive || !self.tree.toggle(id) {
            return None;
        }
        tracing::debug!(node = %id, "toggle");
        Some(self.relayout(id))
    }

    /// Handle a click at a world position
    pub fn click(&mut self, world: Pos2) -> ClickOutcome {
        let frame = self.reconciler.frame();
        let Some(hit) = InputHandler::hit_test(&frame, &self.tree, &self.ctx, world) else {
            return ClickOutcome::Ignored;
        };
        let outcome = InputHandler::resolve_click(&self.tree, hit);
        if let ClickOutcome::Toggled(id) = outcome {
            self.toggle(id);
        }
        outcome
    }

    pub fn tick(&mut self, dt: f32) -> bool {
        self.reconciler.tick(dt)
    }

    pub fn frame(&self) -> Frame {
        self.reconciler.frame()
    }

    /// Paint into all available space. Returns the outcome of a click, if any;
    /// navigation is left to the caller.
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Option<ClickOutcome> {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click());
        let rect = response.rect;
        self.set_container(rect.size());
        self.tick(ui.input(|i| i.stable_dt));

        let frame = self.reconciler.frame();
        if frame.nodes.is_empty() {
            return None;
        }
        let transform = ScreenTransform::fit(frame.view, rect);

        self.input.hovered = response.hover_pos().and_then(|pos| {
            InputHandler::hit_test(&frame, &self.tree, &self.ctx, transform.to_world(pos))
        });
        if self.input.hovered.is_some() {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        }

        let hovered = self.input.hovered_node();
        self.renderer
            .render(&painter, &frame, &self.tree, &self.ctx, &transform, hovered);

        let outcome = response
            .clicked()
            .then(|| response.interact_pointer_pos())
            .flatten()
            .map(|pos| self.click(transform.to_world(pos)));

        if self.is_animating() || matches!(outcome, Some(ClickOutcome::Toggled(_))) {
            ui.ctx().request_repaint();
        }
        outcome
    }
}
