//! End-to-end scenarios through the widget: build, collapse/expand, and
//! multi-root rendering.

use egui::{Pos2, Vec2};
use hierarchy_graph::graph::text_fit::FragmentKind;
use hierarchy_graph::graph::{ClickOutcome, NodeId, Phase, TextMeasure};
use hierarchy_graph::{
    Cell, CellValue, Dimension, HierarchyError, HierarchySettings, HierarchyVis, HierarchyWidget,
    QueryResponse, Row, VisOptions,
};
use pretty_assertions::assert_eq;

/// Every glyph is 0.6em wide
struct FixedAdvance;

impl TextMeasure for FixedAdvance {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.6
    }
}

const CONTAINER: Vec2 = Vec2::new(1000.0, 600.0);

fn dims(names: &[&str]) -> Vec<Dimension> {
    names.iter().map(|n| Dimension::new(*n)).collect()
}

fn row(parent: Option<&str>, child: &str, name: &str) -> Row {
    let parent = match parent {
        Some(p) => Cell::new(p),
        None => Cell::new(CellValue::Null),
    };
    Row::new()
        .cell("parent", parent)
        .cell("child", Cell::new(child))
        .cell("name", Cell::new(name))
}

fn widget() -> HierarchyWidget<FixedAdvance> {
    HierarchyWidget::with_measure(FixedAdvance, HierarchySettings::default())
}

fn id_of(widget: &HierarchyWidget<FixedAdvance>, source: &str) -> NodeId {
    widget
        .tree()
        .find_by_source(source)
        .map(|n| n.id)
        .unwrap_or_else(|| panic!("no node {source}"))
}

fn visible_sources(widget: &HierarchyWidget<FixedAdvance>) -> Vec<String> {
    widget
        .tree()
        .visible()
        .into_iter()
        .filter_map(|id| widget.tree().get(id))
        .map(|n| n.source_id.as_str().unwrap_or("<root>").to_string())
        .collect()
}

#[test]
fn single_root_collapse_and_expand_preserves_nodes() {
    let rows = vec![
        row(None, "A", "Root"),
        row(Some("A"), "B", "Child B"),
        row(Some("A"), "C", "Child C"),
    ];
    let mut w = widget();
    w.update(&rows, &dims(&["parent", "child", "name"]), &VisOptions::default(), CONTAINER)
        .unwrap();

    let a = id_of(&w, "A");
    let b = id_of(&w, "B");
    let c = id_of(&w, "C");
    assert_eq!(w.tree().root(), Some(a));
    let root = w.tree().get(a).unwrap();
    assert_eq!(root.child_count, 2);
    assert_eq!(root.children, vec![b, c]);
    assert_eq!(w.tree().get(b).unwrap().depth, 1);
    assert_eq!(w.tree().get(c).unwrap().depth, 1);
    assert_eq!(visible_sources(&w), vec!["A", "B", "C"]);

    let before_b = w.tree().get(b).unwrap().clone();
    let before_c = w.tree().get(c).unwrap().clone();

    let summary = w.toggle(a).unwrap();
    assert_eq!(summary.exiting, vec![b, c]);
    assert_eq!(visible_sources(&w), vec!["A"]);
    assert_eq!(w.tree().get(a).unwrap().collapsed_children, vec![b, c]);
    assert!(w.tree().get(a).unwrap().children.is_empty());

    w.tick(1.0);
    let summary = w.toggle(a).unwrap();
    assert_eq!(summary.entering, vec![b, c]);
    assert_eq!(w.tree().get(a).unwrap().children, vec![b, c]);

    // same arena entries, same content and layout slot
    let after_b = w.tree().get(b).unwrap();
    assert_eq!(after_b.name, before_b.name);
    assert_eq!(after_b.metrics, before_b.metrics);
    assert_eq!((after_b.x, after_b.y), (before_b.x, before_b.y));
    assert_eq!(w.tree().get(c).unwrap().name, before_c.name);
}

#[test]
fn two_roots_render_under_invisible_synthetic_root() {
    let rows = vec![
        row(None, "A", "Alpha"),
        row(Some("A"), "B", "Beta"),
        row(None, "X", "Ex"),
    ];
    let mut w = widget();
    w.update(&rows, &dims(&["parent", "child", "name"]), &VisOptions::default(), CONTAINER)
        .unwrap();

    let root_id = w.tree().root().unwrap();
    let root = w.tree().get(root_id).unwrap();
    assert!(root.is_synthetic());
    assert_eq!(root.children.len(), 2);
    assert!(w.report().synthetic_root);

    let a = id_of(&w, "A");
    let x = id_of(&w, "X");
    let b = id_of(&w, "B");
    assert_eq!(w.tree().get(a).unwrap().depth, 1);
    assert_eq!(w.tree().get(x).unwrap().depth, 1);
    assert_eq!(w.tree().get(b).unwrap().depth, 2);
    // roots' children start collapsed
    assert_eq!(visible_sources(&w), vec!["<root>", "A", "X"]);

    w.tick(1.0);
    let frame = w.frame();
    assert_eq!(frame.node(root_id).unwrap().opacity, 0.0);
    for id in [a, x] {
        let node = frame.node(id).unwrap();
        assert_eq!(node.opacity, 1.0);
        assert_eq!(node.phase, Phase::Updating);
        assert_eq!(node.center.x, w.context().depth_step());
    }

    // the synthetic root cannot be toggled
    assert!(w.toggle(root_id).is_none());
}

#[test]
fn clicking_a_collapsed_node_expands_it() {
    let rows = vec![
        row(None, "A", "Alpha"),
        row(Some("A"), "B", "Beta"),
        row(Some("B"), "D", "Delta"),
    ];
    let mut w = widget();
    w.update(&rows, &dims(&["parent", "child", "name"]), &VisOptions::default(), CONTAINER)
        .unwrap();
    w.tick(1.0);

    let b = id_of(&w, "B");
    let center = w.frame().node(b).unwrap().center;
    // right edge of the box, away from the label
    let outcome = w.click(Pos2::new(center.x + 95.0, center.y));
    assert_eq!(outcome, ClickOutcome::Toggled(b));
    assert_eq!(visible_sources(&w), vec!["A", "B", "D"]);

    assert_eq!(w.click(Pos2::new(-5000.0, 0.0)), ClickOutcome::Ignored);
}

#[test]
fn long_labels_grow_every_node_box() {
    let rows = vec![
        row(None, "A", "Root"),
        row(Some("A"), "B", "A considerably longer organisational unit name"),
    ];
    let mut w = widget();
    w.update(&rows, &dims(&["parent", "child", "name"]), &VisOptions::default(), CONTAINER)
        .unwrap();
    assert_eq!(w.context().line_count, 2);

    let b = w.tree().get(id_of(&w, "B")).unwrap();
    let text = &b.metrics.as_ref().unwrap().text;
    assert_eq!(text.line_count, 2);
    assert!(text.fragments.iter().all(|f| f.kind == FragmentKind::Label));
}

#[test]
fn too_few_dimensions_is_reported_and_draws_nothing() {
    let mut vis = HierarchyVis::with_widget(widget());
    let response = QueryResponse {
        dimensions: dims(&["child"]),
        rows: vec![row(None, "A", "Root")],
        options: VisOptions::default(),
    };
    let err = vis.update(&response, CONTAINER).unwrap_err();
    assert_eq!(err, HierarchyError::TooFewDimensions { found: 1, required: 2 });
    assert_eq!(vis.error().unwrap().title, "Not enough dimensions");
    assert!(vis.widget().tree().is_empty());
    assert!(vis.widget().frame().nodes.is_empty());
}

#[test]
fn refresh_replaces_previous_tree() {
    let mut w = widget();
    let d = dims(&["parent", "child", "name"]);
    w.update(&[row(None, "A", "Alpha")], &d, &VisOptions::default(), CONTAINER)
        .unwrap();
    w.update(&[row(None, "Z", "Zed")], &d, &VisOptions::default(), CONTAINER)
        .unwrap();
    assert_eq!(visible_sources(&w), vec!["Z"]);
    assert_eq!(w.frame().nodes.len(), 1);
}

#[test]
fn very_deep_chain_updates_without_overflow() {
    let n = 100_000;
    let mut rows = vec![row(None, "0", "n0")];
    rows.extend((1..n).map(|i| {
        let parent = (i - 1).to_string();
        row(Some(parent.as_str()), &i.to_string(), &format!("n{i}"))
    }));
    let mut w = widget();
    w.update(&rows, &dims(&["parent", "child", "name"]), &VisOptions::default(), CONTAINER)
        .unwrap();

    assert_eq!(visible_sources(&w), vec!["0", "1"]);
    let last = w.tree().find_by_source(&(n - 1).to_string()).unwrap();
    assert_eq!(last.depth, n - 1);

    let one = id_of(&w, "1");
    let summary = w.toggle(one).unwrap();
    assert_eq!(summary.entering, vec![id_of(&w, "2")]);
}

#[test]
fn parent_cycle_is_dropped_and_rest_renders() {
    let rows = vec![
        row(None, "A", "Alpha"),
        row(Some("A"), "B", "Beta"),
        row(Some("Q"), "P", "Pe"),
        row(Some("P"), "Q", "Qu"),
    ];
    let mut w = widget();
    w.update(&rows, &dims(&["parent", "child", "name"]), &VisOptions::default(), CONTAINER)
        .unwrap();

    assert_eq!(w.report().unreachable, vec!["P".to_string(), "Q".to_string()]);
    assert!(!w.report().synthetic_root);
    assert_eq!(visible_sources(&w), vec!["A", "B"]);
    assert_eq!(w.frame().nodes.len(), 2);
}
