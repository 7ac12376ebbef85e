//! Text fitting - wrap and truncate labels into the fixed node width
//!
//! Widths come from a [`TextMeasure`] implementation. In the widget that is
//! egui's font system ([`FontMeasurer`]), which lays out real glyphs; a
//! non-finite width is treated as "does not fit".
//!
//! Two modes:
//! - value lines present: the label and every value get one line each,
//!   truncated with an ellipsis
//! - label only: greedy word wrap over up to `max_label_lines` lines; an
//!   unbreakable word is hyphenated on an inner line, the last line ends in
//!   an ellipsis

use std::collections::VecDeque;

use egui::epaint::text::{FontDefinitions, Fonts};
use egui::{Color32, FontId};

use super::layout::LayoutContext;
use super::types::TreeNode;

pub const ELLIPSIS: &str = "…";
pub const HYPHEN: &str = "-";

// =============================================================================
// MEASUREMENT
// =============================================================================

/// Rendered text width in logical pixels for a proportional font of `font_size`
pub trait TextMeasure {
    fn text_width(&self, text: &str, font_size: f32) -> f32;

    fn fits(&self, text: &str, font_size: f32, budget: f32) -> bool {
        let width = self.text_width(text, font_size);
        if !width.is_finite() {
            tracing::warn!(text, "non-finite text width; treating as overflow");
            return false;
        }
        width <= budget
    }
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        (**self).text_width(text, font_size)
    }
}

impl TextMeasure for Fonts {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        self.layout_no_wrap(
            text.to_owned(),
            FontId::proportional(font_size),
            Color32::BLACK,
        )
        .size()
        .x
    }
}

/// Owns an egui font system so text can be measured outside a frame
pub struct FontMeasurer {
    fonts: Fonts,
}

impl FontMeasurer {
    /// Fonts at 1 pixel per point with egui's bundled font definitions
    pub fn new() -> Self {
        Self::with_definitions(FontDefinitions::default())
    }

    pub fn with_definitions(definitions: FontDefinitions) -> Self {
        Self {
            fonts: Fonts::new(1.0, 2048, definitions),
        }
    }
}

impl Default for FontMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasure for FontMeasurer {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        self.fonts.text_width(text, font_size)
    }
}

// =============================================================================
// FITTED TEXT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Label,
    Value,
}

/// One rendered line, positioned relative to the node center
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub line: usize,
    pub kind: FragmentKind,
    pub font_size: f32,
    /// Left edge of the text column
    pub x: f32,
    /// Top of the line
    pub y: f32,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FittedText {
    pub fragments: Vec<TextFragment>,
    /// Lines consumed (at least one)
    pub line_count: usize,
}

/// Measured count pill
#[derive(Debug, Clone, PartialEq)]
pub struct CountBadge {
    pub text: String,
    /// Text width, clamped to the minimum pill content width
    pub length: f32,
}

/// Everything the renderer needs to draw a node's text, cached on the node
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeMetrics {
    pub left_badge: Option<CountBadge>,
    pub right_badge: Option<CountBadge>,
    pub text: FittedText,
}

// =============================================================================
// PRIMITIVES
// =============================================================================

/// Truncate `text` to fit `budget`, appending `suffix` when shortened.
///
/// Returns the fitted string and whether it was shortened. Keeps at least one
/// character before the suffix.
pub fn truncate<M: TextMeasure>(
    measure: &M,
    text: &str,
    font_size: f32,
    budget: f32,
    suffix: &str,
) -> (String, bool) {
    if measure.fits(text, font_size, budget) {
        return (text.to_string(), false);
    }
    let (head, _) = split_to_fit(measure, text, font_size, budget, suffix);
    (head, true)
}

/// Longest prefix of `text` that fits with `suffix` appended, and the rest.
fn split_to_fit<M: TextMeasure>(
    measure: &M,
    text: &str,
    font_size: f32,
    budget: f32,
    suffix: &str,
) -> (String, String) {
    let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).skip(1).collect();
    for &end in boundaries.iter().rev() {
        let candidate = format!("{}{suffix}", &text[..end]);
        if measure.fits(&candidate, font_size, budget) {
            return (candidate, text[end..].to_string());
        }
    }
    let first = boundaries.first().copied().unwrap_or(text.len());
    (format!("{}{suffix}", &text[..first]), text[first..].to_string())
}

/// Greedy word wrap with hyphenation and a final ellipsis.
///
/// Returns `(line text, truncated)` per line, at most `max_lines` lines.
pub fn wrap_label<M: TextMeasure>(
    measure: &M,
    text: &str,
    font_size: f32,
    budget: f32,
    max_lines: usize,
) -> Vec<(String, bool)> {
    let max_lines = max_lines.max(1);
    if measure.fits(text, font_size, budget) {
        return vec![(text.to_string(), false)];
    }

    let mut words: VecDeque<String> = text.split_whitespace().map(str::to_string).collect();
    let mut lines: Vec<(String, bool)> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    while let Some(word) = words.pop_front() {
        current.push(word);
        let line_text = current.join(" ");
        if measure.fits(&line_text, font_size, budget) {
            continue;
        }

        let last_line = lines.len() + 1 >= max_lines;
        if current.len() == 1 || last_line {
            let suffix = if last_line { ELLIPSIS } else { HYPHEN };
            let (head, rest) = split_to_fit(measure, &line_text, font_size, budget, suffix);
            lines.push((head, true));
            current.clear();
            if last_line {
                break;
            }
            if !rest.is_empty() {
                words.push_front(rest);
            }
        } else if let Some(overflow) = current.pop() {
            lines.push((current.join(" "), false));
            current.clear();
            words.push_front(overflow);
        }
    }

    if !current.is_empty() {
        lines.push((current.join(" "), false));
    }
    if lines.is_empty() {
        lines.push((String::new(), false));
    }
    lines
}

// =============================================================================
// NODE FITTING
// =============================================================================

/// Fits node text into the box geometry described by `ctx`
pub struct TextFitter<'a, M: TextMeasure> {
    measure: &'a M,
    ctx: &'a LayoutContext,
}

impl<'a, M: TextMeasure> TextFitter<'a, M> {
    pub fn new(measure: &'a M, ctx: &'a LayoutContext) -> Self {
        Self { measure, ctx }
    }

    /// Measure badges, then fit the label and value lines between them
    pub fn fit_node(&self, node: &TreeNode) -> NodeMetrics {
        let count = (node.child_count > 0).then(|| node.child_count.to_string());
        let parent_count = node
            .attributes
            .parent_count
            .filter(|&c| c > 0)
            .map(|c| c.to_string());

        let left_text = if node.right { parent_count } else { count.clone() };
        let right_text = if node.right { count } else { None };

        let left_badge = left_text.map(|t| self.badge(t));
        let right_badge = right_text.map(|t| self.badge(t));

        let (left, right) = self.ctx.text_column(
            left_badge.as_ref().map(|b| b.length),
            right_badge.as_ref().map(|b| b.length),
        );
        let text = self.fit_text(node, left, right - left);

        NodeMetrics {
            left_badge,
            right_badge,
            text,
        }
    }

    fn badge(&self, text: String) -> CountBadge {
        let min = self.ctx.min_count_length();
        let width = self.measure.text_width(&text, self.ctx.count_text_size);
        let length = if width.is_finite() { width.max(min) } else { min };
        CountBadge { text, length }
    }

    /// Fit label/value lines into a column starting at `x` of width `budget`
    pub fn fit_text(&self, node: &TreeNode, x: f32, budget: f32) -> FittedText {
        let label_size = self.ctx.text_size;
        let value_size = self.ctx.value_text_size;

        let mut lines: Vec<(String, bool, FragmentKind, f32)> = Vec::new();
        if node.value_lines.is_empty() {
            for (text, truncated) in wrap_label(
                self.measure,
                &node.name,
                label_size,
                budget,
                self.ctx.max_label_lines,
            ) {
                lines.push((text, truncated, FragmentKind::Label, label_size));
            }
        } else {
            if !node.name.is_empty() {
                let (text, truncated) =
                    truncate(self.measure, &node.name, label_size, budget, ELLIPSIS);
                lines.push((text, truncated, FragmentKind::Label, label_size));
            }
            for value in node.value_lines.iter().filter(|v| !v.is_empty()) {
                let (text, truncated) = truncate(self.measure, value, value_size, budget, ELLIPSIS);
                lines.push((text, truncated, FragmentKind::Value, value_size));
            }
        }

        // Stack lines, centered on the node's cross axis
        let leading = self.ctx.leading;
        let block: f32 = lines.iter().map(|l| l.3).sum::<f32>()
            + leading * lines.len().saturating_sub(1) as f32;
        let mut y = -block / 2.0;
        let fragments: Vec<TextFragment> = lines
            .into_iter()
            .enumerate()
            .filter(|(_, (text, ..))| !text.is_empty())
            .map(|(line, (text, truncated, kind, font_size))| {
                let fragment = TextFragment {
                    text,
                    line,
                    kind,
                    font_size,
                    x,
                    y,
                    truncated,
                };
                y += font_size + leading;
                fragment
            })
            .collect();

        let line_count = fragments.len().max(1);
        FittedText {
            fragments,
            line_count,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::HierarchySettings;
    use crate::graph::types::{NodeId, SourceId};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// Fixed advance per char (scaled by font size / 10)
    pub(crate) struct MonoMeasure(pub f32);

    impl TextMeasure for MonoMeasure {
        fn text_width(&self, text: &str, font_size: f32) -> f32 {
            text.chars().count() as f32 * self.0 * font_size / 10.0
        }
    }

    struct BrokenMeasure;

    impl TextMeasure for BrokenMeasure {
        fn text_width(&self, _text: &str, _font_size: f32) -> f32 {
            f32::NAN
        }
    }

    // 10px per char at size 10
    const M: MonoMeasure = MonoMeasure(10.0);

    fn texts(lines: &[(String, bool)]) -> Vec<&str> {
        lines.iter().map(|(t, _)| t.as_str()).collect()
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate(&M, "abc", 10.0, 100.0, ELLIPSIS), ("abc".into(), false));
    }

    #[test]
    fn truncate_appends_ellipsis() {
        // "abcdefghij" = 100px, budget 60 -> 5 chars + ellipsis
        let (text, truncated) = truncate(&M, "abcdefghij", 10.0, 60.0, ELLIPSIS);
        assert_eq!(text, "abcde…");
        assert!(truncated);
    }

    #[test]
    fn truncate_keeps_one_character() {
        let (text, _) = truncate(&M, "abcdef", 10.0, 5.0, ELLIPSIS);
        assert_eq!(text, "a…");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let (text, _) = truncate(&M, "ééééé", 10.0, 30.0, ELLIPSIS);
        assert_eq!(text, "éé…");
    }

    #[test]
    fn broken_measurement_forces_truncation() {
        let (text, truncated) = truncate(&BrokenMeasure, "abc", 10.0, 1000.0, ELLIPSIS);
        assert!(truncated);
        assert_eq!(text, "a…");
    }

    #[test]
    fn wrap_moves_words_to_second_line() {
        // budget 100px = 10 chars
        let lines = wrap_label(&M, "alpha beta gamma", 10.0, 100.0, 2);
        assert_eq!(texts(&lines), vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn wrap_ellipsizes_second_line() {
        let lines = wrap_label(&M, "alpha beta gamma delta epsilon", 10.0, 100.0, 2);
        assert_eq!(texts(&lines), vec!["alpha beta", "gamma del…"]);
        assert!(lines[1].1);
    }

    #[test]
    fn wrap_hyphenates_long_first_word() {
        let lines = wrap_label(&M, "abcdefghijklmno xy", 10.0, 100.0, 2);
        assert_eq!(texts(&lines), vec!["abcdefghi-", "jklmno xy"]);
    }

    #[test]
    fn wrap_never_exceeds_max_lines() {
        let text = "one two three four five six seven eight nine ten";
        for max in 1..4 {
            let lines = wrap_label(&M, text, 10.0, 60.0, max);
            assert!(lines.len() <= max);
            for (line, _) in &lines {
                assert!(M.text_width(line, 10.0) <= 60.0, "{line} overflows");
            }
        }
    }

    #[test]
    fn wrap_truncates_lone_overflowing_word_on_last_line() {
        let lines = wrap_label(&M, "ab abcdefghijklmnop", 10.0, 100.0, 2);
        assert_eq!(texts(&lines), vec!["ab", "abcdefghi…"]);
    }

    fn node(name: &str, values: &[&str]) -> TreeNode {
        let mut node = TreeNode::new(NodeId(0), SourceId::Row("n".into()));
        node.name = name.into();
        node.value_lines = values.iter().map(|v| v.to_string()).collect();
        node
    }

    #[test]
    fn value_mode_gives_one_line_each() {
        let ctx = LayoutContext::new(&HierarchySettings::default(), 3);
        let fitter = TextFitter::new(&M, &ctx);
        let fitted = fitter.fit_text(&node("Name", &["v1", "", "v3"]), 0.0, 1000.0);
        let kinds: Vec<FragmentKind> = fitted.fragments.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![FragmentKind::Label, FragmentKind::Value, FragmentKind::Value]
        );
        assert_eq!(fitted.line_count, 3);
        assert!(fitted.fragments[0].y < fitted.fragments[1].y);
    }

    #[test]
    fn badges_follow_orientation() {
        let ctx = LayoutContext::new(&HierarchySettings::default(), 1);
        let fitter = TextFitter::new(&M, &ctx);

        let mut right = node("Right", &[]);
        right.child_count = 3;
        let metrics = fitter.fit_node(&right);
        assert!(metrics.left_badge.is_none());
        assert_eq!(metrics.right_badge.as_ref().unwrap().text, "3");

        let mut left = node("Left", &[]);
        left.right = false;
        left.child_count = 12;
        let metrics = fitter.fit_node(&left);
        assert!(metrics.right_badge.is_none());
        let badge = metrics.left_badge.unwrap();
        assert_eq!(badge.text, "12");
        // 2 chars at size 11 = 22px, above the 6px minimum
        assert!((badge.length - 22.0).abs() < 1e-4);
    }

    #[test]
    fn badge_length_is_clamped_to_minimum() {
        let ctx = LayoutContext::new(&HierarchySettings::default(), 1);
        let fitter = TextFitter::new(&MonoMeasure(1.0), &ctx);
        let mut n = node("N", &[]);
        n.child_count = 1;
        let badge = fitter.fit_node(&n).right_badge.unwrap();
        assert_eq!(badge.length, ctx.min_count_length());
    }

    #[test]
    fn egui_fonts_measure_real_glyphs() {
        let fonts = FontMeasurer::new();
        let narrow = fonts.text_width("iiii", 13.0);
        let wide = fonts.text_width("WWWW", 13.0);
        assert!(narrow > 0.0);
        assert!(wide > narrow);
        let (text, truncated) = truncate(&fonts, "A rather long label for a box", 13.0, 60.0, ELLIPSIS);
        assert!(truncated);
        assert!(fonts.text_width(&text, 13.0) <= 60.0);
    }

    proptest! {
        #[test]
        fn refit_is_identity(text in "[a-z ]{0,40}", budget in 20.0f32..300.0) {
            let (once, _) = truncate(&M, &text, 10.0, budget, ELLIPSIS);
            let (twice, truncated) = truncate(&M, &once, 10.0, budget, ELLIPSIS);
            prop_assert_eq!(&once, &twice);
            prop_assert!(!truncated);
        }

        #[test]
        fn wider_budget_never_shortens(text in "[a-zA-Z]{1,40}", narrow in 5.0f32..200.0, extra in 0.0f32..200.0) {
            let (a, _) = truncate(&M, &text, 10.0, narrow, ELLIPSIS);
            let (b, _) = truncate(&M, &text, 10.0, narrow + extra, ELLIPSIS);
            let strip = |s: &str| s.trim_end_matches(ELLIPSIS).chars().count();
            prop_assert!(strip(&b) >= strip(&a));
        }
    }
}
