//! Host-facing surface: create once, update on every data, option or size change.

use egui::{Color32, RichText, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::VisOptions;
use crate::error::HierarchyError;
use crate::graph::{ClickOutcome, FontMeasurer, HierarchyWidget, PassSummary, TextMeasure};
use crate::rows::{Dimension, Row};

/// A query result as the host delivers it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QueryResponse {
    /// Dimension-like fields in order: parent id, child id, name, values...
    #[serde(alias = "dimension_like")]
    pub dimensions: Vec<Dimension>,
    #[serde(alias = "data")]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub options: VisOptions,
}

impl QueryResponse {
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}

/// Validation failure reported back to the host
#[derive(Debug, Clone, PartialEq)]
pub struct VisError {
    pub title: String,
    pub message: String,
}

impl From<&HierarchyError> for VisError {
    fn from(err: &HierarchyError) -> Self {
        let title = match err {
            HierarchyError::TooFewDimensions { .. } => "Not enough dimensions",
            HierarchyError::MissingCell { .. } | HierarchyError::MissingChildId { .. } => {
                "Incomplete row"
            }
            HierarchyError::Config(_) => "Invalid settings",
        };
        Self {
            title: title.to_owned(),
            message: err.to_string(),
        }
    }
}

/// The visualization as mounted in a host surface
pub struct HierarchyVis<M: TextMeasure = FontMeasurer> {
    widget: HierarchyWidget<M>,
    error: Option<VisError>,
}

impl HierarchyVis<FontMeasurer> {
    /// Allocate the drawing state once
    pub fn create() -> Self {
        Self::with_widget(HierarchyWidget::new())
    }
}

impl<M: TextMeasure> HierarchyVis<M> {
    pub fn with_widget(widget: HierarchyWidget<M>) -> Self {
        Self {
            widget,
            error: None,
        }
    }

    /// Rebuild, lay out and reconcile for new data. A validation failure is
    /// kept for display and nothing is drawn.
    pub fn update(
        &mut self,
        response: &QueryResponse,
        container: Vec2,
    ) -> Result<PassSummary, HierarchyError> {
        match self.widget.update(
            &response.rows,
            &response.dimensions,
            &response.options,
            container,
        ) {
            Ok(summary) => {
                self.error = None;
                Ok(summary)
            }
            Err(err) => {
                tracing::warn!(error = %err, "hierarchy update rejected");
                self.error = Some(VisError::from(&err));
                Err(err)
            }
        }
    }

    pub fn error(&self) -> Option<&VisError> {
        self.error.as_ref()
    }

    pub fn widget(&self) -> &HierarchyWidget<M> {
        &self.widget
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) -> Option<ClickOutcome> {
        if let Some(error) = &self.error {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(&error.title).strong().color(Color32::DARK_RED));
                ui.label(&error.message);
            });
            return None;
        }
        self.widget.ui(ui)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_json_with_aliases() {
        let json = r##"{
            "dimension_like": [{"name": "parent"}, {"name": "child"}, {"name": "name"}],
            "data": [
                {"cells": {"parent": {"value": null}, "child": {"value": "A"}, "name": {"value": "Root"}}},
                {"cells": {"parent": {"value": "A"}, "child": {"value": "B"}, "name": {"value": "Child"}},
                 "attributes": {"Cascade": 0, "link": "weak"}}
            ],
            "options": {"colorWithChildren": "#123456"}
        }"##;
        let response = QueryResponse::from_json(json).unwrap();
        assert_eq!(response.dimensions.len(), 3);
        assert_eq!(response.rows.len(), 2);
        assert!(response.rows[1].attributes.is_cascade());
        assert_eq!(response.options.color_with_children, "#123456");
    }

    #[test]
    fn validation_errors_have_titles() {
        let err = HierarchyError::TooFewDimensions {
            found: 1,
            required: 2,
        };
        let vis_error = VisError::from(&err);
        assert_eq!(vis_error.title, "Not enough dimensions");
        assert!(vis_error.message.contains("at least 2"));
    }
}
