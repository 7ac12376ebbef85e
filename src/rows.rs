//! Tabular input from the host
//!
//! A query result is an ordered list of [`Row`]s plus an ordered list of
//! [`Dimension`] descriptors: `[parent id, child id, name?, values...]`.
//! [`RowSchema::from_dimensions`] validates the descriptor list once, before
//! the tree builder reads any row.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HierarchyError;

/// Minimum dimensions: parent id + child id
pub const MIN_DIMENSIONS: usize = 2;

// =============================================================================
// CELLS
// =============================================================================

/// Typed cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Identity key used to match parent ids against child ids.
    ///
    /// `None` for null, so a null parent id never matches a node.
    pub fn key(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(x) => write!(f, "{x}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Cell {
    #[serde(default)]
    pub value: CellValue,
    /// Rich rendering of the value; may embed an anchor used for navigation
    #[serde(default, alias = "formattedHtml", skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkable: Option<bool>,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            html: None,
            linkable: None,
        }
    }

    pub fn null() -> Self {
        Self::default()
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }
}

// =============================================================================
// ROW ATTRIBUTES
// =============================================================================

/// Link stroke variant requested by a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Weak,
    Strong,
}

/// Direction of the arrowhead relative to the tree orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Down,
    Up,
}

/// Reserved per-row attributes that steer rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RowAttributes {
    /// Cascade marker; any value above -1 flags a cascade link
    #[serde(rename = "Cascade", skip_serializing_if = "Option::is_none")]
    pub cascade: Option<i64>,
    /// Present on "load more" placeholder rows
    #[serde(rename = "rowOffset", skip_serializing_if = "Option::is_none")]
    pub row_offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkKind>,
    /// Explicit node fill, overriding the host colors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub direction: Direction,
    /// Count shown on the left badge of right-oriented nodes
    #[serde(rename = "parentCount", skip_serializing_if = "Option::is_none")]
    pub parent_count: Option<usize>,
}

impl RowAttributes {
    pub fn is_cascade(&self) -> bool {
        self.cascade.is_some_and(|c| c > -1)
    }

    /// A nonzero row offset marks a "load more" placeholder row
    pub fn is_load_more(&self) -> bool {
        self.row_offset.is_some_and(|offset| offset > 0)
    }
}

// =============================================================================
// ROW
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Row {
    pub cells: HashMap<String, Cell>,
    #[serde(default)]
    pub attributes: RowAttributes,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style cell insertion
    pub fn cell(mut self, dimension: impl Into<String>, cell: Cell) -> Self {
        self.cells.insert(dimension.into(), cell);
        self
    }

    pub fn get(&self, dimension: &str) -> Option<&Cell> {
        self.cells.get(dimension)
    }
}

// =============================================================================
// SCHEMA
// =============================================================================

/// Dimension-like field descriptor supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Dimension {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
        }
    }
}

/// Validated role assignment of the ordered dimension list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSchema {
    pub parent: String,
    pub child: String,
    pub name: Option<String>,
    pub values: Vec<String>,
}

impl RowSchema {
    pub fn from_dimensions(dimensions: &[Dimension]) -> Result<Self, HierarchyError> {
        match dimensions {
            [parent, child, rest @ ..] => {
                let (name, values) = match rest {
                    [name, values @ ..] => (
                        Some(name.name.clone()),
                        values.iter().map(|d| d.name.clone()).collect(),
                    ),
                    [] => (None, Vec::new()),
                };
                Ok(Self {
                    parent: parent.name.clone(),
                    child: child.name.clone(),
                    name,
                    values,
                })
            }
            _ => Err(HierarchyError::TooFewDimensions {
                found: dimensions.len(),
                required: MIN_DIMENSIONS,
            }),
        }
    }

    /// Text lines per node implied by the schema: every dimension after the
    /// two ids, and never fewer than one.
    pub fn content_lines(&self) -> usize {
        (usize::from(self.name.is_some()) + self.values.len()).max(1)
    }
}
