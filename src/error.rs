//! Error types for building and rendering a hierarchy.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HierarchyError {
    /// The query supplied fewer dimension-like fields than parent + child id.
    #[error("Hierarchy requires at least {required} dimensions, got {found}")]
    TooFewDimensions { found: usize, required: usize },

    /// A row has no cell for a required (parent or child id) dimension.
    #[error("Row {row} is missing required dimension '{dimension}'")]
    MissingCell { row: usize, dimension: String },

    /// A row's child id cell is null, so the node has no identity.
    #[error("Row {row} has a null child id")]
    MissingChildId { row: usize },

    #[error("Invalid settings: {0}")]
    Config(String),
}
