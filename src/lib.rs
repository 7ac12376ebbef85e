//! Collapsible, animated node-link tree visualization for egui
//!
//! Builds a tree from flat parent/child rows, fits node text into fixed-width
//! boxes, lays the visible part out as a tidy tree, and animates expand and
//! collapse transitions.

pub mod config;
pub mod error;
pub mod graph;
pub mod plugin;
pub mod rows;

pub use config::{global_config, HierarchySettings, VisOptions};
pub use error::HierarchyError;
pub use graph::{ClickOutcome, HierarchyWidget, NodeId, Tree, TreeNode};
pub use plugin::{HierarchyVis, QueryResponse, VisError};
pub use rows::{Cell, CellValue, Dimension, Row, RowAttributes, RowSchema};
