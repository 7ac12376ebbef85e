//! Widget settings and host options
//!
//! Layout and animation constants come from `config/hierarchy_settings.yaml`,
//! embedded at compile time and parsed once. Host options (node colors) are
//! supplied per update by the host.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::HierarchyError;

const EMBEDDED_SETTINGS: &str = include_str!("../config/hierarchy_settings.yaml");

static SETTINGS: OnceLock<HierarchySettings> = OnceLock::new();

/// Process-wide settings, parsed from the embedded YAML on first use.
///
/// Falls back to [`HierarchySettings::default`] if the embedded file fails to
/// parse.
pub fn global_config() -> &'static HierarchySettings {
    SETTINGS.get_or_init(|| match HierarchySettings::from_yaml(EMBEDDED_SETTINGS) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!("hierarchy settings: {err}; using built-in defaults");
            HierarchySettings::default()
        }
    })
}

// =============================================================================
// SETTINGS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HierarchySettings {
    pub text: TextSettings,
    pub node: NodeSettings,
    pub spacing: SpacingSettings,
    pub animation: AnimationSettings,
    pub options: VisOptions,
}

impl HierarchySettings {
    pub fn from_yaml(source: &str) -> Result<Self, HierarchyError> {
        serde_yaml::from_str(source).map_err(|e| HierarchyError::Config(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    /// Label font size
    pub size: f32,
    /// Font size of the secondary value lines
    pub value_size: f32,
    /// Font size of the count badges
    pub count_size: f32,
    /// Gap between text lines and around the text block
    pub leading: f32,
    /// Upper bound on wrapped label lines
    pub max_label_lines: usize,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            size: 13.0,
            value_size: 11.0,
            count_size: 11.0,
            leading: 4.0,
            max_label_lines: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    pub width: f32,
    /// Corner radius of the node box, also the text inset when no badge is shown
    pub radius: f32,
    /// Padding around count badge text
    pub count_border: f32,
    pub selection_stroke: f32,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            width: 200.0,
            radius: 19.0,
            count_border: 8.0,
            selection_stroke: 1.5,
        }
    }
}

/// Gaps between node boxes.
///
/// `depth` separates parent and child columns, `breadth` separates siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingSettings {
    pub depth: f32,
    pub breadth: f32,
}

impl Default for SpacingSettings {
    fn default() -> Self {
        Self {
            depth: 50.0,
            breadth: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub duration_ms: u64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self { duration_ms: 750 }
    }
}

impl AnimationSettings {
    pub fn duration_secs(&self) -> f32 {
        self.duration_ms as f32 / 1000.0
    }
}

// =============================================================================
// HOST OPTIONS
// =============================================================================

pub const DEFAULT_COLOR_WITH_CHILDREN: &str = "#36c1b3";
pub const DEFAULT_COLOR_EMPTY: &str = "#fff";

/// Options recognised from the host's configuration surface.
///
/// Accepts both `color_with_children` and `colorWithChildren` spellings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisOptions {
    /// Fill for nodes that have (visible or collapsed) children
    #[serde(alias = "colorWithChildren")]
    pub color_with_children: String,
    /// Fill for leaf nodes
    #[serde(alias = "colorEmpty")]
    pub color_empty: String,
}

impl Default for VisOptions {
    fn default() -> Self {
        Self {
            color_with_children: DEFAULT_COLOR_WITH_CHILDREN.to_string(),
            color_empty: DEFAULT_COLOR_EMPTY.to_string(),
        }
    }
}
