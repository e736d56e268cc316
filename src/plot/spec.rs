use serde::{Deserialize, Serialize};

use crate::color::{self, ColorSpec, Rgb};
use crate::data::ColumnReference;

fn default_x_label() -> String {
    "Time (s)".to_string()
}

fn default_y_label() -> String {
    "Value".to_string()
}

// ---------------------------------------------------------------------------
// PanelSpec – one subplot of a figure
// ---------------------------------------------------------------------------

/// Declarative description of one panel.
///
/// `labels` and `colors` are optional and positional. Resolution order for
/// series `i` is always: explicit entry → column fallback → palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PanelSpec {
    pub title: String,
    #[serde(default = "default_x_label")]
    pub x_label: String,
    #[serde(default = "default_y_label")]
    pub y_label: String,
    pub columns: Vec<ColumnReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<ColorSpec>,
}

impl PanelSpec {
    pub fn new(title: &str, columns: Vec<ColumnReference>) -> Self {
        PanelSpec {
            title: title.to_string(),
            x_label: default_x_label(),
            y_label: default_y_label(),
            columns,
            labels: Vec::new(),
            colors: Vec::new(),
        }
    }

    pub fn with_axes(mut self, x_label: &str, y_label: &str) -> Self {
        self.x_label = x_label.to_string();
        self.y_label = y_label.to_string();
        self
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_colors(mut self, colors: &[&str]) -> Self {
        self.colors = colors.iter().map(|&c| ColorSpec::from(c)).collect();
        self
    }

    /// Legend label of series `position`: the explicit label when present
    /// and non-empty, otherwise `fallback` (header name or derived key).
    pub fn label_for(&self, position: usize, fallback: &str) -> String {
        match self.labels.get(position) {
            Some(label) if !label.is_empty() => label.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Colour of series `position`. A shorter colour list is cycled; an
    /// empty one falls back to the default categorical cycle.
    pub fn color_for(&self, position: usize) -> Rgb {
        if self.colors.is_empty() {
            return color::default_color(position);
        }
        let spec = &self.colors[position % self.colors.len()];
        color::resolve(spec, position, self.columns.len())
    }
}

/// A window of stacked panels sharing one time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FigureSpec {
    pub window_title: String,
    pub panels: Vec<PanelSpec>,
}
