use std::fmt;

use serde::Serialize;

use super::spec::PanelSpec;
use crate::color::{serialize_hex, Rgb};
use crate::data::{ColumnReference, Dataset, DerivedSignals};

// ---------------------------------------------------------------------------
// Rendered output – what a drawing surface consumes
// ---------------------------------------------------------------------------

/// One resolved line of a panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSeries {
    pub label: String,
    #[serde(serialize_with = "serialize_hex")]
    pub color: Rgb,
    /// `[time, value]` pairs.
    pub points: Vec<[f64; 2]>,
}

/// Why a configured series was left out of its panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    MissingDerived { name: String },
    IndexOutOfRange { index: usize, count: usize },
    UnknownHeader { name: String },
    Malformed { column: String },
    LengthMismatch { expected: usize, found: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingDerived { name } => write!(f, "derived signal '{name}' not available"),
            SkipReason::IndexOutOfRange { index, count } => {
                write!(f, "column index {index} out of range (0..{count})")
            }
            SkipReason::UnknownHeader { name } => write!(f, "no column named '{name}'"),
            SkipReason::Malformed { column } => write!(f, "column '{column}' is not numeric"),
            SkipReason::LengthMismatch { expected, found } => {
                write!(f, "series has {found} values, time axis has {expected}")
            }
        }
    }
}

/// A series that could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSeries {
    pub position: usize,
    pub reference: ColumnReference,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPanel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<RenderedSeries>,
    pub skipped: Vec<SkippedSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedFigure {
    pub window_title: String,
    pub panels: Vec<RenderedPanel>,
}

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

/// Look up the values behind a reference plus the name used when the panel
/// has no explicit label.
fn resolve_column<'a>(
    reference: &ColumnReference,
    dataset: &'a Dataset,
    derived: &'a DerivedSignals,
) -> Result<(&'a [f64], String), SkipReason> {
    let index = match reference {
        ColumnReference::Derived(name) => {
            return derived
                .get(name)
                .map(|values| (values, name.clone()))
                .ok_or_else(|| SkipReason::MissingDerived { name: name.clone() });
        }
        ColumnReference::Index(i) => {
            if *i >= dataset.column_count() {
                return Err(SkipReason::IndexOutOfRange {
                    index: *i,
                    count: dataset.column_count(),
                });
            }
            *i
        }
        ColumnReference::Header(name) => dataset
            .index_of(name)
            .ok_or_else(|| SkipReason::UnknownHeader { name: name.clone() })?,
    };

    let header = dataset.header(index).unwrap_or_default().to_string();
    match dataset.values(index) {
        Ok(values) => Ok((values, header)),
        Err(_) => Err(SkipReason::Malformed { column: header }),
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Resolve one panel against the shared time axis.
///
/// Unresolvable series are skipped with a warning; the panel itself is
/// always produced, possibly with no series.
pub fn render_panel(
    spec: &PanelSpec,
    dataset: &Dataset,
    derived: &DerivedSignals,
    time: &[f64],
) -> RenderedPanel {
    let mut series = Vec::with_capacity(spec.columns.len());
    let mut skipped = Vec::new();

    for (position, reference) in spec.columns.iter().enumerate() {
        let resolved = resolve_column(reference, dataset, derived).and_then(|(values, fallback)| {
            if values.len() == time.len() {
                Ok((values, fallback))
            } else {
                Err(SkipReason::LengthMismatch {
                    expected: time.len(),
                    found: values.len(),
                })
            }
        });

        match resolved {
            Ok((values, fallback)) => series.push(RenderedSeries {
                label: spec.label_for(position, &fallback),
                color: spec.color_for(position),
                points: time.iter().zip(values).map(|(&t, &v)| [t, v]).collect(),
            }),
            Err(reason) => {
                log::warn!(
                    "Panel '{}': skipping series {reference}: {reason}",
                    spec.title
                );
                skipped.push(SkippedSeries {
                    position,
                    reference: reference.clone(),
                    reason,
                });
            }
        }
    }

    RenderedPanel {
        title: spec.title.clone(),
        x_label: spec.x_label.clone(),
        y_label: spec.y_label.clone(),
        series,
        skipped,
    }
}

/// Resolve every panel of a window.
pub fn render(
    panels: &[PanelSpec],
    dataset: &Dataset,
    derived: &DerivedSignals,
    time: &[f64],
    window_title: &str,
) -> RenderedFigure {
    RenderedFigure {
        window_title: window_title.to_string(),
        panels: panels
            .iter()
            .map(|spec| render_panel(spec, dataset, derived, time))
            .collect(),
    }
}
