//! One analysis run: resolve → load → slice → derive → render.
//!
//! Each run builds its own dataset and derived signals; nothing is cached
//! between runs.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::data::{compute_all, rezero_time, slice_from, Dataset, DerivedSignals};
use crate::error::ResolveError;
use crate::experiment::{
    decide_intake, latest_stored, resolve_latest, resolve_with_intake, ExperimentSource,
    IntakeDecision,
};
use crate::plot::{
    planar_view, render, render_trajectory, PlanarTrajectoryView, RenderedFigure, TrajectoryView,
};

/// Pick the experiment to analyse.
///
/// In order: a raw log waiting in the inbox (with `intake` set and an
/// inbox configured) is moved into the archive and used; then the newest
/// group of the HDF5 stores under `base_dir`; then the latest archived
/// file of the dated folders (`.txt` after an empty intake, `.csv`
/// otherwise).
pub fn locate(
    config: &AnalysisConfig,
    today: NaiveDate,
    intake: bool,
) -> Result<ExperimentSource, ResolveError> {
    let inbox = match (&config.inbox_dir, intake) {
        (Some(inbox), true) => Some(inbox),
        (None, true) => {
            log::warn!("Intake requested but no inbox_dir configured, resolving latest archive");
            None
        }
        (_, false) => None,
    };

    if let Some(inbox) = inbox {
        if let IntakeDecision::IntakePending(_) = decide_intake(inbox) {
            return resolve_with_intake(inbox, &config.base_dir, today).map(ExperimentSource::File);
        }
    }

    if let Some(stored) = latest_stored(&config.base_dir) {
        return Ok(ExperimentSource::Stored(stored));
    }

    let path = match inbox {
        Some(inbox) => resolve_with_intake(inbox, &config.base_dir, today)?,
        None => resolve_latest(&config.base_dir, today)?,
    };
    Ok(ExperimentSource::File(path))
}

/// Everything produced by a single run.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub source: ExperimentSource,
    /// The sliced table.
    pub dataset: Dataset,
    /// Shared time axis of every panel.
    pub time: Vec<f64>,
    pub derived: DerivedSignals,
    pub figures: Vec<RenderedFigure>,
    pub trajectory: Option<TrajectoryView>,
    pub planar: Option<PlanarTrajectoryView>,
}

/// Serializable view of a run, written by the `export` command.
#[derive(Debug, Serialize)]
pub struct AnalysisExport<'a> {
    pub source: String,
    pub rows: usize,
    pub derived: Vec<&'a str>,
    pub figures: &'a [RenderedFigure],
    pub trajectory: Option<&'a TrajectoryView>,
    pub planar: Option<&'a PlanarTrajectoryView>,
}

impl AnalysisRun {
    pub fn export(&self) -> AnalysisExport<'_> {
        AnalysisExport {
            source: self.source.to_string(),
            rows: self.dataset.row_count(),
            derived: self.derived.names().collect(),
            figures: &self.figures,
            trajectory: self.trajectory.as_ref(),
            planar: self.planar.as_ref(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.export()).context("Failed to serialize analysis run")
    }

    /// Name used in window titles.
    pub fn display_name(&self) -> String {
        self.source.display_name()
    }
}

/// Load and render `source` according to `config`.
///
/// A missing or malformed time column aborts the run. Trajectory problems
/// only drop the trajectory views.
pub fn analyze(source: &ExperimentSource, config: &AnalysisConfig) -> Result<AnalysisRun> {
    let raw = source
        .load()
        .with_context(|| format!("Failed to load {source}"))?;
    let dataset = slice_from(&raw, &config.time_column, config.start_time_offset_sec)
        .context("Failed to slice by time offset")?;
    let derived = compute_all(&dataset, &config.quaternion_columns);

    let time = dataset
        .series(&config.time_column)
        .context("Failed to read time column")?;
    let time = if config.rezero_time {
        rezero_time(time)
    } else {
        time.to_vec()
    };

    let name = source.display_name();
    let figures = config
        .figures
        .iter()
        .map(|figure| {
            let title = format!("{}: {name}", figure.window_title);
            render(&figure.panels, &dataset, &derived, &time, &title)
        })
        .collect();

    let (trajectory, planar) = trajectory_views(&dataset, config);

    log::info!(
        "Analysed {source} ({} rows, {} derived signals)",
        dataset.row_count(),
        derived.len()
    );

    Ok(AnalysisRun {
        source: source.clone(),
        dataset,
        time,
        derived,
        figures,
        trajectory,
        planar,
    })
}

fn trajectory_views(
    dataset: &Dataset,
    config: &AnalysisConfig,
) -> (Option<TrajectoryView>, Option<PlanarTrajectoryView>) {
    let axes: Result<Vec<&[f64]>, _> = config
        .position_columns
        .iter()
        .map(|reference| dataset.series(reference))
        .collect();
    let axes = match axes {
        Ok(axes) => axes,
        Err(e) => {
            log::warn!("Missing mocap position columns ({e}), skipping trajectory");
            return (None, None);
        }
    };
    let [x, y, z] = axes.as_slice() else {
        log::warn!("Expected 3 position columns, got {}", axes.len());
        return (None, None);
    };

    let trajectory = render_trajectory(x, y, z, &config.trajectory_title)
        .map_err(|e| log::warn!("Skipping 3D trajectory: {e}"))
        .ok();

    let x_name = config.position_columns[0].to_string();
    let z_name = config.position_columns[2].to_string();
    let planar = planar_view(
        x,
        z,
        &format!("{} (X-Z plane)", config.trajectory_title),
        &format!("{x_name} Position (X)"),
        &format!("{z_name} Position (Z)"),
    )
    .map_err(|e| log::warn!("Skipping X-Z trajectory: {e}"))
    .ok();

    (trajectory, planar)
}

/// [`locate`] unless `file` is given, then [`analyze`].
pub fn run(
    config: &AnalysisConfig,
    today: NaiveDate,
    intake: bool,
    file: Option<&Path>,
) -> Result<AnalysisRun> {
    let source = match file {
        Some(file) => ExperimentSource::File(file.to_path_buf()),
        None => locate(config, today, intake).context("Failed to resolve experiment file")?,
    };
    analyze(&source, config)
}
