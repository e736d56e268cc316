use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use rusty_mocap::config::AnalysisConfig;
use rusty_mocap::error::classify;
use rusty_mocap::pipeline::{self, AnalysisRun};
use rusty_mocap::plot::RenderedFigure;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which view the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Figure(usize),
    Trajectory3d,
    TrajectoryXz,
}

/// `(figure, panel, series)` position of a rendered line.
pub type SeriesKey = (usize, usize, usize);

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AnalysisConfig,

    /// Date used for folder resolution, fixed at startup.
    pub today: NaiveDate,

    /// Move waiting inbox files into the archive on reload.
    pub intake: bool,

    /// Analyse this file instead of resolving one.
    pub pinned_file: Option<PathBuf>,

    /// Result of the last successful run.
    pub run: Option<AnalysisRun>,

    pub tab: Tab,

    /// Series the user switched off.
    pub hidden: BTreeSet<SeriesKey>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(
        config: AnalysisConfig,
        today: NaiveDate,
        intake: bool,
        pinned_file: Option<PathBuf>,
    ) -> Self {
        Self {
            config,
            today,
            intake,
            pinned_file,
            run: None,
            tab: Tab::Figure(0),
            hidden: BTreeSet::new(),
            status_message: None,
        }
    }

    /// Start a fresh analysis run; the previous run is kept on failure.
    pub fn reload(&mut self) {
        match pipeline::run(
            &self.config,
            self.today,
            self.intake,
            self.pinned_file.as_deref(),
        ) {
            Ok(run) => self.set_run(run),
            Err(e) => {
                let label = match classify(&e) {
                    Some(kind) => format!("Error ({kind})"),
                    None => "Error".to_string(),
                };
                log::error!("Analysis failed: {e:#}");
                self.status_message = Some(format!("{label}: {e:#}"));
            }
        }
    }

    /// Ingest a finished run and reset per-run view state.
    pub fn set_run(&mut self, run: AnalysisRun) {
        self.hidden.clear();
        if let Tab::Figure(i) = self.tab {
            if i >= run.figures.len() {
                self.tab = Tab::Figure(0);
            }
        }
        self.status_message = None;
        self.run = Some(run);
    }

    /// Viewport title naming the loaded experiment.
    pub fn window_title(&self) -> String {
        match &self.run {
            Some(run) => format!("Rusty Mocap – {}", run.display_name()),
            None => "Rusty Mocap – Experiment Viewer".to_string(),
        }
    }

    pub fn current_figure(&self) -> Option<&RenderedFigure> {
        match self.tab {
            Tab::Figure(i) => self.run.as_ref()?.figures.get(i),
            _ => None,
        }
    }

    pub fn is_visible(&self, key: SeriesKey) -> bool {
        !self.hidden.contains(&key)
    }

    pub fn set_visible(&mut self, key: SeriesKey, visible: bool) {
        if visible {
            self.hidden.remove(&key);
        } else {
            self.hidden.insert(key);
        }
    }

    /// Show or hide every series of one panel.
    pub fn set_panel_visible(&mut self, figure: usize, panel: usize, visible: bool) {
        let count = self
            .run
            .as_ref()
            .and_then(|r| r.figures.get(figure))
            .and_then(|f| f.panels.get(panel))
            .map_or(0, |p| p.series.len());
        for series in 0..count {
            self.set_visible((figure, panel, series), visible);
        }
    }
}
