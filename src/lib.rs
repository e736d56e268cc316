//! Experiment resolution and configuration-driven plotting for
//! motion-capture / pressure-sensor logs.
//!
//! The viewer binary lives in `main.rs`; everything it draws is produced
//! here as plain data.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod experiment;
pub mod kinematics;
pub mod pipeline;
pub mod plot;

pub use config::AnalysisConfig;
pub use error::ErrorKind;
pub use experiment::ExperimentSource;
pub use pipeline::{analyze, locate, AnalysisRun};
