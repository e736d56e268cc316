//! Error types for the analysis pipeline.
//!
//! Resolution and load failures are fatal to a run and carry the offending
//! path. Per-series rendering problems are not errors at all: they are
//! recorded as [`crate::plot::SkippedSeries`] on the rendered panel.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification used when reporting a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad base directory, no date-named folders, invalid config file.
    Configuration,
    /// No candidate experiment file could be selected.
    Resolution,
    /// Unreadable file, failed move, failed write.
    Io,
    /// Dimension mismatch, missing or malformed columns.
    DataShape,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Resolution => "resolution",
            ErrorKind::Io => "i/o",
            ErrorKind::DataShape => "data shape",
        })
    }
}

/// Kind of the first typed error in an `anyhow` chain.
pub fn classify(error: &anyhow::Error) -> Option<ErrorKind> {
    error.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<ResolveError>() {
            Some(e.kind())
        } else if let Some(e) = cause.downcast_ref::<TableError>() {
            Some(e.kind())
        } else if let Some(e) = cause.downcast_ref::<ConfigError>() {
            Some(e.kind())
        } else {
            cause.downcast_ref::<TrajectoryError>().map(TrajectoryError::kind)
        }
    })
}

// ---------------------------------------------------------------------------
// Experiment resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cannot read directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no valid date-named folders (e.g. 'June-25') found in {base}")]
    NoDateFoldersFound { base: PathBuf },

    #[error("latest date folder {folder} contains no valid 'Test_X_Y.{extension}' or 'Experiment_X.{extension}' files")]
    NoCandidateFiles { folder: PathBuf, extension: String },

    #[error("inbox {inbox} is empty and no archived experiment was found under {base}")]
    NoFilesFound {
        inbox: PathBuf,
        base: PathBuf,
        #[source]
        cause: Box<ResolveError>,
    },

    #[error("cannot create folder {path}: {source}")]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to move {from} to {to}: {reason}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::DirectoryUnreadable { .. } | ResolveError::NoDateFoldersFound { .. } => {
                ErrorKind::Configuration
            }
            ResolveError::NoCandidateFiles { .. } | ResolveError::NoFilesFound { .. } => {
                ErrorKind::Resolution
            }
            ResolveError::CreateFolder { .. } | ResolveError::MoveFailed { .. } => ErrorKind::Io,
        }
    }
}

// ---------------------------------------------------------------------------
// Tabular data
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TableError {
    #[error("cannot read {path}: {reason}")]
    UnreadableFile { path: PathBuf, reason: String },

    #[error("unsupported file extension for {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("{path} is an HDF5 store but this build has no HDF5 support (enable the `hdf5` feature)")]
    StoreUnavailable { path: PathBuf },

    #[error("row {row} has {found} cells but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("dimension mismatch: expected {expected} values, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("column index {index} out of range (table has {count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    #[error("no column named '{0}'")]
    UnknownHeader(String),

    #[error("column '{0}' contains non-numeric cells")]
    MalformedColumn(String),

    #[error("'{0}' is a derived signal, not a raw column")]
    NotRawColumn(String),

    #[error("cannot write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },
}

impl TableError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TableError::UnreadableFile { .. }
            | TableError::UnsupportedFormat { .. }
            | TableError::WriteFailed { .. } => ErrorKind::Io,
            TableError::StoreUnavailable { .. } => ErrorKind::Configuration,
            _ => ErrorKind::DataShape,
        }
    }
}

// ---------------------------------------------------------------------------
// Trajectory
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum TrajectoryError {
    #[error("trajectory is empty or axis lengths differ (x={x}, y={y}, z={z})")]
    EmptyTrajectory { x: usize, y: usize, z: usize },
}

impl TrajectoryError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::DataShape
    }
}

// ---------------------------------------------------------------------------
// Configuration file
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}
