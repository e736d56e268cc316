//! HDF5 experiment stores.
//!
//! The acquisition rig appends every run to a monthly store in the base
//! directory:
//! ```text
//!  base_dir/
//!    2025_October.h5
//!      exp_001_sine_2025-10-05/   attrs: timestamp, columns, description, ...
//!        data                     rows × columns, f64
//! ```
//! When stores are present the newest group across all of them (by its
//! `timestamp` attribute) is analysed before any dated folder is considered.
//!
//! Reading the stores needs the `hdf5` feature. Without it stores are
//! reported and skipped.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::data::{load_file, Dataset};
use crate::error::TableError;

const STORE_EXTENSION: &str = "h5";

/// Prefix of the groups that hold one experiment each.
pub const GROUP_PREFIX: &str = "exp_";

/// One `exp_*` group of a store and its metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredExperiment {
    pub file: PathBuf,
    pub group: String,
    /// `None` when the attribute is missing or not an ISO timestamp; such
    /// groups sort before every dated one.
    pub timestamp: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub wave_function: Option<String>,
    pub samples: Option<usize>,
}

impl StoredExperiment {
    pub fn new(file: impl Into<PathBuf>, group: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            group: group.into(),
            timestamp: None,
            description: None,
            wave_function: None,
            samples: None,
        }
    }
}

/// Where the data of one analysis run comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ExperimentSource {
    File(PathBuf),
    Stored(StoredExperiment),
}

impl ExperimentSource {
    /// The file on disk: the experiment file or the store holding the group.
    pub fn path(&self) -> &Path {
        match self {
            ExperimentSource::File(path) => path,
            ExperimentSource::Stored(exp) => &exp.file,
        }
    }

    /// Short name used in window titles.
    pub fn display_name(&self) -> String {
        match self {
            ExperimentSource::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            ExperimentSource::Stored(exp) => exp.group.clone(),
        }
    }

    pub fn load(&self) -> Result<Dataset, TableError> {
        match self {
            ExperimentSource::File(path) => load_file(path),
            ExperimentSource::Stored(exp) => load_stored(&exp.file, &exp.group),
        }
    }
}

impl fmt::Display for ExperimentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentSource::File(path) => write!(f, "{}", path.display()),
            ExperimentSource::Stored(exp) => write!(f, "{}/{}", exp.file.display(), exp.group),
        }
    }
}

impl From<PathBuf> for ExperimentSource {
    fn from(path: PathBuf) -> Self {
        ExperimentSource::File(path)
    }
}

/// Parse an ISO 8601 timestamp as written by the rig (`2025-10-05T14:03:27.512`).
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Newest experiment by timestamp. Ties go to the greatest (file, group).
pub fn newest(experiments: Vec<StoredExperiment>) -> Option<StoredExperiment> {
    experiments.into_iter().max_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.file.cmp(&b.file))
            .then_with(|| a.group.cmp(&b.group))
    })
}

/// `*.h5` files directly inside `base_dir`, sorted by name.
pub fn store_files(base_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(base_dir)? {
        let path = entry?.path();
        let is_store = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(STORE_EXTENSION));
        if is_store && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Every experiment of every store under `base_dir`. Unreadable stores are
/// logged and skipped.
pub fn list_stored(base_dir: &Path) -> Vec<StoredExperiment> {
    let files = match store_files(base_dir) {
        Ok(files) => files,
        Err(e) => {
            log::debug!("No stores read from {}: {e}", base_dir.display());
            return Vec::new();
        }
    };

    let mut experiments = Vec::new();
    for file in files {
        match catalog(&file) {
            Ok(found) => experiments.extend(found),
            Err(e) => log::warn!("Skipping store {}: {e}", file.display()),
        }
    }
    experiments
}

/// The newest stored experiment under `base_dir`, if any store holds one.
pub fn latest_stored(base_dir: &Path) -> Option<StoredExperiment> {
    let experiment = newest(list_stored(base_dir))?;
    log::info!(
        "Selected {} from {} ({})",
        experiment.group,
        experiment.file.display(),
        experiment
            .timestamp
            .map_or_else(|| "no timestamp".to_string(), |t| t.to_string())
    );
    Some(experiment)
}

/// Load the newest experiment held in one store file.
pub fn load_newest_stored(file: &Path) -> Result<Dataset, TableError> {
    let experiment = newest(catalog(file)?).ok_or_else(|| TableError::UnreadableFile {
        path: file.to_path_buf(),
        reason: format!("no {GROUP_PREFIX}* groups"),
    })?;
    load_stored(&experiment.file, &experiment.group)
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Experiments held in one store, sorted by group name.
#[cfg(feature = "hdf5")]
pub fn catalog(file: &Path) -> Result<Vec<StoredExperiment>, TableError> {
    crate::data::h5::read_catalog(file)
}

#[cfg(not(feature = "hdf5"))]
pub fn catalog(file: &Path) -> Result<Vec<StoredExperiment>, TableError> {
    Err(TableError::StoreUnavailable {
        path: file.to_path_buf(),
    })
}

/// The `data` table of one group, named by its `columns` attribute.
#[cfg(feature = "hdf5")]
pub fn load_stored(file: &Path, group: &str) -> Result<Dataset, TableError> {
    crate::data::h5::load_group(file, group)
}

#[cfg(not(feature = "hdf5"))]
pub fn load_stored(file: &Path, _group: &str) -> Result<Dataset, TableError> {
    Err(TableError::StoreUnavailable {
        path: file.to_path_buf(),
    })
}
