use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::{archive_pattern, parse_date_folder, pick_latest, scan_numbered};
use crate::error::ResolveError;

/// A `<MonthName>-<Day>` folder with its year-corrected date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFolder {
    pub name: String,
    pub path: PathBuf,
    pub date: NaiveDate,
}

/// The selected experiment: newest folder, highest sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentFile {
    pub folder: DateFolder,
    pub path: PathBuf,
    pub sequence: u64,
}

/// Date-named folders of `base_dir`, newest first.
///
/// Equal dates (e.g. `june-10` and `June-10`) are ordered by name,
/// greatest first.
pub fn date_folders(base_dir: &Path, today: NaiveDate) -> Result<Vec<DateFolder>, ResolveError> {
    let unreadable = |source| ResolveError::DirectoryUnreadable {
        path: base_dir.to_path_buf(),
        source,
    };

    let mut folders = Vec::new();
    for entry in std::fs::read_dir(base_dir).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if let Some(date) = parse_date_folder(&name, today) {
            folders.push(DateFolder { name, path, date });
        }
    }

    folders.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.name.cmp(&a.name)));
    Ok(folders)
}

/// Find the latest experiment file with the given extension.
pub fn locate_latest(
    base_dir: &Path,
    today: NaiveDate,
    extension: &str,
) -> Result<ExperimentFile, ResolveError> {
    let folder = date_folders(base_dir, today)?
        .into_iter()
        .next()
        .ok_or_else(|| ResolveError::NoDateFoldersFound {
            base: base_dir.to_path_buf(),
        })?;
    log::info!("Latest date folder: {} ({})", folder.name, folder.date);

    let files = scan_numbered(&folder.path, archive_pattern(), extension).map_err(|source| {
        ResolveError::DirectoryUnreadable {
            path: folder.path.clone(),
            source,
        }
    })?;

    let best = pick_latest(files).ok_or_else(|| ResolveError::NoCandidateFiles {
        folder: folder.path.clone(),
        extension: extension.to_string(),
    })?;
    log::info!("Latest experiment file: {}", best.path.display());

    Ok(ExperimentFile {
        folder,
        path: best.path,
        sequence: best.sequence,
    })
}

/// Path of the latest `.csv` experiment under `base_dir`.
pub fn resolve_latest(base_dir: &Path, today: NaiveDate) -> Result<PathBuf, ResolveError> {
    resolve_latest_with_extension(base_dir, today, "csv")
}

pub fn resolve_latest_with_extension(
    base_dir: &Path,
    today: NaiveDate,
    extension: &str,
) -> Result<PathBuf, ResolveError> {
    locate_latest(base_dir, today, extension).map(|f| f.path)
}
