use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::{
    experiment_pattern, folder_name_for, inbox_pattern, pick_latest, resolve_latest_with_extension,
    scan_numbered,
};
use crate::error::ResolveError;

const RAW_EXTENSION: &str = "txt";

/// Outcome of looking at the inbox, evaluated once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeDecision {
    /// A raw log is waiting; holds the highest-numbered one.
    IntakePending(PathBuf),
    /// Nothing to ingest, analyse what is already archived.
    UseExisting,
}

/// Scan `inbox_dir` for `Test_<n>.txt`. A missing or unreadable inbox is
/// treated as empty.
pub fn decide_intake(inbox_dir: &Path) -> IntakeDecision {
    match scan_numbered(inbox_dir, inbox_pattern(), RAW_EXTENSION) {
        Ok(files) => match pick_latest(files) {
            Some(file) => IntakeDecision::IntakePending(file.path),
            None => IntakeDecision::UseExisting,
        },
        Err(e) => {
            log::warn!("Inbox {} not readable ({e}), treating as empty", inbox_dir.display());
            IntakeDecision::UseExisting
        }
    }
}

/// Move a waiting inbox file into today's folder, or fall back to the
/// latest archived `.txt` experiment.
pub fn resolve_with_intake(
    inbox_dir: &Path,
    base_dir: &Path,
    today: NaiveDate,
) -> Result<PathBuf, ResolveError> {
    match decide_intake(inbox_dir) {
        IntakeDecision::IntakePending(source) => ingest(&source, base_dir, today, move_file),
        IntakeDecision::UseExisting => {
            log::info!(
                "Inbox {} is empty, using latest archived experiment",
                inbox_dir.display()
            );
            resolve_latest_with_extension(base_dir, today, RAW_EXTENSION).map_err(|cause| {
                ResolveError::NoFilesFound {
                    inbox: inbox_dir.to_path_buf(),
                    base: base_dir.to_path_buf(),
                    cause: Box::new(cause),
                }
            })
        }
    }
}

/// Path for the next `Experiment_<n>.<extension>` in today's folder,
/// creating the folder if needed. The file itself is not created.
pub fn next_experiment_path(
    base_dir: &Path,
    today: NaiveDate,
    extension: &str,
) -> Result<PathBuf, ResolveError> {
    let folder = ensure_day_folder(base_dir, today)?;
    let existing = scan_numbered(&folder, experiment_pattern(), extension).map_err(|source| {
        ResolveError::DirectoryUnreadable {
            path: folder.clone(),
            source,
        }
    })?;
    let next = existing.iter().map(|f| f.sequence).max().map_or(1, |n| n + 1);
    Ok(folder.join(format!("Experiment_{next}.{extension}")))
}

/// Move `source` into today's folder with `mover`. A day folder created
/// here is removed again when the move fails.
fn ingest(
    source: &Path,
    base_dir: &Path,
    today: NaiveDate,
    mover: impl Fn(&Path, &Path) -> Result<(), ResolveError>,
) -> Result<PathBuf, ResolveError> {
    let folder = base_dir.join(folder_name_for(today));
    let Some(file_name) = source.file_name() else {
        return Err(ResolveError::MoveFailed {
            from: source.to_path_buf(),
            to: folder,
            reason: "source has no file name".into(),
        });
    };

    let created = !folder.is_dir();
    let folder = ensure_day_folder(base_dir, today)?;
    let destination = folder.join(file_name);
    if let Err(e) = mover(source, &destination) {
        if created {
            // remove_dir only succeeds on an empty folder
            if let Err(cleanup) = fs::remove_dir(&folder) {
                log::warn!("Could not remove {}: {cleanup}", folder.display());
            }
        }
        return Err(e);
    }

    log::info!(
        "Ingested {} into {}",
        source.display(),
        destination.display()
    );
    Ok(destination)
}

fn ensure_day_folder(base_dir: &Path, today: NaiveDate) -> Result<PathBuf, ResolveError> {
    let folder = base_dir.join(folder_name_for(today));
    fs::create_dir_all(&folder).map_err(|source| ResolveError::CreateFolder {
        path: folder.clone(),
        source,
    })?;
    Ok(folder)
}

fn move_file(from: &Path, to: &Path) -> Result<(), ResolveError> {
    move_file_with(from, to, |a, b| fs::rename(a, b))
}

/// Either the file ends up at `to` and is gone from `from`, or `from` is
/// untouched and an error is returned. Copies when `rename` fails.
fn move_file_with(
    from: &Path,
    to: &Path,
    rename: fn(&Path, &Path) -> io::Result<()>,
) -> Result<(), ResolveError> {
    let failed = |reason: String| ResolveError::MoveFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        reason,
    };

    if to.exists() {
        return Err(failed("destination already exists".into()));
    }
    match rename(from, to) {
        Ok(()) => return Ok(()),
        Err(e) => log::debug!("rename {} failed ({e}), copying", from.display()),
    }

    fs::copy(from, to).map_err(|e| {
        let _ = fs::remove_file(to);
        failed(format!("copy failed: {e}"))
    })?;
    if let Err(e) = fs::remove_file(from) {
        let _ = fs::remove_file(to);
        return Err(failed(format!("could not remove source: {e}")));
    }
    Ok(())
}
