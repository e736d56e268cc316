use std::path::{Path, PathBuf};

use super::loader::{load_file, save_csv};
use super::model::ColumnMap;
use crate::error::TableError;

/// Sub-folder that receives cleaned copies.
pub const OUTPUT_FOLDER_NAME: &str = "cleaned_data";

/// Outcome of a batch clean.
#[derive(Debug, Default)]
pub struct CleanReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, TableError)>,
}

/// Clean one file into `output_dir`, keeping its file name.
pub fn clean_file(input: &Path, output_dir: &Path, map: &ColumnMap) -> Result<PathBuf, TableError> {
    let dataset = load_file(input)?;
    let cleaned = dataset.remap(map);
    log::info!(
        "{}: {} → {} columns",
        input.display(),
        dataset.column_count(),
        cleaned.column_count()
    );

    let name = input.file_name().ok_or_else(|| TableError::UnreadableFile {
        path: input.to_path_buf(),
        reason: "no file name".into(),
    })?;
    let out = output_dir.join(name);
    save_csv(&cleaned, &out)?;
    Ok(out)
}

/// Clean every `.csv` directly inside `folder` into `folder/cleaned_data/`.
///
/// A file that fails is recorded in the report and the batch continues.
pub fn clean_folder(folder: &Path, map: &ColumnMap) -> Result<CleanReport, TableError> {
    let io_err = |e: std::io::Error| TableError::UnreadableFile {
        path: folder.to_path_buf(),
        reason: e.to_string(),
    };

    let mut inputs: Vec<PathBuf> = std::fs::read_dir(folder)
        .map_err(io_err)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    inputs.sort();

    let output_dir = folder.join(OUTPUT_FOLDER_NAME);
    std::fs::create_dir_all(&output_dir).map_err(|e| TableError::WriteFailed {
        path: output_dir.clone(),
        reason: e.to_string(),
    })?;

    let mut report = CleanReport::default();
    for input in inputs {
        match clean_file(&input, &output_dir, map) {
            Ok(out) => report.written.push(out),
            Err(e) => {
                log::error!("Failed to clean {}: {e}", input.display());
                report.failed.push((input, e));
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn cleans_every_csv_and_keeps_going() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Test_1.csv"),
            "time,pd_7,mocap1_x,mocap3_qw\n0,1,2,1\n1,1,2,1\n",
        )
        .unwrap();
        fs::write(dir.path().join("broken.csv"), "").unwrap();
        fs::write(dir.path().join("notes.md"), "ignore me").unwrap();

        let report = clean_folder(dir.path(), &ColumnMap::rig_default()).unwrap();
        assert_eq!(report.written.len(), 1);
        assert_eq!(report.failed.len(), 1);

        let out = load_file(&dir.path().join(OUTPUT_FOLDER_NAME).join("Test_1.csv")).unwrap();
        assert_eq!(
            out.headers(),
            vec!["time", "Desired_pressure_segment_3", "mocap_rigid_body_qw"]
        );
    }
}
