//! Reading `exp_*` groups out of HDF5 experiment stores.
//!
//! Each group holds a 2-D `data` dataset (rows × channels) and a `columns`
//! string attribute naming the channels, plus free-form metadata
//! attributes (`timestamp`, `description`, `wave_function` or
//! `experiment_type`).

use std::path::Path;

use hdf5::types::{VarLenAscii, VarLenUnicode};

use super::model::{Column, Dataset};
use crate::error::TableError;
use crate::experiment::store::{parse_timestamp, StoredExperiment, GROUP_PREFIX};

fn unreadable(path: &Path, e: impl std::fmt::Display) -> TableError {
    TableError::UnreadableFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// Scalar string attribute, UTF-8 or ASCII.
fn string_attr(group: &hdf5::Group, name: &str) -> Option<String> {
    let attr = group.attr(name).ok()?;
    attr.read_scalar::<VarLenUnicode>()
        .map(|s| s.as_str().to_owned())
        .or_else(|_| attr.read_scalar::<VarLenAscii>().map(|s| s.as_str().to_owned()))
        .ok()
}

fn string_list_attr(group: &hdf5::Group, name: &str) -> hdf5::Result<Vec<String>> {
    let attr = group.attr(name)?;
    match attr.read_raw::<VarLenUnicode>() {
        Ok(names) => Ok(names.iter().map(|s| s.as_str().to_owned()).collect()),
        Err(_) => Ok(attr
            .read_raw::<VarLenAscii>()?
            .iter()
            .map(|s| s.as_str().to_owned())
            .collect()),
    }
}

pub fn read_catalog(file: &Path) -> Result<Vec<StoredExperiment>, TableError> {
    let store = hdf5::File::open(file).map_err(|e| unreadable(file, e))?;
    let mut names = store.member_names().map_err(|e| unreadable(file, e))?;
    names.retain(|n| n.starts_with(GROUP_PREFIX));
    names.sort();

    let mut experiments = Vec::with_capacity(names.len());
    for name in names {
        let group = match store.group(&name) {
            Ok(group) => group,
            Err(e) => {
                log::warn!("{}: '{name}' is not a group ({e})", file.display());
                continue;
            }
        };
        let timestamp = string_attr(&group, "timestamp");
        if timestamp.is_none() {
            log::debug!("{}: '{name}' has no timestamp", file.display());
        }
        experiments.push(StoredExperiment {
            timestamp: timestamp.as_deref().and_then(parse_timestamp),
            description: string_attr(&group, "description"),
            wave_function: string_attr(&group, "wave_function")
                .or_else(|| string_attr(&group, "experiment_type")),
            samples: group
                .dataset("data")
                .ok()
                .and_then(|d| d.shape().first().copied()),
            ..StoredExperiment::new(file, name)
        });
    }
    Ok(experiments)
}

pub fn load_group(file: &Path, group_name: &str) -> Result<Dataset, TableError> {
    let store = hdf5::File::open(file).map_err(|e| unreadable(file, e))?;
    let group = store
        .group(group_name)
        .map_err(|e| unreadable(file, format!("group '{group_name}': {e}")))?;
    let names = string_list_attr(&group, "columns")
        .map_err(|e| unreadable(file, format!("'{group_name}' columns attribute: {e}")))?;
    let data = group
        .dataset("data")
        .and_then(|d| d.read_2d::<f64>())
        .map_err(|e| unreadable(file, format!("'{group_name}' data: {e}")))?;

    let (rows, width) = data.dim();
    if width != names.len() {
        return Err(TableError::DimensionMismatch {
            expected: names.len(),
            found: width,
        });
    }

    let columns = names
        .into_iter()
        .enumerate()
        .map(|(j, name)| Column::new(name, data.column(j).to_vec()))
        .collect();

    log::info!(
        "Loaded {rows} rows × {width} columns from {}/{group_name}",
        file.display()
    );
    Dataset::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::store::{latest_stored, load_newest_stored};
    use std::str::FromStr;
    use tempfile::TempDir;

    fn text(s: &str) -> VarLenUnicode {
        VarLenUnicode::from_str(s).unwrap()
    }

    fn write_group(store: &hdf5::File, name: &str, timestamp: &str, columns: &[&str], rows: &[Vec<f64>]) {
        let group = store.create_group(name).unwrap();
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        group
            .new_dataset::<f64>()
            .shape((rows.len(), rows[0].len()))
            .create("data")
            .unwrap()
            .write_raw(&flat)
            .unwrap();
        let names: Vec<VarLenUnicode> = columns.iter().map(|c| text(c)).collect();
        group
            .new_attr::<VarLenUnicode>()
            .shape(names.len())
            .create("columns")
            .unwrap()
            .write_raw(&names)
            .unwrap();
        group
            .new_attr::<VarLenUnicode>()
            .create("timestamp")
            .unwrap()
            .write_scalar(&text(timestamp))
            .unwrap();
        group
            .new_attr::<VarLenUnicode>()
            .create("experiment_type")
            .unwrap()
            .write_scalar(&text("sine"))
            .unwrap();
    }

    #[test]
    fn newest_group_across_stores_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let october = hdf5::File::create(tmp.path().join("2025_October.h5")).unwrap();
        write_group(
            &october,
            "exp_001_sine_2025-10-02",
            "2025-10-02T09:00:00",
            &["time", "pd_3"],
            &[vec![0.0, 1.0], vec![0.5, 2.0]],
        );
        write_group(
            &october,
            "exp_002_sine_2025-10-04",
            "2025-10-04T16:30:00.250000",
            &["time", "pd_3", "mocap_3_qw"],
            &[vec![0.0, 3.0, 1.0], vec![0.5, 4.0, 1.0], vec![1.0, 5.0, 1.0]],
        );
        drop(october);

        let experiment = latest_stored(tmp.path()).unwrap();
        assert_eq!(experiment.group, "exp_002_sine_2025-10-04");
        assert_eq!(experiment.samples, Some(3));
        assert_eq!(experiment.wave_function.as_deref(), Some("sine"));

        let ds = load_group(&experiment.file, &experiment.group).unwrap();
        assert_eq!(ds.headers(), vec!["time", "pd_3", "mocap_3_qw"]);
        assert_eq!(ds.values(1).unwrap(), &[3.0, 4.0, 5.0]);

        let same = load_newest_stored(&experiment.file).unwrap();
        assert_eq!(same, ds);
    }

    #[test]
    fn column_count_must_match_data() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("2025_June.h5");
        let store = hdf5::File::create(&path).unwrap();
        write_group(&store, "exp_001", "2025-06-01T00:00:00", &["time"], &[vec![0.0, 1.0]]);
        drop(store);

        assert!(matches!(
            load_group(&path, "exp_001"),
            Err(TableError::DimensionMismatch { expected: 1, found: 2 })
        ));
    }
}
