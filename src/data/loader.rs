use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Column, Dataset};
use crate::error::TableError;
use crate::experiment::store::load_newest_stored;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an experiment table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma separated; the header row is optional
/// * `.parquet`      – flat numeric columns
/// * `.h5`           – newest `exp_*` group of an experiment store
///                     (needs the `hdf5` feature)
///
/// Fails with [`TableError::UnreadableFile`] when the file is missing,
/// cannot be parsed, or holds no data rows.
pub fn load_file(path: &Path) -> Result<Dataset, TableError> {
    if !path.is_file() {
        return Err(unreadable(path, "file does not exist"));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" | "txt" => load_delimited(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        "h5" | "hdf5" => load_newest_stored(path)?,
        _ => {
            return Err(TableError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    if dataset.is_empty() {
        return Err(unreadable(path, "no data rows"));
    }

    log::info!(
        "Loaded {} rows × {} columns from {}",
        dataset.row_count(),
        dataset.column_count(),
        path.display()
    );
    for col in dataset.columns().iter().filter(|c| !c.is_numeric()) {
        log::debug!(
            "Column '{}' has {} non-numeric cells",
            col.name,
            col.malformed_cells
        );
    }
    Ok(dataset)
}

fn unreadable(path: &Path, reason: impl Into<String>) -> TableError {
    TableError::UnreadableFile {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Delimited loader
// ---------------------------------------------------------------------------

/// Comma separated values, one record per sample.
///
/// The acquisition scripts write `.txt` logs without a header while the
/// archived `.csv` files carry one, so header presence is detected: a first
/// record made only of numbers is data and the columns are named
/// `col_0 … col_{n-1}`.
fn load_delimited(path: &Path) -> Result<Dataset, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| unreadable(path, e.to_string()))?;

    let mut records = reader.records();
    let first = match records.next() {
        Some(rec) => rec.map_err(|e| unreadable(path, e.to_string()))?,
        None => return Ok(Dataset::default()),
    };

    let headerless = first.iter().all(|cell| cell.parse::<f64>().is_ok());
    let mut columns: Vec<Column> = if headerless {
        (0..first.len())
            .map(|i| Column::new(format!("col_{i}"), Vec::new()))
            .collect()
    } else {
        first.iter().map(|h| Column::new(h, Vec::new())).collect()
    };

    if headerless {
        push_record(&mut columns, &first, 0)?;
    }

    // data rows are numbered from 0 whether or not a header was present
    let offset = usize::from(headerless);
    for (i, result) in records.enumerate() {
        let row_no = i + offset;
        let record = result.map_err(|e| unreadable(path, format!("row {row_no}: {e}")))?;
        push_record(&mut columns, &record, row_no)?;
    }

    Dataset::new(columns)
}

fn push_record(
    columns: &mut [Column],
    record: &csv::StringRecord,
    row_no: usize,
) -> Result<(), TableError> {
    let found = record.len();
    if found > columns.len() {
        return Err(TableError::RaggedRow {
            row: row_no,
            expected: columns.len(),
            found,
        });
    }

    let mut cells = record.iter();
    for col in columns.iter_mut() {
        let value = match cells.next() {
            None | Some("") => f64::NAN,
            Some(cell) => match cell.parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    col.malformed_cells += 1;
                    f64::NAN
                }
            },
        };
        col.values.push(value);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per channel.
///
/// Float64/Float32/Int64/Int32 columns become data; any other column type is
/// kept by name but marked malformed so it cannot be plotted.
fn load_parquet(path: &Path) -> Result<Dataset, TableError> {
    let file = std::fs::File::open(path).map_err(|e| unreadable(path, e.to_string()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| unreadable(path, format!("reading parquet metadata: {e}")))?;
    let reader = builder
        .build()
        .map_err(|e| unreadable(path, format!("building parquet reader: {e}")))?;

    let mut columns: Vec<Column> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.map_err(|e| unreadable(path, e.to_string()))?;
        let schema = batch.schema();

        if columns.is_empty() {
            columns = schema
                .fields()
                .iter()
                .map(|f| Column::new(f.name().clone(), Vec::new()))
                .collect();
        }

        for (idx, col) in columns.iter_mut().enumerate() {
            append_numeric(col, batch.column(idx));
        }
    }

    Dataset::new(columns)
}

/// Append one Arrow column to `col`; nulls become NaN.
fn append_numeric(col: &mut Column, array: &Arc<dyn Array>) {
    let n = array.len();
    match array.data_type() {
        DataType::Float64 => {
            if let Some(arr) = array.as_any().downcast_ref::<Float64Array>() {
                col.values
                    .extend(arr.iter().map(|v| v.unwrap_or(f64::NAN)));
                return;
            }
        }
        DataType::Float32 => {
            if let Some(arr) = array.as_any().downcast_ref::<Float32Array>() {
                col.values
                    .extend(arr.iter().map(|v| v.map(f64::from).unwrap_or(f64::NAN)));
                return;
            }
        }
        DataType::Int64 => {
            if let Some(arr) = array.as_any().downcast_ref::<Int64Array>() {
                col.values
                    .extend(arr.iter().map(|v| v.map(|i| i as f64).unwrap_or(f64::NAN)));
                return;
            }
        }
        DataType::Int32 => {
            if let Some(arr) = array.as_any().downcast_ref::<Int32Array>() {
                col.values
                    .extend(arr.iter().map(|v| v.map(f64::from).unwrap_or(f64::NAN)));
                return;
            }
        }
        _ => {}
    }

    col.values.extend(std::iter::repeat(f64::NAN).take(n));
    col.malformed_cells += n - array.null_count();
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

/// Write a dataset as CSV with a header row. NaN cells are written empty.
pub fn save_csv(dataset: &Dataset, path: &Path) -> Result<(), TableError> {
    let fail = |e: csv::Error| TableError::WriteFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut writer = csv::Writer::from_path(path).map_err(fail)?;
    writer.write_record(dataset.headers()).map_err(fail)?;

    for values in (0..dataset.row_count()).filter_map(|i| dataset.row(i)) {
        let cells: Vec<String> = values
            .iter()
            .map(|v| if v.is_nan() { String::new() } else { v.to_string() })
            .collect();
        writer.write_record(&cells).map_err(fail)?;
    }

    writer.flush().map_err(|e| TableError::WriteFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_csv_with_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Experiment_1.csv");
        fs::write(&path, "time,pd_3,mocap_3_qw\n0.0,1.5,1\n0.01,1.6,1\n").unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.headers(), vec!["time", "pd_3", "mocap_3_qw"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.values(1).unwrap(), &[1.5, 1.6]);
    }

    #[test]
    fn loads_headerless_txt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Test_3.txt");
        fs::write(&path, "0.0, 1.0, 2.0\n0.1, 1.1, 2.1\n0.2, 1.2, 2.2\n").unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.headers(), vec!["col_0", "col_1", "col_2"]);
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.values(0).unwrap(), &[0.0, 0.1, 0.2]);
    }

    #[test]
    fn marks_malformed_and_pads_short_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "time,a,b\n0,1,x\n1,,\n2\n").unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.row_count(), 3);
        assert!(ds.column(1).unwrap().is_numeric());
        assert!(ds.values(1).unwrap()[1].is_nan());
        assert!(!ds.column(2).unwrap().is_numeric());
        assert!(ds.values(2).is_err());
    }

    #[test]
    fn long_row_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "time,a\n0,1\n1,2,3\n").unwrap();
        assert!(matches!(
            load_file(&path),
            Err(TableError::RaggedRow { expected: 2, found: 3, .. })
        ));
    }

    #[test]
    fn missing_or_empty_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.csv");
        assert!(matches!(
            load_file(&missing),
            Err(TableError::UnreadableFile { .. })
        ));

        let header_only = dir.path().join("empty.csv");
        fs::write(&header_only, "time,a\n").unwrap();
        assert!(matches!(
            load_file(&header_only),
            Err(TableError::UnreadableFile { .. })
        ));
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = TempDir::new().unwrap();
        let ds = Dataset::from_rows(&["time", "x"], &[vec![0.0, 1.25], vec![0.5, f64::NAN]])
            .unwrap();
        let path = dir.path().join("out.csv");
        save_csv(&ds, &path).unwrap();

        let back = load_file(&path).unwrap();
        assert_eq!(back.headers(), vec!["time", "x"]);
        assert_eq!(back.values(0).unwrap(), &[0.0, 0.5]);
        assert_eq!(back.values(1).unwrap()[0], 1.25);
        assert!(back.values(1).unwrap()[1].is_nan());
    }

    #[test]
    fn loads_parquet_numeric_columns() {
        use arrow::array::StringArray;
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("time", DataType::Float64, false),
            Field::new("pd_3", DataType::Int32, true),
            Field::new("note", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![0.0, 0.5])),
                Arc::new(Int32Array::from(vec![Some(3), None])),
                Arc::new(StringArray::from(vec!["a", "b"])),
            ],
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Experiment_2.parquet");
        let mut writer = ArrowWriter::try_new(fs::File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.headers(), vec!["time", "pd_3", "note"]);
        assert_eq!(ds.values(0).unwrap(), &[0.0, 0.5]);
        assert_eq!(ds.values(1).unwrap()[0], 3.0);
        assert!(ds.values(1).unwrap()[1].is_nan());
        assert!(matches!(ds.values(2), Err(TableError::MalformedColumn(_))));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.mat");
        fs::write(&path, "x").unwrap();
        assert!(matches!(
            load_file(&path),
            Err(TableError::UnsupportedFormat { .. })
        ));
    }

    #[cfg(not(feature = "hdf5"))]
    #[test]
    fn h5_without_feature_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2025_October.h5");
        fs::write(&path, "x").unwrap();
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, TableError::StoreUnavailable { .. }));
        assert!(err.to_string().contains("hdf5"));
    }

    #[test]
    fn headerless_rows_are_numbered_from_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Test_4.txt");
        fs::write(&path, "0.0,1.0\n0.1,1.1,9.9\n").unwrap();
        assert!(matches!(
            load_file(&path),
            Err(TableError::RaggedRow { row: 1, expected: 2, found: 3 })
        ));

        let path = dir.path().join("Experiment_4.csv");
        fs::write(&path, "time,a\n0.0,1.0\n0.1,1.1,9.9\n").unwrap();
        assert!(matches!(
            load_file(&path),
            Err(TableError::RaggedRow { row: 1, .. })
        ));
    }
}
