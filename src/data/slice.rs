use super::model::{ColumnReference, Dataset};
use crate::error::TableError;

// ---------------------------------------------------------------------------
// Time-offset trimming
// ---------------------------------------------------------------------------

/// Drop the leading rows recorded before `threshold_seconds`.
///
/// The first row whose time is `>= threshold_seconds` becomes row 0 of the
/// returned table. When the recording ends before the threshold the table is
/// returned unchanged (logged at warn level): it is too short to trim.
pub fn slice_from(
    dataset: &Dataset,
    time_column: &ColumnReference,
    threshold_seconds: f64,
) -> Result<Dataset, TableError> {
    let time = dataset.series(time_column)?;

    if !is_non_decreasing(time) {
        log::warn!("Time column {time_column} is not non-decreasing; slicing uses the first match");
    }

    let Some(&last) = time.last() else {
        return Ok(dataset.clone());
    };

    if last < threshold_seconds {
        log::warn!(
            "Recording ends at {last:.3}s, before the {threshold_seconds}s offset; not trimming"
        );
        return Ok(dataset.clone());
    }

    let start = time
        .iter()
        .position(|&t| t >= threshold_seconds)
        .unwrap_or(0);
    if start > 0 {
        log::info!("Slicing data to start from {threshold_seconds} seconds (row {start})");
    }
    Ok(dataset.slice_rows(start))
}

/// Shift a time sequence so that it starts at zero.
pub fn rezero_time(time: &[f64]) -> Vec<f64> {
    match time.first() {
        Some(&t0) => time.iter().map(|t| t - t0).collect(),
        None => Vec::new(),
    }
}

fn is_non_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| !(w[1] < w[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(times: &[f64]) -> Dataset {
        let rows: Vec<Vec<f64>> = times.iter().enumerate().map(|(i, &t)| vec![t, i as f64]).collect();
        Dataset::from_rows(&["time", "v"], &rows).unwrap()
    }

    #[test]
    fn trims_to_first_row_at_threshold() {
        let ds = table(&[0.0, 5.0, 9.9, 10.0, 10.0, 12.0]);
        let out = slice_from(&ds, &ColumnReference::index(0), 10.0).unwrap();
        assert_eq!(out.values(0).unwrap(), &[10.0, 10.0, 12.0]);
        assert_eq!(out.values(1).unwrap(), &[3.0, 4.0, 5.0]);
    }

    #[test]
    fn short_recording_is_unchanged() {
        let ds = table(&[0.0, 1.0, 2.0]);
        let out = slice_from(&ds, &ColumnReference::header("time"), 10.0).unwrap();
        assert_eq!(out, ds);
    }

    #[test]
    fn slicing_is_idempotent() {
        let ds = table(&[0.0, 4.0, 8.0, 12.0, 16.0]);
        let once = slice_from(&ds, &ColumnReference::index(0), 8.0).unwrap();
        let again = slice_from(&once, &ColumnReference::index(0), 8.0).unwrap();
        let lower = slice_from(&once, &ColumnReference::index(0), 2.0).unwrap();
        assert_eq!(once, again);
        assert_eq!(once, lower);
    }

    #[test]
    fn bad_time_column_is_an_error() {
        let ds = table(&[0.0, 1.0]);
        assert!(slice_from(&ds, &ColumnReference::index(7), 0.0).is_err());
    }

    #[test]
    fn rezero_starts_at_zero_and_is_idempotent() {
        let t = rezero_time(&[10.0, 10.5, 11.0]);
        assert_eq!(t, vec![0.0, 0.5, 1.0]);
        assert_eq!(rezero_time(&t), t);
        assert!(rezero_time(&[]).is_empty());
    }
}
