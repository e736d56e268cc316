//! Locating the experiment file to analyse.
//!
//! Archive layout:
//! ```text
//!  base_dir/
//!    2025_June.h5     ← experiment store, newest `exp_*` group wins (see `store`)
//!    June-25/
//!      Experiment_1.csv
//!      Test_4_2.csv
//!    July-02/
//!      Test_7.txt
//!  inbox_dir/
//!    Test_12.txt      ← picked up by intake, moved under today's folder
//! ```
//!
//! "Today" is always passed in by the caller so resolution is
//! deterministic.

pub mod intake;
pub mod resolver;
pub mod store;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{Datelike, Month, NaiveDate};
use regex::Regex;

pub use intake::{decide_intake, next_experiment_path, resolve_with_intake, IntakeDecision};
pub use resolver::{
    date_folders, locate_latest, resolve_latest, resolve_latest_with_extension, DateFolder,
    ExperimentFile,
};
pub use store::{latest_stored, list_stored, ExperimentSource, StoredExperiment};

// ---------------------------------------------------------------------------
// Name patterns
// ---------------------------------------------------------------------------

fn date_folder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Za-z]+)-(\d{1,2})$").expect("literal pattern"))
}

/// `Test_<a>_<b>`, `Test_<a>` or `Experiment_<n>` (stem only).
pub(crate) fn archive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:Test_(\d+)(?:_(\d+))?|Experiment_(\d+))$").expect("literal pattern")
    })
}

/// Raw logs waiting in the inbox.
pub(crate) fn inbox_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^Test_(\d+)$").expect("literal pattern"))
}

pub(crate) fn experiment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^Experiment_(\d+)$").expect("literal pattern"))
}

// ---------------------------------------------------------------------------
// Date folders
// ---------------------------------------------------------------------------

fn month_from_name(name: &str) -> Option<u32> {
    (1..=12u8)
        .filter_map(|m| Month::try_from(m).ok())
        .find(|m| m.name().eq_ignore_ascii_case(name))
        .map(|m| m.number_from_month())
}

/// Parse a `<MonthName>-<Day>` folder name relative to `today`.
///
/// The year is today's, except that a month later than the current one
/// belongs to the previous year (a December series analysed in January).
pub fn parse_date_folder(name: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = date_folder_pattern().captures(name)?;
    let month = month_from_name(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    let year = if month > today.month() {
        today.year() - 1
    } else {
        today.year()
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Folder name the acquisition side uses for `date`, e.g. `October-05`.
pub fn folder_name_for(date: NaiveDate) -> String {
    date.format("%B-%d").to_string()
}

// ---------------------------------------------------------------------------
// Numbered files
// ---------------------------------------------------------------------------

/// A file whose name ends in a sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NumberedFile {
    pub path: PathBuf,
    pub name: String,
    pub sequence: u64,
}

/// Trailing integer of `file_name` if its stem matches `pattern` and its
/// extension is exactly `extension`.
pub(crate) fn trailing_number(pattern: &Regex, file_name: &str, extension: &str) -> Option<u64> {
    let stem = file_name.strip_suffix(extension)?.strip_suffix('.')?;
    let caps = pattern.captures(stem)?;
    caps.iter()
        .skip(1)
        .flatten()
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

/// Regular files in `dir` matching `pattern`.
pub(crate) fn scan_numbered(
    dir: &Path,
    pattern: &Regex,
    extension: &str,
) -> io::Result<Vec<NumberedFile>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        if let Some(sequence) = trailing_number(pattern, &name, extension) {
            found.push(NumberedFile {
                path,
                name,
                sequence,
            });
        }
    }
    Ok(found)
}

/// Highest sequence number wins; equal numbers go to the greatest name.
pub(crate) fn pick_latest(files: Vec<NumberedFile>) -> Option<NumberedFile> {
    files
        .into_iter()
        .max_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.name.cmp(&b.name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn december_folder_in_february_is_last_year() {
        let today = day(2025, 2, 3);
        assert_eq!(parse_date_folder("December-20", today), Some(day(2024, 12, 20)));
        assert_eq!(parse_date_folder("February-1", today), Some(day(2025, 2, 1)));
    }

    #[test]
    fn month_names_are_case_insensitive_and_full() {
        let today = day(2025, 7, 1);
        assert_eq!(parse_date_folder("june-5", today), Some(day(2025, 6, 5)));
        assert_eq!(parse_date_folder("JUNE-05", today), Some(day(2025, 6, 5)));
        assert_eq!(parse_date_folder("Jun-5", today), None);
        assert_eq!(parse_date_folder("June-123", today), None);
        assert_eq!(parse_date_folder("June-31", today), None);
        assert_eq!(parse_date_folder("cleaned_data", today), None);
    }

    #[test]
    fn folder_name_is_zero_padded() {
        assert_eq!(folder_name_for(day(2025, 10, 5)), "October-05");
        assert_eq!(parse_date_folder("October-05", day(2025, 10, 19)), Some(day(2025, 10, 5)));
    }

    #[test]
    fn trailing_numbers() {
        let p = archive_pattern();
        assert_eq!(trailing_number(p, "Test_4_12.csv", "csv"), Some(12));
        assert_eq!(trailing_number(p, "Test_7.csv", "csv"), Some(7));
        assert_eq!(trailing_number(p, "Experiment_10.csv", "csv"), Some(10));
        assert_eq!(trailing_number(p, "Experiment_10.txt", "csv"), None);
        assert_eq!(trailing_number(p, "Experiment_10csv", "csv"), None);
        assert_eq!(trailing_number(p, "Run_3.csv", "csv"), None);
        assert_eq!(trailing_number(inbox_pattern(), "Test_3_1.txt", "txt"), None);
        assert_eq!(trailing_number(inbox_pattern(), "Test_03.txt", "txt"), Some(3));
    }

    #[test]
    fn pick_latest_is_numeric_with_name_tiebreak() {
        let f = |name: &str, sequence| NumberedFile {
            path: PathBuf::from(name),
            name: name.to_string(),
            sequence,
        };
        let best = pick_latest(vec![f("Experiment_3.csv", 3), f("Experiment_10.csv", 10)]).unwrap();
        assert_eq!(best.name, "Experiment_10.csv");

        let tie = pick_latest(vec![f("Test_1_5.csv", 5), f("Test_2_5.csv", 5)]).unwrap();
        assert_eq!(tie.name, "Test_2_5.csv");
        assert!(pick_latest(Vec::new()).is_none());
    }
}
