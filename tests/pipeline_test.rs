//! End-to-end: experiment tree on disk → resolve → load → slice → derive → render.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rusty_mocap::config::AnalysisConfig;
use rusty_mocap::data::derived::{PITCH, ROLL, YAW};
use rusty_mocap::error::ResolveError;
use rusty_mocap::experiment::{decide_intake, ExperimentSource, IntakeDecision};
use rusty_mocap::pipeline::{self, analyze, locate};
use rusty_mocap::plot::SkipReason;
use tempfile::TempDir;

const HEADER: &str =
    "time,pd_3,pd_6,pm_8_4,mocap_3_x,mocap_3_y,mocap_3_z,mocap_3_qx,mocap_3_qy,mocap_3_qz,mocap_3_qw";

/// 30 s at 2 Hz; the body turns about Z at a constant rate.
fn experiment_body() -> String {
    let mut body = format!("{HEADER}\n");
    for i in 0..60 {
        let t = i as f64 * 0.5;
        let half = 0.01 * t;
        body.push_str(&format!(
            "{t},{},{},{},{},{},{},0,0,{},{}\n",
            t.sin(),
            t.cos(),
            0.5 * t,
            0.1 * t,
            -0.1 * t,
            1.0,
            half.sin(),
            half.cos()
        ));
    }
    body
}

fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 12).unwrap()
}

fn config(root: &Path) -> AnalysisConfig {
    AnalysisConfig {
        base_dir: root.join("experiments"),
        inbox_dir: Some(root.join("inbox")),
        ..AnalysisConfig::default()
    }
}

#[test]
fn latest_archive_across_year_boundary() {
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("experiments");
    write(&base.join("December-30/Experiment_7.csv"), &experiment_body());
    write(&base.join("January-02/Experiment_3.csv"), &experiment_body());
    write(&base.join("January-02/Experiment_10.csv"), &experiment_body());
    write(&base.join("January-02/cleaned_data/Experiment_99.csv"), &experiment_body());

    let found = locate(&config(tmp.path()), today(), false).unwrap();
    assert_eq!(found, ExperimentSource::File(base.join("January-02/Experiment_10.csv")));
}

#[test]
fn default_figures_render_with_partial_columns() {
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("experiments");
    write(&base.join("January-02/Experiment_1.csv"), &experiment_body());

    let run = pipeline::run(&config(tmp.path()), today(), false, None).unwrap();

    // 10 s offset at 2 Hz drops 20 rows; the axis keeps recording time.
    assert_eq!(run.dataset.row_count(), 40);
    assert_eq!(run.time[0], 10.0);

    for key in [YAW, PITCH, ROLL] {
        assert!(run.derived.contains(key), "missing derived {key}");
    }

    assert_eq!(run.figures.len(), 3);
    let desired = &run.figures[0].panels[0];
    assert_eq!(desired.title, "Desired Pressures");
    let labels: Vec<&str> = desired.series.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["pd_segment_1", "pd_segment_2"]);
    assert_eq!(desired.skipped.len(), 2);
    assert!(matches!(
        &desired.skipped[0].reason,
        SkipReason::UnknownHeader { name } if name == "pd_7"
    ));

    // Segments 1 and 2 have no data at all in this log.
    assert!(run.figures[1].panels.iter().all(|p| p.series.is_empty()));

    let mocap = &run.figures[2];
    assert!(mocap.window_title.ends_with(": Experiment_1.csv"));
    assert_eq!(mocap.panels[0].series.len(), 3);
    let yaw = &mocap.panels[1].series[0];
    assert_eq!(yaw.label, "Yaw");
    // Positive rotation about Z shows up as negative yaw.
    assert!(yaw.points.iter().skip(1).all(|p| p[1] < 0.0));

    let trajectory = run.trajectory.as_ref().unwrap();
    assert_eq!(trajectory.title, "Robot Trajectory");
    assert_eq!(trajectory.path.len(), 40);
    assert!(run.planar.is_some());
}

#[test]
fn intake_then_resolve_then_fall_back() {
    let tmp = TempDir::new().unwrap();
    let config = config(tmp.path());
    let inbox = tmp.path().join("inbox");
    write(&inbox.join("Test_1.txt"), &experiment_body());
    write(&inbox.join("Test_2.txt"), &experiment_body());

    // First run ingests Test_2, the highest number.
    let first = locate(&config, today(), true).unwrap();
    assert_eq!(first.path(), config.base_dir.join("January-12/Test_2.txt").as_path());
    assert!(!inbox.join("Test_2.txt").exists());
    analyze(&first, &config).unwrap();

    // Second run ingests the remaining file.
    let second = locate(&config, today(), true).unwrap();
    assert_eq!(second.path(), config.base_dir.join("January-12/Test_1.txt").as_path());
    assert_eq!(decide_intake(&inbox), IntakeDecision::UseExisting);

    // Inbox now empty: the newest archived .txt wins.
    let third = locate(&config, today(), true).unwrap();
    assert_eq!(third.path(), config.base_dir.join("January-12/Test_2.txt").as_path());
}

#[test]
fn nothing_anywhere_is_no_files_found() {
    let tmp = TempDir::new().unwrap();
    let config = config(tmp.path());
    fs::create_dir_all(&config.base_dir).unwrap();

    let err = locate(&config, today(), true).unwrap_err();
    assert!(matches!(err, ResolveError::NoFilesFound { .. }));
    assert!(err.to_string().contains("inbox"));
}

#[test]
fn export_round_trips_through_json() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("Experiment_1.csv");
    write(&file, &experiment_body());

    let run = pipeline::run(&config(tmp.path()), today(), false, Some(&file)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&run.to_json().unwrap()).unwrap();

    assert_eq!(json["rows"], 40);
    assert_eq!(json["figures"].as_array().unwrap().len(), 3);
    let color = json["figures"][0]["panels"][0]["series"][0]["color"].as_str().unwrap();
    assert_eq!(color, "#d62728");
    assert_eq!(
        json["figures"][0]["panels"][0]["skipped"][0]["reason"],
        "unknown_header"
    );
}
