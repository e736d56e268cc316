//! Analysis configuration: where experiments live and what to draw.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::derived::{PITCH, YAW};
use crate::data::ColumnReference;
use crate::error::ConfigError;
use crate::plot::{FigureSpec, PanelSpec};

/// Everything a run needs apart from "today".
///
/// Missing fields take their [`Default`] value; unknown fields are an
/// error so that a misspelt key does not silently fall back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub base_dir: PathBuf,
    /// Enables the intake workflow when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbox_dir: Option<PathBuf>,
    pub time_column: ColumnReference,
    /// Rows before this time are dropped.
    pub start_time_offset_sec: f64,
    /// Shift the sliced time axis so it starts at zero. Off by default: the
    /// stock figures show recording time, starting at the offset.
    pub rezero_time: bool,
    /// qx, qy, qz, qw.
    pub quaternion_columns: Vec<ColumnReference>,
    /// x, y, z.
    pub position_columns: Vec<ColumnReference>,
    pub figures: Vec<FigureSpec>,
    pub trajectory_title: String,
}

fn headers(names: &[&str]) -> Vec<ColumnReference> {
    names.iter().map(|n| ColumnReference::header(n)).collect()
}

const PRESSURE_AXIS: &str = "Sensor Pressure (PSI)";
const TIME_AXIS: &str = "Time (s)";

/// Desired pressures and the single-sensor segments 3 and 4.
fn sensor_control_desired() -> FigureSpec {
    FigureSpec {
        window_title: "Sensor & Control Data (Desired, Segments 3 & 4)".into(),
        panels: vec![
            PanelSpec::new("Desired Pressures", headers(&["pd_3", "pd_6", "pd_7", "pd_8"]))
                .with_axes(TIME_AXIS, "Desired Pressure (PSI)")
                .with_labels(&["pd_segment_1", "pd_segment_2", "pd_segment_3", "pd_segment_4"])
                .with_colors(&["tab:red", "tab:orange", "tab:blue", "tab:green"]),
            PanelSpec::new("Measured Pressures (Segment 3)", headers(&["pm_8_4"]))
                .with_axes(TIME_AXIS, PRESSURE_AXIS)
                .with_labels(&["pm_segment_3"])
                .with_colors(&["tab:blue", "tab:cyan"]),
            PanelSpec::new("Measured Pressures (Segment 4)", headers(&["pm_8_3"]))
                .with_axes(TIME_AXIS, PRESSURE_AXIS)
                .with_labels(&["pm_segment_4"])
                .with_colors(&["tab:purple"]),
        ],
    }
}

/// The five-pouch segments 1 and 2.
fn sensor_control_segments() -> FigureSpec {
    FigureSpec {
        window_title: "Sensor & Control Data (Segments 1 & 2)".into(),
        panels: vec![
            PanelSpec::new(
                "Measured Pressures (Segment 1)",
                headers(&["pm_3_1", "pm_3_2", "pm_3_3", "pm_3_4", "pm_7_1"]),
            )
            .with_axes(TIME_AXIS, PRESSURE_AXIS)
            .with_labels(&[
                "Segment_1_pouch_1",
                "Segment_1_pouch_2",
                "Segment_1_pouch_3",
                "Segment_1_pouch_4",
                "Segment_1_pouch_5",
            ])
            .with_colors(&["tab:red", "tab:pink", "crimson", "tab:brown", "salmon"]),
            PanelSpec::new(
                "Measured Pressures (Segment 2)",
                headers(&["pm_7_2", "pm_7_3", "pm_7_4", "pm_8_1", "pm_8_2"]),
            )
            .with_axes(TIME_AXIS, PRESSURE_AXIS)
            .with_labels(&[
                "Segment_2_pouch_1",
                "Segment_2_pouch_2",
                "Segment_2_pouch_3",
                "Segment_2_pouch_4",
                "Segment_2_pouch_5",
            ])
            .with_colors(&["tab:orange", "tab:olive", "gold", "darkorange", "peru"]),
        ],
    }
}

fn mocap_time_series(position: &[ColumnReference]) -> FigureSpec {
    FigureSpec {
        window_title: "Mocap Data (Time Series - Body 3)".into(),
        panels: vec![
            PanelSpec::new("Mocap Position (Body 3 - Trajectory)", position.to_vec())
                .with_axes(TIME_AXIS, "Position")
                .with_labels(&["X Position", "Y Position", "Z Position"])
                .with_colors(&["tab:blue", "tab:orange", "tab:green"]),
            PanelSpec::new(
                "Mocap Yaw Orientation (Body 3 - Trajectory)",
                vec![ColumnReference::derived(YAW)],
            )
            .with_axes(TIME_AXIS, "Yaw (rad)")
            .with_labels(&["Yaw"])
            .with_colors(&["tab:red"]),
            PanelSpec::new(
                "Mocap Pitch Orientation (Body 3 - Trajectory)",
                vec![ColumnReference::derived(PITCH)],
            )
            .with_axes(TIME_AXIS, "Pitch (rad)")
            .with_labels(&["Pitch"])
            .with_colors(&["tab:purple"]),
        ],
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let position_columns = headers(&["mocap_3_x", "mocap_3_y", "mocap_3_z"]);
        AnalysisConfig {
            base_dir: PathBuf::from("experiments"),
            inbox_dir: None,
            time_column: ColumnReference::index(0),
            start_time_offset_sec: 10.0,
            rezero_time: false,
            quaternion_columns: headers(&["mocap_3_qx", "mocap_3_qy", "mocap_3_qz", "mocap_3_qw"]),
            figures: vec![
                sensor_control_desired(),
                sensor_control_segments(),
                mocap_time_series(&position_columns),
            ],
            position_columns,
            trajectory_title: "Robot Trajectory".into(),
        }
    }
}

impl AnalysisConfig {
    /// Read and validate a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AnalysisConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quaternion_columns.len() != 4 {
            return Err(ConfigError::Invalid(format!(
                "quaternion_columns needs 4 entries (qx, qy, qz, qw), got {}",
                self.quaternion_columns.len()
            )));
        }
        if self.position_columns.len() != 3 {
            return Err(ConfigError::Invalid(format!(
                "position_columns needs 3 entries (x, y, z), got {}",
                self.position_columns.len()
            )));
        }
        if !self.start_time_offset_sec.is_finite() {
            return Err(ConfigError::Invalid(
                "start_time_offset_sec must be a finite number".into(),
            ));
        }
        if let ColumnReference::Derived(name) = &self.time_column {
            return Err(ConfigError::Invalid(format!(
                "time_column must be a raw column, not derived '{name}'"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_has_three_figures_and_is_valid() {
        let config = AnalysisConfig::default();
        assert_eq!(config.figures.len(), 3);
        assert_eq!(config.figures[0].panels.len(), 3);
        assert_eq!(config.figures[1].panels.len(), 2);
        assert_eq!(
            config.figures[2].panels[1].columns,
            vec![ColumnReference::derived("yaw")]
        );
        assert_eq!(config.start_time_offset_sec, 10.0);
        config.validate().unwrap();
    }

    #[test]
    fn load_fills_missing_fields_from_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("analysis.json");
        fs::write(
            &path,
            r#"{"base_dir": "/data/experiments", "start_time_offset_sec": 2.5, "inbox_dir": "/data/inbox"}"#,
        )
        .unwrap();

        let config = AnalysisConfig::load(&path).unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/data/experiments"));
        assert_eq!(config.inbox_dir, Some(PathBuf::from("/data/inbox")));
        assert_eq!(config.start_time_offset_sec, 2.5);
        assert_eq!(config.figures, AnalysisConfig::default().figures);
    }

    #[test]
    fn save_then_load_is_identity() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("analysis.json");
        let config = AnalysisConfig::default();
        fs::write(&path, config.to_json().unwrap()).unwrap();
        assert_eq!(AnalysisConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn unknown_field_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("analysis.json");
        fs::write(&path, r#"{"base_dir": "x", "start_offset": 3}"#).unwrap();
        assert!(matches!(
            AnalysisConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn wrong_quaternion_count_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("analysis.json");
        fs::write(
            &path,
            r#"{"quaternion_columns": [{"index": 1}, {"index": 2}, {"index": 3}]}"#,
        )
        .unwrap();
        assert!(matches!(
            AnalysisConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let tmp = TempDir::new().unwrap();
        let err = AnalysisConfig::load(&tmp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
