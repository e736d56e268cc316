use std::collections::BTreeMap;

use super::model::{ColumnReference, Dataset};
use crate::error::TableError;
use crate::kinematics::quaternions_to_euler;

/// Key of the yaw signal.
pub const YAW: &str = "yaw";
/// Key of the pitch signal.
pub const PITCH: &str = "pitch";
/// Key of the roll signal.
pub const ROLL: &str = "roll";

// ---------------------------------------------------------------------------
// DerivedSignals – named series computed from raw columns
// ---------------------------------------------------------------------------

/// Name → series map, built once per run right after slicing.
///
/// Every series has the same length as the dataset it was derived from. A
/// signal whose inputs were missing or malformed is simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedSignals {
    signals: BTreeMap<String, Vec<f64>>,
}

impl DerivedSignals {
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.signals.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.signals.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

impl FromIterator<(String, Vec<f64>)> for DerivedSignals {
    fn from_iter<I: IntoIterator<Item = (String, Vec<f64>)>>(iter: I) -> Self {
        DerivedSignals {
            signals: iter.into_iter().collect(),
        }
    }
}

/// Compute every derived signal the dataset supports.
///
/// `quaternion_columns` names qx, qy, qz, qw in that order. Failures are
/// logged and leave the affected keys out; they never fail the run.
pub fn compute_all(dataset: &Dataset, quaternion_columns: &[ColumnReference]) -> DerivedSignals {
    let mut signals = BTreeMap::new();

    match orientation(dataset, quaternion_columns) {
        Ok(found) => signals.extend(found),
        Err(e) => log::warn!("Could not calculate orientation from quaternions: {e}"),
    }

    log::debug!("Derived signals: {:?}", signals.keys().collect::<Vec<_>>());
    DerivedSignals { signals }
}

fn orientation(
    dataset: &Dataset,
    columns: &[ColumnReference],
) -> Result<Vec<(String, Vec<f64>)>, TableError> {
    let [qx, qy, qz, qw] = columns else {
        return Err(TableError::DimensionMismatch {
            expected: 4,
            found: columns.len(),
        });
    };

    let euler = quaternions_to_euler(
        dataset.series(qx)?,
        dataset.series(qy)?,
        dataset.series(qz)?,
        dataset.series(qw)?,
    )?;

    Ok(vec![
        (YAW.to_string(), euler.yaw),
        (PITCH.to_string(), euler.pitch),
        (ROLL.to_string(), euler.roll),
    ])
}
