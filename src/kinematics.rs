//! Quaternion → roll / pitch / yaw conversion for motion-capture bodies.
//!
//! All angles are in radians. Yaw is reported with the display sign
//! convention of the capture rig (negated right-hand yaw).

use crate::error::TableError;

/// Rotation about X.
pub fn roll(qx: f64, qy: f64, qz: f64, qw: f64) -> f64 {
    (2.0 * (qw * qx + qy * qz)).atan2(1.0 - 2.0 * (qx * qx + qy * qy))
}

/// Rotation about Y, always within [-π/2, π/2].
pub fn pitch(qx: f64, qy: f64, qz: f64, qw: f64) -> f64 {
    // Rounding can push the argument just past ±1.
    (2.0 * (qw * qy - qz * qx)).clamp(-1.0, 1.0).asin()
}

/// Rotation about Z, negated.
pub fn yaw(qx: f64, qy: f64, qz: f64, qw: f64) -> f64 {
    -(2.0 * (qw * qz + qx * qy)).atan2(1.0 - 2.0 * (qy * qy + qz * qz))
}

/// Element-wise Euler angles for a batch of quaternions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EulerSeries {
    pub roll: Vec<f64>,
    pub pitch: Vec<f64>,
    pub yaw: Vec<f64>,
}

/// Convert four component sequences into roll/pitch/yaw sequences.
pub fn quaternions_to_euler(
    qx: &[f64],
    qy: &[f64],
    qz: &[f64],
    qw: &[f64],
) -> Result<EulerSeries, TableError> {
    let n = qx.len();
    for other in [qy.len(), qz.len(), qw.len()] {
        if other != n {
            return Err(TableError::DimensionMismatch {
                expected: n,
                found: other,
            });
        }
    }

    let mut out = EulerSeries {
        roll: Vec::with_capacity(n),
        pitch: Vec::with_capacity(n),
        yaw: Vec::with_capacity(n),
    };
    for i in 0..n {
        let (x, y, z, w) = (qx[i], qy[i], qz[i], qw[i]);
        out.roll.push(roll(x, y, z, w));
        out.pitch.push(pitch(x, y, z, w));
        out.yaw.push(yaw(x, y, z, w));
    }
    Ok(out)
}
