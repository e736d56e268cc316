use serde::Serialize;

use crate::error::TrajectoryError;

// ---------------------------------------------------------------------------
// Equal-aspect framing
// ---------------------------------------------------------------------------

/// Axis-aligned cube that frames a path with the same scale on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingCube {
    /// Midpoint of each axis' min/max.
    pub center: [f64; 3],
    /// Half of the largest axis range; 1.0 when every axis is flat.
    pub half_range: f64,
}

impl BoundingCube {
    pub fn from_axes(x: &[f64], y: &[f64], z: &[f64]) -> Self {
        let (x_min, x_max) = min_max(x);
        let (y_min, y_max) = min_max(y);
        let (z_min, z_max) = min_max(z);

        let max_range = (x_max - x_min).max(y_max - y_min).max(z_max - z_min);
        let mut half_range = max_range / 2.0;
        if half_range == 0.0 || !half_range.is_finite() {
            half_range = 1.0;
        }

        BoundingCube {
            center: [
                (x_min + x_max) / 2.0,
                (y_min + y_max) / 2.0,
                (z_min + z_max) / 2.0,
            ],
            half_range,
        }
    }

    /// `(lower, upper)` limits of axis 0, 1 or 2.
    pub fn limits(&self, axis: usize) -> (f64, f64) {
        let c = self.center[axis];
        (c - self.half_range, c + self.half_range)
    }

    /// The eight corners, bit `k` of the index selecting the upper limit of
    /// axis `k`.
    pub fn corners(&self) -> [[f64; 3]; 8] {
        let mut out = [[0.0; 3]; 8];
        for (i, corner) in out.iter_mut().enumerate() {
            for (axis, v) in corner.iter_mut().enumerate() {
                let (lo, hi) = self.limits(axis);
                *v = if i & (1 << axis) != 0 { hi } else { lo };
            }
        }
        out
    }

    /// Corner index pairs of the twelve cube edges.
    pub fn edges() -> impl Iterator<Item = (usize, usize)> {
        (0..8usize).flat_map(|i| {
            (0..3)
                .map(move |axis| (i, i | (1 << axis)))
                .filter(|(a, b)| a != b)
        })
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

// ---------------------------------------------------------------------------
// 3D trajectory
// ---------------------------------------------------------------------------

/// A position trace ready for drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryView {
    pub title: String,
    pub path: Vec<[f64; 3]>,
    pub start: [f64; 3],
    pub end: [f64; 3],
    pub bounds: BoundingCube,
}

/// Build the 3D trajectory view: polyline, start/end markers and an
/// equal-aspect bounding cube.
pub fn render_trajectory(
    x: &[f64],
    y: &[f64],
    z: &[f64],
    title: &str,
) -> Result<TrajectoryView, TrajectoryError> {
    if x.is_empty() || x.len() != y.len() || x.len() != z.len() {
        return Err(TrajectoryError::EmptyTrajectory {
            x: x.len(),
            y: y.len(),
            z: z.len(),
        });
    }

    let path: Vec<[f64; 3]> = (0..x.len()).map(|i| [x[i], y[i], z[i]]).collect();
    Ok(TrajectoryView {
        title: title.to_string(),
        start: path[0],
        end: path[path.len() - 1],
        bounds: BoundingCube::from_axes(x, y, z),
        path,
    })
}

/// Fixed camera used to draw a 3D view on a 2D surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

impl Default for Projection {
    fn default() -> Self {
        Projection {
            azimuth_deg: -60.0,
            elevation_deg: 30.0,
        }
    }
}

impl Projection {
    /// Orthographic projection onto the screen plane. Lengths along screen
    /// axes are preserved, so equal aspect stays equal.
    pub fn project(&self, p: [f64; 3]) -> [f64; 2] {
        let (sa, ca) = self.azimuth_deg.to_radians().sin_cos();
        let (se, ce) = self.elevation_deg.to_radians().sin_cos();
        let right = [-sa, ca, 0.0];
        let up = [-ca * se, -sa * se, ce];
        [dot(p, right), dot(p, up)]
    }
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

// ---------------------------------------------------------------------------
// Planar trajectory (X–Z plane)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanarTrajectoryView {
    pub title: String,
    pub u_label: String,
    pub v_label: String,
    pub path: Vec<[f64; 2]>,
    pub start: [f64; 2],
    pub end: [f64; 2],
}

/// Two-axis trajectory, drawn with equal aspect.
pub fn planar_view(
    u: &[f64],
    v: &[f64],
    title: &str,
    u_label: &str,
    v_label: &str,
) -> Result<PlanarTrajectoryView, TrajectoryError> {
    if u.is_empty() || u.len() != v.len() {
        return Err(TrajectoryError::EmptyTrajectory {
            x: u.len(),
            y: 0,
            z: v.len(),
        });
    }

    let path: Vec<[f64; 2]> = u.iter().zip(v).map(|(&a, &b)| [a, b]).collect();
    Ok(PlanarTrajectoryView {
        title: title.to_string(),
        u_label: u_label.to_string(),
        v_label: v_label.to_string(),
        start: path[0],
        end: path[path.len() - 1],
        path,
    })
}
