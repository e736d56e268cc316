//! Writes a synthetic experiment into today's folder for trying the viewer:
//! `generate_sample [base_dir]`.

use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rusty_mocap::data::{save_csv, Column, Dataset};
use rusty_mocap::experiment::next_experiment_path;

const SAMPLE_RATE_HZ: f64 = 50.0;
const DURATION_SEC: f64 = 40.0;

const DESIRED: [&str; 4] = ["pd_3", "pd_6", "pd_7", "pd_8"];
const MEASURED: [&str; 12] = [
    "pm_3_1", "pm_3_2", "pm_3_3", "pm_3_4", "pm_7_1", "pm_7_2", "pm_7_3", "pm_7_4", "pm_8_1",
    "pm_8_2", "pm_8_3", "pm_8_4",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }
}

/// Quaternion (qx, qy, qz, qw) for the given yaw and pitch, zero roll.
fn quaternion(yaw: f64, pitch: f64) -> [f64; 4] {
    let (sy, cy) = (yaw / 2.0).sin_cos();
    let (sp, cp) = (pitch / 2.0).sin_cos();
    [-sp * sy, sp * cy, cp * sy, cp * cy]
}

fn main() -> Result<()> {
    env_logger::init();

    let base_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("experiments"));
    let today = chrono::Local::now().date_naive();
    let output = next_experiment_path(&base_dir, today, "csv")?;

    let mut rng = SimpleRng::new(42);
    let n = (DURATION_SEC * SAMPLE_RATE_HZ) as usize;
    let time: Vec<f64> = (0..n).map(|i| i as f64 / SAMPLE_RATE_HZ).collect();

    let mut columns = vec![Column::new("time", time.clone())];

    // Desired pressures: phase-shifted sine waves, measured ones lag and add noise.
    let desired: Vec<Vec<f64>> = (0..DESIRED.len())
        .map(|k| {
            let phase = k as f64 * PI / 2.0;
            time.iter()
                .map(|&t| 5.0 + 4.0 * (2.0 * PI * 0.1 * t + phase).sin())
                .collect()
        })
        .collect();
    for (name, values) in DESIRED.iter().zip(&desired) {
        columns.push(Column::new(*name, values.clone()));
    }
    for (i, name) in MEASURED.iter().enumerate() {
        let source = &desired[i * DESIRED.len() / MEASURED.len()];
        let lag = 5 + i;
        let values = (0..n)
            .map(|j| source[j.saturating_sub(lag)] * 0.95 + rng.gauss(0.0, 0.05))
            .collect();
        columns.push(Column::new(*name, values));
    }

    // Mocap body 3: slow helix with a gently rotating orientation.
    let position: [Vec<f64>; 3] = [
        time.iter().map(|&t| 0.2 * (0.15 * t).cos()).collect(),
        time.iter().map(|&t| 0.2 * (0.15 * t).sin()).collect(),
        time.iter().map(|&t| 0.5 + 0.005 * t).collect(),
    ];
    for (axis, values) in ["x", "y", "z"].iter().zip(position) {
        let noisy = values.iter().map(|v| v + rng.gauss(0.0, 0.0005)).collect();
        columns.push(Column::new(format!("mocap_3_{axis}"), noisy));
    }

    let quats: Vec<[f64; 4]> = time
        .iter()
        .map(|&t| quaternion(0.6 * (0.2 * t).sin(), 0.15 * (0.5 * t).sin()))
        .collect();
    for (k, axis) in ["qx", "qy", "qz", "qw"].iter().enumerate() {
        columns.push(Column::new(
            format!("mocap_3_{axis}"),
            quats.iter().map(|q| q[k]).collect(),
        ));
    }

    let dataset = Dataset::new(columns).context("Failed to assemble sample dataset")?;
    save_csv(&dataset, &output)?;

    println!(
        "Wrote {} rows × {} columns to {}",
        dataset.row_count(),
        dataset.column_count(),
        output.display()
    );
    Ok(())
}
