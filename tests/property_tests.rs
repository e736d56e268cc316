//! Property-based tests for the numeric invariants of rusty-mocap
//!
//! - quaternion conversion never leaves its angle ranges
//! - trimming and re-zeroing are idempotent
//! - rendering never drops a resolvable series

use std::f64::consts::{FRAC_PI_2, PI};

use proptest::prelude::*;
use rusty_mocap::color::{self, ColorSpec};
use rusty_mocap::data::{rezero_time, slice_from, ColumnReference, Dataset, DerivedSignals};
use rusty_mocap::kinematics::{pitch, quaternions_to_euler, roll, yaw};
use rusty_mocap::plot::{render_panel, render_trajectory, PanelSpec};

// ============================================================================
// Strategies
// ============================================================================

/// Random unit quaternion (qx, qy, qz, qw).
fn arb_unit_quaternion() -> impl Strategy<Value = [f64; 4]> {
    prop::array::uniform4(-1.0f64..1.0)
        .prop_filter("non-degenerate", |q| q.iter().map(|c| c * c).sum::<f64>() > 1e-6)
        .prop_map(|q| {
            let norm = q.iter().map(|c| c * c).sum::<f64>().sqrt();
            [q[0] / norm, q[1] / norm, q[2] / norm, q[3] / norm]
        })
}

/// Non-decreasing time axis starting at zero.
fn arb_time_axis() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..0.5, 1..200).prop_map(|steps| {
        let mut t = 0.0;
        steps
            .into_iter()
            .map(|dt| {
                let now = t;
                t += dt;
                now
            })
            .collect()
    })
}

fn dataset_for(time: &[f64]) -> Dataset {
    let rows: Vec<Vec<f64>> = time
        .iter()
        .enumerate()
        .map(|(i, &t)| vec![t, i as f64])
        .collect();
    Dataset::from_rows(&["time", "row"], &rows).unwrap()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Pitch stays within [-π/2, π/2] and the other angles within [-π, π].
    #[test]
    fn prop_euler_angles_in_range(q in arb_unit_quaternion()) {
        let [x, y, z, w] = q;
        let p = pitch(x, y, z, w);
        prop_assert!(p.is_finite());
        prop_assert!((-FRAC_PI_2..=FRAC_PI_2).contains(&p));
        prop_assert!((-PI..=PI).contains(&roll(x, y, z, w)));
        prop_assert!((-PI..=PI).contains(&yaw(x, y, z, w)));
    }

    /// Components slightly outside the unit sphere still give a finite pitch.
    #[test]
    fn prop_pitch_clamped_for_rounding(q in arb_unit_quaternion(), scale in 1.0f64..1.001) {
        let [x, y, z, w] = q.map(|c| c * scale);
        let p = pitch(x, y, z, w);
        prop_assert!(p.is_finite());
        prop_assert!(p.abs() <= FRAC_PI_2);
    }

    /// Batch conversion agrees with the scalar functions.
    #[test]
    fn prop_batch_matches_scalar(qs in prop::collection::vec(arb_unit_quaternion(), 1..50)) {
        let col = |k: usize| qs.iter().map(|q| q[k]).collect::<Vec<_>>();
        let euler = quaternions_to_euler(&col(0), &col(1), &col(2), &col(3)).unwrap();
        prop_assert_eq!(euler.yaw.len(), qs.len());
        for (i, [x, y, z, w]) in qs.iter().copied().enumerate() {
            prop_assert_eq!(euler.pitch[i], pitch(x, y, z, w));
            prop_assert_eq!(euler.yaw[i], yaw(x, y, z, w));
        }
    }

    /// Trimming an already-trimmed table at the same or a lower threshold is a no-op.
    #[test]
    fn prop_slice_idempotent(
        time in arb_time_axis(),
        frac in 0.0f64..=1.0,
        lower_frac in 0.0f64..=1.0,
    ) {
        let last = *time.last().unwrap();
        let threshold = last * frac;
        let time_col = ColumnReference::index(0);

        let once = slice_from(&dataset_for(&time), &time_col, threshold).unwrap();
        let twice = slice_from(&once, &time_col, threshold).unwrap();
        let lower = slice_from(&once, &time_col, threshold * lower_frac).unwrap();

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(&once, &lower);
        prop_assert!(once.row_count() >= 1);
        let first = once.values(0).unwrap()[0];
        prop_assert!(first >= threshold);
    }

    #[test]
    fn prop_rezero_idempotent(time in arb_time_axis(), offset in -100.0f64..100.0) {
        let shifted: Vec<f64> = time.iter().map(|t| t + offset).collect();
        let once = rezero_time(&shifted);
        prop_assert_eq!(once[0], 0.0);
        prop_assert_eq!(rezero_time(&once), once);
    }

    /// Every resolvable reference yields a series, every other one a skip.
    #[test]
    fn prop_render_partitions_references(indices in prop::collection::vec(0usize..6, 0..10)) {
        let dataset = Dataset::from_rows(
            &["time", "a", "b"],
            &[vec![0.0, 1.0, 2.0], vec![1.0, 3.0, 4.0]],
        )
        .unwrap();
        let refs: Vec<ColumnReference> = indices.iter().map(|&i| ColumnReference::index(i)).collect();
        let spec = PanelSpec::new("p", refs);
        let panel = render_panel(&spec, &dataset, &DerivedSignals::default(), &[0.0, 1.0]);

        let valid = indices.iter().filter(|&&i| i < 3).count();
        prop_assert_eq!(panel.series.len(), valid);
        prop_assert_eq!(panel.skipped.len(), indices.len() - valid);
    }

    /// Colour resolution never fails, whatever the entry.
    #[test]
    fn prop_color_resolution_total(
        index in 0usize..1000,
        name in "[a-z:#0-9]{0,12}",
        position in 0usize..20,
        count in 0usize..20,
    ) {
        let _ = color::resolve(&ColorSpec::Index(index), position, count);
        let _ = color::resolve(&ColorSpec::Name(name), position, count);
    }

    /// A stationary body gets a unit cube centred on its position.
    #[test]
    fn prop_flat_trajectory_unit_cube(
        p in prop::array::uniform3(-10.0f64..10.0),
        n in 1usize..20,
    ) {
        let view = render_trajectory(&vec![p[0]; n], &vec![p[1]; n], &vec![p[2]; n], "t").unwrap();
        prop_assert_eq!(view.bounds.half_range, 1.0);
        prop_assert_eq!(view.bounds.center, p);
    }
}

#[test]
fn identity_quaternion_is_zero_rotation() {
    assert_eq!(roll(0.0, 0.0, 0.0, 1.0), 0.0);
    assert_eq!(pitch(0.0, 0.0, 0.0, 1.0), 0.0);
    assert_eq!(yaw(0.0, 0.0, 0.0, 1.0).abs(), 0.0);
}
