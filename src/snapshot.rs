use crate::fields::mean_over;
use crate::trajectory::frame_extent;
use lenia_common::{Params, Snapshot, Vec2};

/// Collects summary fields for the particle set after `step` steps.
///
/// Positions are copied into the snapshot only when `include_positions` is set.
pub fn capture_snapshot(
    params: &Params,
    step: usize,
    dt: f64,
    positions: &[Vec2],
    include_positions: bool,
) -> Snapshot {
    let mean = mean_over(params, positions);
    Snapshot {
        step,
        time: step as f64 * dt,
        particle_count: positions.len() as u32,
        mean_energy: mean.e,
        mean_growth: mean.g,
        mean_potential: mean.u,
        extent: frame_extent(positions),
        all_finite: positions.iter().all(Vec2::is_finite),
        positions: include_positions.then(|| positions.iter().map(|&p| p.into()).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::mean_fields;

    #[test]
    fn test_capture() {
        let params = Params::rotor();
        let positions = vec![Vec2::new(0.5, -2.5), Vec2::new(1.0, 1.0)];
        let snapshot = capture_snapshot(&params, 10, 0.1, &positions, true);
        let mean = mean_fields(&params, &positions).unwrap();

        assert_eq!(snapshot.step, 10);
        assert!((snapshot.time - 1.0).abs() < 1e-12);
        assert_eq!(snapshot.particle_count, 2);
        assert_eq!(snapshot.mean_energy, mean.e);
        assert_eq!(snapshot.mean_growth, mean.g);
        assert_eq!(snapshot.mean_potential, mean.u);
        assert_eq!(snapshot.extent, 2.5 * 1.2);
        assert!(snapshot.all_finite);
        assert_eq!(snapshot.positions, Some(vec![(0.5, -2.5), (1.0, 1.0)]));

        let bare = capture_snapshot(&params, 10, 0.1, &positions, false);
        assert!(bare.positions.is_none());
    }

    #[test]
    fn test_capture_flags_divergence() {
        let params = Params::rotor();
        let positions = vec![Vec2::new(f64::NAN, 0.0), Vec2::new(1.0, 1.0)];
        let snapshot = capture_snapshot(&params, 3, 0.1, &positions, false);
        assert!(!snapshot.all_finite);
        assert!(snapshot.mean_energy.is_nan());
        assert_eq!(snapshot.extent, 1.2);
    }
}
