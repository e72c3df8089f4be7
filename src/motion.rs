use crate::dual::{Dual, Real};
use crate::fields::{check_inputs, fields_generic, peak, DISTANCE_FLOOR_SQ};
use lenia_common::{LeniaError, Params, Vec2};
use rayon::prelude::*;

/// How the spatial gradient of E is obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GradientMethod {
    /// Closed-form gradient chain-ruled through the pairwise distances.
    #[default]
    Analytic,
    /// Forward-mode automatic differentiation of the field expression.
    Dual,
}

/// Closed-form gradient of E with respect to the query point `x`.
fn analytic_gradient(params: &Params, points: &[Vec2], x: Vec2) -> Vec2 {
    // U has to be known before dG/dU can be formed.
    let mut kernel_sum = 0.0;
    for &p in points {
        let r = x.distance_squared(p).max_const(DISTANCE_FLOOR_SQ).sqrt();
        kernel_sum += peak(r, params.mu_k, params.sigma_k);
    }
    let u = params.w_k * kernel_sum;
    let g = peak(u, params.mu_g, params.sigma_g);
    let dg_du = -2.0 * (u - params.mu_g) / (params.sigma_g * params.sigma_g) * g;

    let inv_sigma_k_sq = 1.0 / (params.sigma_k * params.sigma_k);
    let mut grad = Vec2::zero();
    for &p in points {
        let d = x - p;
        let r_sq = d.length_squared();
        // Clipped distances are constant, so they contribute nothing.
        if r_sq <= DISTANCE_FLOOR_SQ {
            continue;
        }
        let r = r_sq.sqrt();
        let du_dr = -2.0
            * params.w_k
            * (r - params.mu_k)
            * inv_sigma_k_sq
            * peak(r, params.mu_k, params.sigma_k);
        let dr_dr = -params.c_rep * (1.0 - r).max(0.0);
        grad += d * ((dr_dr - dg_du * du_dr) / r);
    }
    grad
}

fn dual_gradient(params: &Params, points: &[Vec2], x: Vec2) -> Vec2 {
    let (qx, qy) = Dual::variables(x);
    fields_generic(params, points, qx, qy).e.grad
}

#[inline]
pub(crate) fn gradient_at(
    params: &Params,
    points: &[Vec2],
    x: Vec2,
    method: GradientMethod,
) -> Vec2 {
    match method {
        GradientMethod::Analytic => analytic_gradient(params, points, x),
        GradientMethod::Dual => dual_gradient(params, points, x),
    }
}

/// Forces on every particle, without input validation.
pub(crate) fn forces(params: &Params, points: &[Vec2], method: GradientMethod) -> Vec<Vec2> {
    // Each task reads the shared snapshot and sums sequentially, so the
    // result does not depend on the thread count.
    points
        .par_iter()
        .map(|&p| -gradient_at(params, points, p, method))
        .collect()
}

/// Gradient of E at an arbitrary query point, the particle set held fixed.
pub fn energy_gradient(
    params: &Params,
    points: &[Vec2],
    x: Vec2,
    method: GradientMethod,
) -> Result<Vec2, LeniaError> {
    check_inputs(params, points)?;
    Ok(gradient_at(params, points, x, method))
}

/// Velocity of every particle: `-∇E` evaluated at the particle's own position.
///
/// The output is index-aligned with `points`.
pub fn motion(params: &Params, points: &[Vec2]) -> Result<Vec<Vec2>, LeniaError> {
    motion_with(params, points, GradientMethod::Analytic)
}

/// Like [`motion`], with an explicit gradient method.
pub fn motion_with(
    params: &Params,
    points: &[Vec2],
    method: GradientMethod,
) -> Result<Vec<Vec2>, LeniaError> {
    check_inputs(params, points)?;
    log::trace!("Evaluating motion for {} particles ({:?}).", points.len(), method);
    Ok(forces(params, points, method))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::fields;
    use rand::prelude::*;

    fn random_points(n: usize, half_width: f64, seed: u64) -> Vec<Vec2> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                Vec2::new(
                    rng.random_range(-half_width..half_width),
                    rng.random_range(-half_width..half_width),
                )
            })
            .collect()
    }

    fn assert_vec_close(a: Vec2, b: Vec2, rel: f64, abs: f64) {
        let err = (a - b).length();
        let scale = a.length().max(b.length());
        assert!(
            err <= rel * scale + abs,
            "{:?} vs {:?} (err {:e})",
            a,
            b,
            err
        );
    }

    /// Central difference of E at a particle's own position with the set frozen.
    fn finite_difference(params: &Params, points: &[Vec2], x: Vec2) -> Vec2 {
        let h = 1e-6;
        let e = |q: Vec2| fields(params, points, q).unwrap().e;
        Vec2::new(
            (e(x + Vec2::new(h, 0.0)) - e(x - Vec2::new(h, 0.0))) / (2.0 * h),
            (e(x + Vec2::new(0.0, h)) - e(x - Vec2::new(0.0, h))) / (2.0 * h),
        )
    }

    #[test]
    fn test_analytic_matches_dual() {
        let params = Params::new(2.0, 0.8, 0.15, 0.6, 0.15, 1.0);
        let points = random_points(40, 3.0, 7);
        let analytic = motion_with(&params, &points, GradientMethod::Analytic).unwrap();
        let dual = motion_with(&params, &points, GradientMethod::Dual).unwrap();
        assert_eq!(analytic.len(), points.len());
        for (a, d) in analytic.iter().zip(&dual) {
            assert_vec_close(*a, *d, 1e-9, 1e-12);
        }
    }

    #[test]
    fn test_matches_finite_difference() {
        let params = Params::new(2.0, 0.8, 0.15, 0.6, 0.15, 1.0);
        let points = random_points(12, 3.0, 42);
        for method in [GradientMethod::Analytic, GradientMethod::Dual] {
            let forces = motion_with(&params, &points, method).unwrap();
            for (i, &p) in points.iter().enumerate() {
                let fd = -finite_difference(&params, &points, p);
                assert_vec_close(forces[i], fd, 1e-4, 1e-9);
            }
        }
    }

    #[test]
    fn test_rotor_forces_match_finite_difference() {
        let params = Params::rotor();
        let points = random_points(30, 6.0, 20);
        let forces = motion(&params, &points).unwrap();
        for (i, &p) in points.iter().enumerate() {
            assert!(forces[i].is_finite());
            let fd = -finite_difference(&params, &points, p);
            assert_vec_close(forces[i], fd, 1e-4, 1e-9);
        }
    }

    #[test]
    fn test_self_term_has_no_force() {
        // A lone particle only sees itself at the distance floor.
        let params = Params::rotor();
        let forces = motion(&params, &[Vec2::new(1.0, 2.0)]).unwrap();
        assert_eq!(forces, vec![Vec2::zero()]);
        let forces = motion_with(&params, &[Vec2::new(1.0, 2.0)], GradientMethod::Dual).unwrap();
        assert_eq!(forces, vec![Vec2::zero()]);
    }

    #[test]
    fn test_close_pair_repels() {
        let params = Params::rotor();
        let points = [Vec2::new(-0.25, 0.0), Vec2::new(0.25, 0.0)];
        let forces = motion(&params, &points).unwrap();
        assert!(forces[0].x < 0.0);
        assert!(forces[1].x > 0.0);
        assert!((forces[0].x + forces[1].x).abs() < 1e-15);
        assert_eq!(forces[0].y, 0.0);
    }

    #[test]
    fn test_energy_gradient_off_particle() {
        let params = Params::new(2.0, 0.8, 0.15, 0.6, 0.15, 1.0);
        let points = random_points(6, 2.0, 1);
        let x = Vec2::new(0.37, -0.21);
        let a = energy_gradient(&params, &points, x, GradientMethod::Analytic).unwrap();
        let d = energy_gradient(&params, &points, x, GradientMethod::Dual).unwrap();
        assert_vec_close(a, d, 1e-9, 1e-12);
        assert_vec_close(a, finite_difference(&params, &points, x), 1e-4, 1e-9);
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert_eq!(motion(&Params::rotor(), &[]), Err(LeniaError::EmptyParticleSet));
        let bad = Params { sigma_g: -1.0, ..Params::rotor() };
        assert!(motion(&bad, &[Vec2::zero()]).is_err());
    }
}
