use crate::dual::Real;
use lenia_common::{LeniaError, Params, Vec2};
use serde::{Deserialize, Serialize};

/// Squared distances are clipped below at this value before the square root,
/// so a query point sitting on a particle has r = 1e-5 instead of 0.
pub const DISTANCE_FLOOR_SQ: f64 = 1e-10;

/// The four scalar fields at a query point.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fields<T = f64> {
    /// Aggregated attraction potential.
    pub u: T,
    /// Growth response of `u`.
    pub g: T,
    /// Short-range repulsion.
    pub r: T,
    /// Net energy, `r - g`. Motion descends this.
    pub e: T,
}

/// Gaussian bump `exp(-((x - mu) / sigma)^2)`.
#[inline(always)]
pub fn peak<T: Real>(x: T, mu: f64, sigma: f64) -> T {
    (-((x - T::constant(mu)) / T::constant(sigma)).square()).exp()
}

/// Evaluates U, G, R and E at the query point `(qx, qy)`.
///
/// The particle set is a plain snapshot: only the query point carries
/// derivatives when `T` is a dual number.
pub fn fields_generic<T: Real>(params: &Params, points: &[Vec2], qx: T, qy: T) -> Fields<T> {
    let one = T::constant(1.0);
    let mut kernel_sum = T::constant(0.0);
    let mut overlap_sum = T::constant(0.0);

    for p in points {
        let dx = qx - T::constant(p.x);
        let dy = qy - T::constant(p.y);
        let r = (dx * dx + dy * dy).max_const(DISTANCE_FLOOR_SQ).sqrt();
        kernel_sum = kernel_sum + peak(r, params.mu_k, params.sigma_k);
        overlap_sum = overlap_sum + (one - r).max_const(0.0).square();
    }

    let u = kernel_sum * T::constant(params.w_k);
    let g = peak(u, params.mu_g, params.sigma_g);
    let r = T::constant(params.c_rep / 2.0) * overlap_sum;
    Fields { u, g, r, e: r - g }
}

/// Rejects invalid parameters and empty particle sets.
pub(crate) fn check_inputs(params: &Params, points: &[Vec2]) -> Result<(), LeniaError> {
    params.validate()?;
    if points.is_empty() {
        return Err(LeniaError::EmptyParticleSet);
    }
    Ok(())
}

#[inline]
pub(crate) fn evaluate(params: &Params, points: &[Vec2], x: Vec2) -> Fields {
    fields_generic(params, points, x.x, x.y)
}

/// Computes `(U, G, R, E)` at `x` for the given particle set.
///
/// `x` may coincide with a particle; that particle then contributes at the
/// distance floor, including the constant `c_rep / 2` self-repulsion.
pub fn fields(params: &Params, points: &[Vec2], x: Vec2) -> Result<Fields, LeniaError> {
    check_inputs(params, points)?;
    Ok(evaluate(params, points, x))
}

pub(crate) fn mean_over(params: &Params, points: &[Vec2]) -> Fields {
    if points.is_empty() {
        return Fields::default();
    }
    let mut sum: Fields = Fields::default();
    for &p in points {
        let f = evaluate(params, points, p);
        sum.u += f.u;
        sum.g += f.g;
        sum.r += f.r;
        sum.e += f.e;
    }
    let n = points.len() as f64;
    Fields {
        u: sum.u / n,
        g: sum.g / n,
        r: sum.r / n,
        e: sum.e / n,
    }
}

/// Mean of the fields evaluated at every particle's own position.
pub fn mean_fields(params: &Params, points: &[Vec2]) -> Result<Fields, LeniaError> {
    check_inputs(params, points)?;
    Ok(mean_over(params, points))
}

/// Energy of a point that sees no attraction at all, `-G(0)`.
///
/// Renderers subtract this so that empty space maps to zero.
pub fn resting_energy(params: &Params) -> f64 {
    -peak(0.0, params.mu_g, params.sigma_g)
}
