use lenia_common::error::ensure_positive;
use lenia_common::{LeniaError, Vec2};
use rand::distr::Uniform;
use rand::prelude::*;

/// Places `count` particles uniformly in `[-half_width, half_width)^2`.
///
/// The RNG is seeded with `seed`, so the same arguments always give the same
/// particle set.
pub fn uniform_square(count: usize, half_width: f64, seed: u64) -> Result<Vec<Vec2>, LeniaError> {
    if count == 0 {
        return Err(LeniaError::EmptyParticleSet);
    }
    ensure_positive("half_width", half_width)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let coord_dist = Uniform::new(-half_width, half_width)
        .map_err(|_| LeniaError::invalid("half_width", half_width, "empty sampling range"))?;

    let positions = (0..count)
        .map(|_| Vec2::new(rng.sample(&coord_dist), rng.sample(&coord_dist)))
        .collect();
    Ok(positions)
}
