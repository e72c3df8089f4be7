use crate::fields::{check_inputs, evaluate, Fields};
use lenia_common::error::ensure_positive;
use lenia_common::{LeniaError, Params, Vec2};
use rayon::prelude::*;

/// Fields sampled on a square grid spanning `[-extent, extent]^2`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGrid {
    resolution: usize,
    extent: f64,
    /// Row-major, `values[iy * resolution + ix]`.
    values: Vec<Fields>,
}

impl FieldGrid {
    /// Nodes per side, always at least 2.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn extent(&self) -> f64 {
        self.extent
    }

    /// Row-major field values, `values()[iy * resolution + ix]`.
    pub fn values(&self) -> &[Fields] {
        &self.values
    }

    /// World coordinate of grid node `(ix, iy)`. Both ends of the span are included.
    pub fn point(&self, ix: usize, iy: usize) -> Vec2 {
        grid_point(self.resolution, self.extent, ix, iy)
    }

    pub fn get(&self, ix: usize, iy: usize) -> Option<&Fields> {
        if ix >= self.resolution || iy >= self.resolution {
            return None;
        }
        self.values.get(iy * self.resolution + ix)
    }

    /// Iterates `(ix, iy, point, fields)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Vec2, &Fields)> + '_ {
        self.values.iter().enumerate().map(move |(i, f)| {
            let ix = i % self.resolution;
            let iy = i / self.resolution;
            (ix, iy, self.point(ix, iy), f)
        })
    }
}

#[inline]
fn grid_point(resolution: usize, extent: f64, ix: usize, iy: usize) -> Vec2 {
    let step = 2.0 * extent / (resolution - 1) as f64;
    Vec2::new(-extent + ix as f64 * step, -extent + iy as f64 * step)
}

/// Evaluates the fields at every node of a `resolution x resolution` grid.
///
/// Rows are computed in parallel; every node is independent.
pub fn field_grid(
    params: &Params,
    points: &[Vec2],
    extent: f64,
    resolution: usize,
) -> Result<FieldGrid, LeniaError> {
    check_inputs(params, points)?;
    ensure_positive("extent", extent)?;
    if resolution < 2 {
        return Err(LeniaError::invalid(
            "resolution",
            resolution as f64,
            "grid needs at least 2 nodes per side",
        ));
    }

    let mut values = vec![Fields::<f64>::default(); resolution * resolution];
    values
        .par_chunks_mut(resolution)
        .enumerate()
        .for_each(|(iy, row)| {
            for (ix, out) in row.iter_mut().enumerate() {
                *out = evaluate(params, points, grid_point(resolution, extent, ix, iy));
            }
        });

    Ok(FieldGrid { resolution, extent, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::fields;

    #[test]
    fn test_grid_shape_and_endpoints() {
        let params = Params::rotor();
        let points = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 2.0)];
        let grid = field_grid(&params, &points, 3.0, 7).unwrap();
        assert_eq!(grid.values().len(), 49);
        assert_eq!(grid.resolution(), 7);
        assert_eq!(grid.extent(), 3.0);
        assert_eq!(grid.point(0, 0), Vec2::new(-3.0, -3.0));
        assert_eq!(grid.point(6, 6), Vec2::new(3.0, 3.0));
        assert_eq!(grid.point(3, 3), Vec2::new(0.0, 0.0));
        assert!(grid.get(7, 0).is_none());
        assert_eq!(grid.iter().count(), 49);
    }

    #[test]
    fn test_grid_matches_pointwise_fields() {
        let params = Params::new(2.0, 1.0, 0.2, 0.6, 0.15, 1.0);
        let points = vec![Vec2::new(0.5, -0.5), Vec2::new(-1.0, 1.5), Vec2::new(2.0, 0.0)];
        let grid = field_grid(&params, &points, 4.0, 9).unwrap();
        for (ix, iy, p, f) in grid.iter() {
            assert_eq!(grid.get(ix, iy), Some(f));
            assert_eq!(*f, fields(&params, &points, p).unwrap());
        }
    }

    #[test]
    fn test_rejects_bad_grid() {
        let params = Params::rotor();
        let points = vec![Vec2::zero()];
        assert!(field_grid(&params, &points, 1.0, 1).is_err());
        assert!(field_grid(&params, &points, 0.0, 4).is_err());
        assert!(field_grid(&params, &[], 1.0, 4).is_err());
    }
}
