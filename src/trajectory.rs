use lenia_common::Vec2;
use serde::{Deserialize, Serialize};

/// Margin applied around the particles when framing a trajectory.
const EXTENT_MARGIN: f64 = 1.2;

/// Particle positions after each integration step.
///
/// Frame `i` holds the particle set after `i + 1` steps; the initial state is
/// not part of the trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    dt: f64,
    frames: Vec<Vec<Vec2>>,
}

impl Trajectory {
    pub(crate) fn with_capacity(dt: f64, n_steps: usize) -> Self {
        Trajectory { dt, frames: Vec::with_capacity(n_steps) }
    }

    pub(crate) fn push(&mut self, frame: Vec<Vec2>) {
        self.frames.push(frame);
    }

    /// The step size the trajectory was integrated with.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Vec<Vec2>] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&[Vec2]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    pub fn last(&self) -> Option<&[Vec2]> {
        self.frames.last().map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Vec2]> {
        self.frames.iter().map(Vec::as_slice)
    }

    pub fn into_frames(self) -> Vec<Vec<Vec2>> {
        self.frames
    }

    /// Index of the first frame containing a NaN or infinite coordinate.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.frames
            .iter()
            .position(|frame| frame.iter().any(|p| !p.is_finite()))
    }

    /// Drops the first non-finite frame and everything after it.
    /// Returns the number of frames removed.
    pub fn truncate_at_divergence(&mut self) -> usize {
        match self.first_non_finite() {
            Some(index) => {
                let removed = self.frames.len() - index;
                self.frames.truncate(index);
                removed
            }
            None => 0,
        }
    }

    /// Half-width of a square view containing every finite position, with margin.
    pub fn extent(&self) -> Option<f64> {
        if self.frames.is_empty() {
            return None;
        }
        let max_abs = self
            .frames
            .iter()
            .map(|frame| frame_max_abs(frame))
            .fold(0.0, f64::max);
        Some(max_abs * EXTENT_MARGIN)
    }
}

/// Largest absolute finite coordinate in a frame (0 if there is none).
pub(crate) fn frame_max_abs(frame: &[Vec2]) -> f64 {
    frame
        .iter()
        .filter(|p| p.is_finite())
        .map(Vec2::max_abs)
        .fold(0.0, f64::max)
}

/// `frame_max_abs` with the framing margin applied.
pub fn frame_extent(frame: &[Vec2]) -> f64 {
    frame_max_abs(frame) * EXTENT_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trajectory {
        let mut t = Trajectory::with_capacity(0.5, 4);
        t.push(vec![Vec2::new(1.0, -2.0), Vec2::new(0.5, 0.5)]);
        t.push(vec![Vec2::new(3.0, 0.0), Vec2::new(0.0, -1.0)]);
        t.push(vec![Vec2::new(f64::NAN, 0.0), Vec2::new(1e9, 0.0)]);
        t.push(vec![Vec2::new(f64::INFINITY, 0.0), Vec2::new(0.0, 0.0)]);
        t
    }

    #[test]
    fn test_accessors() {
        let t = sample();
        assert_eq!(t.len(), 4);
        assert!(!t.is_empty());
        assert_eq!(t.dt(), 0.5);
        assert_eq!(t.frame(1).unwrap()[0], Vec2::new(3.0, 0.0));
        assert!(t.frame(4).is_none());
        assert_eq!(t.iter().count(), 4);
        assert_eq!(t.last().unwrap()[1], Vec2::zero());
    }

    #[test]
    fn test_divergence_helpers() {
        let mut t = sample();
        assert_eq!(t.first_non_finite(), Some(2));
        assert_eq!(t.truncate_at_divergence(), 2);
        assert_eq!(t.len(), 2);
        assert_eq!(t.first_non_finite(), None);
        assert_eq!(t.truncate_at_divergence(), 0);
    }

    #[test]
    fn test_extent() {
        let mut t = sample();
        // Non-finite coordinates are skipped, huge finite ones are not.
        assert_eq!(t.extent(), Some(1e9 * 1.2));
        t.truncate_at_divergence();
        assert_eq!(t.extent(), Some(3.0 * 1.2));
        assert_eq!(Trajectory::with_capacity(0.1, 0).extent(), None);
    }
}
