//! Particle Lenia: particles in the plane descending an energy field that
//! they generate themselves.
//!
//! The core is three pure operations. [`fields`] evaluates the potential,
//! growth, repulsion and energy at a query point. [`motion`] turns the energy
//! gradient into a velocity for every particle. [`integrate`] steps the
//! particle set with explicit Euler and records the trajectory.

pub mod dual;
pub mod fields;
pub mod grid;
pub mod integrator;
pub mod motion;
pub mod placement;
pub mod snapshot;
pub mod trajectory;

pub use fields::{fields, mean_fields, resting_energy, Fields};
pub use grid::{field_grid, FieldGrid};
pub use integrator::{integrate, integrate_observed, step};
pub use motion::{energy_gradient, motion, motion_with, GradientMethod};
pub use placement::uniform_square;
pub use snapshot::capture_snapshot;
pub use trajectory::Trajectory;

pub use lenia_common::{LeniaConfig, LeniaError, Params, Snapshot, Vec2};
