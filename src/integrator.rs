use crate::fields::check_inputs;
use crate::motion::{forces, GradientMethod};
use crate::trajectory::Trajectory;
use lenia_common::error::ensure_positive;
use lenia_common::{LeniaError, Params, Vec2};
use log::{debug, trace};

fn check_run(params: &Params, positions: &[Vec2], dt: f64) -> Result<(), LeniaError> {
    check_inputs(params, positions)?;
    ensure_positive("dt", dt)
}

/// One forward Euler step, without input validation.
fn euler_step(params: &Params, positions: &[Vec2], dt: f64, method: GradientMethod) -> Vec<Vec2> {
    let velocities = forces(params, positions, method);
    positions
        .iter()
        .zip(velocities)
        .map(|(&p, v)| p + v * dt)
        .collect()
}

/// Advances the particle set by a single explicit Euler step.
pub fn step(
    params: &Params,
    positions: &[Vec2],
    dt: f64,
    method: GradientMethod,
) -> Result<Vec<Vec2>, LeniaError> {
    check_run(params, positions, dt)?;
    Ok(euler_step(params, positions, dt, method))
}

/// Integrates `n_steps` explicit Euler steps from `initial`.
///
/// The returned trajectory has exactly `n_steps` frames and does not include
/// `initial`. Non-finite positions caused by an unstable `dt` are propagated
/// as-is; see [`Trajectory::first_non_finite`].
pub fn integrate(
    params: &Params,
    initial: &[Vec2],
    dt: f64,
    n_steps: usize,
) -> Result<Trajectory, LeniaError> {
    integrate_observed(params, initial, dt, n_steps, GradientMethod::Analytic, |_, _| {})
}

/// Like [`integrate`], calling `observer(step, positions)` after every step.
///
/// `step` counts from 1, so the observer sees the same frame that lands at
/// index `step - 1` of the trajectory.
pub fn integrate_observed<F>(
    params: &Params,
    initial: &[Vec2],
    dt: f64,
    n_steps: usize,
    method: GradientMethod,
    mut observer: F,
) -> Result<Trajectory, LeniaError>
where
    F: FnMut(usize, &[Vec2]),
{
    check_run(params, initial, dt)?;
    debug!(
        "Integrating {} particles for {} steps (dt = {}, {:?} gradient).",
        initial.len(),
        n_steps,
        dt,
        method
    );

    let mut trajectory = Trajectory::with_capacity(dt, n_steps);
    let mut current = initial.to_vec();
    for step in 1..=n_steps {
        current = euler_step(params, &current, dt, method);
        observer(step, &current);
        trace!("Step {} done.", step);
        trajectory.push(current.clone());
    }
    Ok(trajectory)
}
