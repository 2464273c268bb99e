//! Bounded limited-memory quasi-Newton (projected L-BFGS).
//!
//! # Algorithm
//!
//! The solver keeps the last `memory` curvature pairs `(s, y)` and builds a
//! search direction with the two-loop recursion, scaled by `γ = sᵀy / yᵀy`.
//! Components held at a bound by the gradient are frozen for the iteration.
//! A projected backtracking line search (Armijo, `c1 = 1e-4`, halving)
//! chooses the step; every trial point is clamped into the box.
//!
//! A pair is stored only when `sᵀy > ε·yᵀy`, which keeps the implicit
//! inverse Hessian positive definite.
//!
//! If a line search fails, the history is dropped and the current point is
//! evaluated again before a steepest-descent retry. The re-evaluation lets a
//! batch objective whose contexts changed between passes recover. A failure
//! from a freshly evaluated point ends the run with
//! [`Status::LineSearchFailed`].
//!
//! # Stopping
//!
//! - [`Status::Converged`]: the infinity norm of the projected gradient is at
//!   most `pg_tol`, or an accepted step reduced the objective by a relative
//!   amount of at most `rel_reduction_tol`
//! - [`Status::MaxIters`]: `max_iters` iterations completed
//! - [`Status::LineSearchFailed`]: no descent step could be found
//! - [`Status::StoppedByObserver`]: an observer returned [`Action::StopEarly`]
//!
//! Non-converged statuses are logged with `tracing::warn!` and returned with
//! the best iterate; they are not errors.
//!
//! # Observer Events
//!
//! The solver emits [`Event::Iterated`] after each accepted step and
//! [`Event::Restarted`] after each line-search restart.

mod action;
mod config;
mod error;
mod event;
mod line_search;
mod memory;
mod search;
mod solution;

#[cfg(test)]
mod tests;

pub use action::Action;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use stackelberg_core::{Maximize, Minimize, Observer, Sample, Vector, params::Bound};

use search::search;

/// Minimizes the objective within `bounds`, starting from `x0`.
///
/// `x0` is clamped into the bounds before the first evaluation.
///
/// # Errors
///
/// Returns an error if the objective fails, if `bounds` and `x0` differ in
/// length, or if the objective is not finite at the starting point.
pub fn minimize<F, E, Obs>(
    objective: F,
    x0: &Vector,
    bounds: &[Bound],
    config: &Config,
    observer: Obs,
) -> Result<Solution, Error<E>>
where
    F: FnMut(&Vector) -> Result<Sample, E>,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    search::<F, E, Minimize, Obs>(objective, x0, bounds, config, observer)
}

/// Minimizes the objective without observer support.
///
/// This is a convenience wrapper around [`minimize`] that uses a no-op observer.
///
/// # Errors
///
/// Same as [`minimize`].
pub fn minimize_unobserved<F, E>(
    objective: F,
    x0: &Vector,
    bounds: &[Bound],
    config: &Config,
) -> Result<Solution, Error<E>>
where
    F: FnMut(&Vector) -> Result<Sample, E>,
{
    minimize(objective, x0, bounds, config, ())
}

/// Maximizes the objective within `bounds`, starting from `x0`.
///
/// Internally minimizes the negated objective. The returned objective,
/// gradient, and event values are in the maximization sense.
///
/// # Errors
///
/// Same as [`minimize`].
pub fn maximize<F, E, Obs>(
    objective: F,
    x0: &Vector,
    bounds: &[Bound],
    config: &Config,
    observer: Obs,
) -> Result<Solution, Error<E>>
where
    F: FnMut(&Vector) -> Result<Sample, E>,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    search::<F, E, Maximize, Obs>(objective, x0, bounds, config, observer)
}

/// Maximizes the objective without observer support.
///
/// This is a convenience wrapper around [`maximize`] that uses a no-op observer.
///
/// # Errors
///
/// Same as [`minimize`].
pub fn maximize_unobserved<F, E>(
    objective: F,
    x0: &Vector,
    bounds: &[Bound],
    config: &Config,
) -> Result<Solution, Error<E>>
where
    F: FnMut(&Vector) -> Result<Sample, E>,
{
    maximize(objective, x0, bounds, config, ())
}
