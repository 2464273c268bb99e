//! Fixed-step projected gradient ascent.
//!
//! Each iteration evaluates the objective and moves `x ← P(x + step·∇f(x))`,
//! where `P` clamps into the bounds. There is no line search. The run uses
//! its whole iteration budget unless `grad_tol` is positive and the
//! projected gradient's infinity norm falls to `grad_tol`, or an observer
//! stops it.
//!
//! Every iteration emits an [`Event`], which makes this solver useful for
//! inspecting how an objective behaves along its gradient.

mod action;
mod config;
mod error;
mod event;
mod solution;


pub use action::Action;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use tracing::debug;

use stackelberg_core::{Observer, Sample, Vector, params::Bound};

use crate::bounds::{project, projected_gradient_norm};

/// Ascends the objective from `x0` within `bounds`.
///
/// # Errors
///
/// Returns an error if the objective fails or produces a non-finite value
/// or gradient, or if `bounds` and `x0` differ in length.
pub fn maximize<F, E, Obs>(
    mut objective: F,
    x0: &Vector,
    bounds: &[Bound],
    config: &Config,
    mut observer: Obs,
) -> Result<Solution, Error<E>>
where
    F: FnMut(&Vector) -> Result<Sample, E>,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    if bounds.len() != x0.len() {
        return Err(Error::BoundsDimension {
            expected: x0.len(),
            found: bounds.len(),
        });
    }

    let mut x = x0.clone();
    project(&mut x, bounds);
    let mut evaluations = 0;

    for iter in 1..=config.iters() {
        let Sample { value, gradient } = objective(&x).map_err(Error::Objective)?;
        evaluations += 1;
        if !value.is_finite() || gradient.iter().any(|g| !g.is_finite()) {
            return Err(Error::NonFinite { iter });
        }

        if config.grad_tol() > 0.0 {
            let descent = gradient.mapv(|g| -g);
            if projected_gradient_norm(&x, &descent, bounds) <= config.grad_tol() {
                return Ok(Solution {
                    status: Status::Converged,
                    x,
                    objective: value,
                    iters: iter - 1,
                    evaluations,
                });
            }
        }

        debug!(iter, objective = value, "gradient ascent step");
        let event = Event {
            iter,
            x: &x,
            objective: value,
            gradient: &gradient,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution {
                status: Status::StoppedByObserver,
                x,
                objective: value,
                iters: iter - 1,
                evaluations,
            });
        }

        x.scaled_add(config.step(), &gradient);
        project(&mut x, bounds);
    }

    let Sample { value, .. } = objective(&x).map_err(Error::Objective)?;
    evaluations += 1;

    Ok(Solution {
        status: Status::Completed,
        x,
        objective: value,
        iters: config.iters(),
        evaluations,
    })
}

/// Ascends the objective without observer support.
///
/// This is a convenience wrapper around [`maximize`] that uses a no-op observer.
///
/// # Errors
///
/// Same as [`maximize`].
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
