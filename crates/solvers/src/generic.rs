//! Unbounded gradient-based solvers delegated to `argmin`.
//!
//! Supports L-BFGS, steepest descent, and Polak-Ribière nonlinear conjugate
//! gradient, each with a More-Thuente line search. These solvers do not
//! support bounds.
//!
//! Each distinct point is evaluated once; `argmin`'s separate cost and
//! gradient requests at the same point share the evaluation. The run stops
//! with [`Status::Converged`] once the gradient's infinity norm falls to
//! `grad_tol`, or when the solver itself reports convergence.
//!
//! The returned solution holds the best point evaluated, except for a
//! converged run, which returns the point where the tolerance was met.

mod action;
mod adapter;
mod config;
mod error;
mod event;
mod method;
mod solution;


pub use action::Action;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use method::{Method, ParseMethodError};
pub use solution::{Solution, Status};

use argmin::{
    core::{
        Error as ArgminError, Executor, IterState, Solver, State, TerminationReason,
        TerminationStatus,
    },
    solver::{
        conjugategradient::{NonlinearConjugateGradient, beta::PolakRibiere},
        gradientdescent::SteepestDescent,
        linesearch::MoreThuenteLineSearch,
        quasinewton::LBFGS,
    },
};
use tracing::{debug, warn};

use stackelberg_core::{Goal, Maximize, Minimize, Observer, Sample, Vector};

use adapter::{Adapter, Interrupt, Point};

type ArgminState = IterState<Vector, Vector, (), (), (), f64>;
type LineSearch = MoreThuenteLineSearch<Vector, Vector, f64>;

/// Iterations between conjugate gradient restarts.
const CG_RESTART_ITERS: u64 = 10;

/// Minimizes the objective from `x0` with the given method.
///
/// # Errors
///
/// Returns an error if the objective fails, if `argmin` fails for a reason
/// of its own, or if the run ends before any point was evaluated.
pub fn minimize<F, E, Obs>(
    objective: F,
    x0: &Vector,
    method: Method,
    config: &Config,
    observer: Obs,
) -> Result<Solution, Error<E>>
where
    F: FnMut(&Vector) -> Result<Sample, E>,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    run::<F, E, Minimize, Obs>(objective, x0, method, config, observer)
}

/// Minimizes the objective without observer support.
///
/// # Errors
///
/// Same as [`minimize`].
pub fn minimize_unobserved<F, E>(
    objective: F,
    x0: &Vector,
    method: Method,
    config: &Config,
) -> Result<Solution, Error<E>>
where
    F: FnMut(&Vector) -> Result<Sample, E>,
{
    minimize(objective, x0, method, config, ())
}

/// Maximizes the objective from `x0` with the given method.
///
/// Internally minimizes the negated objective. Returned and observed
/// objective values are in the maximization sense.
///
/// # Errors
///
/// Same as [`minimize`].
pub fn maximize<F, E, Obs>(
    objective: F,
    x0: &Vector,
    method: Method,
    config: &Config,
    observer: Obs,
) -> Result<Solution, Error<E>>
where
    F: FnMut(&Vector) -> Result<Sample, E>,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    run::<F, E, Maximize, Obs>(objective, x0, method, config, observer)
}

/// Maximizes the objective without observer support.
///
/// # Errors
///
/// Same as [`minimize`].
pub fn maximize_unobserved<F, E>(
    objective: F,
    x0: &Vector,
    method: Method,
    config: &Config,
) -> Result<Solution, Error<E>>
where
    F: FnMut(&Vector) -> Result<Sample, E>,
{
    maximize(objective, x0, method, config, ())
}

fn run<F, E, G, Obs>(
    objective: F,
    x0: &Vector,
    method: Method,
    config: &Config,
    observer: Obs,
) -> Result<Solution, Error<E>>
where
    F: FnMut(&Vector) -> Result<Sample, E>,
    G: Goal,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let adapter = Adapter::<F, Obs, E, G>::new(objective, observer, config.grad_tol());
    debug!(%method, max_iters = config.max_iters(), "starting argmin run");

    let outcome = match method {
        Method::Lbfgs { memory } => {
            let solver: LBFGS<LineSearch, Vector, Vector, f64> =
                LBFGS::new(LineSearch::new(), memory);
            execute(&adapter, solver, x0, config.max_iters())
        }
        Method::SteepestDescent => {
            let solver = SteepestDescent::new(LineSearch::new());
            execute(&adapter, solver, x0, config.max_iters())
        }
        Method::ConjugateGradient => {
            let solver: NonlinearConjugateGradient<Vector, LineSearch, PolakRibiere, f64> =
                NonlinearConjugateGradient::new(LineSearch::new(), PolakRibiere::new())
                    .restart_iters(CG_RESTART_ITERS);
            execute(&adapter, solver, x0, config.max_iters())
        }
    };

    let record = adapter.into_record();
    match record.interrupt {
        Some(Interrupt::Failed(error)) => return Err(Error::Objective(error)),
        Some(Interrupt::Converged) => {
            let iters = record.gradient_evaluations;
            return finish::<G, E>(record.last, Status::Converged, iters, record.evaluations);
        }
        Some(Interrupt::Stopped) => {
            let iters = record.gradient_evaluations;
            return finish::<G, E>(
                record.best,
                Status::StoppedByObserver,
                iters,
                record.evaluations,
            );
        }
        None => {}
    }

    let (iters, termination) = outcome.map_err(|error| Error::Solver(error.into()))?;
    let status = match termination {
        TerminationStatus::Terminated(
            TerminationReason::SolverConverged | TerminationReason::TargetCostReached,
        ) => Status::Converged,
        TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
            warn!(iters, "argmin run reached the iteration limit");
            Status::MaxIters
        }
        other => {
            warn!(%other, "argmin run ended without converging");
            Status::Terminated(other.to_string())
        }
    };
    finish::<G, E>(record.best, status, iters, record.evaluations)
}

/// Runs `solver` on the adapter, returning the iteration count and the
/// reason the run ended.
fn execute<P, S>(
    problem: P,
    solver: S,
    x0: &Vector,
    max_iters: u64,
) -> Result<(u64, TerminationStatus), ArgminError>
where
    S: Solver<P, ArgminState>,
{
    let result = Executor::new(problem, solver)
        .configure(|state| state.param(x0.clone()).max_iters(max_iters))
        .run()?;
    let state = result.state();
    Ok((state.get_iter(), state.get_termination_status().clone()))
}

fn finish<G: Goal, E>(
    point: Option<Point>,
    status: Status,
    iters: u64,
    evaluations: usize,
) -> Result<Solution, Error<E>> {
    let Point { x, sample } = point.ok_or(Error::NoEvaluation)?;
    Ok(Solution {
        status,
        x,
        objective: G::transform(sample.value),
        iters,
        evaluations,
    })
}
