//! Bi-level (Stackelberg) optimization through an implicit inner optimum.
//!
//! The outer parameters are chosen to maximize `f2(outer, inner)` while the
//! inner parameters always maximize `f1(outer, inner)` for the current outer
//! parameters.
//!
//! # Algorithm
//!
//! The outer problem runs on the bounded quasi-Newton solver. Every outer
//! evaluation first re-solves the inner problem to convergence, warm-started
//! from the previous inner optimum. At that optimum the [`Coupling`] terms
//! are averaged over the context source and combined by the implicit
//! function theorem:
//!
//! ```text
//! ∇F(outer) = ∂f2/∂outer − J·H⁻¹·∂f2/∂inner
//! ```
//!
//! where `H = ∂²f1/∂inner²` and `J = ∂/∂inner (∂f1/∂outer)`. One linear
//! solve per outer evaluation replaces differentiating through the inner
//! solver.
//!
//! After the outer solver stops, the inner problem is solved once more for
//! the final outer point, so the returned pair is mutually consistent.
//!
//! # Failure
//!
//! A singular, non-finite, or ill-conditioned `H` ends the run with
//! [`Error::SingularCurvature`]; there is no approximate fallback. Inner
//! solves that stop without converging are logged with `tracing::warn!` and
//! the run continues.
//!
//! [`Coupling`]: stackelberg_core::Coupling

mod action;
mod config;
mod error;
mod event;
mod implicit;
mod outcome;
mod state;


pub use action::Action;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use outcome::Outcome;
pub use state::InnerState;

pub use crate::quasi_newton::Status;

use std::cell::{Cell, RefCell};

use tracing::{debug, warn};

use stackelberg_core::{
    BoundsMap, ContextSource, NestedOracle, Observer, ParamError, ParameterBlock, ParameterSpace,
    Sample, Vector, params::Bound,
};

use crate::{
    batch::{self, CouplingShape, average},
    quasi_newton,
};

use implicit::implicit_gradient;

/// Maximizes an outer objective over parameters that also shape an inner
/// optimum.
#[derive(Debug)]
pub struct BiLevelOptimizer<'a, O, S: ?Sized> {
    oracle: &'a O,
    source: &'a S,
    inner_space: ParameterSpace,
    outer_space: ParameterSpace,
    config: Config,
    batch: batch::Config,
}

/// The inner optimum for one outer point, with its mean objective.
struct InnerSolve {
    x: Vector,
    objective: f64,
    iters: usize,
    status: Status,
}

impl<'a, O, S> BiLevelOptimizer<'a, O, S>
where
    O: NestedOracle,
    S: ContextSource<Context = O::Context> + ?Sized,
{
    /// Creates an optimizer over the layouts of the inner and outer blocks.
    ///
    /// # Errors
    ///
    /// Returns an error if blocks within one list share a name or a block
    /// is empty.
    pub fn new(
        oracle: &'a O,
        source: &'a S,
        inner_blocks: &[ParameterBlock],
        outer_blocks: &[ParameterBlock],
        config: Config,
        batch: batch::Config,
    ) -> Result<Self, ParamError> {
        Ok(Self {
            oracle,
            source,
            inner_space: ParameterSpace::new(inner_blocks)?,
            outer_space: ParameterSpace::new(outer_blocks)?,
            config,
            batch,
        })
    }

    #[must_use]
    pub fn inner_space(&self) -> &ParameterSpace {
        &self.inner_space
    }

    #[must_use]
    pub fn outer_space(&self) -> &ParameterSpace {
        &self.outer_space
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Maximizes the outer objective and writes both block sets back.
    ///
    /// `bounds` applies to the outer blocks. Inner blocks use their own
    /// bounds.
    ///
    /// # Errors
    ///
    /// Returns an error naming the failed stage: an inner solve, a coupling
    /// batch pass, the implicit-gradient solve, or the outer solver.
    pub fn maximize(
        &self,
        inner: &mut [ParameterBlock],
        outer: &mut [ParameterBlock],
        bounds: &BoundsMap,
    ) -> Result<Outcome, Error<O::Error>> {
        self.maximize_observed(inner, outer, bounds, ())
    }

    /// Like [`maximize`](Self::maximize), reporting progress to `observer`.
    ///
    /// # Errors
    ///
    /// Same as [`maximize`](Self::maximize).
    pub fn maximize_observed<Obs>(
        &self,
        inner: &mut [ParameterBlock],
        outer: &mut [ParameterBlock],
        bounds: &BoundsMap,
        observer: Obs,
    ) -> Result<Outcome, Error<O::Error>>
    where
        Obs: for<'e> Observer<Event<'e>, Action>,
    {
        let outer_x0 = self.outer_space.flatten(outer)?;
        let outer_bounds = self.outer_space.bounds(outer, bounds)?;
        let inner_x0 = self.inner_space.flatten(inner)?;
        let inner_bounds = self.inner_space.bounds(inner, &BoundsMap::new())?;

        let observer = RefCell::new(observer);
        let stop = Cell::new(false);
        let state = RefCell::new(InnerState::Stale(inner_x0));
        let solves = Cell::new(0_usize);

        let objective = |x: &Vector| -> Result<Sample, Error<O::Error>> {
            let mut state = state.borrow_mut();
            state.invalidate();
            let solve = self.solve_inner(x, state.point(), &inner_bounds)?;
            solves.set(solves.get() + 1);
            let inner = state.converge(solve.x);
            self.notify(&observer, &stop, &Event::InnerSolved {
                outer: x,
                inner,
                objective: solve.objective,
                iters: solve.iters,
                status: solve.status,
            });

            let sample = self.outer_sample(x, inner)?;
            self.notify(&observer, &stop, &Event::OuterEvaluated {
                outer: x,
                objective: sample.value,
                gradient: &sample.gradient,
            });
            Ok(sample)
        };

        let forward = |event: &quasi_newton::Event<'_>| {
            self.notify(&observer, &stop, &Event::Outer(event));
            stop.get().then_some(quasi_newton::Action::StopEarly)
        };

        let solution = quasi_newton::maximize(
            objective,
            &outer_x0,
            &outer_bounds,
            self.config.outer(),
            forward,
        )?;
        if matches!(solution.status, Status::MaxIters | Status::LineSearchFailed) {
            warn!(status = ?solution.status, iters = solution.iters, "outer solve did not converge");
        }

        let mut state = state.into_inner();
        state.invalidate();
        let solve = self.solve_inner(&solution.x, state.point(), &inner_bounds)?;
        let inner_x = state.converge(solve.x).clone();
        debug!(
            outer_iters = solution.iters,
            inner_solves = solves.get() + 1,
            objective = solution.objective,
            "bi-level run finished"
        );

        let outer_values = named(&self.outer_space, &solution.x)?;
        let inner_values = named(&self.inner_space, &inner_x)?;
        self.outer_space.write_back(&solution.x, outer)?;
        self.inner_space.write_back(&inner_x, inner)?;

        Ok(Outcome {
            status: solution.status,
            outer: solution.x,
            inner: inner_x,
            outer_values,
            inner_values,
            objective: solution.objective,
            inner_objective: solve.objective,
            gradient: solution.gradient,
            iters: solution.iters,
            inner_solves: solves.get() + 1,
        })
    }

    /// Solves the inner problem for `outer`, starting from `warm`.
    fn solve_inner(
        &self,
        outer: &Vector,
        warm: &Vector,
        bounds: &[Bound],
    ) -> Result<InnerSolve, Error<O::Error>> {
        let shape = warm.len();
        let objective = |inner: &Vector| {
            average(self.source, &self.batch, shape, |context| {
                self.oracle.inner(outer, inner, context)
            })
            .map(|batch| batch.mean)
        };

        let solution = quasi_newton::maximize_unobserved(
            objective,
            warm,
            bounds,
            self.config.inner(),
        )
        .map_err(Error::Inner)?;

        if matches!(solution.status, Status::MaxIters | Status::LineSearchFailed) {
            warn!(status = ?solution.status, iters = solution.iters, "inner solve did not converge");
        }
        debug!(iters = solution.iters, objective = solution.objective, "inner solve finished");

        Ok(InnerSolve {
            x: solution.x,
            objective: solution.objective,
            iters: solution.iters,
            status: solution.status,
        })
    }

    /// Evaluates the outer objective and implicit gradient at the inner
    /// optimum for `outer`.
    fn outer_sample(&self, outer: &Vector, inner: &Vector) -> Result<Sample, Error<O::Error>> {
        let shape = CouplingShape {
            outer: outer.len(),
            inner: inner.len(),
        };
        let coupling = average(self.source, &self.batch, shape, |context| {
            self.oracle.coupling(outer, inner, context)
        })
        .map_err(Error::Coupling)?
        .mean;

        let gradient = implicit_gradient(&coupling, self.config.condition_limit())
            .map_err(|condition| Error::SingularCurvature { condition })?;
        Ok(Sample::new(coupling.objective, gradient))
    }

    /// Forwards an event, latching a stop request for the outer solver.
    fn notify<Obs>(&self, observer: &RefCell<Obs>, stop: &Cell<bool>, event: &Event<'_>)
    where
        Obs: for<'e> Observer<Event<'e>, Action>,
    {
        if let Some(Action::StopEarly) = observer.borrow_mut().observe(event) {
            stop.set(true);
        }
    }
}

fn named(space: &ParameterSpace, x: &Vector) -> Result<Vec<(String, Vec<f64>)>, ParamError> {
    Ok(space
        .ranges()
        .iter()
        .map(|r| r.name.clone())
        .zip(space.unflatten(x)?)
        .collect())
}
