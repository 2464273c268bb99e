//! Single-level maximization over named parameter blocks.
//!
//! An [`Optimizer`] ties a [`BatchEvaluator`] to a [`ParameterSpace`] and a
//! [`Strategy`]. Each run flattens the caller's blocks into a starting
//! point, maximizes the batch-mean objective with the chosen solver, and
//! writes the optimum back into the blocks.
//!
//! # Starting point and bounds
//!
//! [`Overrides`] replace a block's stored value as the starting point for
//! one run; the stored value only changes when the run succeeds. A block
//! without an entry in the [`BoundsMap`] uses its own bounds, or is
//! unbounded if it has none.
//!
//! # Failure
//!
//! A run that stops without converging (iteration limit, failed line
//! search) is logged with `tracing::warn!` and still returns an
//! [`Outcome`]. A fatal error, such as an empty batch, returns `Err` and
//! leaves every block untouched.

mod action;
mod error;
mod event;
mod outcome;
mod strategy;

#[cfg(test)]
mod tests;

pub use action::Action;
pub use error::Error;
pub use event::Event;
pub use outcome::{Outcome, Status};
pub use strategy::Strategy;

use tracing::{debug, warn};

use stackelberg_core::{
    BoundsMap, ContextSource, Observer, Oracle, Overrides, ParamError, ParameterBlock,
    ParameterSpace, Vector,
};

use crate::{
    batch::{self, BatchEvaluator},
    bounds::is_constrained,
    generic, gradient_ascent, quasi_newton,
};

/// Maximizes a batched objective over an ordered list of parameter blocks.
#[derive(Debug)]
pub struct Optimizer<'a, O, S: ?Sized> {
    evaluator: BatchEvaluator<'a, O, S>,
    space: ParameterSpace,
    strategy: Strategy,
}

impl<'a, O, S> Optimizer<'a, O, S>
where
    O: Oracle,
    S: ContextSource<Context = O::Context> + ?Sized,
{
    /// Creates an optimizer over the layout of `blocks`.
    ///
    /// Later runs must be given blocks with the same names, order, and
    /// dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error if two blocks share a name or a block is empty.
    pub fn new(
        oracle: &'a O,
        source: &'a S,
        blocks: &[ParameterBlock],
        strategy: Strategy,
        batch: batch::Config,
    ) -> Result<Self, ParamError> {
        Ok(Self {
            evaluator: BatchEvaluator::new(oracle, source, batch),
            space: ParameterSpace::new(blocks)?,
            strategy,
        })
    }

    #[must_use]
    pub fn space(&self) -> &ParameterSpace {
        &self.space
    }

    #[must_use]
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    #[must_use]
    pub fn evaluator(&self) -> &BatchEvaluator<'a, O, S> {
        &self.evaluator
    }

    /// Maximizes the batch-mean objective and writes the optimum back.
    ///
    /// # Errors
    ///
    /// Returns an error if the blocks, overrides, or bounds disagree with
    /// the layout, if a batch pass fails, or if the solver fails.
    pub fn maximize(
        &self,
        blocks: &mut [ParameterBlock],
        overrides: &Overrides,
        bounds: &BoundsMap,
    ) -> Result<Outcome, Error<O::Error>> {
        self.maximize_observed(blocks, overrides, bounds, ())
    }

    /// Like [`maximize`](Self::maximize), forwarding solver events to
    /// `observer`.
    ///
    /// # Errors
    ///
    /// Same as [`maximize`](Self::maximize).
    pub fn maximize_observed<Obs>(
        &self,
        blocks: &mut [ParameterBlock],
        overrides: &Overrides,
        bounds: &BoundsMap,
        mut observer: Obs,
    ) -> Result<Outcome, Error<O::Error>>
    where
        Obs: for<'e> Observer<Event<'e>, Action>,
    {
        let x0 = self.space.initial(blocks, overrides)?;
        let bounds = self.space.bounds(blocks, bounds)?;
        debug!(
            strategy = self.strategy.name(),
            dim = self.space.dim(),
            "starting optimization"
        );

        let objective = |x: &Vector| self.evaluator.evaluate(x).map(|batch| batch.mean);

        let (status, x, objective, iters, evaluations) = match &self.strategy {
            Strategy::QuasiNewton(config) => {
                let forward = |event: &quasi_newton::Event<'_>| {
                    observer
                        .observe(&Event::QuasiNewton(event))
                        .map(|action| match action {
                            Action::StopEarly => quasi_newton::Action::StopEarly,
                        })
                };
                let solution = quasi_newton::maximize(objective, &x0, &bounds, config, forward)?;
                (
                    Status::from(solution.status),
                    solution.x,
                    solution.objective,
                    solution.iters,
                    solution.evaluations,
                )
            }
            Strategy::GradientAscent(config) => {
                let forward = |event: &gradient_ascent::Event<'_>| {
                    observer
                        .observe(&Event::GradientAscent(event))
                        .map(|action| match action {
                            Action::StopEarly => gradient_ascent::Action::StopEarly,
                        })
                };
                let solution =
                    gradient_ascent::maximize(objective, &x0, &bounds, config, forward)?;
                (
                    Status::from(solution.status),
                    solution.x,
                    solution.objective,
                    solution.iters,
                    solution.evaluations,
                )
            }
            Strategy::Generic { method, config } => {
                if is_constrained(&bounds) {
                    return Err(Error::BoundsUnsupported(*method));
                }
                let forward = |event: &generic::Event<'_>| {
                    observer
                        .observe(&Event::Generic(event))
                        .map(|action| match action {
                            Action::StopEarly => generic::Action::StopEarly,
                        })
                };
                let solution = generic::maximize(objective, &x0, *method, config, forward)?;
                (
                    Status::from(solution.status),
                    solution.x,
                    solution.objective,
                    usize::try_from(solution.iters).unwrap_or(usize::MAX),
                    solution.evaluations,
                )
            }
        };

        if status.is_warning() {
            warn!(?status, iters, objective, "optimizer stopped without converging");
        } else {
            debug!(?status, iters, objective, evaluations, "optimizer finished");
        }

        let values = self
            .space
            .ranges()
            .iter()
            .map(|r| r.name.clone())
            .zip(self.space.unflatten(&x)?)
            .collect();
        self.space.write_back(&x, blocks)?;

        Ok(Outcome {
            status,
            x,
            values,
            objective,
            iters,
            evaluations,
        })
    }
}
