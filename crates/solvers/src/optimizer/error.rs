use thiserror::Error;

use stackelberg_core::ParamError;

use crate::{batch, generic, gradient_ascent, quasi_newton};

/// Errors that end an optimizer run.
///
/// Block values are never written back when a run returns an error.
#[derive(Debug, Error)]
pub enum Error<E> {
    /// Blocks, overrides, or bounds disagree with the parameter space.
    #[error(transparent)]
    Param(#[from] ParamError),

    /// A batch pass failed: the oracle errored, every sample was rejected,
    /// or a sample had the wrong shape.
    #[error("batch evaluation failed")]
    Batch(#[source] batch::Error<E>),

    /// The generic path was given a bound other than `(-∞, +∞)`.
    #[error("{0} does not support bounds")]
    BoundsUnsupported(generic::Method),

    #[error("objective is not finite at the starting point")]
    NonFiniteStart,

    #[error("objective or gradient is not finite at iteration {iter}")]
    NonFinite { iter: usize },

    /// The generic solver failed for a reason of its own.
    #[error("solver failed: {0}")]
    Solver(Box<dyn std::error::Error + Send + Sync>),
}

impl<E> From<quasi_newton::Error<batch::Error<E>>> for Error<E> {
    fn from(error: quasi_newton::Error<batch::Error<E>>) -> Self {
        match error {
            quasi_newton::Error::Objective(error) => Self::Batch(error),
            quasi_newton::Error::BoundsDimension { expected, found } => {
                Self::Param(ParamError::FlatDimension { expected, found })
            }
            quasi_newton::Error::NonFiniteStart => Self::NonFiniteStart,
        }
    }
}

impl<E> From<gradient_ascent::Error<batch::Error<E>>> for Error<E> {
    fn from(error: gradient_ascent::Error<batch::Error<E>>) -> Self {
        match error {
            gradient_ascent::Error::Objective(error) => Self::Batch(error),
            gradient_ascent::Error::BoundsDimension { expected, found } => {
                Self::Param(ParamError::FlatDimension { expected, found })
            }
            gradient_ascent::Error::NonFinite { iter } => Self::NonFinite { iter },
        }
    }
}

impl<E> From<generic::Error<batch::Error<E>>> for Error<E> {
    fn from(error: generic::Error<batch::Error<E>>) -> Self {
        match error {
            generic::Error::Objective(error) => Self::Batch(error),
            generic::Error::Solver(error) => Self::Solver(error),
            generic::Error::NoEvaluation => Self::Solver("no point was evaluated".into()),
        }
    }
}
