use std::convert::Infallible;

use thiserror::Error;

use stackelberg_core::ParamError;

use crate::{batch, quasi_newton};

/// Errors that end a bi-level run.
///
/// The variant names the stage that failed. Block values are never written
/// back when a run returns an error.
#[derive(Debug, Error)]
pub enum Error<E> {
    /// Blocks or bounds disagree with the parameter spaces.
    #[error(transparent)]
    Param(#[from] ParamError),

    /// An inner solve failed, including a failed batch pass of `f1`.
    #[error("inner solve failed")]
    Inner(#[source] quasi_newton::Error<batch::Error<E>>),

    /// Averaging the coupling terms at an inner optimum failed.
    #[error("coupling evaluation failed")]
    Coupling(#[source] batch::Error<E>),

    /// The inner Hessian is singular, non-finite, or too ill-conditioned
    /// to solve against.
    #[error("inner Hessian is singular (condition number {condition:e})")]
    SingularCurvature { condition: f64 },

    /// The outer solver could not start.
    #[error("outer solve failed")]
    Outer(#[source] quasi_newton::Error<Infallible>),
}

impl<E> From<quasi_newton::Error<Error<E>>> for Error<E> {
    fn from(error: quasi_newton::Error<Error<E>>) -> Self {
        match error {
            quasi_newton::Error::Objective(error) => error,
            quasi_newton::Error::BoundsDimension { expected, found } => {
                Self::Outer(quasi_newton::Error::BoundsDimension { expected, found })
            }
            quasi_newton::Error::NonFiniteStart => Self::Outer(quasi_newton::Error::NonFiniteStart),
        }
    }
}
