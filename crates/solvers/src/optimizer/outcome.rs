use stackelberg_core::Vector;

use crate::{generic, gradient_ascent, quasi_newton};

/// Indicates why an optimizer run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The solver met its convergence criterion.
    Converged,

    /// The solver reached its iteration limit without converging.
    MaxIters,

    /// The quasi-Newton line search found no ascent step.
    LineSearchFailed,

    /// Gradient ascent ran its full iteration budget.
    Completed,

    /// Stopped early due to an observer decision.
    StoppedByObserver,

    /// The generic solver ended for another reason, given as text.
    Terminated(String),
}

impl Status {
    /// Returns `true` if the status warrants a non-convergence warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::MaxIters | Self::LineSearchFailed | Self::Terminated(_)
        )
    }
}

impl From<quasi_newton::Status> for Status {
    fn from(status: quasi_newton::Status) -> Self {
        match status {
            quasi_newton::Status::Converged => Self::Converged,
            quasi_newton::Status::MaxIters => Self::MaxIters,
            quasi_newton::Status::LineSearchFailed => Self::LineSearchFailed,
            quasi_newton::Status::StoppedByObserver => Self::StoppedByObserver,
        }
    }
}

impl From<gradient_ascent::Status> for Status {
    fn from(status: gradient_ascent::Status) -> Self {
        match status {
            gradient_ascent::Status::Completed => Self::Completed,
            gradient_ascent::Status::Converged => Self::Converged,
            gradient_ascent::Status::StoppedByObserver => Self::StoppedByObserver,
        }
    }
}

impl From<generic::Status> for Status {
    fn from(status: generic::Status) -> Self {
        match status {
            generic::Status::Converged => Self::Converged,
            generic::Status::MaxIters => Self::MaxIters,
            generic::Status::StoppedByObserver => Self::StoppedByObserver,
            generic::Status::Terminated(reason) => Self::Terminated(reason),
        }
    }
}

/// The result of an optimizer run.
///
/// The same values have already been written back into the caller's blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: Status,

    /// Final flat parameter vector.
    pub x: Vector,

    /// Each block's name and its slice of `x`, in block order.
    pub values: Vec<(String, Vec<f64>)>,

    /// Batch-mean objective at `x`.
    pub objective: f64,

    pub iters: usize,

    /// Batch passes run, each over the whole context source.
    pub evaluations: usize,
}

impl Outcome {
    /// Returns the named block's final value.
    #[must_use]
    pub fn value(&self, block: &str) -> Option<&[f64]> {
        self.values
            .iter()
            .find(|(name, _)| name == block)
            .map(|(_, value)| value.as_slice())
    }
}
