use stackelberg_core::Vector;

use crate::quasi_newton;

/// Events emitted by the bi-level optimizer.
///
/// Objective values are batch means in the maximization sense.
#[derive(Debug)]
pub enum Event<'a> {
    /// The inner problem was solved for one outer point.
    InnerSolved {
        outer: &'a Vector,
        inner: &'a Vector,

        /// Mean inner objective `f1` at the optimum.
        objective: f64,

        iters: usize,
        status: quasi_newton::Status,
    },

    /// The outer objective and its implicit gradient were evaluated.
    OuterEvaluated {
        outer: &'a Vector,

        /// Mean outer objective `f2`.
        objective: f64,

        /// Implicit gradient of `f2` with respect to the outer parameters.
        gradient: &'a Vector,
    },

    /// The outer solver finished an iteration or restarted.
    Outer(&'a quasi_newton::Event<'a>),
}

impl Event<'_> {
    /// Returns the objective this event reports.
    #[must_use]
    pub fn objective(&self) -> f64 {
        match self {
            Self::InnerSolved { objective, .. } | Self::OuterEvaluated { objective, .. } => {
                *objective
            }
            Self::Outer(event) => event.objective(),
        }
    }

    /// Returns the outer iteration for [`Event::Outer`] events.
    #[must_use]
    pub fn outer_iter(&self) -> Option<usize> {
        match self {
            Self::Outer(event) => Some(event.iter()),
            _ => None,
        }
    }
}
