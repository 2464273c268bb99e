use stackelberg_core::Vector;

use crate::{generic, gradient_ascent, quasi_newton};

/// An event from the solver an optimizer run delegates to.
#[derive(Debug)]
pub enum Event<'a> {
    QuasiNewton(&'a quasi_newton::Event<'a>),
    GradientAscent(&'a gradient_ascent::Event<'a>),
    Generic(&'a generic::Event<'a>),
}

impl<'a> Event<'a> {
    /// Returns the iteration, or the evaluation count for a generic run.
    #[must_use]
    pub fn iter(&self) -> usize {
        match self {
            Self::QuasiNewton(event) => event.iter(),
            Self::GradientAscent(event) => event.iter,
            Self::Generic(event) => event.evaluation,
        }
    }

    /// Returns the batch-mean objective, in the maximization sense.
    #[must_use]
    pub fn objective(&self) -> f64 {
        match self {
            Self::QuasiNewton(event) => event.objective(),
            Self::GradientAscent(event) => event.objective,
            Self::Generic(event) => event.objective,
        }
    }

    /// Returns the flat point the event refers to, if it carries one.
    #[must_use]
    pub fn x(&self) -> Option<&'a Vector> {
        match *self {
            Self::QuasiNewton(event) => match *event {
                quasi_newton::Event::Iterated { x, .. } => Some(x),
                quasi_newton::Event::Restarted { .. } => None,
            },
            Self::GradientAscent(event) => Some(event.x),
            Self::Generic(event) => Some(event.x),
        }
    }
}
