use crate::{generic, gradient_ascent, quasi_newton};

/// The procedure an [`Optimizer`](super::Optimizer) runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    /// Bounded limited-memory quasi-Newton ascent.
    QuasiNewton(quasi_newton::Config),

    /// Fixed-step projected gradient ascent.
    GradientAscent(gradient_ascent::Config),

    /// An unbounded `argmin` method. Rejects non-trivial bounds.
    Generic {
        method: generic::Method,
        config: generic::Config,
    },
}

impl Default for Strategy {
    fn default() -> Self {
        Self::QuasiNewton(quasi_newton::Config::default())
    }
}

impl Strategy {
    /// Returns a short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::QuasiNewton(_) => "quasi-newton",
            Self::GradientAscent(_) => "gradient-ascent",
            Self::Generic { .. } => "generic",
        }
    }
}
