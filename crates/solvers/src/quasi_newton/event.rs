use stackelberg_core::Vector;

/// Events emitted by the quasi-Newton solver.
///
/// Objective values are reported in the caller's sense: for a maximization
/// run, larger is better.
#[derive(Debug)]
pub enum Event<'a> {
    /// An iteration accepted a step.
    Iterated {
        /// Iteration number, starting at 1.
        iter: usize,

        /// The new iterate.
        x: &'a Vector,

        /// Objective at `x`.
        objective: f64,

        /// Infinity norm of the projected gradient at `x`.
        pg_norm: f64,

        /// Accepted step length along the search direction.
        step: f64,
    },

    /// A line search failed; the curvature history was dropped and the
    /// current point re-evaluated.
    Restarted {
        /// Iteration in which the search failed.
        iter: usize,

        /// Objective at the re-evaluated current point.
        objective: f64,
    },
}

impl Event<'_> {
    /// Returns the iteration this event belongs to.
    #[must_use]
    pub fn iter(&self) -> usize {
        match self {
            Self::Iterated { iter, .. } | Self::Restarted { iter, .. } => *iter,
        }
    }

    /// Returns the objective reported by this event.
    #[must_use]
    pub fn objective(&self) -> f64 {
        match self {
            Self::Iterated { objective, .. } | Self::Restarted { objective, .. } => *objective,
        }
    }
}
