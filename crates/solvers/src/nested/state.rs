use stackelberg_core::Vector;

/// Whether the inner parameters sit at the optimum for the current outer
/// parameters.
///
/// Moving the outer parameters makes the state [`Stale`](Self::Stale); only
/// an inner solve makes it [`Converged`](Self::Converged) again. Both
/// variants keep the latest inner point, which warm-starts the next solve.
#[derive(Debug, Clone, PartialEq)]
pub enum InnerState {
    Stale(Vector),
    Converged(Vector),
}

impl InnerState {
    /// Marks the inner point as out of date.
    pub fn invalidate(&mut self) {
        if let Self::Converged(inner) = self {
            *self = Self::Stale(std::mem::take(inner));
        }
    }

    /// Records a fresh inner optimum and returns it.
    pub fn converge(&mut self, inner: Vector) -> &Vector {
        *self = Self::Converged(inner);
        self.point()
    }

    /// Returns the inner optimum, or `None` while stale.
    #[must_use]
    pub fn converged(&self) -> Option<&Vector> {
        match self {
            Self::Converged(inner) => Some(inner),
            Self::Stale(_) => None,
        }
    }

    /// Returns the latest inner point, stale or not.
    #[must_use]
    pub fn point(&self) -> &Vector {
        match self {
            Self::Stale(inner) | Self::Converged(inner) => inner,
        }
    }
}
