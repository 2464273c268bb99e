use thiserror::Error;

/// Configuration for the bounded quasi-Newton solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    memory: usize,
    max_iters: usize,
    pg_tol: f64,
    rel_reduction_tol: f64,
    max_line_search: usize,
}

/// Errors that can occur when validating a quasi-Newton config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("memory must be at least 1")]
    Memory,

    #[error("pg_tol must be finite and non-negative")]
    PgTol,

    #[error("rel_reduction_tol must be finite and non-negative")]
    RelReductionTol,

    #[error("max_line_search must be at least 1")]
    MaxLineSearch,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(10, 15_000, 1e-5, 1e7 * f64::EPSILON, 20).unwrap()
    }
}

impl Config {
    /// Creates a new config with validated settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `memory` or `max_line_search` is zero, or if a
    /// tolerance is negative or non-finite.
    pub fn new(
        memory: usize,
        max_iters: usize,
        pg_tol: f64,
        rel_reduction_tol: f64,
        max_line_search: usize,
    ) -> Result<Self, ConfigError> {
        if memory == 0 {
            return Err(ConfigError::Memory);
        }
        if !pg_tol.is_finite() || pg_tol < 0.0 {
            return Err(ConfigError::PgTol);
        }
        if !rel_reduction_tol.is_finite() || rel_reduction_tol < 0.0 {
            return Err(ConfigError::RelReductionTol);
        }
        if max_line_search == 0 {
            return Err(ConfigError::MaxLineSearch);
        }

        Ok(Self {
            memory,
            max_iters,
            pg_tol,
            rel_reduction_tol,
            max_line_search,
        })
    }

    /// Returns a copy with a different iteration limit.
    #[must_use]
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Returns the number of curvature pairs kept.
    #[must_use]
    pub fn memory(&self) -> usize {
        self.memory
    }

    /// Returns the maximum number of iterations.
    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Returns the projected-gradient tolerance (infinity norm).
    #[must_use]
    pub fn pg_tol(&self) -> f64 {
        self.pg_tol
    }

    /// Returns the relative objective reduction below which the solver stops.
    #[must_use]
    pub fn rel_reduction_tol(&self) -> f64 {
        self.rel_reduction_tol
    }

    /// Returns the maximum number of backtracking steps per iteration.
    #[must_use]
    pub fn max_line_search(&self) -> usize {
        self.max_line_search
    }
}
