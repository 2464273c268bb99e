use thiserror::Error;

use crate::quasi_newton;

/// Configuration for the bi-level optimizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    inner: quasi_newton::Config,
    outer: quasi_newton::Config,
    condition_limit: f64,
}

/// Errors that can occur when validating a bi-level config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("condition_limit must be at least 1")]
    ConditionLimit,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(
            quasi_newton::Config::default(),
            quasi_newton::Config::default(),
            1e12,
        )
        .unwrap()
    }
}

impl Config {
    /// Creates a new config.
    ///
    /// `condition_limit` is the largest inner-Hessian condition number for
    /// which the implicit gradient is trusted. It may be infinite, which
    /// only rejects exactly singular curvature.
    ///
    /// # Errors
    ///
    /// Returns an error if `condition_limit` is NaN or less than 1.
    pub fn new(
        inner: quasi_newton::Config,
        outer: quasi_newton::Config,
        condition_limit: f64,
    ) -> Result<Self, ConfigError> {
        if condition_limit.is_nan() || condition_limit < 1.0 {
            return Err(ConfigError::ConditionLimit);
        }
        Ok(Self {
            inner,
            outer,
            condition_limit,
        })
    }

    /// Returns the solver config used for every inner solve.
    #[must_use]
    pub fn inner(&self) -> &quasi_newton::Config {
        &self.inner
    }

    /// Returns the solver config used for the outer problem.
    #[must_use]
    pub fn outer(&self) -> &quasi_newton::Config {
        &self.outer
    }

    #[must_use]
    pub fn condition_limit(&self) -> f64 {
        self.condition_limit
    }
}
