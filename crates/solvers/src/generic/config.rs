use thiserror::Error;

/// Configuration for the `argmin` passthrough.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: u64,
    grad_tol: f64,
}

/// Errors that can occur when validating a passthrough config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grad_tol must be finite and non-negative")]
    GradTol,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1000, 1e-8).unwrap()
    }
}

impl Config {
    /// Creates a new config.
    ///
    /// # Errors
    ///
    /// Returns an error if `grad_tol` is negative or non-finite.
    pub fn new(max_iters: u64, grad_tol: f64) -> Result<Self, ConfigError> {
        if !grad_tol.is_finite() || grad_tol < 0.0 {
            return Err(ConfigError::GradTol);
        }
        Ok(Self {
            max_iters,
            grad_tol,
        })
    }

    /// Returns the iteration limit passed to the executor.
    #[must_use]
    pub fn max_iters(&self) -> u64 {
        self.max_iters
    }

    /// Returns the gradient infinity norm at which the run stops.
    #[must_use]
    pub fn grad_tol(&self) -> f64 {
        self.grad_tol
    }
}
