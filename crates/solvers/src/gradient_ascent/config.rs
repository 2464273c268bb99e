use thiserror::Error;

/// Configuration for fixed-step gradient ascent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    step: f64,
    iters: usize,
    grad_tol: f64,
}

/// Errors that can occur when validating a gradient ascent config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("step must be finite and positive")]
    Step,

    #[error("grad_tol must be finite and non-negative")]
    GradTol,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1.0, 100_000, 0.0).unwrap()
    }
}

impl Config {
    /// Creates a new config.
    ///
    /// A `grad_tol` of zero disables the gradient stopping rule, so the full
    /// iteration budget always runs.
    ///
    /// # Errors
    ///
    /// Returns an error if `step` is not positive or `grad_tol` is negative,
    /// or if either is non-finite.
    pub fn new(step: f64, iters: usize, grad_tol: f64) -> Result<Self, ConfigError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigError::Step);
        }
        if !grad_tol.is_finite() || grad_tol < 0.0 {
            return Err(ConfigError::GradTol);
        }

        Ok(Self {
            step,
            iters,
            grad_tol,
        })
    }

    /// Returns the step size multiplying the gradient.
    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Returns the iteration budget.
    #[must_use]
    pub fn iters(&self) -> usize {
        self.iters
    }

    /// Returns the projected-gradient tolerance, zero when disabled.
    #[must_use]
    pub fn grad_tol(&self) -> f64 {
        self.grad_tol
    }
}
