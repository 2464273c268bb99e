use thiserror::Error;

/// Configuration for batch evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    inf_ignore: f64,
}

/// Errors that can occur when validating a batch config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("inf_ignore must be positive and not NaN")]
    InfIgnore,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(f64::INFINITY).unwrap()
    }
}

impl Config {
    /// Creates a config that rejects samples with any magnitude above
    /// `inf_ignore`.
    ///
    /// `f64::INFINITY` rejects only non-finite samples.
    ///
    /// # Errors
    ///
    /// Returns an error if `inf_ignore` is NaN or not positive.
    pub fn new(inf_ignore: f64) -> Result<Self, ConfigError> {
        if inf_ignore.is_nan() || inf_ignore <= 0.0 {
            return Err(ConfigError::InfIgnore);
        }
        Ok(Self { inf_ignore })
    }

    /// Returns the magnitude above which a sample is rejected.
    #[must_use]
    pub fn inf_ignore(&self) -> f64 {
        self.inf_ignore
    }
}
