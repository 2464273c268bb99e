//! Batch evaluation: one robust objective and gradient estimate per point.
//!
//! A [`BatchEvaluator`] runs an [`Oracle`] against every context of a fresh
//! pass over a [`ContextSource`] and returns the mean of the accepted
//! results. A result is rejected, and logged at `debug` level, if its value
//! or any derivative entry is non-finite or exceeds the configured
//! `inf_ignore` magnitude. Rejection drops one degenerate context instead of
//! corrupting the whole estimate.
//!
//! A pass with no accepted result is an error ([`Error::EmptyBatch`]); there
//! is no meaningful mean to return. Neither is a mean that overflows even
//! though every accepted result was finite ([`Error::Overflow`]).
//!
//! The same reduction is available as [`average`] for any [`BatchSample`],
//! which the bi-level optimizer uses to average [`Coupling`] terms.
//!
//! [`Oracle`]: stackelberg_core::Oracle
//! [`ContextSource`]: stackelberg_core::ContextSource
//! [`Coupling`]: stackelberg_core::Coupling

mod config;
mod error;
mod evaluator;
mod reduce;
mod sample;

#[cfg(test)]
mod tests;

pub use config::{Config, ConfigError};
pub use error::{Error, Mismatch};
pub use evaluator::BatchEvaluator;
pub use reduce::average;
pub use sample::{BatchSample, CouplingShape, Rejection, Term};

#[cfg(feature = "parallel")]
pub use reduce::average_parallel;

/// The mean over the accepted samples of one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult<T> {
    pub mean: T,
    pub accepted: usize,
    pub rejected: usize,
}
