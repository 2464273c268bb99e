use thiserror::Error;

use super::Term;

/// A per-context result whose shape disagrees with the parameter space.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{term} has shape {found:?}, expected {expected:?}")]
pub struct Mismatch {
    pub term: Term,
    pub expected: Vec<usize>,
    pub found: Vec<usize>,
}

/// Errors that end a batch pass.
#[derive(Debug, Error)]
pub enum Error<E> {
    /// The oracle failed on one context.
    #[error("oracle failed on context {index}")]
    Oracle {
        index: usize,
        #[source]
        source: E,
    },

    /// Every context was rejected, or the source yielded none.
    #[error("no samples accepted ({rejected} rejected)")]
    EmptyBatch { rejected: usize },

    /// The accepted results are finite but their mean is not.
    #[error("mean {term} overflowed over {accepted} accepted samples")]
    Overflow { term: Term, accepted: usize },

    /// A context produced a result with the wrong shape.
    #[error("context {index}: {mismatch}")]
    Dimension { index: usize, mismatch: Mismatch },
}
