/// Errors that can occur during gradient ascent.
#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
    #[error("objective evaluation failed")]
    Objective(#[source] E),

    #[error("expected {expected} bounds, found {found}")]
    BoundsDimension { expected: usize, found: usize },

    #[error("objective or gradient is not finite at iteration {iter}")]
    NonFinite { iter: usize },
}
