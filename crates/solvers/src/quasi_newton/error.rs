/// Errors that can occur during a quasi-Newton run.
#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
    #[error("objective evaluation failed")]
    Objective(#[source] E),

    #[error("expected {expected} bounds, found {found}")]
    BoundsDimension { expected: usize, found: usize },

    #[error("objective is not finite at the starting point")]
    NonFiniteStart,
}
