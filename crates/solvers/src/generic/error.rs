/// Errors that can occur during an `argmin` run.
#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
    #[error("objective evaluation failed")]
    Objective(#[source] E),

    #[error("solver failed: {0}")]
    Solver(Box<dyn std::error::Error + Send + Sync>),

    #[error("solver finished without an evaluated point")]
    NoEvaluation,
}
