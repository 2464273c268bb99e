use stackelberg_core::Vector;

/// Indicates why the `argmin` run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The gradient fell to `grad_tol`, or the solver reported convergence.
    Converged,

    /// Reached the iteration limit.
    MaxIters,

    /// Stopped early due to an observer decision.
    StoppedByObserver,

    /// The solver ended for another reason, given as text.
    Terminated(String),
}

/// The result of an `argmin` run.
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: Status,

    /// Best point evaluated.
    pub x: Vector,

    /// Objective at `x`, in the caller's sense.
    pub objective: f64,

    /// Iterations reported by the solver, or gradient evaluations for a run
    /// that was interrupted.
    pub iters: u64,

    /// Distinct objective evaluations.
    pub evaluations: usize,
}
