use stackelberg_core::Vector;

/// Indicates why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The projected gradient or the objective reduction fell below tolerance.
    Converged,

    /// Reached the iteration limit without converging.
    MaxIters,

    /// No step from a freshly evaluated point decreased the objective.
    LineSearchFailed,

    /// Stopped early due to an observer decision.
    StoppedByObserver,
}

/// The result of a quasi-Newton run.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Final solver status.
    pub status: Status,

    /// Best iterate found.
    pub x: Vector,

    /// Objective value at `x`, in the caller's sense.
    pub objective: f64,

    /// Objective gradient at `x`, in the caller's sense.
    pub gradient: Vector,

    /// Completed iterations.
    pub iters: usize,

    /// Objective evaluations, including line-search trials.
    pub evaluations: usize,
}
