use stackelberg_core::Vector;

/// Indicates why gradient ascent stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Ran the full iteration budget.
    Completed,

    /// The projected gradient fell to `grad_tol`.
    Converged,

    /// Stopped early due to an observer decision.
    StoppedByObserver,
}

/// The result of a gradient ascent run.
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: Status,

    /// Final iterate.
    pub x: Vector,

    /// Objective at `x`.
    pub objective: f64,

    /// Steps taken.
    pub iters: usize,

    /// Objective evaluations.
    pub evaluations: usize,
}
