use stackelberg_core::Vector;

/// Emitted once per iteration, before the step is taken.
#[derive(Debug)]
pub struct Event<'a> {
    /// Iteration number, starting at 1.
    pub iter: usize,

    /// The point just evaluated.
    pub x: &'a Vector,

    /// Objective at `x`.
    pub objective: f64,

    /// Objective gradient at `x`.
    pub gradient: &'a Vector,
}
