use stackelberg_core::Vector;

/// Emitted once per distinct objective evaluation.
///
/// `argmin` drives its own iterations, so events follow evaluations
/// (including line-search trials) rather than iterations.
#[derive(Debug)]
pub struct Event<'a> {
    /// Evaluation count, starting at 1.
    pub evaluation: usize,

    pub x: &'a Vector,

    /// Objective at `x`, in the caller's sense.
    pub objective: f64,
}
