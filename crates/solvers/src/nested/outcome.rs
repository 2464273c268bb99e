use stackelberg_core::Vector;

use crate::quasi_newton::Status;

/// The result of a bi-level run.
///
/// The inner point is the optimum for the final outer point. Both have
/// already been written back into the caller's blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Outer solver status.
    pub status: Status,

    pub outer: Vector,
    pub inner: Vector,

    /// Each outer block's name and final value.
    pub outer_values: Vec<(String, Vec<f64>)>,

    /// Each inner block's name and final value.
    pub inner_values: Vec<(String, Vec<f64>)>,

    /// Mean outer objective `f2` at the final point.
    pub objective: f64,

    /// Mean inner objective `f1` at the final point.
    pub inner_objective: f64,

    /// Implicit gradient at the final point, in the maximization sense.
    pub gradient: Vector,

    /// Outer iterations.
    pub iters: usize,

    /// Inner solves, including the final one.
    pub inner_solves: usize,
}
