//! Box-constraint helpers shared by the bounded solvers.

use stackelberg_core::{Vector, params::Bound};

/// Clamps every component of `x` into its bound.
pub(crate) fn project(x: &mut Vector, bounds: &[Bound]) {
    for (xi, &(lower, upper)) in x.iter_mut().zip(bounds) {
        *xi = xi.clamp(lower, upper);
    }
}

/// Infinity norm of the projected gradient step `P(x - g) - x`.
///
/// `gradient` is taken in the minimization frame.
pub(crate) fn projected_gradient_norm(x: &Vector, gradient: &Vector, bounds: &[Bound]) -> f64 {
    x.iter()
        .zip(gradient)
        .zip(bounds)
        .map(|((&xi, &gi), &(lower, upper))| ((xi - gi).clamp(lower, upper) - xi).abs())
        .fold(0.0, f64::max)
}

/// Returns true if any bound in the list restricts its component.
pub(crate) fn is_constrained(bounds: &[Bound]) -> bool {
    bounds
        .iter()
        .any(|&(lower, upper)| lower > f64::NEG_INFINITY || upper < f64::INFINITY)
}
