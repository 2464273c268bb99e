use crate::Vector;

/// Defines the optimization direction.
///
/// Solvers always minimize internally. A goal maps the caller's objective
/// and gradient into that minimization frame and back, so a maximizer is a
/// minimizer run on the negated objective.
pub trait Goal {
    /// Transforms an objective value into the internal minimization frame.
    ///
    /// - [`Minimize`]: returns the value unchanged
    /// - [`Maximize`]: negates the value
    fn transform(value: f64) -> f64;

    /// Transforms a gradient in place into the internal minimization frame.
    fn transform_gradient(gradient: &mut Vector);
}

/// Minimize the objective function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Minimize;

impl Goal for Minimize {
    #[inline]
    fn transform(value: f64) -> f64 {
        value
    }

    #[inline]
    fn transform_gradient(_gradient: &mut Vector) {}
}

/// Maximize the objective function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Maximize;

impl Goal for Maximize {
    #[inline]
    fn transform(value: f64) -> f64 {
        -value
    }

    #[inline]
    fn transform_gradient(gradient: &mut Vector) {
        gradient.mapv_inplace(|g| -g);
    }
}
