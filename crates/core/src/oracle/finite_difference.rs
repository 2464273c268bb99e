use std::cell::RefCell;
use std::marker::PhantomData;

use finitediff::FiniteDiff;

use crate::Vector;

use super::{Oracle, Sample};

/// An oracle that differentiates a value-only objective numerically.
///
/// Gradients are central differences from the `finitediff` crate, so each
/// evaluation costs `2n + 1` calls. If the objective fails at a perturbed
/// point, the first such error is returned.
pub struct FiniteDifference<F, C> {
    objective: F,
    _context: PhantomData<fn(&C)>,
}

impl<F, C> FiniteDifference<F, C> {
    /// Wraps an objective `f(x, context) -> Result<f64, E>`.
    pub fn new(objective: F) -> Self {
        Self {
            objective,
            _context: PhantomData,
        }
    }
}

impl<F, C, E> Oracle for FiniteDifference<F, C>
where
    F: Fn(&Vector, &C) -> Result<f64, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Context = C;
    type Error = E;

    fn evaluate(&self, x: &Vector, context: &C) -> Result<Sample, E> {
        let value = (self.objective)(x, context)?;

        let failure: RefCell<Option<E>> = RefCell::new(None);
        let gradient = x.central_diff(&|p: &Vector| match (self.objective)(p, context) {
            Ok(v) => v,
            Err(err) => {
                failure.borrow_mut().get_or_insert(err);
                f64::NAN
            }
        });
        if let Some(err) = failure.into_inner() {
            return Err(err);
        }

        Ok(Sample::new(value, gradient))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;
    use ndarray::array;
    use thiserror::Error;

    #[test]
    fn matches_analytic_gradient() {
        // f(x) = -(x0 - y)^2 + 3 x0 x1, ∇f = (-2(x0 - y) + 3 x1, 3 x0).
        let oracle: FiniteDifference<_, f64> = FiniteDifference::new(|x: &Vector, y: &f64| {
            Ok::<_, Infallible>(-(x[0] - y).powi(2) + 3.0 * x[0] * x[1])
        });

        let x = array![1.5, -2.0];
        let sample = oracle.evaluate(&x, &4.0).unwrap();

        assert_relative_eq!(sample.value, -6.25 - 9.0);
        assert_relative_eq!(sample.gradient[0], 5.0 - 6.0, epsilon = 1e-6);
        assert_relative_eq!(sample.gradient[1], 4.5, epsilon = 1e-6);
    }

    #[derive(Debug, Error, PartialEq)]
    #[error("outside the domain at {0}")]
    struct Domain(f64);

    #[test]
    fn failure_at_a_perturbed_point_is_returned() {
        // Defined only for x0 <= 0, so the forward step from 0 fails.
        let oracle: FiniteDifference<_, ()> = FiniteDifference::new(|x: &Vector, _: &()| {
            if x[0] > 0.0 { Err(Domain(x[0])) } else { Ok(-x[0] * x[0]) }
        });

        let inside = oracle.evaluate(&array![-1.0], &()).unwrap();
        assert_relative_eq!(inside.gradient[0], 2.0, epsilon = 1e-6);
        assert!(matches!(oracle.evaluate(&array![0.0], &()), Err(Domain(step)) if step > 0.0));
    }
}
