use std::convert::Infallible;

use ndarray::array;
use stackelberg_core::{Coupling, NestedOracle, Oracle, Sample, Vector};

/// `f(x) = -Σᵢ (xᵢ - y)²` against a scalar target `y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Distance;

impl Oracle for Distance {
    type Context = f64;
    type Error = Infallible;

    fn evaluate(&self, x: &Vector, y: &f64) -> Result<Sample, Infallible> {
        let d = x.mapv(|xi| xi - y);
        Ok(Sample::new(-d.dot(&d), -2.0 * &d))
    }
}

/// A leader `x2` and a follower `x1 = (a, b)`.
///
/// The follower maximizes
/// `f1 = -(a - x2 - 1)² - (b - x2)² - (a - 3)⁴`,
/// and the leader maximizes
/// `f2 = -(a - 2)² - (b - 4)² - (x2 - 6)²`
/// through the follower's response.
#[derive(Debug, Clone, Copy, Default)]
pub struct Leader;

impl Leader {
    /// Value and inner gradient of `f1`.
    #[must_use]
    pub fn follower(x2: f64, x1: &Vector) -> Sample {
        let (a, b) = (x1[0], x1[1]);
        let value = -(a - x2 - 1.0).powi(2) - (b - x2).powi(2) - (a - 3.0).powi(4);
        let gradient = array![
            -2.0 * (a - x2 - 1.0) - 4.0 * (a - 3.0).powi(3),
            -2.0 * (b - x2),
        ];
        Sample::new(value, gradient)
    }

    /// Value of `f2`.
    #[must_use]
    pub fn leader(x2: f64, x1: &Vector) -> f64 {
        -(x1[0] - 2.0).powi(2) - (x1[1] - 4.0).powi(2) - (x2 - 6.0).powi(2)
    }
}

impl NestedOracle for Leader {
    type Context = ();
    type Error = Infallible;

    fn inner(&self, outer: &Vector, inner: &Vector, _: &()) -> Result<Sample, Infallible> {
        Ok(Self::follower(outer[0], inner))
    }

    fn coupling(&self, outer: &Vector, inner: &Vector, _: &()) -> Result<Coupling, Infallible> {
        let (x2, a, b) = (outer[0], inner[0], inner[1]);
        Ok(Coupling {
            objective: Self::leader(x2, inner),
            outer_gradient: array![-2.0 * (x2 - 6.0)],
            inner_gradient: array![-2.0 * (a - 2.0), -2.0 * (b - 4.0)],
            inner_hessian: array![[-2.0 - 12.0 * (a - 3.0).powi(2), 0.0], [0.0, -2.0]],
            cross_jacobian: array![[2.0, 2.0]],
        })
    }
}
