//! Laplace approximation of a trajectory's likelihood under a linear reward.
//!
//! The demonstrated controls `u` are assumed near-optimal for a reward
//! `r(u) = r₀(u) + Σₖ θₖ φₖ(u)`. Expanding `r` to second order around the
//! demonstration gives, up to a constant,
//!
//! ```text
//! L(θ) = gᵀH⁻¹g + ln det(−H)
//! ```
//!
//! with `g = g₀ + Σₖ θₖ gₖ` and `H = H₀ + Σₖ θₖ Hₖ − λI` the reward's
//! gradient and Hessian in the controls. The ridge `λ` keeps `H` away from
//! singular. Maximizing `L` over `θ` fits reward weights to the data.
//!
//! The derivatives of `r₀` and each `φₖ` come from an external feature
//! model; this module only combines them.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use thiserror::Error;

use stackelberg_core::{Matrix, Oracle, Sample, Vector};

/// Ridge subtracted from the reward Hessian.
pub const DEFAULT_REGULARIZATION: f64 = 0.1;

/// Reward derivatives in the controls of one trajectory window.
///
/// Each feature's Hessian must be symmetric, as must the base Hessian.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDerivatives {
    base_gradient: Vector,
    base_hessian: Matrix,
    gradients: Vec<Vector>,
    hessians: Vec<Matrix>,
}

impl FeatureDerivatives {
    /// Bundles the base reward's derivatives with one pair per feature.
    ///
    /// # Errors
    ///
    /// Returns an error if the shapes disagree with the base gradient's
    /// length or the feature lists differ in length.
    pub fn new(
        base_gradient: Vector,
        base_hessian: Matrix,
        gradients: Vec<Vector>,
        hessians: Vec<Matrix>,
    ) -> Result<Self, Error> {
        let n = base_gradient.len();
        if base_hessian.dim() != (n, n) {
            return Err(Error::BaseHessian {
                expected: n,
                found: base_hessian.dim(),
            });
        }
        if gradients.len() != hessians.len() {
            return Err(Error::FeatureCount {
                gradients: gradients.len(),
                hessians: hessians.len(),
            });
        }
        for (feature, (gradient, hessian)) in gradients.iter().zip(&hessians).enumerate() {
            if gradient.len() != n {
                return Err(Error::Gradient {
                    feature,
                    expected: n,
                    found: gradient.len(),
                });
            }
            if hessian.dim() != (n, n) {
                return Err(Error::Hessian {
                    feature,
                    expected: n,
                    found: hessian.dim(),
                });
            }
        }

        Ok(Self {
            base_gradient,
            base_hessian,
            gradients,
            hessians,
        })
    }

    /// Number of reward features, the length of `θ`.
    #[must_use]
    pub fn features(&self) -> usize {
        self.gradients.len()
    }

    /// Number of control variables in the window.
    #[must_use]
    pub fn controls(&self) -> usize {
        self.base_gradient.len()
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("base hessian has shape {found:?}, expected {expected}x{expected}")]
    BaseHessian {
        expected: usize,
        found: (usize, usize),
    },

    #[error("{gradients} feature gradients but {hessians} feature hessians")]
    FeatureCount { gradients: usize, hessians: usize },

    #[error("feature {feature}: gradient has length {found}, expected {expected}")]
    Gradient {
        feature: usize,
        expected: usize,
        found: usize,
    },

    #[error("feature {feature}: hessian has shape {found:?}, expected {expected}x{expected}")]
    Hessian {
        feature: usize,
        expected: usize,
        found: (usize, usize),
    },

    #[error("expected {expected} reward weights, found {found}")]
    Weights { expected: usize, found: usize },

    #[error("regularization must be finite and non-negative, got {0}")]
    Regularization(f64),
}

/// The Laplace log-likelihood of reward weights, as an [`Oracle`].
///
/// If `−H` is not positive definite at some `θ`, the approximation does not
/// apply and the value and gradient are NaN. A batch evaluation rejects
/// that window instead of failing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaplaceLikelihood {
    regularization: f64,
}

impl LaplaceLikelihood {
    /// Creates the likelihood with ridge `λ = regularization`.
    ///
    /// # Errors
    ///
    /// Returns an error if `regularization` is negative or not finite.
    pub fn new(regularization: f64) -> Result<Self, Error> {
        if !regularization.is_finite() || regularization < 0.0 {
            return Err(Error::Regularization(regularization));
        }
        Ok(Self { regularization })
    }

    #[must_use]
    pub fn regularization(&self) -> f64 {
        self.regularization
    }
}

impl Default for LaplaceLikelihood {
    fn default() -> Self {
        Self {
            regularization: DEFAULT_REGULARIZATION,
        }
    }
}

impl Oracle for LaplaceLikelihood {
    type Context = FeatureDerivatives;
    type Error = Error;

    fn evaluate(&self, theta: &Vector, d: &FeatureDerivatives) -> Result<Sample, Error> {
        if theta.len() != d.features() {
            return Err(Error::Weights {
                expected: d.features(),
                found: theta.len(),
            });
        }

        let n = d.controls();
        let mut g = d.base_gradient.clone();
        let mut h = d.base_hessian.clone();
        for ((weight, gk), hk) in theta.iter().zip(&d.gradients).zip(&d.hessians) {
            g.scaled_add(*weight, gk);
            h.scaled_add(*weight, hk);
        }
        h.diag_mut().mapv_inplace(|v| v - self.regularization);

        // −H = LLᵀ, so H⁻¹ = −(LLᵀ)⁻¹.
        let neg_h = DMatrix::from_row_iterator(n, n, h.iter().map(|v| -v));
        let Some(cholesky) = Cholesky::<f64, Dyn>::new(neg_h) else {
            return Ok(Sample::new(f64::NAN, Vector::from_elem(theta.len(), f64::NAN)));
        };

        let log_det = 2.0 * cholesky.l().diagonal().iter().map(|v| v.ln()).sum::<f64>();
        let solved = cholesky.solve(&DVector::from_iterator(n, g.iter().copied()));
        let z: Vector = solved.iter().map(|v| -v).collect();
        let inverse = cholesky.inverse();
        let h_inv = Matrix::from_shape_fn((n, n), |(i, j)| -inverse[(i, j)]);

        let value = g.dot(&z) + log_det;
        let gradient = d
            .gradients
            .iter()
            .zip(&d.hessians)
            .map(|(gk, hk)| 2.0 * gk.dot(&z) - z.dot(&hk.dot(&z)) + (&h_inv * &hk.t()).sum())
            .collect();

        Ok(Sample::new(value, gradient))
    }
}
