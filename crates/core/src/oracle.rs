//! Differentiation oracles: objective value and derivatives at a point.
//!
//! An oracle is evaluated against one explicitly passed context (for
//! example, one recorded trajectory segment). It has no hidden bound state,
//! so evaluating different contexts never interferes.
//!
//! How derivatives are produced is up to the implementor: closed forms,
//! automatic differentiation, or [`FiniteDifference`].

mod finite_difference;

pub use finite_difference::FiniteDifference;

use crate::{Matrix, Vector};

/// Objective value and gradient for one context.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub gradient: Vector,
}

impl Sample {
    #[must_use]
    pub fn new(value: f64, gradient: Vector) -> Self {
        Self { value, gradient }
    }
}

/// Supplies the objective value and gradient at a parameter point.
pub trait Oracle {
    /// One dataset element the objective is evaluated against.
    type Context;

    type Error: std::error::Error + Send + Sync + 'static;

    /// Evaluates the objective and its gradient with respect to `x`.
    ///
    /// The gradient must have the same length as `x`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the oracle cannot be evaluated. A finite
    /// but unusable result (NaN, overflow) should be returned as a value,
    /// not an error, so batch evaluation can reject that one sample.
    fn evaluate(&self, x: &Vector, context: &Self::Context) -> Result<Sample, Self::Error>;
}

impl<T: Oracle + ?Sized> Oracle for &T {
    type Context = T::Context;
    type Error = T::Error;

    fn evaluate(&self, x: &Vector, context: &Self::Context) -> Result<Sample, Self::Error> {
        (**self).evaluate(x, context)
    }
}

/// Derivative information linking an inner and an outer objective.
///
/// With `f1` the inner objective and `f2` the outer objective, all terms are
/// evaluated at one `(outer, inner)` point.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupling {
    /// Value of `f2`.
    pub objective: f64,

    /// `∂f2/∂outer`, length `n_outer`.
    pub outer_gradient: Vector,

    /// `∂f2/∂inner`, length `n_inner`.
    pub inner_gradient: Vector,

    /// `∂²f1/∂inner²`, shape `n_inner × n_inner`.
    pub inner_hessian: Matrix,

    /// `∂/∂inner (∂f1/∂outer)`, shape `n_outer × n_inner`.
    pub cross_jacobian: Matrix,
}

/// Supplies derivatives for a two-level (Stackelberg) problem.
///
/// The inner parameters are kept at a maximizer of `f1` for the current
/// outer parameters; the outer parameters are optimized for `f2`.
pub trait NestedOracle {
    type Context;

    type Error: std::error::Error + Send + Sync + 'static;

    /// Evaluates `f1` and `∂f1/∂inner` with the outer parameters held fixed.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the oracle cannot be evaluated.
    fn inner(
        &self,
        outer: &Vector,
        inner: &Vector,
        context: &Self::Context,
    ) -> Result<Sample, Self::Error>;

    /// Evaluates the terms needed for the implicit outer gradient.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the oracle cannot be evaluated.
    fn coupling(
        &self,
        outer: &Vector,
        inner: &Vector,
        context: &Self::Context,
    ) -> Result<Coupling, Self::Error>;
}

impl<T: NestedOracle + ?Sized> NestedOracle for &T {
    type Context = T::Context;
    type Error = T::Error;

    fn inner(
        &self,
        outer: &Vector,
        inner: &Vector,
        context: &Self::Context,
    ) -> Result<Sample, Self::Error> {
        (**self).inner(outer, inner, context)
    }

    fn coupling(
        &self,
        outer: &Vector,
        inner: &Vector,
        context: &Self::Context,
    ) -> Result<Coupling, Self::Error> {
        (**self).coupling(outer, inner, context)
    }
}
