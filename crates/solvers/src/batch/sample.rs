use std::fmt;

use stackelberg_core::{Coupling, Sample};

use super::Mismatch;

/// The quantity inside a per-context result that a check refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    Value,
    Gradient,
    OuterGradient,
    InnerGradient,
    Hessian,
    Jacobian,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Value => "value",
            Self::Gradient => "gradient",
            Self::OuterGradient => "outer gradient",
            Self::InnerGradient => "inner gradient",
            Self::Hessian => "inner Hessian",
            Self::Jacobian => "cross Jacobian",
        };
        f.write_str(name)
    }
}

/// Why a per-context result was left out of the batch mean.
///
/// Matrix indices are row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NonFinite { term: Term, index: usize },
    OutOfRange { term: Term, index: usize },
}

/// A per-context result that can be screened and averaged.
pub trait BatchSample: Sized {
    /// The expected dimensions of a result.
    type Shape: Copy;

    /// Checks that the result's dimensions match `shape`.
    ///
    /// # Errors
    ///
    /// Returns the first term whose shape disagrees.
    fn check_shape(&self, shape: Self::Shape) -> Result<(), Mismatch>;

    /// Returns the first reason to reject this result, if any.
    ///
    /// A result is rejected if any entry is non-finite or has a magnitude
    /// strictly greater than `limit`.
    fn screen(&self, limit: f64) -> Option<Rejection>;

    /// Adds `other` into `self` elementwise.
    fn accumulate(&mut self, other: &Self);

    /// Divides every entry by `count`.
    fn divide(&mut self, count: f64);
}

impl BatchSample for Sample {
    type Shape = usize;

    fn check_shape(&self, dim: usize) -> Result<(), Mismatch> {
        expect_shape(Term::Gradient, &[dim], self.gradient.shape())
    }

    fn screen(&self, limit: f64) -> Option<Rejection> {
        screen_entries(Term::Value, std::iter::once(&self.value), limit)
            .or_else(|| screen_entries(Term::Gradient, self.gradient.iter(), limit))
    }

    fn accumulate(&mut self, other: &Self) {
        self.value += other.value;
        self.gradient += &other.gradient;
    }

    fn divide(&mut self, count: f64) {
        self.value /= count;
        self.gradient /= count;
    }
}

/// Dimensions of a [`Coupling`]: outer and inner parameter counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CouplingShape {
    pub outer: usize,
    pub inner: usize,
}

impl BatchSample for Coupling {
    type Shape = CouplingShape;

    fn check_shape(&self, shape: CouplingShape) -> Result<(), Mismatch> {
        let CouplingShape { outer, inner } = shape;
        expect_shape(Term::OuterGradient, &[outer], self.outer_gradient.shape())?;
        expect_shape(Term::InnerGradient, &[inner], self.inner_gradient.shape())?;
        expect_shape(Term::Hessian, &[inner, inner], self.inner_hessian.shape())?;
        expect_shape(Term::Jacobian, &[outer, inner], self.cross_jacobian.shape())
    }

    fn screen(&self, limit: f64) -> Option<Rejection> {
        screen_entries(Term::Value, std::iter::once(&self.objective), limit)
            .or_else(|| screen_entries(Term::OuterGradient, self.outer_gradient.iter(), limit))
            .or_else(|| screen_entries(Term::InnerGradient, self.inner_gradient.iter(), limit))
            .or_else(|| screen_entries(Term::Hessian, self.inner_hessian.iter(), limit))
            .or_else(|| screen_entries(Term::Jacobian, self.cross_jacobian.iter(), limit))
    }

    fn accumulate(&mut self, other: &Self) {
        self.objective += other.objective;
        self.outer_gradient += &other.outer_gradient;
        self.inner_gradient += &other.inner_gradient;
        self.inner_hessian += &other.inner_hessian;
        self.cross_jacobian += &other.cross_jacobian;
    }

    fn divide(&mut self, count: f64) {
        self.objective /= count;
        self.outer_gradient /= count;
        self.inner_gradient /= count;
        self.inner_hessian /= count;
        self.cross_jacobian /= count;
    }
}

fn expect_shape(term: Term, expected: &[usize], found: &[usize]) -> Result<(), Mismatch> {
    if expected == found {
        Ok(())
    } else {
        Err(Mismatch {
            term,
            expected: expected.to_vec(),
            found: found.to_vec(),
        })
    }
}

fn screen_entries<'a>(
    term: Term,
    entries: impl Iterator<Item = &'a f64>,
    limit: f64,
) -> Option<Rejection> {
    entries.enumerate().find_map(|(index, &v)| {
        if !v.is_finite() {
            Some(Rejection::NonFinite { term, index })
        } else if v.abs() > limit {
            Some(Rejection::OutOfRange { term, index })
        } else {
            None
        }
    })
}
