//! Core traits and types for batched and bi-level gradient optimization.
//!
//! This crate defines the shared abstractions that solvers and observers
//! build on:
//!
//! - [`ParameterBlock`] and [`ParameterSpace`]: named parameter vectors and
//!   the flat index that maps them into one optimization space
//! - [`Oracle`] and [`NestedOracle`]: objective value and derivatives at a
//!   parameter point for an explicitly passed context
//! - [`ContextSource`]: a factory producing a fresh sequence of contexts on
//!   every batch pass
//! - [`Observer`]: receives solver events and optionally returns control actions
//! - [`Goal`]: the optimization direction, used to run maximization on a
//!   minimizer

pub mod context;
pub mod oracle;
pub mod params;

mod goal;
mod observer;

pub use context::ContextSource;
pub use goal::{Goal, Maximize, Minimize};
pub use observer::Observer;
pub use oracle::{Coupling, NestedOracle, Oracle, Sample};
pub use params::{Bound, BoundsMap, Overrides, ParamError, ParameterBlock, ParameterSpace};

/// Dense real vector used for flat parameters and gradients.
pub type Vector = ndarray::Array1<f64>;

/// Dense real matrix used for Hessians and cross-Jacobians.
pub type Matrix = ndarray::Array2<f64>;
