//! Batched gradient optimizers for single-level and bi-level problems.
//!
//! # Modules
//!
//! - [`batch`]: averages oracle output over a dataset of contexts, rejecting
//!   degenerate samples
//! - [`quasi_newton`]: projected limited-memory BFGS on box constraints
//! - [`gradient_ascent`]: fixed-step projected gradient iteration
//! - [`generic`]: unbounded solvers delegated to `argmin`
//! - [`optimizer`]: maximizes a batched objective over named parameter blocks
//! - [`nested`]: bi-level optimization through an implicit inner optimum

pub mod batch;
pub mod generic;
pub mod gradient_ascent;
pub mod nested;
pub mod optimizer;
pub mod quasi_newton;

mod bounds;

pub use batch::{BatchEvaluator, BatchResult};
pub use nested::BiLevelOptimizer;
pub use optimizer::{Optimizer, Outcome, Strategy};
