//! Capability traits for cross-solver observers.
//!
//! These traits abstract over solver-specific event and action types, enabling
//! observers to work generically across different solvers.
//!
//! # Event traits
//!
//! - [`HasObjective`]: events that carry an objective value
//! - [`HasIteration`]: events that belong to a numbered iteration
//!
//! # Action traits
//!
//! - [`CanStopEarly`]: actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use stackelberg_core::Observer;
//! use stackelberg_observers::traits::{CanStopEarly, HasObjective};
//!
//! struct GoodEnough {
//!     target: f64,
//! }
//!
//! impl<E: HasObjective, A: CanStopEarly> Observer<E, A> for GoodEnough {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.objective() >= self.target).then(A::stop_early)
//!     }
//! }
//! ```

use stackelberg_solvers::{generic, gradient_ascent, nested, optimizer, quasi_newton};

/// An event that carries an objective value.
///
/// Values are in the caller's sense: larger is better for a maximization run.
pub trait HasObjective {
    /// Returns the objective for this event.
    fn objective(&self) -> f64;

    /// Whether the objective tracks the run's own progress.
    ///
    /// Events that report a sub-problem or a trial point return `false`,
    /// and progress observers skip them.
    fn is_progress(&self) -> bool {
        true
    }
}

/// An event that belongs to a numbered iteration.
pub trait HasIteration {
    /// Returns the iteration number, starting at 1.
    ///
    /// Solvers that are driven by evaluations rather than iterations report
    /// the evaluation count.
    fn iteration(&self) -> usize;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the solver early.
    fn stop_early() -> Self;
}

// --- quasi_newton ---

impl HasObjective for quasi_newton::Event<'_> {
    fn objective(&self) -> f64 {
        quasi_newton::Event::objective(self)
    }
}

impl HasIteration for quasi_newton::Event<'_> {
    fn iteration(&self) -> usize {
        self.iter()
    }
}

// --- gradient_ascent ---

impl HasObjective for gradient_ascent::Event<'_> {
    fn objective(&self) -> f64 {
        self.objective
    }
}

impl HasIteration for gradient_ascent::Event<'_> {
    fn iteration(&self) -> usize {
        self.iter
    }
}

// --- generic ---

impl HasObjective for generic::Event<'_> {
    fn objective(&self) -> f64 {
        self.objective
    }
}

impl HasIteration for generic::Event<'_> {
    fn iteration(&self) -> usize {
        self.evaluation
    }
}

// --- optimizer ---

impl HasObjective for optimizer::Event<'_> {
    fn objective(&self) -> f64 {
        optimizer::Event::objective(self)
    }
}

impl HasIteration for optimizer::Event<'_> {
    fn iteration(&self) -> usize {
        self.iter()
    }
}

// --- nested ---

impl HasObjective for nested::Event<'_> {
    fn objective(&self) -> f64 {
        nested::Event::objective(self)
    }

    /// Only outer iterations count. Inner solves report `f1`, and outer
    /// evaluations include line-search trials.
    fn is_progress(&self) -> bool {
        matches!(self, nested::Event::Outer(_))
    }
}

/// Events inside an outer iteration report 0.
impl HasIteration for nested::Event<'_> {
    fn iteration(&self) -> usize {
        self.outer_iter().unwrap_or(0)
    }
}

// --- CanStopEarly impls ---

impl CanStopEarly for quasi_newton::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanStopEarly for gradient_ascent::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanStopEarly for generic::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanStopEarly for optimizer::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanStopEarly for nested::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
