//! Reusable observers for the batched bi-level optimizers.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work across the solvers in `stackelberg-solvers`.
//!
//! # Modules
//!
//! - [`traits`]: Capability traits for cross-solver observers
//!   ([`HasObjective`], [`HasIteration`], [`CanStopEarly`])
//!
//! # Observers
//!
//! - [`Log`]: reports progress through `tracing`
//! - [`Plateau`]: stops a run once the objective stops improving
//!
//! [`Observer`]: stackelberg_core::Observer
//! [`HasObjective`]: traits::HasObjective
//! [`HasIteration`]: traits::HasIteration
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod traits;

mod log;
mod plateau;

pub use log::Log;
pub use plateau::Plateau;
