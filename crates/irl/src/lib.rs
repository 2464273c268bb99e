//! Inverse reinforcement learning on recorded driving trajectories.
//!
//! - [`trajectory`] reads trajectory-sample files and cuts them into
//!   fixed-length windows, one context per window
//! - [`laplace`] scores reward weights with a Laplace approximation of the
//!   trajectory likelihood, as an [`Oracle`] over those contexts
//!
//! Together they plug into `stackelberg_solvers::Optimizer`: the dataset is
//! the context source and the reward weights are the parameter block.
//!
//! [`Oracle`]: stackelberg_core::Oracle

pub mod laplace;
pub mod trajectory;

pub use laplace::{FeatureDerivatives, LaplaceLikelihood};
pub use trajectory::{Header, SampleFile, TrajectorySample, load_dataset};
