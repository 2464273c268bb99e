use stackelberg_core::Observer;
use tracing::info;

use crate::traits::{HasIteration, HasObjective};

/// Reports solver progress through `tracing` at `info` level.
///
/// Logs every `every`-th iteration with the run's label, iteration, and
/// objective. Never takes an action.
///
/// # Example
///
/// ```rust
/// use ndarray::array;
/// use stackelberg_core::{Sample, Vector, params::UNBOUNDED};
/// use stackelberg_observers::Log;
/// use stackelberg_solvers::quasi_newton;
///
/// let peak = |x: &Vector| -> Result<_, std::convert::Infallible> {
///     Ok(Sample::new(-x[0] * x[0], array![-2.0 * x[0]]))
/// };
///
/// let solution = quasi_newton::maximize(
///     peak,
///     &array![3.0],
///     &[UNBOUNDED],
///     &quasi_newton::Config::default(),
///     Log::new("peak"),
/// )
/// .unwrap();
/// assert!(solution.x[0].abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct Log {
    label: &'static str,
    every: usize,
    logged: usize,
}

impl Log {
    /// Creates a logger that reports every iteration.
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            every: 1,
            logged: 0,
        }
    }

    /// Reports only every `every`-th iteration. Zero is treated as one.
    #[must_use]
    pub fn every(mut self, every: usize) -> Self {
        self.every = every.max(1);
        self
    }

    /// Returns how many events have been logged.
    #[must_use]
    pub fn logged(&self) -> usize {
        self.logged
    }
}

impl<E, A> Observer<E, A> for Log
where
    E: HasObjective + HasIteration,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        if !event.is_progress() {
            return None;
        }
        let iter = event.iteration();
        if iter % self.every == 0 {
            self.logged += 1;
            info!(
                label = self.label,
                iter,
                objective = event.objective(),
                "progress"
            );
        }
        None
    }
}
