use stackelberg_core::Observer;
use tracing::debug;

use crate::traits::{CanStopEarly, HasObjective};

/// Stops a run once the objective stops improving.
///
/// An event improves on the best objective seen so far if it beats it by
/// more than `tol`. After `window` consecutive events without improvement,
/// the observer requests an early stop. Non-finite objectives never count
/// as improvements.
#[derive(Debug, Clone)]
pub struct Plateau {
    tol: f64,
    window: usize,
    sign: f64,
    best: f64,
    stale: usize,
}

impl Plateau {
    /// Watches a maximization run, where larger objectives are better.
    #[must_use]
    pub fn maximizing(tol: f64, window: usize) -> Self {
        Self::with_sign(tol, window, 1.0)
    }

    /// Watches a minimization run, where smaller objectives are better.
    #[must_use]
    pub fn minimizing(tol: f64, window: usize) -> Self {
        Self::with_sign(tol, window, -1.0)
    }

    fn with_sign(tol: f64, window: usize, sign: f64) -> Self {
        Self {
            tol: tol.abs(),
            window: window.max(1),
            sign,
            best: f64::NEG_INFINITY,
            stale: 0,
        }
    }

    /// Returns the best objective seen, in the run's own sense.
    #[must_use]
    pub fn best(&self) -> Option<f64> {
        self.best.is_finite().then_some(self.sign * self.best)
    }
}

impl<E, A> Observer<E, A> for Plateau
where
    E: HasObjective,
    A: CanStopEarly,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        if !event.is_progress() {
            return None;
        }
        let score = self.sign * event.objective();
        if score.is_finite() && score > self.best + self.tol {
            self.best = score;
            self.stale = 0;
            return None;
        }

        self.stale += 1;
        if self.stale >= self.window {
            debug!(window = self.window, best = self.sign * self.best, "objective plateaued");
            return Some(A::stop_early());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;
    use stackelberg_core::{Sample, Vector, params::UNBOUNDED};
    use stackelberg_solvers::gradient_ascent;

    struct Value(f64);

    impl HasObjective for Value {
        fn objective(&self) -> f64 {
            self.0
        }
    }

    /// A trial point that is not part of the run's progress.
    struct Trial(f64);

    impl HasObjective for Trial {
        fn objective(&self) -> f64 {
            self.0
        }

        fn is_progress(&self) -> bool {
            false
        }
    }

    #[derive(Debug, PartialEq)]
    struct Stop;

    impl CanStopEarly for Stop {
        fn stop_early() -> Self {
            Stop
        }
    }

    #[test]
    fn stops_after_window_without_improvement() {
        let mut plateau = Plateau::maximizing(0.1, 2);

        assert_eq!(plateau.observe(&Value(1.0)), None::<Stop>);
        assert_eq!(plateau.observe(&Value(1.05)), None::<Stop>);
        assert_eq!(plateau.observe(&Value(1.08)), Some(Stop));
        assert_relative_eq!(plateau.best().unwrap(), 1.0);
    }

    #[test]
    fn improvement_resets_the_window() {
        let mut plateau = Plateau::minimizing(0.0, 2);

        assert_eq!(plateau.observe(&Value(5.0)), None::<Stop>);
        assert_eq!(plateau.observe(&Value(6.0)), None::<Stop>);
        assert_eq!(plateau.observe(&Value(4.0)), None::<Stop>);
        assert_eq!(plateau.observe(&Value(f64::NAN)), None::<Stop>);
        assert_eq!(plateau.observe(&Value(4.0)), Some(Stop));
        assert_relative_eq!(plateau.best().unwrap(), 4.0);
    }

    #[test]
    fn trial_points_neither_improve_nor_age() {
        let mut plateau = Plateau::maximizing(0.0, 1);

        assert_eq!(plateau.observe(&Value(1.0)), None::<Stop>);
        for _ in 0..5 {
            assert_eq!(plateau.observe(&Trial(100.0)), None::<Stop>);
            assert_eq!(plateau.observe(&Trial(-100.0)), None::<Stop>);
        }
        assert_relative_eq!(plateau.best().unwrap(), 1.0);
        assert_eq!(plateau.observe(&Value(0.5)), Some(Stop));
    }

    #[test]
    fn ends_fixed_step_run_early() {
        let peak = |x: &Vector| -> Result<Sample, std::convert::Infallible> {
            let d = x[0] - 1.0;
            Ok(Sample::new(-d * d, array![-2.0 * d]))
        };
        let config = gradient_ascent::Config::new(0.25, 10_000, 0.0).unwrap();

        let solution = gradient_ascent::maximize(
            peak,
            &array![0.0],
            &[UNBOUNDED],
            &config,
            Plateau::maximizing(1e-12, 5),
        )
        .unwrap();

        assert_eq!(solution.status, gradient_ascent::Status::StoppedByObserver);
        assert!(solution.iters < 100);
        assert_relative_eq!(solution.x[0], 1.0, epsilon = 1e-5);
    }
}
