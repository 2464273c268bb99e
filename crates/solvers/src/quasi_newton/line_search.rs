use stackelberg_core::{Vector, params::Bound};

use crate::bounds::project;

use super::search::Point;

/// Sufficient-decrease constant for the Armijo condition.
const C1: f64 = 1e-4;

/// Projected backtracking line search.
///
/// Tries `P(x + t·d)` for `t = initial_step, initial_step/2, …` and accepts
/// the first trial whose value satisfies the Armijo condition along the
/// projected step and whose value and gradient are finite. Returns the
/// accepted point and step length, or `None` if every trial failed.
pub(super) fn backtrack<F, E>(
    eval: &mut F,
    from: &Point,
    direction: &Vector,
    bounds: &[Bound],
    initial_step: f64,
    max_trials: usize,
) -> Result<Option<(Point, f64)>, E>
where
    F: FnMut(Vector) -> Result<Point, E>,
{
    let mut step = initial_step;
    for _ in 0..max_trials {
        let mut x = &from.x + &(direction * step);
        project(&mut x, bounds);

        let decrease = from.gradient.dot(&(&x - &from.x));
        if decrease < 0.0 {
            let trial = eval(x)?;
            if trial.is_finite() && trial.value <= from.value + C1 * decrease {
                return Ok(Some((trial, step)));
            }
        }
        step *= 0.5;
    }
    Ok(None)
}
