use std::marker::PhantomData;

use tracing::{debug, warn};

use stackelberg_core::{Goal, Observer, Sample, Vector, params::Bound};

use crate::bounds::{project, projected_gradient_norm};

use super::{
    Action, Config, Error, Event, Solution,
    line_search::backtrack,
    memory::History,
    solution::Status,
};

/// An evaluated point in the internal minimization frame.
#[derive(Debug, Clone)]
pub(super) struct Point {
    pub(super) x: Vector,
    pub(super) value: f64,
    pub(super) gradient: Vector,
}

impl Point {
    pub(super) fn is_finite(&self) -> bool {
        self.value.is_finite() && self.gradient.iter().all(|g| g.is_finite())
    }
}

/// Counts evaluations and maps results into the minimization frame.
struct Evaluator<F, G> {
    objective: F,
    evaluations: usize,
    _goal: PhantomData<G>,
}

impl<F, E, G> Evaluator<F, G>
where
    F: FnMut(&Vector) -> Result<Sample, E>,
    G: Goal,
{
    fn point(&mut self, x: Vector) -> Result<Point, Error<E>> {
        self.evaluations += 1;
        let Sample {
            value,
            mut gradient,
        } = (self.objective)(&x).map_err(Error::Objective)?;
        G::transform_gradient(&mut gradient);
        Ok(Point {
            x,
            value: G::transform(value),
            gradient,
        })
    }
}

/// Core projected L-BFGS loop.
///
/// `G` maps the caller's objective into the minimization frame. Both goal
/// transforms are involutions, so the same transform maps results back.
pub(super) fn search<F, E, G, Obs>(
    objective: F,
    x0: &Vector,
    bounds: &[Bound],
    config: &Config,
    mut observer: Obs,
) -> Result<Solution, Error<E>>
where
    F: FnMut(&Vector) -> Result<Sample, E>,
    G: Goal,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    if bounds.len() != x0.len() {
        return Err(Error::BoundsDimension {
            expected: x0.len(),
            found: bounds.len(),
        });
    }

    let mut eval = Evaluator::<F, G> {
        objective,
        evaluations: 0,
        _goal: PhantomData,
    };

    let mut x = x0.clone();
    project(&mut x, bounds);
    let mut current = eval.point(x)?;
    if !current.is_finite() {
        return Err(Error::NonFiniteStart);
    }

    let mut history = History::new(config.memory());
    let mut refreshed = false;

    for iter in 1..=config.max_iters() {
        let pg_norm = projected_gradient_norm(&current.x, &current.gradient, bounds);
        if pg_norm <= config.pg_tol() {
            return Ok(finish::<G>(current, Status::Converged, iter - 1, eval.evaluations));
        }

        let free = free_components(&current, bounds);
        let mut direction = history.direction(&current.gradient, &free);
        if current.gradient.dot(&direction) >= 0.0 {
            history.clear();
            direction = history.direction(&current.gradient, &free);
        }

        let initial_step = if history.is_empty() {
            let norm = direction.dot(&direction).sqrt();
            if norm > 1.0 { 1.0 / norm } else { 1.0 }
        } else {
            1.0
        };

        let accepted = backtrack(
            &mut |x| eval.point(x),
            &current,
            &direction,
            bounds,
            initial_step,
            config.max_line_search(),
        )?;

        let Some((next, step)) = accepted else {
            if refreshed {
                warn!(iter, "line search failed from a freshly evaluated point");
                return Ok(finish::<G>(
                    current,
                    Status::LineSearchFailed,
                    iter - 1,
                    eval.evaluations,
                ));
            }

            history.clear();
            refreshed = true;
            let fresh = eval.point(current.x.clone())?;
            if !fresh.is_finite() {
                warn!(iter, "objective is not finite at the current point");
                return Ok(finish::<G>(
                    current,
                    Status::LineSearchFailed,
                    iter - 1,
                    eval.evaluations,
                ));
            }
            current = fresh;
            debug!(iter, objective = current.value, "line search restarted");

            let event = Event::Restarted {
                iter,
                objective: G::transform(current.value),
            };
            if let Some(Action::StopEarly) = observer.observe(&event) {
                return Ok(finish::<G>(
                    current,
                    Status::StoppedByObserver,
                    iter,
                    eval.evaluations,
                ));
            }
            continue;
        };

        history.push(&next.x - &current.x, &next.gradient - &current.gradient);
        let scale = current.value.abs().max(next.value.abs()).max(1.0);
        let reduction = (current.value - next.value) / scale;
        current = next;
        refreshed = false;

        let pg_norm = projected_gradient_norm(&current.x, &current.gradient, bounds);
        debug!(iter, objective = current.value, pg_norm, step, "quasi-Newton step");

        let event = Event::Iterated {
            iter,
            x: &current.x,
            objective: G::transform(current.value),
            pg_norm,
            step,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(finish::<G>(
                current,
                Status::StoppedByObserver,
                iter,
                eval.evaluations,
            ));
        }

        if pg_norm <= config.pg_tol() || reduction <= config.rel_reduction_tol() {
            return Ok(finish::<G>(current, Status::Converged, iter, eval.evaluations));
        }
    }

    warn!(
        max_iters = config.max_iters(),
        "quasi-Newton solver reached the iteration limit"
    );
    Ok(finish::<G>(
        current,
        Status::MaxIters,
        config.max_iters(),
        eval.evaluations,
    ))
}

/// Marks components held at a bound by the descent direction `-g`.
fn free_components(point: &Point, bounds: &[Bound]) -> Vec<bool> {
    point
        .x
        .iter()
        .zip(&point.gradient)
        .zip(bounds)
        .map(|((&x, &g), &(lower, upper))| !((x <= lower && g > 0.0) || (x >= upper && g < 0.0)))
        .collect()
}

fn finish<G: Goal>(point: Point, status: Status, iters: usize, evaluations: usize) -> Solution {
    let Point {
        x,
        value,
        mut gradient,
    } = point;
    G::transform_gradient(&mut gradient);
    Solution {
        status,
        x,
        objective: G::transform(value),
        gradient,
        iters,
        evaluations,
    }
}
