//! Adapter exposing a batched objective as an `argmin` problem.
//!
//! `argmin` asks for the cost and the gradient at the same point in two
//! calls; the adapter caches the last evaluation so each point costs one
//! batch pass. Its callbacks cannot carry our error type, so the first
//! objective failure, an observer stop, or reaching the gradient tolerance
//! is recorded in a side channel and surfaced to `argmin` as a plain error
//! that ends the run.

use std::cell::RefCell;
use std::marker::PhantomData;

use argmin::core::{CostFunction, Error as ArgminError, Gradient};
use tracing::debug;

use stackelberg_core::{Goal, Observer, Sample, Vector};

use super::{Action, Event};

/// Why the adapter ended a run from inside a callback.
pub(super) enum Interrupt<E> {
    Failed(E),
    Converged,
    Stopped,
}

/// An evaluated point in the minimization frame.
#[derive(Clone)]
pub(super) struct Point {
    pub(super) x: Vector,
    pub(super) sample: Sample,
}

struct Inner<F, Obs, E> {
    objective: F,
    observer: Obs,
    last: Option<Point>,
    best: Option<Point>,
    evaluations: usize,
    gradient_evaluations: u64,
    interrupt: Option<Interrupt<E>>,
}

pub(super) struct Adapter<F, Obs, E, G> {
    inner: RefCell<Inner<F, Obs, E>>,
    grad_tol: f64,
    _goal: PhantomData<G>,
}

/// What the adapter observed over a run.
pub(super) struct Record<E> {
    pub(super) last: Option<Point>,
    pub(super) best: Option<Point>,
    pub(super) evaluations: usize,
    pub(super) gradient_evaluations: u64,
    pub(super) interrupt: Option<Interrupt<E>>,
}

impl<F, Obs, E, G> Adapter<F, Obs, E, G>
where
    F: FnMut(&Vector) -> Result<Sample, E>,
    Obs: for<'a> Observer<Event<'a>, Action>,
    G: Goal,
{
    pub(super) fn new(objective: F, observer: Obs, grad_tol: f64) -> Self {
        Self {
            inner: RefCell::new(Inner {
                objective,
                observer,
                last: None,
                best: None,
                evaluations: 0,
                gradient_evaluations: 0,
                interrupt: None,
            }),
            grad_tol,
            _goal: PhantomData,
        }
    }

    pub(super) fn into_record(self) -> Record<E> {
        let inner = self.inner.into_inner();
        Record {
            last: inner.last,
            best: inner.best,
            evaluations: inner.evaluations,
            gradient_evaluations: inner.gradient_evaluations,
            interrupt: inner.interrupt,
        }
    }

    /// Evaluates at `x` in the minimization frame, reusing the cached point.
    fn evaluate(&self, x: &Vector) -> Result<Sample, ArgminError> {
        let inner = &mut *self.inner.borrow_mut();
        if let Some(last) = &inner.last
            && last.x == *x
        {
            return Ok(last.sample.clone());
        }

        inner.evaluations += 1;
        let mut sample = match (inner.objective)(x) {
            Ok(sample) => sample,
            Err(error) => {
                inner.interrupt = Some(Interrupt::Failed(error));
                return Err(ArgminError::msg("objective evaluation failed"));
            }
        };
        let objective = sample.value;
        sample.value = G::transform(sample.value);
        G::transform_gradient(&mut sample.gradient);

        let point = Point {
            x: x.clone(),
            sample: sample.clone(),
        };
        let improves = point.sample.value.is_finite()
            && inner
                .best
                .as_ref()
                .is_none_or(|best| point.sample.value < best.sample.value);
        if improves {
            inner.best = Some(point.clone());
        }
        inner.last = Some(point);

        debug!(evaluation = inner.evaluations, objective, "argmin evaluation");
        let event = Event {
            evaluation: inner.evaluations,
            x,
            objective,
        };
        if let Some(Action::StopEarly) = inner.observer.observe(&event) {
            inner.interrupt = Some(Interrupt::Stopped);
            return Err(ArgminError::msg("stopped by observer"));
        }

        Ok(sample)
    }
}

impl<F, Obs, E, G> CostFunction for &Adapter<F, Obs, E, G>
where
    F: FnMut(&Vector) -> Result<Sample, E>,
    Obs: for<'a> Observer<Event<'a>, Action>,
    G: Goal,
{
    type Param = Vector;
    type Output = f64;

    fn cost(&self, x: &Vector) -> Result<f64, ArgminError> {
        self.evaluate(x).map(|sample| sample.value)
    }
}

impl<F, Obs, E, G> Gradient for &Adapter<F, Obs, E, G>
where
    F: FnMut(&Vector) -> Result<Sample, E>,
    Obs: for<'a> Observer<Event<'a>, Action>,
    G: Goal,
{
    type Param = Vector;
    type Gradient = Vector;

    fn gradient(&self, x: &Vector) -> Result<Vector, ArgminError> {
        let sample = self.evaluate(x)?;
        self.inner.borrow_mut().gradient_evaluations += 1;

        let norm = sample.gradient.iter().fold(0.0, |m: f64, g| m.max(g.abs()));
        if norm <= self.grad_tol {
            self.inner.borrow_mut().interrupt = Some(Interrupt::Converged);
            return Err(ArgminError::msg("gradient tolerance reached"));
        }
        Ok(sample.gradient)
    }
}
