use std::convert::Infallible;

use approx::assert_relative_eq;
use ndarray::{Array2, array};
use thiserror::Error as ThisError;

use stackelberg_core::{
    Coupling, Oracle, Sample, Vector,
    context::{Dataset, Single},
};

use super::{
    BatchEvaluator, BatchSample, Config, CouplingShape, Error, Rejection, Term, average,
};

/// Returns the context itself as the sample, ignoring `x`.
struct Replay;

impl Oracle for Replay {
    type Context = Sample;
    type Error = Infallible;

    fn evaluate(&self, _x: &Vector, context: &Sample) -> Result<Sample, Self::Error> {
        Ok(context.clone())
    }
}

/// f(x) = -(x - y)², with `y` supplied by the context.
struct Distance;

impl Oracle for Distance {
    type Context = f64;
    type Error = Infallible;

    fn evaluate(&self, x: &Vector, y: &f64) -> Result<Sample, Self::Error> {
        let d = x[0] - y;
        Ok(Sample::new(-d * d, array![-2.0 * d]))
    }
}

#[derive(Debug, ThisError)]
#[error("context {0} is unreadable")]
struct Unreadable(usize);

struct FailsOn(usize);

impl Oracle for FailsOn {
    type Context = usize;
    type Error = Unreadable;

    fn evaluate(&self, _x: &Vector, context: &usize) -> Result<Sample, Self::Error> {
        if *context == self.0 {
            Err(Unreadable(*context))
        } else {
            Ok(Sample::new(1.0, array![0.0]))
        }
    }
}

#[test]
fn identical_contexts_average_to_themselves() {
    let sample = Sample::new(2.5, array![1.0, -4.0]);
    let source = Dataset::new(vec![sample.clone(); 7]);

    let evaluator = BatchEvaluator::new(&Replay, &source, Config::default());
    let result = evaluator.evaluate(&array![0.0, 0.0]).unwrap();

    assert_eq!(result.accepted, 7);
    assert_eq!(result.rejected, 0);
    assert_relative_eq!(result.mean.value, sample.value);
    assert_relative_eq!(result.mean.gradient, sample.gradient);
}

#[test]
fn single_context_calls_oracle_once() {
    let source = Single(3.0);
    let evaluator = BatchEvaluator::new(&Distance, &source, Config::default());

    let result = evaluator.evaluate(&array![1.0]).unwrap();

    assert_eq!(result.accepted, 1);
    assert_relative_eq!(result.mean.value, -4.0);
    assert_relative_eq!(result.mean.gradient[0], 4.0);
}

#[test]
fn nan_gradient_sample_is_excluded_from_mean() {
    let source = Dataset::new(vec![
        Sample::new(1.0, array![2.0]),
        Sample::new(3.0, array![f64::NAN]),
        Sample::new(5.0, array![6.0]),
    ]);

    let evaluator = BatchEvaluator::new(&Replay, &source, Config::default());
    let result = evaluator.evaluate(&array![0.0]).unwrap();

    assert_eq!(result.accepted, 2);
    assert_eq!(result.rejected, 1);
    assert_relative_eq!(result.mean.value, 3.0);
    assert_relative_eq!(result.mean.gradient[0], 4.0);
}

#[test]
fn magnitude_above_limit_is_rejected() {
    let source = Dataset::new(vec![
        Sample::new(1.0, array![1.0]),
        Sample::new(1.0, array![2e7]),
        Sample::new(-3e7, array![1.0]),
    ]);

    let config = Config::new(1e7).unwrap();
    let evaluator = BatchEvaluator::new(&Replay, &source, config);
    let result = evaluator.evaluate(&array![0.0]).unwrap();

    assert_eq!(result.accepted, 1);
    assert_eq!(result.rejected, 2);
}

#[test]
fn limit_is_strict() {
    let sample = Sample::new(10.0, array![-10.0]);

    assert_eq!(sample.screen(10.0), None);
    assert_eq!(
        sample.screen(9.0),
        Some(Rejection::OutOfRange {
            term: Term::Value,
            index: 0
        })
    );
}

#[test]
fn all_rejected_is_an_error() {
    let source = Dataset::new(vec![
        Sample::new(f64::NAN, array![0.0]),
        Sample::new(0.0, array![f64::INFINITY]),
    ]);

    let evaluator = BatchEvaluator::new(&Replay, &source, Config::default());
    let error = evaluator.evaluate(&array![0.0]).unwrap_err();

    assert!(matches!(error, Error::EmptyBatch { rejected: 2 }));
}

#[test]
fn empty_source_is_an_error() {
    let source: Dataset<f64> = Dataset::default();
    let evaluator = BatchEvaluator::new(&Distance, &source, Config::default());

    let error = evaluator.evaluate(&array![0.0]).unwrap_err();

    assert!(matches!(error, Error::EmptyBatch { rejected: 0 }));
}

#[test]
fn overflowing_mean_is_an_error() {
    let source = Dataset::new(vec![Sample::new(1e308, array![1e308]); 2]);

    let evaluator = BatchEvaluator::new(&Replay, &source, Config::default());
    let error = evaluator.evaluate(&array![0.0]).unwrap_err();

    assert!(matches!(
        error,
        Error::Overflow {
            term: Term::Value,
            accepted: 2
        }
    ));
}

#[test]
fn wrong_gradient_length_is_fatal() {
    let source = Dataset::new(vec![Sample::new(0.0, array![1.0, 2.0])]);
    let evaluator = BatchEvaluator::new(&Replay, &source, Config::default());

    let error = evaluator.evaluate(&array![0.0]).unwrap_err();

    let Error::Dimension { index, mismatch } = error else {
        panic!("expected a dimension error");
    };
    assert_eq!(index, 0);
    assert_eq!(mismatch.term, Term::Gradient);
    assert_eq!(mismatch.found, vec![2]);
}

#[test]
fn oracle_error_reports_context_index() {
    let source = Dataset::new(vec![0, 1, 2]);
    let evaluator = BatchEvaluator::new(&FailsOn(2), &source, Config::default());

    let error = evaluator.evaluate(&array![0.0]).unwrap_err();

    assert!(matches!(error, Error::Oracle { index: 2, source: Unreadable(2) }));
}

fn coupling(scale: f64) -> Coupling {
    Coupling {
        objective: scale,
        outer_gradient: array![scale],
        inner_gradient: array![scale, -scale],
        inner_hessian: Array2::eye(2) * -scale,
        cross_jacobian: array![[scale, 0.0]],
    }
}

#[test]
fn coupling_terms_are_averaged() {
    let source = Dataset::new(vec![1.0, 3.0]);
    let shape = CouplingShape { outer: 1, inner: 2 };

    let result = average(&source, &Config::default(), shape, |s: &f64| {
        Ok::<_, Infallible>(coupling(*s))
    })
    .unwrap();

    assert_relative_eq!(result.mean.objective, 2.0);
    assert_relative_eq!(result.mean.inner_hessian, Array2::eye(2) * -2.0);
    assert_relative_eq!(result.mean.cross_jacobian, array![[2.0, 0.0]]);
}

#[test]
fn coupling_screens_hessian_entries() {
    let mut bad = coupling(1.0);
    bad.inner_hessian[[1, 0]] = f64::NAN;

    assert_eq!(
        bad.screen(f64::INFINITY),
        Some(Rejection::NonFinite {
            term: Term::Hessian,
            index: 2
        })
    );
}

#[test]
fn coupling_shape_mismatch_names_the_term() {
    let shape = CouplingShape { outer: 2, inner: 2 };
    let mismatch = coupling(1.0).check_shape(shape).unwrap_err();

    assert_eq!(mismatch.term, Term::OuterGradient);
    assert_eq!(mismatch.expected, vec![2]);
}

#[test]
fn rejects_invalid_limit() {
    assert!(Config::new(0.0).is_err());
    assert!(Config::new(f64::NAN).is_err());
    assert!(Config::new(1.0).is_ok());
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_matches_sequential() {
    let source: Dataset<f64> = (0..50).map(f64::from).collect();
    let evaluator = BatchEvaluator::new(&Distance, &source, Config::default());
    let x = array![4.0];

    let sequential = evaluator.evaluate(&x).unwrap();
    let parallel = evaluator.evaluate_parallel(&x).unwrap();

    assert_eq!(sequential.accepted, parallel.accepted);
    assert_relative_eq!(sequential.mean.value, parallel.mean.value, max_relative = 1e-12);
    assert_relative_eq!(
        sequential.mean.gradient,
        parallel.mean.gradient,
        max_relative = 1e-12
    );
}
