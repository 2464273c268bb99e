use std::convert::Infallible;

use approx::assert_relative_eq;
use ndarray::Array1;

use stackelberg_core::{
    BoundsMap, Oracle, Overrides, ParamError, ParameterBlock, Sample, Vector, context::Dataset,
};

use crate::{batch, generic, gradient_ascent};

use super::{Action, Error, Event, Optimizer, Status, Strategy};

/// f(x) = -Σ(x_i - w_i·y)², pulling each component toward a scaled target.
struct Pull {
    weights: Vec<f64>,
}

impl Pull {
    fn scalar() -> Self {
        Self {
            weights: vec![1.0],
        }
    }
}

impl Oracle for Pull {
    type Context = f64;
    type Error = Infallible;

    fn evaluate(&self, x: &Vector, y: &f64) -> Result<Sample, Self::Error> {
        let target: Vector = self.weights.iter().map(|w| w * y).collect();
        let d = x - &target;
        Ok(Sample::new(-d.dot(&d), -2.0 * &d))
    }
}

fn targets() -> Dataset<f64> {
    Dataset::from(vec![1.0, 2.0, 3.0, 6.0])
}

fn scalar_block() -> Vec<ParameterBlock> {
    vec![ParameterBlock::new("x", vec![0.0])]
}

#[test]
fn converges_to_batch_mean() {
    let oracle = Pull::scalar();
    let source = targets();
    let mut blocks = scalar_block();
    let optimizer = Optimizer::new(
        &oracle,
        &source,
        &blocks,
        Strategy::default(),
        batch::Config::default(),
    )
    .unwrap();

    let outcome = optimizer
        .maximize(&mut blocks, &Overrides::new(), &BoundsMap::new())
        .unwrap();

    assert_eq!(outcome.status, Status::Converged);
    assert_relative_eq!(outcome.x[0], 3.0, epsilon = 1e-6);
    assert_relative_eq!(blocks[0].value()[0], 3.0, epsilon = 1e-6);
    assert_eq!(outcome.value("x"), Some(blocks[0].value()));
}

#[test]
fn optimizes_several_blocks() {
    let oracle = Pull {
        weights: vec![1.0, -1.0, 2.0],
    };
    let source = targets();
    let mut blocks = vec![
        ParameterBlock::new("a", vec![0.0, 0.0]),
        ParameterBlock::new("b", vec![0.0]),
    ];
    let optimizer = Optimizer::new(
        &oracle,
        &source,
        &blocks,
        Strategy::default(),
        batch::Config::default(),
    )
    .unwrap();

    optimizer
        .maximize(&mut blocks, &Overrides::new(), &BoundsMap::new())
        .unwrap();

    assert_relative_eq!(
        Array1::from(blocks[0].value().to_vec()),
        Array1::from(vec![3.0, -3.0]),
        epsilon = 1e-6
    );
    assert_relative_eq!(blocks[1].value()[0], 6.0, epsilon = 1e-6);
}

#[test]
fn respects_bounds_map() {
    let oracle = Pull::scalar();
    let source = targets();
    let mut blocks = scalar_block();
    let optimizer = Optimizer::new(
        &oracle,
        &source,
        &blocks,
        Strategy::default(),
        batch::Config::default(),
    )
    .unwrap();

    let bounds = BoundsMap::new().with("x", vec![(-1.0, 2.0)]);
    let outcome = optimizer
        .maximize(&mut blocks, &Overrides::new(), &bounds)
        .unwrap();

    assert_relative_eq!(outcome.x[0], 2.0);
    assert!(blocks[0].value()[0] <= 2.0);
}

#[test]
fn block_bounds_apply_without_override() {
    let oracle = Pull::scalar();
    let source = targets();
    let mut blocks = vec![
        ParameterBlock::new("x", vec![0.0])
            .with_bounds(vec![(4.0, 5.0)])
            .unwrap(),
    ];
    let optimizer = Optimizer::new(
        &oracle,
        &source,
        &blocks,
        Strategy::default(),
        batch::Config::default(),
    )
    .unwrap();

    let outcome = optimizer
        .maximize(&mut blocks, &Overrides::new(), &BoundsMap::new())
        .unwrap();

    assert_relative_eq!(outcome.x[0], 4.0);
}

#[test]
fn override_sets_start_for_one_run() {
    let oracle = Pull::scalar();
    let source = targets();
    let mut blocks = scalar_block();
    let optimizer = Optimizer::new(
        &oracle,
        &source,
        &blocks,
        Strategy::default(),
        batch::Config::default(),
    )
    .unwrap();

    let mut first = None;
    let observer = |event: &Event<'_>| {
        if first.is_none() {
            first = event.x().map(|x| x[0]);
        }
        None::<Action>
    };
    let overrides = Overrides::new().with("x", vec![2.9]);
    optimizer
        .maximize_observed(&mut blocks, &overrides, &BoundsMap::new(), observer)
        .unwrap();

    // The first accepted step moves from 2.9 toward 3, never from 0.
    assert!(first.is_some_and(|x| (2.9..=3.1).contains(&x)));
}

#[test]
fn mismatched_override_is_rejected_before_running() {
    let oracle = Pull::scalar();
    let source = targets();
    let mut blocks = scalar_block();
    let optimizer = Optimizer::new(
        &oracle,
        &source,
        &blocks,
        Strategy::default(),
        batch::Config::default(),
    )
    .unwrap();

    let overrides = Overrides::new().with("x", vec![1.0, 2.0]);
    let error = optimizer
        .maximize(&mut blocks, &overrides, &BoundsMap::new())
        .unwrap_err();

    assert!(matches!(
        error,
        Error::Param(ParamError::DimensionMismatch { .. })
    ));
    assert_eq!(blocks[0].value(), &[0.0]);
}

#[test]
fn empty_batch_is_fatal_and_writes_nothing() {
    let oracle = Pull::scalar();
    let source = Dataset::from(vec![f64::NAN, f64::NAN]);
    let mut blocks = scalar_block();
    let optimizer = Optimizer::new(
        &oracle,
        &source,
        &blocks,
        Strategy::default(),
        batch::Config::default(),
    )
    .unwrap();

    let error = optimizer
        .maximize(&mut blocks, &Overrides::new(), &BoundsMap::new())
        .unwrap_err();

    assert!(matches!(
        error,
        Error::Batch(batch::Error::EmptyBatch { rejected: 2 })
    ));
    assert_eq!(blocks[0].value(), &[0.0]);
}

#[test]
fn gradient_ascent_strategy() {
    let oracle = Pull::scalar();
    let source = targets();
    let mut blocks = scalar_block();
    let strategy = Strategy::GradientAscent(gradient_ascent::Config::new(0.25, 100, 0.0).unwrap());
    let optimizer =
        Optimizer::new(&oracle, &source, &blocks, strategy, batch::Config::default()).unwrap();

    let outcome = optimizer
        .maximize(&mut blocks, &Overrides::new(), &BoundsMap::new())
        .unwrap();

    assert_eq!(outcome.status, Status::Completed);
    assert_eq!(outcome.iters, 100);
    assert_relative_eq!(blocks[0].value()[0], 3.0, epsilon = 1e-9);
}

#[test]
fn generic_strategy() {
    let oracle = Pull::scalar();
    let source = targets();
    let mut blocks = scalar_block();
    let strategy = Strategy::Generic {
        method: "cg".parse().unwrap(),
        config: generic::Config::default(),
    };
    let optimizer =
        Optimizer::new(&oracle, &source, &blocks, strategy, batch::Config::default()).unwrap();

    let outcome = optimizer
        .maximize(&mut blocks, &Overrides::new(), &BoundsMap::new())
        .unwrap();

    assert_eq!(outcome.status, Status::Converged);
    assert_relative_eq!(blocks[0].value()[0], 3.0, epsilon = 1e-6);
}

#[test]
fn generic_strategy_rejects_bounds() {
    let oracle = Pull::scalar();
    let source = targets();
    let mut blocks = scalar_block();
    let strategy = Strategy::Generic {
        method: generic::Method::SteepestDescent,
        config: generic::Config::default(),
    };
    let optimizer =
        Optimizer::new(&oracle, &source, &blocks, strategy, batch::Config::default()).unwrap();

    let bounds = BoundsMap::all(vec![(0.0, 1.0)]);
    let error = optimizer
        .maximize(&mut blocks, &Overrides::new(), &bounds)
        .unwrap_err();

    assert!(matches!(
        error,
        Error::BoundsUnsupported(generic::Method::SteepestDescent)
    ));
    assert_eq!(blocks[0].value(), &[0.0]);
}

#[test]
fn observer_can_stop_early() {
    let oracle = Pull::scalar();
    let source = targets();
    let mut blocks = scalar_block();
    let strategy = Strategy::GradientAscent(gradient_ascent::Config::new(0.01, 1000, 0.0).unwrap());
    let optimizer =
        Optimizer::new(&oracle, &source, &blocks, strategy, batch::Config::default()).unwrap();

    let observer = |event: &Event<'_>| (event.iter() == 5).then_some(Action::StopEarly);
    let outcome = optimizer
        .maximize_observed(&mut blocks, &Overrides::new(), &BoundsMap::new(), observer)
        .unwrap();

    assert_eq!(outcome.status, Status::StoppedByObserver);
    assert_eq!(outcome.iters, 4);
    assert_eq!(blocks[0].value(), outcome.x.as_slice().unwrap());
}

#[test]
fn rerun_after_convergence_stays_put() {
    let oracle = Pull::scalar();
    let source = targets();
    let mut blocks = scalar_block();
    let optimizer = Optimizer::new(
        &oracle,
        &source,
        &blocks,
        Strategy::default(),
        batch::Config::default(),
    )
    .unwrap();

    let first = optimizer
        .maximize(&mut blocks, &Overrides::new(), &BoundsMap::new())
        .unwrap();
    let second = optimizer
        .maximize(&mut blocks, &Overrides::new(), &BoundsMap::new())
        .unwrap();

    assert_relative_eq!(first.x[0], second.x[0], epsilon = 1e-6);
    assert_eq!(second.status, Status::Converged);
}

#[test]
fn rejects_blocks_with_another_layout() {
    let oracle = Pull::scalar();
    let source = targets();
    let optimizer = Optimizer::new(
        &oracle,
        &source,
        &scalar_block(),
        Strategy::default(),
        batch::Config::default(),
    )
    .unwrap();

    let mut other = vec![ParameterBlock::new("y", vec![0.0])];
    let error = optimizer
        .maximize(&mut other, &Overrides::new(), &BoundsMap::new())
        .unwrap_err();

    assert!(matches!(
        error,
        Error::Param(ParamError::LayoutMismatch { position: 0 })
    ));
}
