use approx::assert_relative_eq;
use ndarray::array;

use integration_tests::oracles::Distance;
use stackelberg_core::{
    BoundsMap, Observer, Overrides, ParameterBlock,
    context::{Dataset, FromFn, OneShot},
};
use stackelberg_observers::{Log, Plateau};
use stackelberg_solvers::{
    BatchEvaluator, Optimizer, Strategy, batch, gradient_ascent,
    optimizer::{Action, Event, Status},
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn scalar() -> Vec<ParameterBlock> {
    vec![ParameterBlock::new("x", vec![0.0])]
}

fn strategies() -> [Strategy; 2] {
    [
        Strategy::default(),
        Strategy::GradientAscent(gradient_ascent::Config::new(0.25, 200, 0.0).unwrap()),
    ]
}

#[test]
fn one_shot_source_settles_on_its_fallback() {
    init_logging();
    let source = OneShot::new((0..10).map(f64::from), 10.0);
    let mut blocks = scalar();
    let optimizer = Optimizer::new(
        &Distance,
        &source,
        &blocks,
        Strategy::default(),
        batch::Config::default(),
    )
    .unwrap();

    optimizer
        .maximize(&mut blocks, &Overrides::new(), &BoundsMap::new())
        .unwrap();

    assert!(source.is_exhausted());
    assert_relative_eq!(blocks[0].value()[0], 10.0, epsilon = 1e-3);
}

#[test]
fn restartable_source_converges_to_its_mean() {
    let source = FromFn(|| (0..10).map(f64::from));
    let mut blocks = scalar();
    let optimizer = Optimizer::new(
        &Distance,
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
    assert_relative_eq!(blocks[0].value()[0], 4.5, epsilon = 1e-5);
}

#[test]
fn bounds_hold_for_every_strategy() {
    let source = Dataset::from(vec![3.0, 5.0]);
    let bounds = BoundsMap::new().with("low", vec![(5.0, 6.0), (-3.0, 1.0)]);

    for strategy in strategies() {
        let mut blocks = vec![
            ParameterBlock::new("low", vec![0.0, 0.0]),
            ParameterBlock::new("capped", vec![0.0])
                .with_bounds(vec![(-1.0, 2.5)])
                .unwrap(),
            ParameterBlock::new("free", vec![0.0]),
        ];
        let optimizer =
            Optimizer::new(&Distance, &source, &blocks, strategy, batch::Config::default())
                .unwrap();

        optimizer
            .maximize(&mut blocks, &Overrides::new(), &bounds)
            .unwrap();

        assert_relative_eq!(blocks[0].value()[0], 5.0);
        assert_relative_eq!(blocks[0].value()[1], 1.0);
        assert_relative_eq!(blocks[1].value()[0], 2.5);
        assert_relative_eq!(blocks[2].value()[0], 4.0, epsilon = 1e-5);
    }
}

#[test]
fn rerun_does_not_move_a_converged_point() {
    let source = Dataset::from(vec![-2.0, 1.0, 7.0]);

    for strategy in strategies() {
        let mut blocks = scalar();
        let optimizer =
            Optimizer::new(&Distance, &source, &blocks, strategy, batch::Config::default())
                .unwrap();

        optimizer
            .maximize(&mut blocks, &Overrides::new(), &BoundsMap::new())
            .unwrap();
        let first = blocks[0].value()[0];
        optimizer
            .maximize(&mut blocks, &Overrides::new(), &BoundsMap::new())
            .unwrap();

        assert_relative_eq!(blocks[0].value()[0], first, epsilon = 1e-6);
        assert_relative_eq!(first, 2.0, epsilon = 1e-5);
    }
}

#[test]
fn degenerate_contexts_are_left_out() {
    let source = Dataset::from(vec![1.0, f64::NAN, 5.0]);
    let evaluator = BatchEvaluator::new(&Distance, &source, batch::Config::default());

    let result = evaluator.evaluate(&array![0.0]).unwrap();

    assert_eq!((result.accepted, result.rejected), (2, 1));
    assert_relative_eq!(result.mean.value, -13.0);
    assert_relative_eq!(result.mean.gradient, array![6.0]);

    let mut blocks = scalar();
    let optimizer = Optimizer::new(
        &Distance,
        &source,
        &blocks,
        Strategy::default(),
        batch::Config::default(),
    )
    .unwrap();
    optimizer
        .maximize(&mut blocks, &Overrides::new(), &BoundsMap::new())
        .unwrap();

    assert_relative_eq!(blocks[0].value()[0], 3.0, epsilon = 1e-5);
}

#[test]
fn outliers_beyond_the_threshold_are_left_out() {
    let source = Dataset::from(vec![1.0, 1000.0]);
    let mut blocks = scalar();
    let optimizer = Optimizer::new(
        &Distance,
        &source,
        &blocks,
        Strategy::default(),
        batch::Config::new(100.0).unwrap(),
    )
    .unwrap();

    optimizer
        .maximize(&mut blocks, &Overrides::new(), &BoundsMap::new())
        .unwrap();

    assert_relative_eq!(blocks[0].value()[0], 1.0, epsilon = 1e-5);
}

#[test]
fn plateau_observer_ends_a_long_run() {
    init_logging();
    let source = Dataset::from(vec![2.0, 4.0]);
    let mut blocks = scalar();
    let strategy =
        Strategy::GradientAscent(gradient_ascent::Config::new(0.25, 100_000, 0.0).unwrap());
    let optimizer =
        Optimizer::new(&Distance, &source, &blocks, strategy, batch::Config::default()).unwrap();

    let mut log = Log::new("ascent").every(10);
    let mut plateau = Plateau::maximizing(1e-12, 5);
    let observer = |event: &Event<'_>| -> Option<Action> {
        log.observe(event).or_else(|| plateau.observe(event))
    };
    let outcome = optimizer
        .maximize_observed(&mut blocks, &Overrides::new(), &BoundsMap::new(), observer)
        .unwrap();

    assert_eq!(outcome.status, Status::StoppedByObserver);
    assert!(outcome.iters < 100);
    assert_relative_eq!(blocks[0].value()[0], 3.0, epsilon = 1e-5);
}
