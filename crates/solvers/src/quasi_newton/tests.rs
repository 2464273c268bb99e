use std::convert::Infallible;

use approx::assert_relative_eq;
use ndarray::array;
use thiserror::Error as ThisError;

use stackelberg_core::{Sample, Vector, params::UNBOUNDED};

use super::{
    Action, Config, Error, Event, Status, maximize, maximize_unobserved, minimize,
    minimize_unobserved,
};

/// f(x, y) = (1 - x)² + 100(y - x²)², minimum at (1, 1).
fn rosenbrock(x: &Vector) -> Result<Sample, Infallible> {
    let (a, b) = (x[0], x[1]);
    let value = (1.0 - a).powi(2) + 100.0 * (b - a * a).powi(2);
    let gradient = array![
        -2.0 * (1.0 - a) - 400.0 * a * (b - a * a),
        200.0 * (b - a * a)
    ];
    Ok(Sample::new(value, gradient))
}

/// f(x, y) = -(x - 2)² - 3(y + 1)² - xy, a concave quadratic.
fn concave(x: &Vector) -> Result<Sample, Infallible> {
    let (a, b) = (x[0], x[1]);
    let value = -(a - 2.0).powi(2) - 3.0 * (b + 1.0).powi(2) - a * b;
    let gradient = array![-2.0 * (a - 2.0) - b, -6.0 * (b + 1.0) - a];
    Ok(Sample::new(value, gradient))
}

#[test]
fn minimizes_rosenbrock() {
    let config = Config::new(10, 15_000, 1e-10, 0.0, 40).unwrap();

    let solution =
        minimize_unobserved(rosenbrock, &array![-1.2, 1.0], &[UNBOUNDED; 2], &config).unwrap();

    assert_relative_eq!(solution.x, array![1.0, 1.0], epsilon = 1e-3);
    assert!(solution.evaluations > solution.iters);
}

#[test]
fn maximizes_concave_quadratic() {
    // Stationary point of the concave quadratic: 2x + y = 4, x + 6y = -6.
    let expected = array![30.0 / 11.0, -16.0 / 11.0];

    let solution =
        maximize_unobserved(concave, &array![0.0, 0.0], &[UNBOUNDED; 2], &Config::default())
            .unwrap();

    assert_eq!(solution.status, Status::Converged);
    assert_relative_eq!(solution.x, expected, epsilon = 1e-4);
    assert!(solution.gradient.iter().all(|g| g.abs() < 1e-3));

    let value = concave(&expected).unwrap().value;
    assert_relative_eq!(solution.objective, value, epsilon = 1e-8);
}

#[test]
fn stops_at_active_bound() {
    // Unconstrained minimum of (x - 3)² is outside the box.
    let objective = |x: &Vector| -> Result<Sample, Infallible> {
        Ok(Sample::new((x[0] - 3.0).powi(2), array![2.0 * (x[0] - 3.0)]))
    };

    let solution =
        minimize_unobserved(objective, &array![0.5], &[(0.0, 1.0)], &Config::default()).unwrap();

    assert_eq!(solution.status, Status::Converged);
    assert_relative_eq!(solution.x[0], 1.0);
}

#[test]
fn starting_point_is_clamped() {
    let mut first = None;
    let objective = |x: &Vector| -> Result<Sample, Infallible> {
        first.get_or_insert(x[0]);
        Ok(Sample::new(x[0] * x[0], array![2.0 * x[0]]))
    };

    minimize_unobserved(objective, &array![-5.0], &[(-1.0, 1.0)], &Config::default()).unwrap();

    assert_eq!(first, Some(-1.0));
}

#[test]
fn respects_bounds_on_every_iterate() {
    let bounds = [(-0.5, 0.5), (0.0, 2.0)];
    let observer = |event: &Event<'_>| {
        if let Event::Iterated { x, .. } = event {
            assert!(x.iter().zip(&bounds).all(|(v, (lo, hi))| lo <= v && v <= hi));
        }
        None::<Action>
    };

    let solution = minimize(rosenbrock, &array![0.0, 0.0], &bounds, &Config::default(), observer)
        .unwrap();

    assert_relative_eq!(solution.x[0], 0.5, epsilon = 1e-6);
    assert_relative_eq!(solution.x[1], 0.25, epsilon = 1e-4);
}

#[test]
fn observer_can_stop_early() {
    let mut seen = Vec::new();
    let observer = |event: &Event<'_>| {
        seen.push(event.iter());
        (event.iter() == 2).then_some(Action::StopEarly)
    };

    let solution = maximize(concave, &array![0.0, 0.0], &[UNBOUNDED; 2], &Config::default(), observer)
        .unwrap();

    assert_eq!(solution.status, Status::StoppedByObserver);
    assert_eq!(solution.iters, 2);
    assert_eq!(seen, vec![1, 2]);
}

#[test]
fn reports_iteration_limit() {
    let config = Config::default().with_max_iters(1);

    let solution =
        minimize_unobserved(rosenbrock, &array![-1.2, 1.0], &[UNBOUNDED; 2], &config).unwrap();

    assert_eq!(solution.status, Status::MaxIters);
    assert_eq!(solution.iters, 1);
}

#[test]
fn stationary_point_on_the_last_iteration_is_converged() {
    // The first step from 0 lands exactly on the peak of -(x - 1)².
    let peak = |x: &Vector| -> Result<Sample, Infallible> {
        let d = x[0] - 1.0;
        Ok(Sample::new(-d * d, array![-2.0 * d]))
    };
    let config = Config::default().with_max_iters(1);

    let solution = maximize_unobserved(peak, &array![0.0], &[UNBOUNDED], &config).unwrap();

    assert_eq!(solution.status, Status::Converged);
    assert_eq!(solution.iters, 1);
    assert_relative_eq!(solution.x[0], 1.0);
}

#[test]
fn recovers_when_objective_shifts_between_passes() {
    // The first evaluation sees a target of 4.5; every later one sees 10.
    let mut calls = 0;
    let objective = |x: &Vector| -> Result<Sample, Infallible> {
        calls += 1;
        let target = if calls == 1 { 4.5 } else { 10.0 };
        let d = x[0] - target;
        Ok(Sample::new(-d * d, array![-2.0 * d]))
    };

    let mut restarts = 0;
    let observer = |event: &Event<'_>| {
        if matches!(event, Event::Restarted { .. }) {
            restarts += 1;
        }
        None::<Action>
    };

    let solution =
        maximize(objective, &array![0.0], &[UNBOUNDED], &Config::default(), observer).unwrap();

    assert_eq!(restarts, 1);
    assert_eq!(solution.status, Status::Converged);
    assert_relative_eq!(solution.x[0], 10.0, epsilon = 1e-6);
}

#[test]
fn fails_when_no_descent_exists() {
    // The reported gradient disagrees with the values, so no step decreases.
    let objective = |x: &Vector| -> Result<Sample, Infallible> {
        Ok(Sample::new(x[0] * x[0], array![-1.0]))
    };

    let solution =
        minimize_unobserved(objective, &array![0.0], &[UNBOUNDED], &Config::default()).unwrap();

    assert_eq!(solution.status, Status::LineSearchFailed);
    assert_relative_eq!(solution.x[0], 0.0);
}

#[test]
fn rejects_mismatched_bounds() {
    let error = minimize_unobserved(rosenbrock, &array![0.0, 0.0], &[UNBOUNDED], &Config::default())
        .unwrap_err();

    assert!(matches!(
        error,
        Error::BoundsDimension {
            expected: 2,
            found: 1
        }
    ));
}

#[test]
fn rejects_non_finite_start() {
    let objective =
        |_: &Vector| -> Result<Sample, Infallible> { Ok(Sample::new(f64::NAN, array![0.0])) };

    let error =
        minimize_unobserved(objective, &array![0.0], &[UNBOUNDED], &Config::default()).unwrap_err();

    assert!(matches!(error, Error::NonFiniteStart));
}

#[derive(Debug, ThisError)]
#[error("oracle offline")]
struct Offline;

#[test]
fn propagates_objective_errors() {
    let objective = |_: &Vector| -> Result<Sample, Offline> { Err(Offline) };

    let error =
        minimize_unobserved(objective, &array![0.0], &[UNBOUNDED], &Config::default()).unwrap_err();

    assert!(matches!(error, Error::Objective(Offline)));
}

#[test]
fn rejects_invalid_config() {
    assert!(Config::new(0, 10, 1e-5, 0.0, 20).is_err());
    assert!(Config::new(5, 10, -1.0, 0.0, 20).is_err());
    assert!(Config::new(5, 10, 1e-5, f64::NAN, 20).is_err());
    assert!(Config::new(5, 10, 1e-5, 0.0, 0).is_err());
}
