use nalgebra::{DMatrix, DVector};

use stackelberg_core::{Coupling, Vector};

/// Combines averaged coupling terms into the implicit outer gradient.
///
/// With `H` the inner Hessian, `J` the cross-Jacobian, and `∂f2/∂inner` the
/// outer objective's inner gradient, returns `∂f2/∂outer − J·H⁻¹·∂f2/∂inner`.
///
/// Returns `Err(condition)` if `H` has non-finite entries, is singular, or
/// has a condition number above `condition_limit`.
pub(super) fn implicit_gradient(coupling: &Coupling, condition_limit: f64) -> Result<Vector, f64> {
    let n = coupling.inner_gradient.len();
    let hessian = DMatrix::from_row_iterator(n, n, coupling.inner_hessian.iter().copied());

    let condition = condition_number(&hessian);
    if !condition.is_finite() || condition > condition_limit {
        return Err(condition);
    }

    let rhs = DVector::from_iterator(n, coupling.inner_gradient.iter().copied());
    let solved = hessian.lu().solve(&rhs).ok_or(f64::INFINITY)?;
    if solved.iter().any(|v| !v.is_finite()) {
        return Err(f64::INFINITY);
    }

    let solved: Vector = solved.iter().copied().collect();
    Ok(&coupling.outer_gradient - &coupling.cross_jacobian.dot(&solved))
}

/// Ratio of the largest to the smallest singular value.
fn condition_number(matrix: &DMatrix<f64>) -> f64 {
    if matrix.iter().any(|v| !v.is_finite()) {
        return f64::NAN;
    }
    let singular = matrix.singular_values();
    let largest = singular.max();
    let smallest = singular.min();
    if smallest > 0.0 {
        largest / smallest
    } else {
        f64::INFINITY
    }
}
