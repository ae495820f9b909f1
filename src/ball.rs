//! Poincare-ball geometry.
//!
//! All embeddings live in the open unit ball. Distance between two points
//! u, v is the arccosh metric:
//!
//! ```text
//! d(u, v) = arccosh(1 + 2 * ||u - v||^2 / ((1 - ||u||^2) (1 - ||v||^2)))
//! ```
//!
//! The metric degenerates at the boundary (the denominator vanishes), which
//! is why every write path projects vectors back inside the ball and every
//! read path rejects vectors with norm >= 1.
//!
//! Gradients of the distance with respect to each endpoint follow the chain
//! rule through arccosh; converting a Euclidean gradient to the Riemannian
//! one multiplies by the inverse metric tensor, `(1 - ||x||^2)^2 / 4` for
//! the ball's conformal metric.
//!
//! # References
//!
//! - Nickel & Kiela (2017). "Poincare Embeddings for Learning Hierarchical
//!   Representations"

use crate::error::{Error, Result};
use ndarray::{Array1, ArrayView1};

/// Squared Euclidean norm.
#[inline]
pub fn sq_norm(x: ArrayView1<'_, f64>) -> f64 {
    x.dot(&x)
}

/// Hyperbolic distance between two points assumed to lie inside the ball.
///
/// Clamps the arccosh argument at 1 so that coincident points (where
/// rounding can push the argument fractionally below 1) yield exactly 0.
pub fn distance(u: ArrayView1<'_, f64>, v: ArrayView1<'_, f64>) -> f64 {
    let alpha = 1.0 - sq_norm(u);
    let beta = 1.0 - sq_norm(v);
    let diff = &u - &v;
    let gamma = 1.0 + 2.0 * diff.dot(&diff) / (alpha * beta);
    gamma.max(1.0).acosh()
}

/// Hyperbolic distance with domain checking.
///
/// Returns [`Error::BoundaryViolation`] if either vector's norm is >= 1.
pub fn try_distance(u: ArrayView1<'_, f64>, v: ArrayView1<'_, f64>) -> Result<f64> {
    check_inside(u)?;
    check_inside(v)?;
    Ok(distance(u, v))
}

fn check_inside(x: ArrayView1<'_, f64>) -> Result<()> {
    let sq = sq_norm(x);
    if sq >= 1.0 {
        return Err(Error::BoundaryViolation { norm: sq.sqrt() });
    }
    Ok(())
}

/// Distance and its Euclidean gradients with respect to both endpoints.
///
/// With `alpha = 1 - ||u||^2`, `beta = 1 - ||v||^2` and `gamma` the arccosh
/// argument:
///
/// ```text
/// dd/du = 4 / (beta * sqrt(gamma^2 - 1))
///         * ((||v||^2 - 2<u,v> + 1) / alpha^2 * u - v / alpha)
/// ```
///
/// and symmetrically for v. At `gamma = 1` the distance is not
/// differentiable; both gradients are returned as zero, which makes a
/// coincident positive pair a no-op update rather than a NaN source.
pub fn distance_with_grads(
    u: ArrayView1<'_, f64>,
    v: ArrayView1<'_, f64>,
) -> (f64, Array1<f64>, Array1<f64>) {
    let u_sq = sq_norm(u);
    let v_sq = sq_norm(v);
    let alpha = 1.0 - u_sq;
    let beta = 1.0 - v_sq;
    let diff = &u - &v;
    let gamma = (1.0 + 2.0 * diff.dot(&diff) / (alpha * beta)).max(1.0);

    let denom_sq = gamma * gamma - 1.0;
    if denom_sq <= 0.0 {
        return (0.0, Array1::zeros(u.len()), Array1::zeros(v.len()));
    }
    let dist = gamma.acosh();
    let denom = denom_sq.sqrt();
    let dot_uv = u.dot(&v);

    let mut grad_u = u.to_owned();
    grad_u *= (v_sq - 2.0 * dot_uv + 1.0) / (alpha * alpha);
    grad_u.scaled_add(-1.0 / alpha, &v);
    grad_u *= 4.0 / (beta * denom);

    let mut grad_v = v.to_owned();
    grad_v *= (u_sq - 2.0 * dot_uv + 1.0) / (beta * beta);
    grad_v.scaled_add(-1.0 / beta, &u);
    grad_v *= 4.0 / (alpha * denom);

    (dist, grad_u, grad_v)
}

/// Conformal factor converting a Euclidean gradient at `x` into the
/// Riemannian one: `(1 - ||x||^2)^2 / 4`.
#[inline]
pub fn conformal_factor(x: ArrayView1<'_, f64>) -> f64 {
    let residual = 1.0 - sq_norm(x);
    residual * residual / 4.0
}
