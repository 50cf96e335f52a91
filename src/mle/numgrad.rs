//! mle::numgrad — adaptive central-difference gradients.
//!
//! Purpose
//! -------
//! Supplies the derivative fallback for models without an analytic score.
//! Each coordinate is differentiated independently with a five-point central
//! difference: a 3-point estimate at `±h` and a Richardson-style 5-point
//! refinement using `±h/2`, with truncation and rounding error estimates.
//! When the rounding error dominates the truncation error, one refinement
//! round re-evaluates at an error-balancing step.
//!
//! Conventions
//! -----------
//! - The base step is the documented engine constant
//!   [`DIFFERENTIAL`](crate::mle::types::DIFFERENTIAL) = 1e-5.
//! - The objective closure receives a full flat vector with one coordinate
//!   perturbed, so the model always sees a structurally valid parameter set.
//! - Evaluation errors abort the whole gradient; there is no partial result.
use ndarray::Array1;

use crate::{
    errors::MleResult,
    mle::types::{DIFFERENTIAL, Grad, Theta},
};

/// 3-point + 5-point central difference of `g` at `x` with step `h`.
///
/// Returns `(derivative, truncation_error, rounding_error)`.
fn central_deriv<G>(g: &G, x: f64, h: f64) -> MleResult<(f64, f64, f64)>
where
    G: Fn(f64) -> MleResult<f64>,
{
    let fm1 = g(x - h)?;
    let fp1 = g(x + h)?;
    let fmh = g(x - h / 2.0)?;
    let fph = g(x + h / 2.0)?;

    let r3 = 0.5 * (fp1 - fm1);
    let r5 = (4.0 / 3.0) * (fph - fmh) - (1.0 / 3.0) * r3;
    let e3 = (fp1.abs() + fm1.abs()) * f64::EPSILON;
    let e5 = 2.0 * (fph.abs() + fmh.abs()) * f64::EPSILON + e3;

    // Rounding contribution from representing x + h, significant when x and
    // h differ in magnitude.
    let dy = (r3 / h).abs().max((r5 / h).abs()) * (x / h).abs() * f64::EPSILON;

    let truncation = ((r5 - r3) / h).abs();
    let rounding = (e5 / h).abs() + dy;
    Ok((r5 / h, truncation, rounding))
}

/// Adaptive central derivative of a one-dimensional function at `x`.
///
/// Starts at [`DIFFERENTIAL`] and, when the rounding error dominates,
/// retries once at the error-balancing step, keeping the refined value only
/// when it is both more accurate and consistent with the first estimate.
///
/// # Errors
/// Propagates any evaluation error from `g`.
pub(crate) fn central_derivative<G>(g: &G, x: f64) -> MleResult<f64>
where
    G: Fn(f64) -> MleResult<f64>,
{
    let h = DIFFERENTIAL;
    let (mut result, truncation, rounding) = central_deriv(g, x, h)?;
    let error = truncation + rounding;

    if rounding < truncation && rounding > 0.0 && truncation > 0.0 {
        let h_opt = h * (rounding / (2.0 * truncation)).powf(1.0 / 3.0);
        let (r_opt, trunc_opt, round_opt) = central_deriv(g, x, h_opt)?;
        let error_opt = trunc_opt + round_opt;
        if error_opt < error && (r_opt - result).abs() < 4.0 * error {
            result = r_opt;
        }
    }
    Ok(result)
}

/// Numerical gradient of `f` at `theta`, one adaptive central difference per
/// coordinate.
///
/// # Errors
/// Propagates the first evaluation error from `f`.
pub(crate) fn numerical_gradient<F>(f: F, theta: &Theta) -> MleResult<Grad>
where
    F: Fn(&Theta) -> MleResult<f64>,
{
    let mut grad = Array1::zeros(theta.len());
    for j in 0..theta.len() {
        let one_d = |b: f64| -> MleResult<f64> {
            let mut shifted = theta.clone();
            shifted[j] = b;
            f(&shifted)
        };
        grad[j] = central_derivative(&one_d, theta[j])?;
    }
    Ok(grad)
}
