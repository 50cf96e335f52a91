//! Validation helpers for the maximum-likelihood drivers.
//!
//! Centralizes the consistency checks shared by the drivers and the
//! objective adapter:
//!
//! - **Option checks**: [`verify_tolerance`], [`verify_step_size`] ensure the
//!   numeric knobs are finite and strictly positive.
//! - **Gradient validation**: [`validate_grad`] enforces correct dimension
//!   and finite entries.
//! - **Starting points**: [`validate_start`] checks length and finiteness of
//!   a caller-supplied starting vector.
//! - **Boundedness**: [`is_bounded`] is the restart controller's test for an
//!   estimate that has wandered off toward infinity.
use crate::{
    errors::{MleError, MleResult},
    mle::types::{Grad, Theta},
};

/// Validate a convergence tolerance: finite and strictly positive.
///
/// # Errors
/// Returns [`MleError::InvalidTolerance`] if the value is non-finite or ≤ 0.0.
pub fn verify_tolerance(tol: f64) -> MleResult<()> {
    if !tol.is_finite() {
        return Err(MleError::InvalidTolerance { tol, reason: "Tolerance must be finite." });
    }
    if tol <= 0.0 {
        return Err(MleError::InvalidTolerance { tol, reason: "Tolerance must be positive." });
    }
    Ok(())
}

/// Validate a step size: finite and strictly positive.
///
/// # Errors
/// Returns [`MleError::InvalidStepSize`] if the value is non-finite or ≤ 0.0.
pub fn verify_step_size(step: f64) -> MleResult<()> {
    if !step.is_finite() {
        return Err(MleError::InvalidStepSize { step, reason: "Step size must be finite." });
    }
    if step <= 0.0 {
        return Err(MleError::InvalidStepSize { step, reason: "Step size must be positive." });
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`MleError::GradientDimMismatch`] if length does not match `dim`.
/// - [`MleError::InvalidGradient`] with the index/value of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> MleResult<()> {
    if grad.len() != dim {
        return Err(MleError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(MleError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate a starting point against the expected dimension and finiteness.
///
/// # Errors
/// - [`MleError::StartingPointDimMismatch`] on a length mismatch.
/// - [`MleError::InvalidStartingPoint`] on the first non-finite entry.
pub fn validate_start(start: &Theta, dim: usize) -> MleResult<()> {
    if start.len() != dim {
        return Err(MleError::StartingPointDimMismatch { expected: dim, found: start.len() });
    }
    for (index, &value) in start.iter().enumerate() {
        if !value.is_finite() {
            return Err(MleError::InvalidStartingPoint { index, value });
        }
    }
    Ok(())
}

/// True when every entry of `theta` is finite and within `±bound`.
pub fn is_bounded(theta: &Theta, bound: f64) -> bool {
    theta.iter().all(|v| v.is_finite() && v.abs() <= bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    // Purpose: tolerance and step-size checks reject the degenerate values.
    // Given: zero, negative, and NaN inputs.
    // Expect: each yields the matching error variant; a sane value passes.
    #[test]
    fn option_checks_reject_degenerate_values() {
        assert!(verify_tolerance(1e-3).is_ok());
        assert!(matches!(verify_tolerance(0.0), Err(MleError::InvalidTolerance { .. })));
        assert!(matches!(verify_tolerance(f64::NAN), Err(MleError::InvalidTolerance { .. })));
        assert!(verify_step_size(0.05).is_ok());
        assert!(matches!(verify_step_size(-1.0), Err(MleError::InvalidStepSize { .. })));
    }

    // Purpose: gradient validation reports dimension and finiteness faults.
    // Given: a short gradient and one with a NaN entry.
    // Expect: GradientDimMismatch, then InvalidGradient at the NaN index.
    #[test]
    fn gradient_validation() {
        let short = arr1(&[1.0]);
        assert!(matches!(
            validate_grad(&short, 2),
            Err(MleError::GradientDimMismatch { expected: 2, found: 1 })
        ));
        let bad = arr1(&[1.0, f64::NAN]);
        assert!(matches!(
            validate_grad(&bad, 2),
            Err(MleError::InvalidGradient { index: 1, .. })
        ));
    }

    // Purpose: boundedness test used by the restart controller.
    // Given: vectors inside, outside, and with non-finite entries.
    // Expect: only the fully finite, in-range vector is bounded.
    #[test]
    fn boundedness() {
        assert!(is_bounded(&arr1(&[3.0, -9999.0]), 1e4));
        assert!(!is_bounded(&arr1(&[3.0, 1.1e4]), 1e4));
        assert!(!is_bounded(&arr1(&[f64::INFINITY]), 1e4));
    }
}
