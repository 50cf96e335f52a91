//! mle::covariance — sandwich (BHHH) covariance from the evaluation trace.
//!
//! Purpose
//! -------
//! Estimate the parameter covariance from the `(gradient, energy)` pairs the
//! drivers record while running: a weighted sum of score outer products,
//! scaled by the observation count, then inverted. The weights form a
//! softmax over the recorded energies, so evaluations near the optimum
//! dominate and early, far-from-optimal ones contribute almost nothing.
//!
//! Key behaviors
//! -------------
//! - Weight for sample `j`: `w_j = 1 / (1 + Σ_{k≠j} exp(E_k − E_j))`. The
//!   exponent differences keep the sum finite for any energy offset.
//! - Samples whose weight denominator overflows are skipped rather than
//!   poisoning the matrix.
//! - Inversion goes through `nalgebra::DMatrix::try_inverse`; a singular
//!   information matrix yields [`Covariance::Singular`], never a panic.
use nalgebra::DMatrix;
use ndarray::Array2;

use crate::mle::{estimate::Covariance, trace::EvalTrace};

/// Estimate the covariance matrix from a driver's evaluation trace.
///
/// `observations` scales the information matrix (per-observation scores sum
/// to the full-sample score); `None` leaves it unscaled. An empty trace
/// yields [`Covariance::Singular`].
pub(crate) fn estimate_covariance(
    trace: &EvalTrace, dim: usize, observations: Option<usize>, names: Option<Vec<String>>,
) -> Covariance {
    if trace.is_empty() || dim == 0 {
        return Covariance::Singular;
    }
    let energies = trace.energies();
    let n = energies.len();

    // Softmax denominators: 1 + sum over the other samples of exp(E_k - E_j).
    let mut denominators = vec![1.0_f64; n];
    for j in 0..n {
        for k in 0..n {
            if k != j {
                denominators[j] += (energies[k] - energies[j]).exp();
            }
        }
    }

    let mut info = Array2::<f64>::zeros((dim, dim));
    for (m, grad) in trace.gradients().iter().enumerate() {
        let denominator = denominators[m];
        if !denominator.is_finite() || grad.len() != dim {
            continue;
        }
        for j in 0..dim {
            for k in 0..dim {
                info[[j, k]] += grad[j] * grad[k] / denominator;
            }
        }
    }
    if let Some(rows) = observations {
        info *= rows as f64;
    }

    let dense = DMatrix::from_fn(dim, dim, |r, c| info[[r, c]]);
    match dense.try_inverse() {
        Some(inverse) => {
            let matrix = Array2::from_shape_fn((dim, dim), |(r, c)| inverse[(r, c)]);
            Covariance::Matrix { matrix, names }
        }
        None => Covariance::Singular,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr1;

    // Purpose: with a single recorded sample the estimator reduces to the
    // inverse outer product.
    // Given: one gradient [2] and no observation scaling.
    // Expect: information 4, covariance 1/4.
    #[test]
    fn single_sample_reduction() {
        let mut trace = EvalTrace::default();
        trace.record(&arr1(&[2.0]), -1.0);
        match estimate_covariance(&trace, 1, None, None) {
            Covariance::Matrix { matrix, .. } => {
                assert_relative_eq!(matrix[[0, 0]], 0.25);
            }
            other => panic!("expected a matrix, got {other:?}"),
        }
    }

    // Purpose: observation scaling divides the covariance by the row count.
    // Given: the same single sample with 10 observations.
    // Expect: covariance 1/40.
    #[test]
    fn observation_scaling() {
        let mut trace = EvalTrace::default();
        trace.record(&arr1(&[2.0]), -1.0);
        match estimate_covariance(&trace, 1, Some(10), None) {
            Covariance::Matrix { matrix, .. } => {
                assert_relative_eq!(matrix[[0, 0]], 0.025);
            }
            other => panic!("expected a matrix, got {other:?}"),
        }
    }

    // Purpose: high-energy samples dominate the softmax weighting.
    // Given: two 1-d samples whose energies differ by 200.
    // Expect: the result is numerically the high-energy sample's inverse
    // outer product; the other's weight underflows to zero.
    #[test]
    fn softmax_weighting_prefers_high_energy() {
        let mut trace = EvalTrace::default();
        trace.record(&arr1(&[100.0]), -201.0);
        trace.record(&arr1(&[2.0]), -1.0);
        match estimate_covariance(&trace, 1, None, None) {
            Covariance::Matrix { matrix, .. } => {
                assert_relative_eq!(matrix[[0, 0]], 0.25, max_relative = 1e-10);
            }
            other => panic!("expected a matrix, got {other:?}"),
        }
    }

    // Purpose: a singular information matrix is reported, not inverted.
    // Given: two 2-d samples with identical (hence rank-one) gradients.
    // Expect: Covariance::Singular.
    #[test]
    fn singular_information_matrix() {
        let mut trace = EvalTrace::default();
        trace.record(&arr1(&[1.0, 2.0]), -1.0);
        trace.record(&arr1(&[1.0, 2.0]), -1.0);
        assert_eq!(estimate_covariance(&trace, 2, None, None), Covariance::Singular);
    }

    // Purpose: an empty trace cannot produce a covariance.
    // Given: no recorded samples.
    // Expect: Covariance::Singular.
    #[test]
    fn empty_trace_is_singular() {
        let trace = EvalTrace::default();
        assert_eq!(estimate_covariance(&trace, 3, None, None), Covariance::Singular);
    }
}
