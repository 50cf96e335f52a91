//! mle::estimate — the result type returned by every driver.
use crate::{mle::options::MleOptions, params::ParamSet};

/// How a driver run terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateStatus {
    /// The driver's convergence test fired.
    Converged,
    /// The iteration cap was reached first.
    MaxIterationsExceeded,
    /// A solver step failed numerically; the parameters are the last point
    /// visited before the failure.
    NumericalFailure,
}

impl EstimateStatus {
    /// Numeric status code: 0 for success, nonzero otherwise.
    pub fn code(&self) -> i32 {
        match self {
            EstimateStatus::Converged => 0,
            EstimateStatus::MaxIterationsExceeded => 1,
            EstimateStatus::NumericalFailure => 2,
        }
    }
}

/// Covariance output of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Covariance {
    /// The inverted sandwich information matrix, with optional row/column
    /// names taken from the model's parameter names.
    Matrix {
        matrix: ndarray::Array2<f64>,
        names: Option<Vec<String>>,
    },
    /// The information matrix was singular (or the evaluation trace empty).
    Singular,
    /// The chosen driver records no gradient trace (Nelder–Mead).
    Unsupported,
}

/// A completed maximum-likelihood run.
///
/// Always carries the best parameters the driver reached, even on
/// non-converged or numerically failed runs; check [`Estimate::converged`]
/// or the status before trusting them.
#[derive(Debug, Clone)]
pub struct Estimate {
    /// Estimated parameters in structured form, names attached when the
    /// model provides them.
    pub params: ParamSet,
    /// Log-likelihood at `params` (natural log of the density for
    /// density-only models).
    pub log_likelihood: f64,
    /// Termination status.
    pub status: EstimateStatus,
    /// Covariance estimate; `None` when not requested.
    pub covariance: Option<Covariance>,
    /// The options the run used, kept for restarts.
    pub options: MleOptions,
}

impl Estimate {
    /// True when the run converged.
    pub fn converged(&self) -> bool {
        self.status == EstimateStatus::Converged
    }

    /// Numeric status code: 0 for success, nonzero otherwise.
    pub fn status_code(&self) -> i32 {
        self.status.code()
    }
}
