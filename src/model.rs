//! model — the capability interface estimated models implement.
//!
//! Purpose
//! -------
//! A [`Model`] tells the engine how to evaluate itself on an opaque data
//! payload. Only [`Model::param_shape`] and one of
//! [`Model::log_likelihood`] / [`Model::density`] are mandatory; everything
//! else is an optional capability with a default body returning a sentinel
//! error that the engine matches on to select a fallback:
//!
//! - no `log_likelihood` -> the raw `density` is used (and the final reported
//!   value is its natural log);
//! - no `score` -> the numerical gradient engine;
//! - no `constraint` -> every point is treated as feasible.
//!
//! Conventions
//! -----------
//! - All evaluations receive a structured [`ParamSet`], never the flat
//!   optimizer vector.
//! - `constraint` returns the penalty magnitude (zero when feasible) and
//!   writes a corrected copy of the parameters into `feasible`.
//! - Invalid inputs are recoverable [`MleError`](crate::errors::MleError)
//!   values, not panics.
use crate::{
    errors::{MleError, MleResult},
    mle::types::Grad,
    params::{ParamSet, ParamShape},
};

/// A statistical model the engine can maximize.
pub trait Model {
    /// Opaque data payload the model evaluates against.
    type Data;

    /// Dimensions of this model's parameter set.
    fn param_shape(&self, data: &Self::Data) -> ParamShape;

    /// Log-likelihood `ℓ(θ)` of the data under `params`.
    ///
    /// Default: sentinel signaling the engine to fall back to [`Model::density`].
    fn log_likelihood(&self, _params: &ParamSet, _data: &Self::Data) -> MleResult<f64> {
        Err(MleError::LikelihoodNotImplemented)
    }

    /// Raw (non-log) density or likelihood of the data under `params`.
    ///
    /// Only consulted when [`Model::log_likelihood`] is not implemented.
    fn density(&self, _params: &ParamSet, _data: &Self::Data) -> MleResult<f64> {
        Err(MleError::LikelihoodNotImplemented)
    }

    /// Analytic score `∇ℓ(θ)`, flattened in pack order.
    ///
    /// Default: sentinel selecting the numerical gradient engine.
    fn score(&self, _params: &ParamSet, _data: &Self::Data) -> MleResult<Grad> {
        Err(MleError::ScoreNotImplemented)
    }

    /// Constraint check. Returns the penalty magnitude (zero when `params`
    /// is feasible) and, when binding, writes the nearest feasible point
    /// into `feasible`.
    fn constraint(
        &self, _params: &ParamSet, _feasible: &mut ParamSet, _data: &Self::Data,
    ) -> MleResult<f64> {
        Err(MleError::ConstraintNotImplemented)
    }

    /// Names for the flattened parameters, used to label covariance output.
    fn param_names(&self, _data: &Self::Data) -> Option<Vec<String>> {
        None
    }

    /// Observation count used to scale the information matrix. `None` leaves
    /// the matrix unscaled.
    fn observations(&self, _data: &Self::Data) -> Option<usize> {
        None
    }
}
