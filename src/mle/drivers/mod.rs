//! mle::drivers — the three optimizer families.
//!
//! Purpose
//! -------
//! One submodule per family, all built on the same skeleton: construct an
//! [`Objective`](crate::mle::objective::Objective), step the underlying
//! solver one iteration at a time, record `(gradient, energy)` samples for
//! the covariance estimator, and assemble an
//! [`Estimate`](crate::mle::estimate::Estimate) whatever happens.
//!
//! - [`gradient`]: conjugate gradient (Fletcher–Reeves / Polak–Ribière) and
//!   L-BFGS, converging on the gradient L2 norm.
//! - [`simplex`]: Nelder–Mead, converging on the simplex spread.
//! - [`anneal`]: simulated annealing with a cooling schedule and Metropolis
//!   acceptance.
//!
//! Key behaviors
//! -------------
//! - The engine owns the iteration loop, so a numerically failed solver step
//!   still produces an estimate: the last visited point with
//!   `NumericalFailure` status.
//! - Every driver returns through [`finish_estimate`], which unpacks the
//!   flat vector, re-attaches parameter names, evaluates the final
//!   log-likelihood through the model, and runs the covariance estimator
//!   when requested.
use crate::{
    errors::MleResult,
    mle::{
        covariance::estimate_covariance,
        estimate::{Covariance, Estimate, EstimateStatus},
        objective::Objective,
        options::MleOptions,
        trace::EvalTrace,
        types::Theta,
    },
    model::Model,
    params::{ParamSet, ParamShape},
};

pub(crate) mod anneal;
pub(crate) mod gradient;
pub(crate) mod simplex;

/// Assemble the final [`Estimate`] shared by all drivers.
///
/// `trace` is `None` for drivers that record no gradient samples; a
/// requested covariance then reports [`Covariance::Unsupported`]. The final
/// log-likelihood is re-evaluated through the model at the returned point;
/// if that evaluation fails (possible after a numerical failure), the
/// estimate carries NaN rather than aborting the run.
pub(crate) fn finish_estimate<M: Model>(
    model: &M, data: &M::Data, objective: &Objective<'_, M>, shape: &ParamShape,
    final_theta: &Theta, status: EstimateStatus, trace: Option<&EvalTrace>, opts: &MleOptions,
) -> MleResult<Estimate> {
    let params =
        ParamSet::unpack(final_theta, shape)?.with_names(model.param_names(data));
    let log_likelihood = match objective.final_log_likelihood(&params) {
        Ok(value) => value,
        Err(_) => f64::NAN,
    };
    let covariance = if opts.want_covariance {
        Some(match trace {
            Some(t) => estimate_covariance(
                t,
                shape.len(),
                model.observations(data),
                params.names.clone(),
            ),
            None => Covariance::Unsupported,
        })
    } else {
        None
    };
    Ok(Estimate { params, log_likelihood, status, covariance, options: opts.clone() })
}
