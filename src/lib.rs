//! maxlik — maximum-likelihood estimation for user-defined models.
//!
//! Purpose
//! -------
//! A generic maximum-likelihood engine: implement the [`model::Model`] trait
//! for your likelihood (and optionally its score, constraint, and raw
//! density), then call [`mle::maximum_likelihood`] to fit it with your
//! choice of optimizer family:
//!
//! - gradient methods (conjugate gradient with Fletcher–Reeves or
//!   Polak–Ribière updates, or L-BFGS),
//! - the derivative-free Nelder–Mead simplex,
//! - simulated annealing with a configurable cooling schedule.
//!
//! Every run returns an [`mle::Estimate`] carrying the fitted parameters,
//! the log-likelihood, a termination status, and (for gradient-family runs)
//! a sandwich covariance estimated from the scores observed along the way.
//! [`mle::restart`] polishes a previous estimate with tightened knobs, and
//! [`imputation::impute`] applies the engine to fill missing data cells
//! under a multivariate normal.
//!
//! Conventions
//! -----------
//! - Parameters are structured [`params::ParamSet`]s on the model side and
//!   flat `ndarray` vectors inside the optimizers; the engine owns the
//!   bijection.
//! - Missing model capabilities degrade gracefully (numerical gradients,
//!   density fallback) instead of failing.
//! - All fallible paths return [`errors::MleResult`]; the crate never
//!   intentionally panics outside of tests.

pub mod errors;
pub mod imputation;
pub mod mle;
pub mod model;
pub mod params;

// ---- Re-exports (primary public surface) ----------------------------------

pub use crate::errors::{MleError, MleResult};
pub use crate::imputation::impute;
pub use crate::mle::{
    AnnealingSchedule, Covariance, Estimate, EstimateStatus, Method, MleOptions, PathTrace,
    maximum_likelihood, restart,
};
pub use crate::model::Model;
pub use crate::params::{ParamSet, ParamShape};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use maxlik::prelude::*;
//
// to import the main estimation surface in a single line.

pub mod prelude {
    pub use crate::errors::{MleError, MleResult};
    pub use crate::mle::{
        Covariance, Estimate, EstimateStatus, Method, MleOptions, maximum_likelihood, restart,
    };
    pub use crate::model::Model;
    pub use crate::params::{ParamSet, ParamShape};
}
