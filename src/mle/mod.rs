//! mle — the maximum-likelihood estimation engine.
//!
//! Purpose
//! -------
//! Turn any [`Model`](crate::model::Model) into a fitted
//! [`Estimate`](estimate::Estimate): maximize its log-likelihood (or raw
//! density) over opaque data with one of three optimizer families, then
//! optionally attach a sandwich covariance estimated from the gradients
//! observed along the way.
//!
//! Key behaviors
//! -------------
//! - Maximization is performed by *minimizing* the cost `c(θ) = -f(θ)`
//!   built by [`objective::Objective`]; all user-facing values are reported
//!   back in log-likelihood space.
//! - Structured parameters flow through the flat pack/unpack bijection in
//!   [`crate::params`]; models never see the flat form.
//! - Missing capabilities degrade gracefully: no score -> numerical
//!   gradients ([`numgrad`]), no log-likelihood -> raw density, no
//!   constraint -> unconstrained search.
//! - Drivers advance their solver one step at a time, so a numerical
//!   failure yields a marked estimate rather than a lost run; only
//!   configuration errors abort.
//! - [`api::restart`] reruns from a previous estimate with scaled knobs and
//!   never returns a worse result.
//!
//! Conventions
//! -----------
//! - Tolerance and step size are interpreted per driver; see
//!   [`options::MleOptions`].
//! - Randomness (annealing only) comes from a seedable RNG in the options;
//!   a fixed seed makes runs reproducible.
//! - Errors bubble up as [`MleResult`](crate::errors::MleResult); the
//!   engine never intentionally panics.

pub mod api;
pub(crate) mod covariance;
pub(crate) mod drivers;
pub mod estimate;
pub(crate) mod numgrad;
pub mod objective;
pub mod options;
pub mod trace;
pub mod types;
pub(crate) mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{maximum_likelihood, restart};
pub use self::estimate::{Covariance, Estimate, EstimateStatus};
pub use self::options::{AnnealingSchedule, Method, MleOptions};
pub use self::trace::{PathPoint, PathTrace};
pub use self::types::{Cost, DIFFERENTIAL, Grad, RESTART_BOUND, Theta};
