//! mle::types — shared numeric aliases, engine constants, and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the core numeric types, solver aliases, and hard-coded engine
//! constants used by the maximum-likelihood drivers. The rest of the engine
//! imports these instead of spelling out `ndarray` and Argmin generics.
//!
//! Key behaviors
//! -------------
//! - Canonical aliases for flat parameter vectors, gradients, and scalar
//!   costs (`Theta`, `Grad`, `Cost`).
//! - Pre-wired solver aliases over the common `(Theta, Grad, Cost)` shapes:
//!   nonlinear conjugate gradient (Fletcher–Reeves and Polak–Ribière beta
//!   rules), L-BFGS, and Nelder–Mead, all on a More–Thuente line search
//!   where one applies.
//! - Engine constants: iteration caps, the numerical-derivative base step,
//!   and the restart boundedness limit.
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` are flat vectors in pack order (ordered component
//!   first, then the matrix row-major); length equals the number of free
//!   parameters.
//! - `Cost` is always `c(θ) = -f(θ)` where `f` is the log-likelihood or raw
//!   density; higher layers own the sign flips back to likelihood space.
use argmin::solver::{
    conjugategradient::{
        NonlinearConjugateGradient,
        beta::{FletcherReeves, PolakRibiere},
    },
    linesearch::MoreThuenteLineSearch,
    neldermead::NelderMead,
    quasinewton::LBFGS,
};
use ndarray::Array1;

/// Flat parameter vector `θ` in pack order.
pub type Theta = Array1<f64>;

/// Gradient vector `∇c(θ)`, matching the shape of `Theta`.
pub type Grad = Array1<f64>;

/// Scalar objective value: the cost `c(θ) = -f(θ)`.
pub type Cost = f64;

/// Base step for the adaptive central-difference derivative.
pub const DIFFERENTIAL: f64 = 1e-5;

/// Iteration cap for derivative-free drivers.
pub const MAX_ITERATIONS: u64 = 5_000;

/// Iteration cap for derivative-based drivers.
pub const MAX_ITERATIONS_W_D: u64 = 5_000;

/// Parameter magnitude beyond which a restart treats an estimate as having
/// wandered off to infinity.
pub const RESTART_BOUND: f64 = 1e4;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// More–Thuente line search specialized to this crate's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// Conjugate gradient with the Fletcher–Reeves beta rule.
pub type CgFletcherReeves = NonlinearConjugateGradient<Theta, MoreThuenteLS, FletcherReeves, Cost>;

/// Conjugate gradient with the Polak–Ribière beta rule.
pub type CgPolakRibiere = NonlinearConjugateGradient<Theta, MoreThuenteLS, PolakRibiere, Cost>;

/// L-BFGS quasi-Newton solver on the More–Thuente line search.
pub type QuasiNewton = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;

/// Nelder–Mead simplex solver over flat parameter vectors.
pub type Simplex = NelderMead<Theta, Cost>;
