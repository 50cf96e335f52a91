//! mle::options — run configuration: method selection, knobs, and the
//! annealing schedule.
//!
//! Purpose
//! -------
//! [`MleOptions`] is the single configuration object threaded through the
//! engine. It selects the [`Method`], carries the two shared numeric knobs
//! (step size and tolerance, whose interpretation is per-driver), the
//! annealing schedule, the RNG seed, verbosity, and the optional path sink.
//!
//! Conventions
//! -----------
//! - Tolerance means: gradient L2 norm threshold for the gradient family,
//!   simplex-spread threshold for Nelder–Mead; annealing ignores it.
//! - Step size means: initial simplex edge length for Nelder–Mead and the
//!   per-trial Manhattan displacement budget for annealing. The gradient
//!   family's line search chooses its own step, so there the knob only
//!   participates in restart scaling.
//! - Options are validated at the API boundary, so drivers can assume sane,
//!   finite knobs.
use std::str::FromStr;

use crate::{
    errors::{MleError, MleResult},
    mle::{
        trace::PathTrace,
        types::Theta,
        validation::{verify_step_size, verify_tolerance},
    },
};

/// The optimizer family (and, for conjugate gradient, the beta rule) to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Nelder–Mead simplex, derivative free.
    Simplex,
    /// Nonlinear conjugate gradient, Fletcher–Reeves beta rule. The default.
    ConjugateFletcherReeves,
    /// Nonlinear conjugate gradient, Polak–Ribière beta rule.
    ConjugatePolakRibiere,
    /// L-BFGS quasi-Newton.
    Bfgs,
    /// Simulated annealing.
    Annealing,
}

impl Default for Method {
    fn default() -> Self {
        Method::ConjugateFletcherReeves
    }
}

impl FromStr for Method {
    type Err = MleError;

    /// Parse a method name. Case-insensitive; separators are ignored, so
    /// `"fletcher-reeves"`, `"Fletcher Reeves"` and `"fletcherreeves"` all
    /// select the same method.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String =
            s.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>().to_lowercase();
        match normalized.as_str() {
            "simplex" | "neldermead" | "nm" => Ok(Method::Simplex),
            "cg" | "fr" | "fletcherreeves" | "conjugatefletcherreeves" => {
                Ok(Method::ConjugateFletcherReeves)
            }
            "pr" | "polakribiere" | "conjugatepolakribiere" => Ok(Method::ConjugatePolakRibiere),
            "bfgs" | "lbfgs" | "quasinewton" => Ok(Method::Bfgs),
            "annealing" | "anneal" | "siman" => Ok(Method::Annealing),
            _ => Err(MleError::InvalidParameter { text: format!("unknown method '{s}'") }),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::Simplex => "simplex",
            Method::ConjugateFletcherReeves => "fletcher-reeves",
            Method::ConjugatePolakRibiere => "polak-ribiere",
            Method::Bfgs => "bfgs",
            Method::Annealing => "annealing",
        };
        write!(f, "{name}")
    }
}

/// Cooling schedule for the annealing driver.
///
/// The temperature starts at `t_initial` and is divided by `cooling_rate`
/// after each batch of `iters_per_temp` trials, stopping once it drops to
/// `t_min`. `k` scales the Metropolis acceptance exponent. `n_tries` is the
/// trial fan-out per step kept for schedule compatibility; the driver visits
/// one candidate per trial regardless.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealingSchedule {
    pub n_tries: usize,
    pub iters_per_temp: usize,
    pub k: f64,
    pub t_initial: f64,
    pub cooling_rate: f64,
    pub t_min: f64,
}

impl Default for AnnealingSchedule {
    fn default() -> Self {
        AnnealingSchedule {
            n_tries: 200,
            iters_per_temp: 200,
            k: 1.0,
            t_initial: 50.0,
            cooling_rate: 1.002,
            t_min: 0.5,
        }
    }
}

impl AnnealingSchedule {
    /// Validate the schedule's internal consistency.
    ///
    /// # Errors
    /// [`MleError::InvalidSchedule`] naming the first violated condition.
    pub fn validate(&self) -> MleResult<()> {
        if self.iters_per_temp == 0 {
            return Err(MleError::InvalidSchedule {
                reason: "iters_per_temp must be at least 1",
            });
        }
        if !self.k.is_finite() || self.k <= 0.0 {
            return Err(MleError::InvalidSchedule {
                reason: "Boltzmann constant k must be finite and positive",
            });
        }
        if !self.t_min.is_finite() || self.t_min <= 0.0 {
            return Err(MleError::InvalidSchedule {
                reason: "t_min must be finite and positive",
            });
        }
        if !self.t_initial.is_finite() || self.t_initial <= self.t_min {
            return Err(MleError::InvalidSchedule {
                reason: "t_initial must be finite and greater than t_min",
            });
        }
        if !self.cooling_rate.is_finite() || self.cooling_rate <= 1.0 {
            return Err(MleError::InvalidSchedule {
                reason: "cooling_rate must be finite and greater than 1",
            });
        }
        Ok(())
    }
}

/// Configuration for one maximum-likelihood run.
#[derive(Debug, Clone)]
pub struct MleOptions {
    /// Optimizer family to use.
    pub method: Method,
    /// Starting point in flat (pack) order. `None` selects the per-driver
    /// default: all 0.1 for the gradient family, the origin for the simplex,
    /// all 1.0 for annealing.
    pub starting_point: Option<Theta>,
    /// Per-driver step knob (simplex edge, annealing displacement budget);
    /// see the module docs.
    pub step_size: f64,
    /// Per-driver convergence tolerance; see the module docs.
    pub tolerance: f64,
    /// Emit per-iteration progress on stderr.
    pub verbose: bool,
    /// Estimate the sandwich covariance after the run.
    pub want_covariance: bool,
    /// Cooling schedule; only consulted by the annealing driver.
    pub annealing: AnnealingSchedule,
    /// RNG seed for the annealing driver. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Optional sink recording every objective evaluation.
    pub path_trace: Option<PathTrace>,
}

impl Default for MleOptions {
    fn default() -> Self {
        MleOptions {
            method: Method::default(),
            starting_point: None,
            step_size: 1.0,
            tolerance: 1e-3,
            verbose: false,
            want_covariance: true,
            annealing: AnnealingSchedule::default(),
            seed: None,
            path_trace: None,
        }
    }
}

impl MleOptions {
    /// Construct options with the given method and knobs, validated.
    ///
    /// # Errors
    /// Propagates the step-size, tolerance, and schedule validation errors.
    pub fn new(method: Method, step_size: f64, tolerance: f64) -> MleResult<Self> {
        let opts = MleOptions { method, step_size, tolerance, ..MleOptions::default() };
        opts.validate()?;
        Ok(opts)
    }

    /// Re-check all numeric knobs. Called at the API boundary so that field
    /// edits after construction cannot smuggle in degenerate values.
    pub fn validate(&self) -> MleResult<()> {
        verify_step_size(self.step_size)?;
        verify_tolerance(self.tolerance)?;
        if self.method == Method::Annealing {
            self.annealing.validate()?;
        }
        Ok(())
    }
}
