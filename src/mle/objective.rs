//! Adapter that exposes a user [`Model`] as an `argmin` problem.
//!
//! The engine *maximizes* an objective `f(θ)` (log-likelihood, or raw density
//! for models that only supply one) by minimizing the cost `c(θ) = -f(θ)`.
//! When the model's constraint binds, the cost becomes
//! `-f(feasible) + penalty`, so infeasible points are smoothly repelled while
//! the objective stays defined everywhere. Analytic scores are negated
//! accordingly; models without one fall back to the adaptive
//! central-difference gradient of `f`, likewise negated.
use std::sync::{Arc, OnceLock};

use argmin::core::{CostFunction, Error, Gradient};

use crate::{
    errors::{MleError, MleResult},
    mle::{
        numgrad::numerical_gradient,
        trace::PathTrace,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
    model::Model,
    params::{ParamSet, ParamShape},
};

/// Which evaluation capability the model turned out to have. Discovered on
/// the first successful evaluation and latched for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capability {
    /// The model supplies `log_likelihood`; energies are log-likelihoods.
    Likelihood,
    /// Only the raw `density` is available; the engine minimizes `-p` and
    /// reports `ln p` as the final log-likelihood.
    Density,
}

/// Bridges a user [`Model`] to `argmin`'s `CostFunction` and `Gradient`.
///
/// - `CostFunction::cost` returns `-f(θ)` plus the constraint penalty.
/// - `Gradient::gradient` returns `-∇f` at the feasibility-corrected point,
///   analytic when the model provides a score, numerical otherwise.
pub struct Objective<'a, M: Model> {
    model: &'a M,
    data: &'a M::Data,
    shape: ParamShape,
    use_constraint: bool,
    capability: Arc<OnceLock<Capability>>,
    path: Option<PathTrace>,
}

// Manual impl: a derive would demand `M: Clone` for no reason.
impl<'a, M: Model> Clone for Objective<'a, M> {
    fn clone(&self) -> Self {
        Objective {
            model: self.model,
            data: self.data,
            shape: self.shape,
            use_constraint: self.use_constraint,
            capability: Arc::clone(&self.capability),
            path: self.path.clone(),
        }
    }
}

impl<'a, M: Model> Objective<'a, M> {
    /// Construct an adapter over a model and its data.
    ///
    /// `use_constraint` disables the cost-side penalty for drivers that
    /// project trial points onto the feasible set themselves (annealing);
    /// gradient evaluation always corrects the point first.
    pub fn new(
        model: &'a M, data: &'a M::Data, shape: ParamShape, path: Option<PathTrace>,
        use_constraint: bool,
    ) -> Self {
        Objective {
            model,
            data,
            shape,
            use_constraint,
            capability: Arc::new(OnceLock::new()),
            path,
        }
    }

    /// Evaluate `f(θ)`: the log-likelihood, falling back to the raw density.
    ///
    /// # Errors
    /// [`MleError::MissingLikelihood`] when the model implements neither.
    fn raw_value(&self, params: &ParamSet) -> MleResult<f64> {
        match self.model.log_likelihood(params, self.data) {
            Ok(ll) => {
                let _ = self.capability.set(Capability::Likelihood);
                Ok(ll)
            }
            Err(MleError::LikelihoodNotImplemented) => {
                match self.model.density(params, self.data) {
                    Ok(p) => {
                        let _ = self.capability.set(Capability::Density);
                        Ok(p)
                    }
                    Err(MleError::LikelihoodNotImplemented) => Err(MleError::MissingLikelihood),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// `f` at a flat vector; re-unpacks so the model always sees structure.
    pub(crate) fn raw_value_flat(&self, theta: &Theta) -> MleResult<f64> {
        let params = ParamSet::unpack(theta, &self.shape)?;
        self.raw_value(&params)
    }

    /// Run the model's constraint, returning the evaluation point and the
    /// penalty (zero when feasible or when no constraint exists).
    fn constrained(&self, params: ParamSet) -> MleResult<(ParamSet, f64)> {
        let mut feasible = params.clone();
        match self.model.constraint(&params, &mut feasible, self.data) {
            Ok(penalty) if penalty > 0.0 => Ok((feasible, penalty)),
            Ok(_) => Ok((params, 0.0)),
            Err(MleError::ConstraintNotImplemented) => Ok((params, 0.0)),
            Err(e) => Err(e),
        }
    }

    /// The cost `c(θ)` the minimizers see. Records the evaluation on the
    /// path sink before the finiteness check, so failed points still show up
    /// in the trace.
    pub(crate) fn negated_cost(&self, theta: &Theta) -> MleResult<f64> {
        let params = ParamSet::unpack(theta, &self.shape)?;
        let cost = if self.use_constraint {
            let (eval, penalty) = self.constrained(params)?;
            -self.raw_value(&eval)? + penalty
        } else {
            -self.raw_value(&params)?
        };
        if let Some(path) = &self.path {
            path.record(theta, -cost);
        }
        if !cost.is_finite() {
            return Err(MleError::NonFiniteCost { value: cost });
        }
        Ok(cost)
    }

    /// The cost gradient `∇c(θ) = -∇f` at the feasibility-corrected point.
    pub(crate) fn negated_gradient(&self, theta: &Theta) -> MleResult<Grad> {
        let params = ParamSet::unpack(theta, &self.shape)?;
        let (eval, _) = self.constrained(params)?;
        let flat = eval.pack()?;
        let grad = match self.model.score(&eval, self.data) {
            Ok(g) => g,
            Err(MleError::ScoreNotImplemented) => {
                numerical_gradient(|t| self.raw_value_flat(t), &flat)?
            }
            Err(e) => return Err(e),
        };
        validate_grad(&grad, theta.len())?;
        Ok(-grad)
    }

    /// Map a cost back to energy (log-likelihood) space for trace recording:
    /// `-c` for likelihood models, `ln(-c)` for density-only models.
    pub(crate) fn energy(&self, cost: f64) -> f64 {
        match self.capability.get().copied().unwrap_or(Capability::Likelihood) {
            Capability::Likelihood => -cost,
            Capability::Density => (-cost).ln(),
        }
    }

    /// The log-likelihood reported on the final estimate. For density-only
    /// models this is the natural log of the density.
    pub(crate) fn final_log_likelihood(&self, params: &ParamSet) -> MleResult<f64> {
        let value = self.raw_value(params)?;
        match self.capability.get() {
            Some(Capability::Density) => Ok(value.ln()),
            _ => Ok(value),
        }
    }
}

impl<'a, M: Model> CostFunction for Objective<'a, M> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.negated_cost(theta)?)
    }
}

impl<'a, M: Model> Gradient for Objective<'a, M> {
    type Param = Theta;
    type Gradient = Grad;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        Ok(self.negated_gradient(theta)?)
    }
}
