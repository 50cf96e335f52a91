//! mle::api — the user-facing entry points.
//!
//! [`maximum_likelihood`] validates the options, sizes the problem from the
//! model's parameter shape, and dispatches to the driver selected by
//! [`Method`]. [`restart`] is the polishing controller layered on top: rerun
//! from a previous estimate with tightened knobs and keep whichever result
//! is better.
use crate::{
    errors::{MleError, MleResult},
    mle::{
        drivers::{anneal::run_annealing, gradient::run_gradient, simplex::run_simplex},
        estimate::Estimate,
        options::{Method, MleOptions},
        types::RESTART_BOUND,
        validation::is_bounded,
    },
    model::Model,
};

/// Maximize a model's likelihood over its data.
///
/// Dispatches on `opts.method`; every driver returns an [`Estimate`] even
/// when it stops early, with the status recording how it terminated.
///
/// # Errors
/// - Option validation errors for degenerate knobs.
/// - [`MleError::EmptyParamShape`] when the model reports zero parameters.
/// - [`MleError::MissingLikelihood`] when the model implements neither
///   `log_likelihood` nor `density` (detected on the first evaluation).
pub fn maximum_likelihood<M: Model>(
    model: &M, data: &M::Data, opts: &MleOptions,
) -> MleResult<Estimate> {
    opts.validate()?;
    let shape = model.param_shape(data);
    if shape.is_empty() {
        return Err(MleError::EmptyParamShape);
    }
    match opts.method {
        Method::Annealing => run_annealing(model, data, &shape, opts),
        Method::Simplex => run_simplex(model, data, &shape, opts),
        Method::ConjugateFletcherReeves | Method::ConjugatePolakRibiere | Method::Bfgs => {
            run_gradient(model, data, &shape, opts)
        }
    }
}

/// Rerun an estimation from a previous result with scaled-down knobs,
/// keeping whichever estimate is better.
///
/// The prior estimate's parameters become the new starting point when they
/// are bounded (all finite, within `±1e4`); an estimate that wandered off
/// keeps the original starting point instead. Tolerance and step size are
/// both multiplied by `scale` (typically well below 1), and `new_method`
/// optionally switches driver families. The fresh run replaces the prior
/// only when its parameters are bounded **and** its log-likelihood is
/// strictly better; exactly one estimate is returned either way.
///
/// # Errors
/// - [`MleError::InvalidScale`] for a non-finite or non-positive `scale`.
/// - Whatever [`maximum_likelihood`] raises for the rerun.
pub fn restart<M: Model>(
    model: &M, data: &M::Data, prior: Estimate, new_method: Option<Method>, scale: f64,
) -> MleResult<Estimate> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(MleError::InvalidScale {
            scale,
            reason: "Scale must be finite and positive.",
        });
    }
    let mut opts = prior.options.clone();
    if let Ok(flat) = prior.params.pack() {
        if is_bounded(&flat, RESTART_BOUND) {
            opts.starting_point = Some(flat);
        }
    }
    opts.tolerance *= scale;
    opts.step_size *= scale;
    if let Some(method) = new_method {
        opts.method = method;
    }

    let fresh = maximum_likelihood(model, data, &opts)?;
    let keep_fresh = match fresh.params.pack() {
        Ok(flat) => {
            is_bounded(&flat, RESTART_BOUND) && fresh.log_likelihood > prior.log_likelihood
        }
        Err(_) => false,
    };
    if keep_fresh { Ok(fresh) } else { Ok(prior) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mle::types::Grad,
        params::{ParamSet, ParamShape},
    };
    use approx::assert_relative_eq;
    use ndarray::arr1;

    /// Concave quadratic with maximum at 4.
    struct Quadratic;

    impl Model for Quadratic {
        type Data = ();

        fn param_shape(&self, _data: &()) -> ParamShape {
            ParamShape::vector(1)
        }

        fn log_likelihood(&self, params: &ParamSet, _data: &()) -> MleResult<f64> {
            let x = params.vector()?[0];
            Ok(-(x - 4.0).powi(2))
        }

        fn score(&self, params: &ParamSet, _data: &()) -> MleResult<Grad> {
            let x = params.vector()?[0];
            Ok(arr1(&[-2.0 * (x - 4.0)]))
        }
    }

    struct Empty;

    impl Model for Empty {
        type Data = ();

        fn param_shape(&self, _data: &()) -> ParamShape {
            ParamShape { vector_len: 0, rows: 0, cols: 0 }
        }
    }

    // Purpose: the dispatcher rejects a zero-parameter model up front.
    // Given: a model whose shape is empty.
    // Expect: EmptyParamShape before any evaluation.
    #[test]
    fn empty_shape_is_rejected() {
        let err = maximum_likelihood(&Empty, &(), &MleOptions::default()).unwrap_err();
        assert_eq!(err, MleError::EmptyParamShape);
    }

    // Purpose: a restart never loses ground.
    // Given: a converged run followed by a restart at scale 0.1.
    // Expect: the returned log-likelihood is at least the prior's, and the
    // parameters stay at the optimum.
    #[test]
    fn restart_is_monotone() {
        let opts = MleOptions::default();
        let first = maximum_likelihood(&Quadratic, &(), &opts).unwrap();
        let prior_ll = first.log_likelihood;
        let second = restart(&Quadratic, &(), first, None, 0.1).unwrap();
        assert!(second.log_likelihood >= prior_ll);
        assert_relative_eq!(second.params.vector().unwrap()[0], 4.0, epsilon = 1e-2);
    }

    // Purpose: restart can switch driver families.
    // Given: a gradient-family prior restarted with the simplex method.
    // Expect: a valid estimate near the optimum either way.
    #[test]
    fn restart_with_method_switch() {
        let first = maximum_likelihood(&Quadratic, &(), &MleOptions::default()).unwrap();
        let second = restart(&Quadratic, &(), first, Some(Method::Simplex), 0.5).unwrap();
        assert_relative_eq!(second.params.vector().unwrap()[0], 4.0, epsilon = 1e-2);
    }

    // Purpose: a degenerate scale is rejected.
    // Given: scale = 0.
    // Expect: InvalidScale.
    #[test]
    fn zero_scale_is_rejected() {
        let first = maximum_likelihood(&Quadratic, &(), &MleOptions::default()).unwrap();
        assert!(matches!(
            restart(&Quadratic, &(), first, None, 0.0),
            Err(MleError::InvalidScale { .. })
        ));
    }
}
