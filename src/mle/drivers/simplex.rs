//! Derivative-free driver: Nelder–Mead over the flat parameter space.
//!
//! The initial simplex has one vertex at the starting point (the origin when
//! none is configured) and one more per dimension, offset by the step size
//! along that axis. Convergence is the solver's own simplex-spread test at
//! the configured tolerance; the iteration cap and failure recovery follow
//! the same rules as the gradient driver. No gradient trace is recorded, so
//! a requested covariance reports `Unsupported`.
use argmin::{
    core::{IterState, Problem, Solver, State, TerminationStatus},
    solver::neldermead::NelderMead,
};
use ndarray::Array1;

use crate::{
    errors::MleResult,
    mle::{
        drivers::finish_estimate,
        estimate::{Estimate, EstimateStatus},
        objective::Objective,
        options::MleOptions,
        types::{MAX_ITERATIONS, Theta},
        validation::validate_start,
    },
    model::Model,
    params::ParamShape,
};

/// Run a Nelder–Mead estimation.
pub(crate) fn run_simplex<M: Model>(
    model: &M, data: &M::Data, shape: &ParamShape, opts: &MleOptions,
) -> MleResult<Estimate> {
    let dim = shape.len();
    let theta0 = match &opts.starting_point {
        Some(start) => {
            validate_start(start, dim)?;
            start.clone()
        }
        None => Array1::zeros(dim),
    };
    let objective = Objective::new(model, data, *shape, opts.path_trace.clone(), true);

    // Starting vertex plus one step-size offset per axis.
    let mut vertices = Vec::with_capacity(dim + 1);
    vertices.push(theta0.clone());
    for j in 0..dim {
        let mut vertex = theta0.clone();
        vertex[j] += opts.step_size;
        vertices.push(vertex);
    }
    // NelderMead's own init unwraps the vertex costs internally, so evaluate
    // them here first and surface configuration errors to the caller.
    for vertex in &vertices {
        objective.negated_cost(vertex)?;
    }
    let mut solver: NelderMead<Theta, f64> =
        NelderMead::new(vertices).with_sd_tolerance(opts.tolerance)?;

    let mut problem = Problem::new(objective.clone());
    let init_state: IterState<Theta, (), (), (), (), f64> = IterState::new();
    let (mut state, _) = solver.init(&mut problem, init_state)?;
    let mut current = state.get_param().cloned().unwrap_or(theta0);

    let mut status = EstimateStatus::MaxIterationsExceeded;
    for iter in 0..MAX_ITERATIONS {
        state = match solver.next_iter(&mut problem, state) {
            Ok((next, _)) => next,
            Err(err) => {
                if opts.verbose {
                    eprintln!("iter {iter}: step failed, stopping: {err}");
                }
                status = EstimateStatus::NumericalFailure;
                break;
            }
        };
        if let Some(param) = state.get_param() {
            current = param.clone();
        }
        if opts.verbose {
            eprintln!("iter {:4}: f() = {:>12.6}", iter + 1, objective.energy(state.get_cost()));
        }
        let termination = Solver::<Objective<'_, M>, _>::terminate(&mut solver, &state);
        if matches!(termination, TerminationStatus::Terminated(_)) {
            status = EstimateStatus::Converged;
            break;
        }
    }
    finish_estimate(model, data, &objective, shape, &current, status, None, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::MleError,
        mle::{estimate::Covariance, options::Method},
        params::ParamSet,
    };
    use approx::assert_relative_eq;

    /// Concave quadratic with maximum at (2, 0.5); no derivatives supplied.
    struct Quadratic;

    impl Model for Quadratic {
        type Data = ();

        fn param_shape(&self, _data: &()) -> ParamShape {
            ParamShape::vector(2)
        }

        fn log_likelihood(&self, params: &ParamSet, _data: &()) -> MleResult<f64> {
            let v = params.vector()?;
            Ok(-(v[0] - 2.0).powi(2) - 3.0 * (v[1] - 0.5).powi(2))
        }
    }

    struct NoLikelihood;

    impl Model for NoLikelihood {
        type Data = ();

        fn param_shape(&self, _data: &()) -> ParamShape {
            ParamShape::vector(1)
        }
    }

    // Purpose: the simplex driver maximizes a smooth surface without any
    // derivative information.
    // Given: the quadratic, default origin start, step size 1, tolerance 1e-8.
    // Expect: convergence within 1e-2 of (2, 0.5).
    #[test]
    fn simplex_converges() {
        let opts = MleOptions {
            method: Method::Simplex,
            tolerance: 1e-8,
            ..MleOptions::default()
        };
        let est = run_simplex(&Quadratic, &(), &ParamShape::vector(2), &opts).unwrap();
        assert!(est.converged());
        let v = est.params.vector().unwrap();
        assert_relative_eq!(v[0], 2.0, epsilon = 1e-2);
        assert_relative_eq!(v[1], 0.5, epsilon = 1e-2);
    }

    // Purpose: requesting a covariance from a derivative-free run is answered
    // explicitly rather than silently omitted.
    // Given: want_covariance = true (the default) on a simplex run.
    // Expect: Covariance::Unsupported.
    #[test]
    fn covariance_is_unsupported() {
        let opts = MleOptions { method: Method::Simplex, ..MleOptions::default() };
        let est = run_simplex(&Quadratic, &(), &ParamShape::vector(2), &opts).unwrap();
        assert_eq!(est.covariance, Some(Covariance::Unsupported));
    }

    // Purpose: a model with no evaluation capability fails before iterating.
    // Given: a model implementing neither log_likelihood nor density.
    // Expect: Err(MissingLikelihood) from the driver, not an estimate.
    #[test]
    fn missing_likelihood_is_fatal() {
        let opts = MleOptions { method: Method::Simplex, ..MleOptions::default() };
        let err = run_simplex(&NoLikelihood, &(), &ParamShape::vector(1), &opts).unwrap_err();
        assert_eq!(err, MleError::MissingLikelihood);
    }
}
