//! Simulated-annealing driver.
//!
//! A hand-rolled cooling loop: the temperature starts at `t_initial` and is
//! divided by `cooling_rate` after each batch of `iters_per_temp` trials,
//! stopping at `t_min`. Each trial perturbs the current point with a
//! Manhattan-budgeted random step, projects it onto the feasible set when
//! the model has a constraint, and accepts it by the Metropolis rule
//! `exp(-(Δc)/(k·t))`. Infeasible-direction evaluations that come back
//! non-finite are treated as infinitely bad trials and rejected, never
//! surfaced.
//!
//! The objective's own constraint penalty is disabled here; projection owns
//! feasibility. The best point seen is tracked alongside the current one and
//! preferred when the cooling loop finishes.
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    errors::{MleError, MleResult},
    mle::{
        drivers::finish_estimate,
        estimate::{Estimate, EstimateStatus},
        objective::Objective,
        options::MleOptions,
        trace::EvalTrace,
        types::Theta,
        validation::validate_start,
    },
    model::Model,
    params::{ParamSet, ParamShape},
};

/// Default starting point for annealing when none is configured.
const DEFAULT_START: f64 = 1.0;

/// Perturb every coordinate once in random order. Each visit spends a
/// uniform fraction of the remaining displacement budget (with random sign)
/// and the budget keeps only what is left, so the total Manhattan
/// displacement never exceeds `step_size`.
fn take_step(theta: &mut Theta, step_size: f64, rng: &mut StdRng) {
    let mut order: Vec<usize> = (0..theta.len()).collect();
    order.shuffle(rng);
    let mut budget = step_size;
    for &dim in &order {
        let sign = if rng.gen::<f64>() > 0.5 { 1.0 } else { -1.0 };
        let fraction = rng.gen::<f64>();
        theta[dim] += fraction * budget * sign;
        budget *= 1.0 - fraction;
    }
}

/// Manhattan distance between two flat parameter vectors. Diagnostics only.
fn manhattan(a: &Theta, b: &Theta) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

/// Project a flat point onto the model's feasible set. Identity when the
/// model has no constraint or the point is already feasible.
fn project<M: Model>(
    model: &M, data: &M::Data, shape: &ParamShape, theta: Theta,
) -> MleResult<Theta> {
    let params = ParamSet::unpack(&theta, shape)?;
    let mut feasible = params.clone();
    match model.constraint(&params, &mut feasible, data) {
        Ok(penalty) if penalty > 0.0 => feasible.pack(),
        Ok(_) => Ok(theta),
        Err(MleError::ConstraintNotImplemented) => Ok(theta),
        Err(e) => Err(e),
    }
}

/// Evaluate a trial point in cost space. Non-finite objectives become an
/// infinitely bad (hence never accepted) trial instead of an error. When
/// covariance is wanted, the `(gradient, energy)` pair is recorded for every
/// evaluation, accepted or not.
fn trial_cost<M: Model>(
    objective: &Objective<'_, M>, theta: &Theta, want_covariance: bool, trace: &mut EvalTrace,
) -> MleResult<f64> {
    let cost = match objective.negated_cost(theta) {
        Ok(c) => c,
        Err(MleError::NonFiniteCost { .. }) => return Ok(f64::INFINITY),
        Err(e) => return Err(e),
    };
    if want_covariance {
        // A failed gradient only costs the trace one sample.
        if let Ok(grad) = objective.negated_gradient(theta) {
            trace.record(&grad, objective.energy(cost));
        }
    }
    Ok(cost)
}

/// Run a simulated-annealing estimation.
pub(crate) fn run_annealing<M: Model>(
    model: &M, data: &M::Data, shape: &ParamShape, opts: &MleOptions,
) -> MleResult<Estimate> {
    let dim = shape.len();
    let schedule = &opts.annealing;
    schedule.validate()?;
    let theta0 = match &opts.starting_point {
        Some(start) => {
            validate_start(start, dim)?;
            start.clone()
        }
        None => ndarray::Array1::from_elem(dim, DEFAULT_START),
    };
    let objective = Objective::new(model, data, *shape, opts.path_trace.clone(), false);
    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut trace = EvalTrace::default();
    let mut current = project(model, data, shape, theta0)?;
    // The first evaluation doubles as the configuration check; a model with
    // no likelihood fails here, before any trial.
    let mut cost = trial_cost(&objective, &current, opts.want_covariance, &mut trace)?;
    let mut best = current.clone();
    let mut best_cost = cost;

    let mut status = EstimateStatus::Converged;
    let mut t = schedule.t_initial;
    'cooling: while t > schedule.t_min {
        for _ in 0..schedule.iters_per_temp {
            let mut candidate = current.clone();
            take_step(&mut candidate, opts.step_size, &mut rng);
            let candidate = match project(model, data, shape, candidate) {
                Ok(c) => c,
                Err(err) => {
                    if opts.verbose {
                        eprintln!("T = {t:9.4}: projection failed, stopping: {err}");
                    }
                    status = EstimateStatus::NumericalFailure;
                    break 'cooling;
                }
            };
            let candidate_cost =
                match trial_cost(&objective, &candidate, opts.want_covariance, &mut trace) {
                    Ok(c) => c,
                    Err(err) => {
                        if opts.verbose {
                            eprintln!("T = {t:9.4}: evaluation failed, stopping: {err}");
                        }
                        status = EstimateStatus::NumericalFailure;
                        break 'cooling;
                    }
                };
            let accept = if candidate_cost < cost {
                true
            } else {
                let acceptance = (-(candidate_cost - cost) / (schedule.k * t)).exp();
                rng.gen::<f64>() < acceptance
            };
            if accept {
                current = candidate;
                cost = candidate_cost;
                if cost < best_cost {
                    best = current.clone();
                    best_cost = cost;
                }
            }
        }
        if opts.verbose {
            eprintln!(
                "T = {:9.4}  f() = {:>12.6}  best = {:>12.6}  |x - best|_1 = {:.4}",
                t,
                objective.energy(cost),
                objective.energy(best_cost),
                manhattan(&current, &best)
            );
        }
        t /= schedule.cooling_rate;
    }

    let final_theta = if best_cost < cost { best } else { current };
    finish_estimate(model, data, &objective, shape, &final_theta, status, Some(&trace), opts)
}
