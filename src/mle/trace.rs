//! Trace sinks: the user-facing evaluation path and the internal
//! per-evaluation record feeding the covariance estimator.
use std::sync::{Arc, Mutex};

use crate::mle::types::{Grad, Theta};

/// One recorded objective evaluation: the flat parameter vector visited and
/// the objective value there (in likelihood space, not cost space).
#[derive(Debug, Clone, PartialEq)]
pub struct PathPoint {
    pub point: Vec<f64>,
    pub value: f64,
}

/// Shared, observational sink recording every objective evaluation.
///
/// Clone the handle into
/// [`MleOptions::path_trace`](crate::mle::options::MleOptions::path_trace)
/// before the run, then read the visited points back afterwards. Recording
/// never influences the optimization.
#[derive(Debug, Clone, Default)]
pub struct PathTrace {
    points: Arc<Mutex<Vec<PathPoint>>>,
}

impl PathTrace {
    pub fn new() -> Self {
        PathTrace::default()
    }

    /// Append one evaluation. Poisoned-lock recovery keeps recording going;
    /// the trace is diagnostics only.
    pub(crate) fn record(&self, theta: &Theta, value: f64) {
        let mut points = match self.points.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        points.push(PathPoint { point: theta.to_vec(), value });
    }

    /// Snapshot of everything recorded so far.
    pub fn points(&self) -> Vec<PathPoint> {
        match self.points.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self.points.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-evaluation `(gradient, energy)` record accumulated by the drivers and
/// consumed by the sandwich covariance estimator. Energy is the
/// log-likelihood at the evaluation point; non-finite energies are dropped
/// at the door so the softmax weighting stays well defined.
#[derive(Debug, Default)]
pub(crate) struct EvalTrace {
    gradients: Vec<Grad>,
    energies: Vec<f64>,
}

impl EvalTrace {
    pub fn record(&mut self, grad: &Grad, energy: f64) {
        if !energy.is_finite() || grad.iter().any(|v| !v.is_finite()) {
            return;
        }
        self.gradients.push(grad.clone());
        self.energies.push(energy);
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    pub fn gradients(&self) -> &[Grad] {
        &self.gradients
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    // Purpose: the path trace records points verbatim and in order.
    // Given: two recorded evaluations.
    // Expect: points() returns both, first in, first out.
    #[test]
    fn path_trace_records_in_order() {
        let trace = PathTrace::new();
        trace.record(&arr1(&[1.0, 2.0]), -3.0);
        trace.record(&arr1(&[1.5, 2.5]), -2.0);
        let points = trace.points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].point, vec![1.0, 2.0]);
        assert_eq!(points[1].value, -2.0);
    }

    // Purpose: non-finite samples never enter the covariance trace.
    // Given: a finite record, an infinite energy, and a NaN gradient entry.
    // Expect: only the finite record is kept.
    #[test]
    fn eval_trace_skips_non_finite() {
        let mut trace = EvalTrace::default();
        trace.record(&arr1(&[1.0]), -1.0);
        trace.record(&arr1(&[1.0]), f64::NEG_INFINITY);
        trace.record(&arr1(&[f64::NAN]), -1.0);
        assert_eq!(trace.energies().len(), 1);
        assert_eq!(trace.gradients().len(), 1);
    }
}
