//! Crate-wide error type for the maximum-likelihood engine.
//!
//! One flat enum covers the whole pipeline: capability sentinels used by the
//! [`Model`](crate::model::Model) default methods, configuration validation,
//! objective-evaluation failures, and wrappers for `argmin` backend errors.
//! Sentinels (`LikelihoodNotImplemented`, `ScoreNotImplemented`,
//! `ConstraintNotImplemented`) are matched explicitly by the engine to select
//! fallbacks; they only become user-visible when no fallback exists.
use argmin::core::{ArgminError, Error};

/// Crate-wide result alias.
pub type MleResult<T> = Result<T, MleError>;

#[derive(Debug, Clone, PartialEq)]
pub enum MleError {
    // ---- Capability sentinels ----
    /// The model supplies neither this method nor an equivalent; the engine
    /// falls back (log-likelihood -> raw density).
    LikelihoodNotImplemented,
    /// Implies the numerical gradient engine should be used.
    ScoreNotImplemented,
    /// The model imposes no parameter constraint.
    ConstraintNotImplemented,

    // ---- Model configuration ----
    /// Neither `log_likelihood` nor `density` is implemented.
    MissingLikelihood,
    /// The parameter shape describes zero parameters.
    EmptyParamShape,
    /// A parameter-set component was requested but absent.
    MissingComponent {
        which: &'static str,
    },

    // ---- Parameter packing ----
    /// Flat vector length does not match the parameter shape.
    PackLengthMismatch {
        expected: usize,
        found: usize,
    },

    // ---- Gradient ----
    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },
    /// Gradient elements need to be finite.
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- Options ----
    /// Convergence tolerance needs to be positive and finite.
    InvalidTolerance {
        tol: f64,
        reason: &'static str,
    },
    /// Step size needs to be positive and finite.
    InvalidStepSize {
        step: f64,
        reason: &'static str,
    },
    /// Annealing schedule parameters are inconsistent.
    InvalidSchedule {
        reason: &'static str,
    },
    /// Starting point length does not match the parameter shape.
    StartingPointDimMismatch {
        expected: usize,
        found: usize,
    },
    /// Starting point entries need to be finite.
    InvalidStartingPoint {
        index: usize,
        value: f64,
    },
    /// Restart scale factor needs to be positive and finite.
    InvalidScale {
        scale: f64,
        reason: &'static str,
    },

    // ---- Objective ----
    /// Objective returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    // ---- Imputation ----
    /// Covariance matrix is not symmetric positive definite.
    NotPositiveDefinite,
    /// Mean or covariance dimensions do not match the data's column count.
    MomentDimMismatch {
        expected: usize,
        found: usize,
    },

    // ---- Argmin ----
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for MleError {}

impl std::fmt::Display for MleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Capability sentinels ----
            MleError::LikelihoodNotImplemented => {
                write!(f, "Log-likelihood not implemented")
            }
            MleError::ScoreNotImplemented => {
                write!(f, "Analytic score not implemented")
            }
            MleError::ConstraintNotImplemented => {
                write!(f, "Parameter constraint not implemented")
            }

            // ---- Model configuration ----
            MleError::MissingLikelihood => {
                write!(f, "Model implements neither log_likelihood nor density")
            }
            MleError::EmptyParamShape => {
                write!(f, "Parameter shape describes zero parameters")
            }
            MleError::MissingComponent { which } => {
                write!(f, "Parameter set has no {which} component")
            }

            // ---- Parameter packing ----
            MleError::PackLengthMismatch { expected, found } => {
                write!(f, "Flat parameter length mismatch: expected {expected}, found {found}")
            }

            // ---- Gradient ----
            MleError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            MleError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- Options ----
            MleError::InvalidTolerance { tol, reason } => {
                write!(f, "Invalid tolerance {tol}: {reason}")
            }
            MleError::InvalidStepSize { step, reason } => {
                write!(f, "Invalid step size {step}: {reason}")
            }
            MleError::InvalidSchedule { reason } => {
                write!(f, "Invalid annealing schedule: {reason}")
            }
            MleError::StartingPointDimMismatch { expected, found } => {
                write!(f, "Starting point dimension mismatch: expected {expected}, found {found}")
            }
            MleError::InvalidStartingPoint { index, value } => {
                write!(f, "Invalid starting point at index {index}: {value}, must be finite")
            }
            MleError::InvalidScale { scale, reason } => {
                write!(f, "Invalid restart scale {scale}: {reason}")
            }

            // ---- Objective ----
            MleError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }

            // ---- Imputation ----
            MleError::NotPositiveDefinite => {
                write!(f, "Covariance matrix is not symmetric positive definite")
            }
            MleError::MomentDimMismatch { expected, found } => {
                write!(f, "Moment dimension mismatch: expected {expected}, found {found}")
            }

            // ---- Argmin ----
            MleError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            MleError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            MleError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            MleError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            MleError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            MleError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            MleError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            MleError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for MleError {
    fn from(original_err: Error) -> Self {
        // Our own errors round-trip through anyhow unchanged; anything else is
        // mapped onto the argmin wrappers.
        match original_err.downcast::<MleError>() {
            Ok(mle_err) => mle_err,
            Err(err) => match err.downcast::<ArgminError>() {
                Ok(argmin_err) => match argmin_err {
                    ArgminError::InvalidParameter { text } => MleError::InvalidParameter { text },
                    ArgminError::NotImplemented { text } => MleError::NotImplemented { text },
                    ArgminError::NotInitialized { text } => MleError::NotInitialized { text },
                    ArgminError::ConditionViolated { text } => {
                        MleError::ConditionViolated { text }
                    }
                    ArgminError::PotentialBug { text } => MleError::PotentialBug { text },
                    ArgminError::ImpossibleError { text } => MleError::ImpossibleError { text },
                    _ => MleError::UnknownError,
                },
                Err(err) => MleError::BackendError { text: err.to_string() },
            },
        }
    }
}
