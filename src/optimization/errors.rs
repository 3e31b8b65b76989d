use crate::risk::errors::RiskError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- AdamOptions ----
    /// Iteration budget must be positive.
    InvalidIterations {
        iterations: usize,
        reason: &'static str,
    },
    /// Learning rate must be finite and strictly positive.
    InvalidLearningRate {
        rate: f64,
        reason: &'static str,
    },
    /// Division guard epsilon must be finite and strictly positive.
    InvalidEpsilon {
        epsilon: f64,
        reason: &'static str,
    },
    /// Moment decay rates must lie in [0, 1).
    InvalidDecayRate {
        beta: f64,
        reason: &'static str,
    },

    // ---- Parameter vector ----
    /// The parameter vector must hold at least one dimension.
    EmptyParameterVector,
    /// Initial parameter values must be finite.
    InvalidInitialParameter {
        index: usize,
        value: f64,
    },
    /// A learning-rate vector must match the parameter dimension.
    LearningRateDimMismatch {
        expected: usize,
        found: usize,
    },
    /// A per-dimension learning-rate index must address an existing dimension.
    LearningRateIndexOutOfRange {
        index: usize,
        dimension: usize,
    },

    // ---- Objective ----
    /// Objective evaluation failed; fatal when raised on the base evaluation.
    ObjectiveFailed {
        text: String,
    },
    /// Base objective produced a non-finite comparison value.
    NonFiniteObjective {
        value: f64,
    },

    // ---- Risk measures ----
    /// Confidence level outside (0, 1] (tail-risk gradient reduction).
    InvalidConfidenceLevel {
        alpha: f64,
        reason: &'static str,
    },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- AdamOptions ----
            OptError::InvalidIterations { iterations, reason } => {
                write!(f, "Invalid iteration budget {iterations}: {reason}")
            }
            OptError::InvalidLearningRate { rate, reason } => {
                write!(f, "Invalid learning rate {rate}: {reason}")
            }
            OptError::InvalidEpsilon { epsilon, reason } => {
                write!(f, "Invalid epsilon {epsilon}: {reason}")
            }
            OptError::InvalidDecayRate { beta, reason } => {
                write!(f, "Invalid moment decay rate {beta}: {reason}")
            }

            // ---- Parameter vector ----
            OptError::EmptyParameterVector => {
                write!(f, "Parameter vector must hold at least one dimension")
            }
            OptError::InvalidInitialParameter { index, value } => {
                write!(f, "Invalid initial parameter at index {index}: {value}, must be finite")
            }
            OptError::LearningRateDimMismatch { expected, found } => {
                write!(f, "Learning-rate dimension mismatch: expected {expected}, found {found}")
            }
            OptError::LearningRateIndexOutOfRange { index, dimension } => {
                write!(f, "Learning-rate index {index} out of range for dimension {dimension}")
            }

            // ---- Objective ----
            OptError::ObjectiveFailed { text } => {
                write!(f, "Objective evaluation failed: {text}")
            }
            OptError::NonFiniteObjective { value } => {
                write!(f, "Non-finite objective value: {value}")
            }

            // ---- Risk measures ----
            OptError::InvalidConfidenceLevel { alpha, reason } => {
                write!(f, "Invalid confidence level {alpha}: {reason}")
            }
        }
    }
}

impl From<RiskError> for OptError {
    fn from(err: RiskError) -> Self {
        match err {
            RiskError::InvalidConfidenceLevel { alpha, reason } => {
                OptError::InvalidConfidenceLevel { alpha, reason }
            }
        }
    }
}
