/// Result alias for risk-measure operations.
pub type RiskResult<T> = Result<T, RiskError>;

/// Errors surfaced by the risk-measure layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskError {
    /// Confidence level outside `(0, 1]` (or non-finite).
    InvalidConfidenceLevel { alpha: f64, reason: &'static str },
}

impl std::error::Error for RiskError {}

impl std::fmt::Display for RiskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskError::InvalidConfidenceLevel { alpha, reason } => {
                write!(f, "Invalid confidence level {alpha}: {reason}")
            }
        }
    }
}
