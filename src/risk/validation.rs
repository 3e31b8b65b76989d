//! Validation helpers for the risk-measure layer.
//!
//! Centralizes the confidence-level precondition shared by every tail
//! measure: `alpha` must be finite and lie in `(0, 1]`. Rejecting (rather
//! than clamping) keeps a silently wrong tail from entering a calibration.

use crate::risk::errors::{RiskError, RiskResult};

/// Validate a confidence level `alpha`.
///
/// - Must be **finite**.
/// - Must satisfy `0 < alpha <= 1`.
///
/// # Errors
/// Returns [`RiskError::InvalidConfidenceLevel`] describing the first rule
/// violated.
pub fn validate_confidence_level(alpha: f64) -> RiskResult<()> {
    if !alpha.is_finite() {
        return Err(RiskError::InvalidConfidenceLevel {
            alpha,
            reason: "Confidence level must be finite.",
        });
    }
    if alpha <= 0.0 {
        return Err(RiskError::InvalidConfidenceLevel {
            alpha,
            reason: "Confidence level must be strictly positive.",
        });
    }
    if alpha > 1.0 {
        return Err(RiskError::InvalidConfidenceLevel {
            alpha,
            reason: "Confidence level must not exceed one.",
        });
    }
    Ok(())
}
