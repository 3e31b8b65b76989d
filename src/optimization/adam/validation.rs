//! Validation helpers for Adam configuration and parameter vectors.
//!
//! This module centralizes the consistency checks used across the optimizer
//! interface:
//!
//! - **Option checks**: [`verify_iterations`], [`verify_learning_rate`],
//!   [`verify_epsilon`], [`verify_decay_rates`] enforce the numeric rules of
//!   [`crate::optimization::adam::AdamOptions`].
//! - **Parameter checks**: [`validate_initial_parameters`] rejects empty or
//!   non-finite starting points, [`validate_learning_rates`] dimension and
//!   positivity of per-dimension rate vectors.
//!
//! These helpers standardize error reporting by returning domain-specific
//! [`OptError`] variants, keeping higher-level code uniform.

use crate::optimization::errors::{OptError, OptResult};

/// Validate the iteration budget (must be `> 0`).
///
/// # Errors
/// Returns [`OptError::InvalidIterations`] for a zero budget.
pub fn verify_iterations(iterations: usize) -> OptResult<()> {
    if iterations == 0 {
        return Err(OptError::InvalidIterations {
            iterations,
            reason: "Iteration budget must be greater than zero.",
        });
    }
    Ok(())
}

/// Validate a learning rate (must be **finite** and **strictly positive**).
///
/// # Errors
/// Returns [`OptError::InvalidLearningRate`] otherwise.
pub fn verify_learning_rate(rate: f64) -> OptResult<()> {
    if !rate.is_finite() {
        return Err(OptError::InvalidLearningRate {
            rate,
            reason: "Learning rate must be finite.",
        });
    }
    if rate <= 0.0 {
        return Err(OptError::InvalidLearningRate {
            rate,
            reason: "Learning rate must be positive.",
        });
    }
    Ok(())
}

/// Validate the division guard (must be **finite** and **strictly positive**).
///
/// # Errors
/// Returns [`OptError::InvalidEpsilon`] otherwise.
pub fn verify_epsilon(epsilon: f64) -> OptResult<()> {
    if !epsilon.is_finite() {
        return Err(OptError::InvalidEpsilon { epsilon, reason: "Epsilon must be finite." });
    }
    if epsilon <= 0.0 {
        return Err(OptError::InvalidEpsilon { epsilon, reason: "Epsilon must be positive." });
    }
    Ok(())
}

/// Validate the moment decay rates (each must lie in `[0, 1)`).
///
/// # Errors
/// Returns [`OptError::InvalidDecayRate`] with the first offending rate.
pub fn verify_decay_rates(betas: (f64, f64)) -> OptResult<()> {
    for beta in [betas.0, betas.1] {
        if !beta.is_finite() || !(0.0..1.0).contains(&beta) {
            return Err(OptError::InvalidDecayRate {
                beta,
                reason: "Decay rates must lie in [0, 1).",
            });
        }
    }
    Ok(())
}

/// Validate an initial parameter vector.
///
/// Checks:
/// - at least one dimension,
/// - every entry finite.
///
/// # Errors
/// - [`OptError::EmptyParameterVector`] for an empty slice.
/// - [`OptError::InvalidInitialParameter`] with the first offending entry.
pub fn validate_initial_parameters(parameters: &[f64]) -> OptResult<()> {
    if parameters.is_empty() {
        return Err(OptError::EmptyParameterVector);
    }
    for (index, &value) in parameters.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidInitialParameter { index, value });
        }
    }
    Ok(())
}

/// Validate a per-dimension learning-rate vector against dimension `dim`.
///
/// # Errors
/// - [`OptError::LearningRateDimMismatch`] if the length differs from `dim`.
/// - [`OptError::InvalidLearningRate`] if any rate is non-finite or ≤ 0.
pub fn validate_learning_rates(rates: &[f64], dim: usize) -> OptResult<()> {
    if rates.len() != dim {
        return Err(OptError::LearningRateDimMismatch { expected: dim, found: rates.len() });
    }
    for &rate in rates {
        verify_learning_rate(rate)?;
    }
    Ok(())
}
