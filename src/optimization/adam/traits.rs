//! Public API surface for stochastic Adam calibration.
//!
//! - [`StochasticObjective`]: trait users implement (or satisfy with a
//!   closure) for their simulation model.
//! - [`AdamOptions`]: validated optimizer configuration.
//! - [`GradientReduction`]: choice of gradient-reduction strategy.
//!
//! Convention: the optimizer *minimizes* the objective. When the objective is
//! ensemble-valued, improvement is judged by its expectation across paths;
//! the gradient-reduction strategy is a separate choice and may weight the
//! tail instead.

use crate::optimization::errors::{OptError, OptResult};
use crate::optimization::adam::validation::{
    verify_decay_rates, verify_epsilon, verify_iterations, verify_learning_rate,
};
use crate::risk::validation::validate_confidence_level;
use crate::stochastic::StochasticScalar;

/// User-implemented stochastic objective interface.
///
/// Maps a parameter vector (one [`StochasticScalar`] per free dimension) to
/// an ensemble-valued loss to be minimized. The optimizer evaluates it fresh
/// on every call — at least `K · (D + 1)` times per run — and never caches
/// results; implementations must be deterministic for fixed input if
/// reproducible gradients are required, and must tolerate parameter values
/// arbitrarily close to those of the previous call (finite-difference
/// perturbation).
///
/// Errors returned from `value` abort the run when raised on the base
/// evaluation of an iteration; during shifted (gradient) evaluations they
/// mark the affected dimension as unavailable instead.
///
/// A blanket implementation covers plain closures:
///
/// ```
/// use stochastic_calibration::prelude::*;
///
/// let objective = |p: &[StochasticScalar]| -> OptResult<StochasticScalar> {
///     Ok((&p[0] - 3.0).squared())
/// };
/// # let _ = &objective;
/// ```
pub trait StochasticObjective {
    /// Evaluate the loss at `parameters`.
    fn value(&self, parameters: &[StochasticScalar]) -> OptResult<StochasticScalar>;
}

impl<F> StochasticObjective for F
where
    F: Fn(&[StochasticScalar]) -> OptResult<StochasticScalar>,
{
    fn value(&self, parameters: &[StochasticScalar]) -> OptResult<StochasticScalar> {
        self(parameters)
    }
}

/// Strategy connecting an ensemble-valued gradient to the moment updates.
///
/// Variants:
/// - `Average`: reduce each dimension's gradient to its expectation; the
///   classical stochastic-gradient choice.
/// - `TailRisk { alpha }`: reduce via `−ES_α(−g)` — the worst-case-weighted
///   gradient — for risk-averse calibration; `alpha` must lie in `(0, 1]`.
/// - `Pathwise`: no reduction; gradient, moments, and parameter updates stay
///   full ensembles and every Monte-Carlo path evolves its own copy of each
///   parameter under its own empirical derivative. Computationally heavier,
///   but per-path heterogeneity in the objective surface shapes the per-path
///   optimum directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientReduction {
    Average,
    TailRisk { alpha: f64 },
    Pathwise,
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `iterations: usize` — iteration budget `K`; the run ends after `K`
///   iterations unless stopped earlier.
/// - `learning_rate: f64` — scalar rate broadcast to every dimension at
///   construction (per-dimension overrides via
///   [`crate::optimization::adam::AdamOptimizer::set_learning_rate`]).
/// - `epsilon: f64` — division-by-zero guard added to `sqrt(v̂)`.
/// - `betas: (f64, f64)` — exponential decay rates for the first and second
///   moment estimates.
/// - `reduction: GradientReduction` — gradient-reduction strategy, fixed for
///   the optimizer's lifetime.
///
/// Defaults (matching the reference calibration setup): learning rate `1e-3`,
/// epsilon `1e-8`, betas `(0.9, 0.999)`, reduction `Average`.
#[derive(Debug, Clone, PartialEq)]
pub struct AdamOptions {
    pub iterations: usize,
    pub learning_rate: f64,
    pub epsilon: f64,
    pub betas: (f64, f64),
    pub reduction: GradientReduction,
}

impl AdamOptions {
    /// Construct fully specified, validated options.
    ///
    /// # Rules
    /// - `iterations > 0`.
    /// - `learning_rate` and `epsilon` finite and strictly positive.
    /// - Each decay rate in `[0, 1)`.
    /// - For `TailRisk`, `alpha` in `(0, 1]`.
    ///
    /// # Errors
    /// The corresponding [`OptError`] variant for the first rule violated.
    pub fn new(
        iterations: usize, learning_rate: f64, epsilon: f64, betas: (f64, f64),
        reduction: GradientReduction,
    ) -> OptResult<Self> {
        let options = Self { iterations, learning_rate, epsilon, betas, reduction };
        options.validate()?;
        Ok(options)
    }

    /// Construct options with the default learning rate, epsilon, and betas.
    pub fn with_defaults(iterations: usize, reduction: GradientReduction) -> OptResult<Self> {
        Self::new(iterations, 1e-3, 1e-8, (0.9, 0.999), reduction)
    }

    /// Re-check every construction rule.
    ///
    /// Fields are public, so the optimizer re-validates at its own
    /// construction boundary; see [`AdamOptions::new`] for the rules.
    pub fn validate(&self) -> OptResult<()> {
        verify_iterations(self.iterations)?;
        verify_learning_rate(self.learning_rate)?;
        verify_epsilon(self.epsilon)?;
        verify_decay_rates(self.betas)?;
        if let GradientReduction::TailRisk { alpha } = self.reduction {
            validate_confidence_level(alpha).map_err(OptError::from)?;
        }
        Ok(())
    }
}

impl Default for AdamOptions {
    fn default() -> Self {
        Self {
            iterations: 1000,
            learning_rate: 1e-3,
            epsilon: 1e-8,
            betas: (0.9, 0.999),
            reduction: GradientReduction::Average,
        }
    }
}
