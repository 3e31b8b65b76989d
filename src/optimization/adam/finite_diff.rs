//! adam::finite_diff — forward-difference gradients of stochastic objectives.
//!
//! Purpose
//! -------
//! Approximate the per-dimension directional derivative of an objective with
//! respect to an ensemble-valued parameter vector, reusing one shared base
//! evaluation so an iteration costs `D + 1` objective calls instead of
//! `2D + 1`. The one-sided scheme trades an `O(ε)` bias for halving the
//! evaluation count — the right trade when each evaluation is a full
//! Monte-Carlo simulation.
//!
//! Key behaviors
//! -------------
//! - Scale-adaptive steps `ε · (|pᵢ| + 1)`, themselves ensemble-valued, so a
//!   pathwise-heterogeneous parameter perturbs each path proportionally.
//! - The D shifted evaluations are mutually independent and run on the rayon
//!   thread pool; each only reads the (per-iteration immutable) parameter
//!   vector.
//! - A dimension whose shifted evaluation fails, or whose derivative comes
//!   back non-finite, yields an explicit `None` sentinel rather than aborting
//!   the whole gradient. Structurally fixed dimensions (a clamped control in
//!   the first time step, say) surface this way every iteration.
//!
//! Invariants & assumptions
//! ------------------------
//! - The base value was produced by the same objective at exactly the current
//!   parameters; failures of that evaluation are the caller's to handle and
//!   are fatal to a run.
//! - The objective is safe to call concurrently (`Sync`) and treats its input
//!   as read-only.

use crate::optimization::adam::traits::StochasticObjective;
use crate::stochastic::StochasticScalar;
use rayon::prelude::*;
use tracing::trace;

/// Relative scale of the forward-difference step.
pub const STEP_SCALE: f64 = 1e-8;

/// Per-dimension forward-difference gradient, `None` where unavailable.
///
/// Purpose
/// -------
/// For each dimension `i`, evaluate the objective at the parameter vector
/// with `pᵢ` replaced by `pᵢ + ε · (|pᵢ| + 1)` and form
/// `(f(shifted) − f(p)) / step` elementwise across paths.
///
/// Parameters
/// ----------
/// - `objective`: the stochastic objective; evaluated once per dimension.
/// - `parameters`: current parameter vector, immutable for this iteration.
/// - `base_value`: `f(parameters)`, computed once by the caller.
///
/// Returns
/// -------
/// A vector of length `parameters.len()`. Entry `i` is `Some(gradient)` when
/// the shifted evaluation succeeded with finite realizations, `None`
/// otherwise ("gradient unavailable for this dimension"); callers skip
/// `None` dimensions for the current iteration and leave their parameters
/// unchanged.
pub fn forward_difference_gradient<F>(
    objective: &F, parameters: &[StochasticScalar], base_value: &StochasticScalar,
) -> Vec<Option<StochasticScalar>>
where
    F: StochasticObjective + Sync,
{
    parameters
        .par_iter()
        .enumerate()
        .map(|(i, parameter)| {
            let step = &(&parameter.abs() + 1.0) * STEP_SCALE;
            let mut shifted = parameters.to_vec();
            shifted[i] = parameter + &step;
            match objective.value(&shifted) {
                Ok(shifted_value) => {
                    let derivative = &(&shifted_value - base_value) / &step;
                    if derivative.is_finite() {
                        Some(derivative)
                    } else {
                        trace!(dimension = i, "non-finite derivative; gradient unavailable");
                        None
                    }
                }
                Err(err) => {
                    trace!(
                        dimension = i,
                        error = %err,
                        "shifted evaluation failed; gradient unavailable"
                    );
                    None
                }
            }
        })
        .collect()
}
