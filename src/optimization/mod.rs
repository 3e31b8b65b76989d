//! optimization — finite-difference Adam stack and unified error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer for calibrating parameter vectors against
//! stochastic objectives: a bias-corrected Adam loop driven by forward
//! finite differences ([`adam`]), together with a single error/result
//! surface ([`errors`]). Callers implement a
//! [`adam::StochasticObjective`], choose a gradient-reduction strategy, and
//! obtain the best-seen parameter vector without touching loop internals.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level optimizer ([`adam::AdamOptimizer`]) that **minimizes**
//!   an ensemble-valued loss, tracking the best point under the expectation of
//!   the objective.
//! - Reduce per-dimension stochastic gradients by average, by worst-case tail
//!   weighting, or not at all (pathwise evolution) — chosen once at
//!   construction.
//! - Normalize configuration issues, numerical failures, and risk-measure
//!   preconditions into a single enum ([`errors::OptError`]) with a common
//!   result alias (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Objective implementations treat domain violations as recoverable
//!   [`errors::OptError`] values, not panics; only a failing *base*
//!   evaluation aborts a run.
//! - Parameters and moments are [`crate::stochastic::StochasticScalar`]
//!   values throughout; in the reduced modes they stay deterministic, in
//!   pathwise mode they carry full ensembles.
//! - Cancellation is cooperative: a plain atomic flag polled once per
//!   iteration boundary, set from any thread.
//!
//! Conventions
//! -----------
//! - Public optimization entrypoints that can fail return `OptResult<T>`.
//! - This module logs progress through `tracing` only; it performs no other
//!   I/O.

pub mod adam;
pub mod errors;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use stochastic_calibration::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::adam::prelude::*;
    pub use super::errors::{OptError, OptResult};
}
