//! adam — finite-difference Adam over ensemble-valued parameters.
//!
//! Purpose
//! -------
//! Minimize a user-supplied stochastic objective
//! `f(&[StochasticScalar]) -> StochasticScalar` with a bias-corrected Adam
//! iteration whose gradients come from scale-adaptive forward differences.
//! Three gradient-reduction strategies connect the ensemble-valued gradient
//! to the moment updates: average, worst-case tail weighting, and pathwise
//! (no reduction).
//!
//! Key behaviors
//! -------------
//! - [`traits::StochasticObjective`]: the injected objective seam, with a
//!   blanket implementation for plain closures.
//! - [`traits::AdamOptions`] / [`traits::GradientReduction`]: validated
//!   configuration, resolved once at construction into a reduction closure so
//!   the iteration loop is branch-free with respect to the mode.
//! - [`finite_diff::forward_difference_gradient`]: one base evaluation plus D
//!   independent shifted evaluations (parallelized), with an explicit
//!   `None` sentinel for dimensions whose shifted evaluation fails.
//! - [`optimizer::AdamOptimizer`]: owns the live iterate and all state,
//!   tracks the best-seen point, supports cooperative cancellation via
//!   [`optimizer::StopHandle`], and detaches every updated parameter from
//!   its computation lineage once per iteration.
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer loop is single-threaded and synchronous; only the D
//!   shifted objective evaluations within one gradient run in parallel.
//! - `run()` resumes from current state — it never resets the iteration
//!   counter, moments, best point, or a previously requested stop.
//! - An unavailable gradient dimension skips that dimension for that
//!   iteration only; it is recovered locally and never surfaced.
//!
//! Testing notes
//! -------------
//! - Submodule unit tests cover gradients on closed-form objectives, option
//!   validation, cancellation, and resume semantics; the crate-level
//!   integration test covers convergence benchmarks.

pub mod finite_diff;
pub mod optimizer;
pub mod traits;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::optimizer::{AdamOptimizer, StopHandle};
pub use self::traits::{AdamOptions, GradientReduction, StochasticObjective};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::optimizer::{AdamOptimizer, StopHandle};
    pub use super::traits::{AdamOptions, GradientReduction, StochasticObjective};
}
