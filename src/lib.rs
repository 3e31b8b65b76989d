//! stochastic_calibration — risk-aware calibration against Monte-Carlo objectives.
//!
//! Purpose
//! -------
//! Provide a small, self-contained numerical core for calibrating scalar
//! parameter vectors against a **stochastic** objective: an objective whose
//! value is an ensemble of outcomes, one per simulated Monte-Carlo path,
//! rather than a single number. The crate combines three layers:
//!
//! - [`stochastic`] — the path-ensemble value type ([`stochastic::StochasticScalar`])
//!   with elementwise arithmetic, an empirical quantile, and a per-path select
//!   operation.
//! - [`risk`] — pure tail-risk measures (expectation, Value-at-Risk, left- and
//!   right-tail Expected Shortfall and its complement) over such ensembles.
//! - [`optimization`] — a finite-difference Adam optimizer
//!   ([`optimization::adam::AdamOptimizer`]) that minimizes a user-supplied
//!   stochastic objective, optionally weighting gradients by their worst-case
//!   tail instead of their average.
//!
//! Key behaviors
//! -------------
//! - Objectives are injected as a [`optimization::adam::StochasticObjective`]
//!   (any `Fn(&[StochasticScalar]) -> OptResult<StochasticScalar>` closure
//!   works); the optimizer never owns or caches them.
//! - Gradients are scale-adaptive forward differences; the D per-dimension
//!   evaluations of one iteration are independent and run in parallel.
//! - The gradient-reduction strategy (average, tail-risk, or pathwise) is
//!   resolved once at optimizer construction into a closure, so the iteration
//!   loop contains no mode branching.
//!
//! Invariants & assumptions
//! ------------------------
//! - All stochastic values participating in one objective evaluation share the
//!   same path count and path indexing; mixing ensembles of different sizes is
//!   a precondition violation, not a recoverable error.
//! - Risk measures reject confidence levels outside `(0, 1]` at the call
//!   boundary; degenerate inputs (zero cross-path variance, `alpha = 1` for
//!   the left tail) have *defined* results and are not errors.
//! - Library code never panics except for documented precondition violations
//!   and never uses `unwrap`/`expect` outside tests.
//!
//! Conventions
//! -----------
//! - Ensembles are backed by `ndarray::Array1<f64>`; a plain number is a
//!   deterministic (broadcastable) ensemble.
//! - Fallible public entrypoints return [`optimization::errors::OptResult`]
//!   or [`risk::errors::RiskResult`]; errors convert upward via `From`.
//! - Progress is reported through `tracing` at `debug`/`trace` level; the
//!   crate never installs a subscriber.
//!
//! Downstream usage
//! ----------------
//! - Simulation code (climate-economy models, interest-rate models, …) maps a
//!   parameter vector to a `StochasticScalar` loss and hands that closure to
//!   [`optimization::adam::AdamOptimizer`].
//! - Analytics code calls the [`risk`] measures directly on simulation output.
//! - `use stochastic_calibration::prelude::*;` imports the main surface.
//!
//! Testing notes
//! -------------
//! - Unit tests live in `#[cfg(test)]` modules next to the code they cover.
//! - `tests/integration_calibration.rs` exercises the full pipeline, including
//!   the Rosenbrock calibration benchmark and pathwise/scalar equivalence.

pub mod optimization;
pub mod risk;
pub mod stochastic;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use stochastic_calibration::prelude::*;
//
// to import the main crate surface in a single line.

pub mod prelude {
    pub use crate::optimization::adam::{
        AdamOptimizer, AdamOptions, GradientReduction, StochasticObjective, StopHandle,
    };
    pub use crate::optimization::errors::{OptError, OptResult};
    pub use crate::risk::measures::{
        expectation, expected_shortfall_complement, left_tail_expected_shortfall,
        right_tail_expected_shortfall, value_at_risk,
    };
    pub use crate::stochastic::StochasticScalar;
}
