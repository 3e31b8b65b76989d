//! risk — tail-risk measures over path ensembles.
//!
//! Purpose
//! -------
//! Pure functions reducing a [`crate::stochastic::StochasticScalar`] to a
//! tail-aware summary: expectation, Value-at-Risk, left- and right-tail
//! Expected Shortfall, and the Expected-Shortfall complement. The same
//! measures double as gradient-reduction strategies inside the optimizer.
//!
//! Conventions
//! -----------
//! - Confidence levels `alpha` are probabilities in `(0, 1]`; anything else
//!   is rejected at the call boundary as [`errors::RiskError`], never clamped.
//! - Quantiles follow the nearest-rank convention of
//!   [`crate::stochastic::StochasticScalar::quantile`].
//! - No I/O and no logging; every function is deterministic for fixed input.

pub mod errors;
pub mod measures;
pub mod validation;

pub use self::errors::{RiskError, RiskResult};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::errors::{RiskError, RiskResult};
    pub use super::measures::{
        expectation, expected_shortfall_complement, left_tail_expected_shortfall,
        right_tail_expected_shortfall, value_at_risk,
    };
}
