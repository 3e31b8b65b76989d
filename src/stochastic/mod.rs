//! stochastic — the path-ensemble value type.
//!
//! Purpose
//! -------
//! Represent quantities that take one value per Monte-Carlo path. A
//! [`StochasticScalar`] is either a full ensemble (`N` realizations backed by
//! `ndarray`) or a deterministic value that broadcasts against any ensemble.
//!
//! Conventions
//! -----------
//! - Path `i` always refers to the same simulated trajectory across every
//!   ensemble participating in one computation; binary operations between two
//!   stochastic values therefore require equal path counts.
//! - The empirical quantile uses the nearest-rank convention documented on
//!   [`StochasticScalar::quantile`]; all tail measures in [`crate::risk`]
//!   inherit it.

pub mod scalar;

pub use self::scalar::StochasticScalar;
