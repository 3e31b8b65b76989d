//! stochastic::scalar — ensemble-valued scalars with broadcastable arithmetic.
//!
//! Purpose
//! -------
//! Define [`StochasticScalar`], the crate's carrier for Monte-Carlo valued
//! quantities: one real outcome per simulated path, or a single deterministic
//! value that broadcasts against any path count. All risk measures and the
//! optimizer operate on this type.
//!
//! Key behaviors
//! -------------
//! - Elementwise `+ - * /` between ensembles (by reference) and against plain
//!   `f64` values, plus unary negation, `abs`, `squared`, and `sqrt`.
//! - Path statistics: `average`, `variance`, `min_path`, `max_path`, and a
//!   nearest-rank `quantile`.
//! - A per-path select, [`StochasticScalar::choose`], returning one of two
//!   values per path depending on the sign of the receiver — the primitive
//!   from which tail indicators are built.
//! - An explicit [`StochasticScalar::detach`] that freezes a value to plain
//!   numeric content, the hook the optimizer uses once per iteration to keep
//!   parameter values free of any computation lineage.
//!
//! Invariants & assumptions
//! ------------------------
//! - A stochastic ensemble always holds at least one path; constructors
//!   enforce this.
//! - Two stochastic operands of a binary operation must have the same path
//!   count. A mismatch is a precondition violation and panics; it is never
//!   reported as a recoverable error because it indicates inconsistent
//!   simulation wiring, not bad data.
//! - Deterministic values broadcast against any path count without
//!   reallocation of the deterministic side.
//!
//! Testing notes
//! -------------
//! - Unit tests below cover broadcasting, the nearest-rank quantile
//!   convention, select semantics, and the path-count precondition.

use ndarray::Array1;

/// A quantity taking one value per Monte-Carlo path.
///
/// Either a full ensemble of `N` realizations or a degenerate deterministic
/// value (the same number on every path). Deterministic values broadcast
/// against stochastic ones in every binary operation.
#[derive(Debug, Clone, PartialEq)]
pub enum StochasticScalar {
    /// The same value on every path.
    Deterministic(f64),
    /// One realization per path; never empty.
    Stochastic(Array1<f64>),
}

impl StochasticScalar {
    /// Create a deterministic (broadcastable) value.
    pub fn scalar(value: f64) -> Self {
        StochasticScalar::Deterministic(value)
    }

    /// Create an ensemble from per-path realizations.
    ///
    /// # Panics
    /// Panics if `values` is empty; an ensemble must contain at least one path.
    pub fn from_paths(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "ensemble must contain at least one path");
        StochasticScalar::Stochastic(Array1::from(values))
    }

    /// Create an ensemble from an existing `ndarray` vector.
    ///
    /// # Panics
    /// Panics if `values` is empty; an ensemble must contain at least one path.
    pub fn from_array(values: Array1<f64>) -> Self {
        assert!(!values.is_empty(), "ensemble must contain at least one path");
        StochasticScalar::Stochastic(values)
    }

    /// Number of paths, or `None` for a deterministic value.
    pub fn num_paths(&self) -> Option<usize> {
        match self {
            StochasticScalar::Deterministic(_) => None,
            StochasticScalar::Stochastic(values) => Some(values.len()),
        }
    }

    /// `true` if this value is structurally deterministic.
    ///
    /// A stochastic ensemble whose paths all happen to be equal is *not*
    /// deterministic in this sense; use [`StochasticScalar::variance`] to
    /// detect zero cross-path dispersion.
    pub fn is_deterministic(&self) -> bool {
        matches!(self, StochasticScalar::Deterministic(_))
    }

    /// The realization on path `index` (a deterministic value on every path).
    ///
    /// # Panics
    /// Panics if `index` is out of range for a stochastic ensemble.
    pub fn path(&self, index: usize) -> f64 {
        match self {
            StochasticScalar::Deterministic(value) => *value,
            StochasticScalar::Stochastic(values) => values[index],
        }
    }

    /// Arithmetic mean across paths.
    pub fn average(&self) -> f64 {
        match self {
            StochasticScalar::Deterministic(value) => *value,
            StochasticScalar::Stochastic(values) => values.sum() / values.len() as f64,
        }
    }

    /// Population variance across paths (zero for deterministic values).
    pub fn variance(&self) -> f64 {
        match self {
            StochasticScalar::Deterministic(_) => 0.0,
            StochasticScalar::Stochastic(values) => {
                let mean = self.average();
                values.mapv(|x| (x - mean) * (x - mean)).sum() / values.len() as f64
            }
        }
    }

    /// Smallest realization across paths.
    pub fn min_path(&self) -> f64 {
        match self {
            StochasticScalar::Deterministic(value) => *value,
            StochasticScalar::Stochastic(values) => values.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }

    /// Largest realization across paths.
    pub fn max_path(&self) -> f64 {
        match self {
            StochasticScalar::Deterministic(value) => *value,
            StochasticScalar::Stochastic(values) => {
                values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            }
        }
    }

    /// Empirical `p`-quantile under the **nearest-rank** convention.
    ///
    /// Purpose
    /// -------
    /// Return the sorted realization at rank
    /// `clamp(round((N + 1) · p) − 1, 0, N − 1)`, i.e. the value such that
    /// roughly a `p`-fraction of paths lie at or below it. `p → 0` approaches
    /// the worst (smallest) outcome and `p → 1` the best (largest). Ties at
    /// the rank boundary resolve by round-half-away-from-zero; no
    /// interpolation is performed. This convention is fixed: every tail
    /// measure in [`crate::risk`] is defined in terms of it.
    ///
    /// Parameters
    /// ----------
    /// - `p`: probability level, assumed to lie in `[0, 1]`. Callers that
    ///   accept user input validate the level before calling (see
    ///   [`crate::risk::measures::value_at_risk`]); out-of-range values are
    ///   clamped to the extreme ranks rather than extrapolated.
    ///
    /// Returns
    /// -------
    /// The quantile as a plain `f64`; a deterministic value is its own
    /// quantile at every level.
    pub fn quantile(&self, p: f64) -> f64 {
        match self {
            StochasticScalar::Deterministic(value) => *value,
            StochasticScalar::Stochastic(values) => {
                let mut sorted = values.to_vec();
                sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                let n = sorted.len();
                let rank = ((n as f64 + 1.0) * p).round() as isize - 1;
                sorted[rank.clamp(0, n as isize - 1) as usize]
            }
        }
    }

    /// Elementwise absolute value.
    pub fn abs(&self) -> Self {
        self.map(f64::abs)
    }

    /// Elementwise square.
    pub fn squared(&self) -> Self {
        self.map(|x| x * x)
    }

    /// Elementwise square root.
    pub fn sqrt(&self) -> Self {
        self.map(f64::sqrt)
    }

    /// `true` if every realization is finite (no NaN or ±∞).
    pub fn is_finite(&self) -> bool {
        match self {
            StochasticScalar::Deterministic(value) => value.is_finite(),
            StochasticScalar::Stochastic(values) => values.iter().all(|x| x.is_finite()),
        }
    }

    /// Per-path select on the sign of the receiver.
    ///
    /// Purpose
    /// -------
    /// Return, for each path `i`, `if_non_negative` where `self ≥ 0` on that
    /// path and `if_negative` otherwise. Combined with subtraction this builds
    /// tail indicators: `(&threshold - x).choose(&one, &zero)` is `1{x ≤ t}`.
    ///
    /// Parameters
    /// ----------
    /// - `if_non_negative`, `if_negative`: values selected per path; either
    ///   may be deterministic and broadcasts.
    ///
    /// # Panics
    /// Panics if two stochastic operands disagree on path count.
    pub fn choose(&self, if_non_negative: &Self, if_negative: &Self) -> Self {
        let paths = [self, if_non_negative, if_negative]
            .iter()
            .filter_map(|value| value.num_paths())
            .max();
        match paths {
            None => {
                let selected =
                    if self.average() >= 0.0 { if_non_negative } else { if_negative };
                StochasticScalar::Deterministic(selected.average())
            }
            Some(n) => {
                for operand in [self, if_non_negative, if_negative] {
                    if let Some(len) = operand.num_paths() {
                        assert_eq!(len, n, "path count mismatch in choose: {len} vs {n}");
                    }
                }
                StochasticScalar::Stochastic(Array1::from_shape_fn(n, |i| {
                    if self.path(i) >= 0.0 {
                        if_non_negative.path(i)
                    } else {
                        if_negative.path(i)
                    }
                }))
            }
        }
    }

    /// Freeze this value to plain numeric content.
    ///
    /// Severs the result from any computation lineage, keeping only the
    /// realized numbers in freshly owned storage. The optimizer calls this
    /// once per iteration on every updated parameter so that the dependency
    /// chain behind an iterate never grows with the iteration count.
    pub fn detach(&self) -> Self {
        match self {
            StochasticScalar::Deterministic(value) => StochasticScalar::Deterministic(*value),
            StochasticScalar::Stochastic(values) => {
                StochasticScalar::Stochastic(Array1::from(values.to_vec()))
            }
        }
    }

    /// Apply `op` to every realization.
    fn map(&self, op: impl Fn(f64) -> f64) -> Self {
        match self {
            StochasticScalar::Deterministic(value) => StochasticScalar::Deterministic(op(*value)),
            StochasticScalar::Stochastic(values) => {
                StochasticScalar::Stochastic(values.mapv(&op))
            }
        }
    }

    /// Combine two values elementwise, broadcasting deterministic operands.
    ///
    /// # Panics
    /// Panics if both operands are stochastic with different path counts.
    fn zip_with(&self, other: &Self, op: impl Fn(f64, f64) -> f64) -> Self {
        match (self, other) {
            (StochasticScalar::Deterministic(a), StochasticScalar::Deterministic(b)) => {
                StochasticScalar::Deterministic(op(*a, *b))
            }
            (StochasticScalar::Deterministic(a), StochasticScalar::Stochastic(b)) => {
                StochasticScalar::Stochastic(b.mapv(|x| op(*a, x)))
            }
            (StochasticScalar::Stochastic(a), StochasticScalar::Deterministic(b)) => {
                StochasticScalar::Stochastic(a.mapv(|x| op(x, *b)))
            }
            (StochasticScalar::Stochastic(a), StochasticScalar::Stochastic(b)) => {
                assert_eq!(
                    a.len(),
                    b.len(),
                    "path count mismatch: {} vs {}",
                    a.len(),
                    b.len()
                );
                StochasticScalar::Stochastic(Array1::from_shape_fn(a.len(), |i| op(a[i], b[i])))
            }
        }
    }
}

// ---- Operator overloads ----------------------------------------------------
//
// All binary operators work on references (ensembles are not Copy) and come
// in an ensemble/ensemble and an ensemble/f64 form; deterministic operands
// broadcast. See `zip_with` for the path-count precondition.

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl std::ops::$trait<&StochasticScalar> for &StochasticScalar {
            type Output = StochasticScalar;

            fn $method(self, rhs: &StochasticScalar) -> StochasticScalar {
                self.zip_with(rhs, |a, b| a $op b)
            }
        }

        impl std::ops::$trait<f64> for &StochasticScalar {
            type Output = StochasticScalar;

            fn $method(self, rhs: f64) -> StochasticScalar {
                self.map(|a| a $op rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, +);
impl_binary_op!(Sub, sub, -);
impl_binary_op!(Mul, mul, *);
impl_binary_op!(Div, div, /);

impl std::ops::Neg for &StochasticScalar {
    type Output = StochasticScalar;

    fn neg(self) -> StochasticScalar {
        self.map(|a| -a)
    }
}

impl From<f64> for StochasticScalar {
    fn from(value: f64) -> Self {
        StochasticScalar::Deterministic(value)
    }
}
