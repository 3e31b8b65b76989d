//! risk::measures — expectation, Value-at-Risk, and Expected Shortfall.
//!
//! Purpose
//! -------
//! Reduce a [`StochasticScalar`] ensemble to tail-aware summaries. The left
//! tail averages the *worst* `alpha`-fraction of outcomes, the right tail the
//! *best* `(1 − alpha)`-fraction; both are defined through the nearest-rank
//! Value-at-Risk and an explicit per-path indicator.
//!
//! Key behaviors
//! -------------
//! - `expectation`, `value_at_risk`, `left_tail_expected_shortfall`,
//!   `right_tail_expected_shortfall`, `expected_shortfall_complement`, all
//!   validating `alpha ∈ (0, 1]` at the call boundary.
//! - Operator factories (`expectation_operator`, `left_tail_operator`, …)
//!   returning boxed closures, the form consumed as gradient-reduction
//!   strategies.
//!
//! Invariants & assumptions
//! ------------------------
//! - Degenerate inputs have *defined* results, not errors: a value with zero
//!   cross-path variance is its own Expected Shortfall, and the left tail at
//!   `alpha = 1` is the plain expectation.
//! - The tail indicator is `1{x ≤ VaR}` (respectively `1{x ≥ VaR}`),
//!   inclusive at the quantile point, built via
//!   [`StochasticScalar::choose`].
//! - `alpha = 1` for the right tail is accepted as a degenerate input; the
//!   `1/(1 − alpha)` normalization then diverges by construction and is not
//!   special-cased.
//!
//! Testing notes
//! -------------
//! - Unit tests below pin the concrete scenarios from the original model
//!   (ten-path ladder, four-path average) and the algebraic identities
//!   between the measures.

use crate::risk::errors::RiskResult;
use crate::risk::validation::validate_confidence_level;
use crate::stochastic::StochasticScalar;

/// Boxed reduction operator `X ↦ ρ(X)`, usable as a gradient-reduction
/// strategy or a standalone analytic.
pub type RiskOperator = Box<dyn Fn(&StochasticScalar) -> StochasticScalar + Send + Sync>;

/// Arithmetic mean across paths, `E[x]`. No failure modes.
pub fn expectation(x: &StochasticScalar) -> f64 {
    x.average()
}

/// Value-at-Risk `VaR_α(x)`: the nearest-rank `alpha`-quantile of `x`.
///
/// `alpha → 0` approaches the worst outcome, `alpha → 1` the best. The rank
/// convention (including tie-breaking) is documented on
/// [`StochasticScalar::quantile`].
///
/// # Errors
/// [`crate::risk::RiskError::InvalidConfidenceLevel`] if `alpha` is outside
/// `(0, 1]` or non-finite.
pub fn value_at_risk(x: &StochasticScalar, alpha: f64) -> RiskResult<f64> {
    validate_confidence_level(alpha)?;
    Ok(x.quantile(alpha))
}

/// Left-tail Expected Shortfall `ES_α(x) = E[x · 1{x ≤ VaR_α(x)}] / α`.
///
/// Purpose
/// -------
/// Average of the worst `alpha`-fraction of outcomes (`alpha = 0.05` is the
/// worst 5%). Lower values of `x` are the bad outcomes.
///
/// Edge cases (defined results, not errors):
/// - zero cross-path variance: `x` is returned unchanged — the shortfall of
///   a constant is the constant;
/// - `alpha = 1`: the plain expectation — the shortfall over the whole
///   distribution is the mean.
///
/// On a finite ensemble the nearest-rank indicator can cover more than an
/// `alpha`-fraction of paths while the normalization still divides by
/// `alpha`; at such discretization boundaries the measure is **not**
/// monotone in `alpha` (on ten paths, `ES_0.8` covers nine of them and
/// exceeds `ES_1`). This matches the discrete definition above and is not
/// smoothed over.
///
/// # Errors
/// [`crate::risk::RiskError::InvalidConfidenceLevel`] if `alpha` is outside
/// `(0, 1]` or non-finite.
pub fn left_tail_expected_shortfall(
    x: &StochasticScalar, alpha: f64,
) -> RiskResult<StochasticScalar> {
    validate_confidence_level(alpha)?;
    Ok(left_tail_unchecked(x, alpha))
}

/// Right-tail Expected Shortfall `E[x · 1{x ≥ VaR_α(x)}] / (1 − α)`.
///
/// Average of the best `(1 − alpha)`-fraction of outcomes. A value with zero
/// cross-path variance is returned unchanged. `alpha = 1` is accepted as a
/// degenerate input: it asks for the average strictly beyond the best
/// outcome, and the diverging normalization reflects that.
///
/// # Errors
/// [`crate::risk::RiskError::InvalidConfidenceLevel`] if `alpha` is outside
/// `(0, 1]` or non-finite.
pub fn right_tail_expected_shortfall(
    x: &StochasticScalar, alpha: f64,
) -> RiskResult<StochasticScalar> {
    validate_confidence_level(alpha)?;
    Ok(right_tail_unchecked(x, alpha))
}

/// Expected-Shortfall complement `E[x] − α · ES_α(x)`.
///
/// Exact by construction: the identity
/// `expected_shortfall_complement(x, α) == expectation(x) − α · left_tail_expected_shortfall(x, α)`
/// holds without rounding caveats beyond ordinary floating-point arithmetic.
///
/// # Errors
/// [`crate::risk::RiskError::InvalidConfidenceLevel`] if `alpha` is outside
/// `(0, 1]` or non-finite.
pub fn expected_shortfall_complement(x: &StochasticScalar, alpha: f64) -> RiskResult<f64> {
    validate_confidence_level(alpha)?;
    Ok(x.average() - alpha * left_tail_unchecked(x, alpha).average())
}

/// Left-tail Expected Shortfall with `alpha` already validated.
///
/// Shared core for [`left_tail_expected_shortfall`], the complement, and the
/// optimizer's tail-risk gradient reduction (which validates `alpha` once at
/// construction and must not re-validate per iteration).
pub(crate) fn left_tail_unchecked(x: &StochasticScalar, alpha: f64) -> StochasticScalar {
    if x.is_deterministic() || x.variance() == 0.0 {
        return x.clone();
    }
    if alpha == 1.0 {
        return StochasticScalar::scalar(x.average());
    }
    let value_at_risk = x.quantile(alpha);
    // 1{x <= VaR}, inclusive at the quantile point
    let indicator = (&(&StochasticScalar::scalar(value_at_risk) - x))
        .choose(&StochasticScalar::scalar(1.0), &StochasticScalar::scalar(0.0));
    let average_below = (x * &indicator).average() / alpha;
    StochasticScalar::scalar(average_below)
}

/// Right-tail Expected Shortfall with `alpha` already validated.
pub(crate) fn right_tail_unchecked(x: &StochasticScalar, alpha: f64) -> StochasticScalar {
    if x.is_deterministic() || x.variance() == 0.0 {
        return x.clone();
    }
    let value_at_risk = x.quantile(alpha);
    // 1{x >= VaR}, inclusive at the quantile point
    let indicator = (&(x - value_at_risk))
        .choose(&StochasticScalar::scalar(1.0), &StochasticScalar::scalar(0.0));
    let average_above = (x * &indicator).average() / (1.0 - alpha);
    StochasticScalar::scalar(average_above)
}

// ---- Operator factories ----------------------------------------------------
//
// The factory forms mirror the function forms one-to-one; they exist so a
// measure can be chosen once (validating alpha a single time) and then
// applied repeatedly, e.g. as the reduction step of an optimizer run.

/// Operator `X ↦ E[X]`.
pub fn expectation_operator() -> RiskOperator {
    Box::new(|x| StochasticScalar::scalar(x.average()))
}

/// Operator `X ↦ VaR_α(X)`.
///
/// # Errors
/// Rejects invalid `alpha` once, at construction.
pub fn value_at_risk_operator(alpha: f64) -> RiskResult<RiskOperator> {
    validate_confidence_level(alpha)?;
    Ok(Box::new(move |x| StochasticScalar::scalar(x.quantile(alpha))))
}

/// Operator `X ↦ ES_α(X)` (left tail).
///
/// # Errors
/// Rejects invalid `alpha` once, at construction.
pub fn left_tail_operator(alpha: f64) -> RiskResult<RiskOperator> {
    validate_confidence_level(alpha)?;
    Ok(Box::new(move |x| left_tail_unchecked(x, alpha)))
}

/// Operator `X ↦ ES_α(X)` (right tail).
///
/// # Errors
/// Rejects invalid `alpha` once, at construction.
pub fn right_tail_operator(alpha: f64) -> RiskResult<RiskOperator> {
    validate_confidence_level(alpha)?;
    Ok(Box::new(move |x| right_tail_unchecked(x, alpha)))
}

/// Operator `X ↦ E[X] − α · ES_α(X)`.
///
/// # Errors
/// Rejects invalid `alpha` once, at construction.
pub fn expected_shortfall_complement_operator(alpha: f64) -> RiskResult<RiskOperator> {
    validate_confidence_level(alpha)?;
    Ok(Box::new(move |x| {
        StochasticScalar::scalar(x.average() - alpha * left_tail_unchecked(x, alpha).average())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::errors::RiskError;
    use approx::assert_abs_diff_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Concrete VaR/ES values on the ten-path ladder scenario.
    // - Degenerate-input edge cases (zero variance, alpha = 1).
    // - Algebraic identities (complement, monotonicity in alpha).
    // - Confidence-level rejection at every entry point.
    // - Agreement between function and operator forms.
    //
    // They intentionally DO NOT cover:
    // - Quantile rank mechanics (see `stochastic::scalar`).
    // - Use of the measures as gradient reductions (see `optimization::adam`).
    // -------------------------------------------------------------------------

    fn ladder() -> StochasticScalar {
        StochasticScalar::from_paths(vec![
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0,
        ])
    }

    #[test]
    // Purpose
    // -------
    // Pin the concrete four-path expectation scenario.
    fn expectation_of_four_path_scenario() {
        let x = StochasticScalar::from_paths(vec![1.0, 0.0, 0.0, 1.0]);

        assert_abs_diff_eq!(expectation(&x), 0.5);
    }

    #[test]
    // Purpose
    // -------
    // Pin VaR and left-tail ES on the ten-path ladder.
    //
    // Given
    // -----
    // - x = [1..10], alpha = 0.3.
    //
    // Expect
    // ------
    // - VaR is the nearest-rank 30th percentile, 3.
    // - Left-tail ES is the average of the three lowest values, 2.
    fn ladder_var_and_left_tail_shortfall() {
        let x = ladder();

        let var = value_at_risk(&x, 0.3).expect("valid alpha");
        let es = left_tail_expected_shortfall(&x, 0.3).expect("valid alpha");

        assert_abs_diff_eq!(var, 3.0);
        assert_abs_diff_eq!(es.average(), 2.0);
    }

    #[test]
    // Purpose
    // -------
    // Pin right-tail ES on the ten-path ladder.
    //
    // Given
    // -----
    // - x = [1..10], alpha = 0.7, so VaR = 8 under nearest-rank.
    //
    // Expect
    // ------
    // - Right-tail ES = (8 + 9 + 10) / 10 / 0.3 = 9.
    fn ladder_right_tail_shortfall() {
        let x = ladder();

        let es = right_tail_expected_shortfall(&x, 0.7).expect("valid alpha");

        assert_abs_diff_eq!(es.average(), 9.0);
    }

    #[test]
    // Purpose
    // -------
    // A value with no cross-path dispersion is its own Expected Shortfall on
    // both tails, for every valid alpha — including a structurally stochastic
    // ensemble whose paths are all equal.
    fn deterministic_input_is_its_own_shortfall() {
        let constant = StochasticScalar::scalar(7.0);
        let flat = StochasticScalar::from_paths(vec![7.0; 16]);

        for alpha in [0.01, 0.05, 0.5, 1.0] {
            for x in [&constant, &flat] {
                let left = left_tail_expected_shortfall(x, alpha).expect("valid alpha");
                let right = right_tail_expected_shortfall(x, alpha).expect("valid alpha");
                assert_eq!(&left, x);
                assert_eq!(&right, x);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The left tail at alpha = 1 spans the whole distribution and equals the
    // expectation.
    fn left_tail_at_full_confidence_is_expectation() {
        let x = ladder();

        let es = left_tail_expected_shortfall(&x, 1.0).expect("valid alpha");

        assert_abs_diff_eq!(es.average(), expectation(&x));
    }

    #[test]
    // Purpose
    // -------
    // Narrower left tails average no better than wider ones, away from
    // discretization boundaries.
    //
    // Given
    // -----
    // - Levels where the nearest-rank indicator covers at most an
    //   alpha-fraction of the ten paths.
    fn left_tail_is_monotone_in_alpha() {
        let x = ladder();

        let mut previous = f64::NEG_INFINITY;
        for alpha in [0.1, 0.2, 0.3, 0.5, 1.0] {
            let es = left_tail_expected_shortfall(&x, alpha)
                .expect("valid alpha")
                .average();
            assert!(
                es >= previous,
                "left-tail ES must be non-decreasing in alpha: {es} < {previous} at {alpha}"
            );
            previous = es;
        }
    }

    #[test]
    // Purpose
    // -------
    // At a discretization boundary the indicator covers more than an
    // alpha-fraction of paths while the normalization divides by alpha, so
    // the measure overshoots and monotonicity in alpha breaks.
    //
    // Given
    // -----
    // - x = [1..10], alpha = 0.8: nearest-rank VaR is 9, covering nine paths.
    //
    // Expect
    // ------
    // - ES_0.8 = (1 + ... + 9) / 10 / 0.8 = 5.625, above ES_1 = 5.5.
    fn left_tail_overshoots_at_discretization_boundaries() {
        let x = ladder();

        let boundary = left_tail_expected_shortfall(&x, 0.8)
            .expect("valid alpha")
            .average();
        let full = left_tail_expected_shortfall(&x, 1.0)
            .expect("valid alpha")
            .average();

        assert_abs_diff_eq!(boundary, 5.625);
        assert_abs_diff_eq!(full, 5.5);
        assert!(boundary > full);
    }

    #[test]
    // Purpose
    // -------
    // The complement satisfies its defining identity exactly.
    fn complement_satisfies_defining_identity() {
        let x = ladder();

        for alpha in [0.1, 0.3, 0.5, 1.0] {
            let complement = expected_shortfall_complement(&x, alpha).expect("valid alpha");
            let es = left_tail_expected_shortfall(&x, alpha)
                .expect("valid alpha")
                .average();
            assert_abs_diff_eq!(complement, expectation(&x) - alpha * es);
        }
    }

    #[test]
    // Purpose
    // -------
    // Every measure rejects out-of-range confidence levels at the boundary.
    fn invalid_confidence_levels_are_rejected_everywhere() {
        let x = ladder();

        for alpha in [0.0, -0.05, 1.5, f64::NAN] {
            assert!(matches!(
                value_at_risk(&x, alpha),
                Err(RiskError::InvalidConfidenceLevel { .. })
            ));
            assert!(left_tail_expected_shortfall(&x, alpha).is_err());
            assert!(right_tail_expected_shortfall(&x, alpha).is_err());
            assert!(expected_shortfall_complement(&x, alpha).is_err());
            assert!(left_tail_operator(alpha).is_err());
            assert!(right_tail_operator(alpha).is_err());
            assert!(value_at_risk_operator(alpha).is_err());
            assert!(expected_shortfall_complement_operator(alpha).is_err());
        }
    }

    #[test]
    // Purpose
    // -------
    // Operator factories agree with the corresponding function forms.
    fn operators_agree_with_function_forms() {
        let x = ladder();
        let alpha = 0.3;

        let mean_op = expectation_operator();
        let var_op = value_at_risk_operator(alpha).expect("valid alpha");
        let left_op = left_tail_operator(alpha).expect("valid alpha");
        let right_op = right_tail_operator(alpha).expect("valid alpha");
        let complement_op =
            expected_shortfall_complement_operator(alpha).expect("valid alpha");

        assert_abs_diff_eq!(mean_op(&x).average(), expectation(&x));
        assert_abs_diff_eq!(
            var_op(&x).average(),
            value_at_risk(&x, alpha).expect("valid alpha")
        );
        assert_abs_diff_eq!(
            left_op(&x).average(),
            left_tail_expected_shortfall(&x, alpha)
                .expect("valid alpha")
                .average()
        );
        assert_abs_diff_eq!(
            right_op(&x).average(),
            right_tail_expected_shortfall(&x, alpha)
                .expect("valid alpha")
                .average()
        );
        assert_abs_diff_eq!(
            complement_op(&x).average(),
            expected_shortfall_complement(&x, alpha).expect("valid alpha")
        );
    }
}
