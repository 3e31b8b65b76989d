//! adam::optimizer — the risk-adjusted Adam iteration loop.
//!
//! Purpose
//! -------
//! Drive the calibration state machine
//! `CREATED → (ITERATING)* → STOPPED | EXHAUSTED`: one base objective
//! evaluation per iteration, a forward-difference gradient, a per-mode
//! gradient reduction, bias-corrected moment updates, and a detached
//! parameter step — with best-point tracking and cooperative cancellation
//! throughout.
//!
//! Key behaviors
//! -------------
//! - The gradient-reduction mode is resolved **once at construction** into a
//!   closure `StochasticScalar → StochasticScalar` (deterministic output for
//!   the reduced modes, identity for pathwise); the iteration loop carries no
//!   mode branching and one update path serves all three modes.
//! - Moments are stored as [`StochasticScalar`] values, zero-initialized
//!   deterministically; in pathwise mode they become ensembles the moment the
//!   first ensemble-valued gradient arrives.
//! - Every updated parameter is [`StochasticScalar::detach`]ed, so the value
//!   chain behind an iterate never grows with the iteration count.
//! - `run()` resumes: iteration counter, moments, best point, and a
//!   previously requested stop all persist across calls. A fresh budget
//!   requires a fresh optimizer.
//!
//! Invariants & assumptions
//! ------------------------
//! - The loop is single-threaded; only the shifted gradient evaluations fan
//!   out (inside [`super::finite_diff`]). No iteration begins before the
//!   previous parameter update completed.
//! - A failing or non-finite *base* evaluation is fatal and propagates out of
//!   [`AdamOptimizer::run`]; a failing *shifted* evaluation skips only its
//!   dimension for that iteration.
//! - Cancellation is observed at iteration boundaries only, via a plain
//!   atomic flag; a stop requested before the first iteration yields a run
//!   with zero iterations and no best point.
//!
//! Testing notes
//! -------------
//! - Unit tests below cover cancellation, resume/exhaustion semantics,
//!   accessor idempotence, learning-rate mutation, and small-scale
//!   convergence; full benchmarks live in the integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::optimization::adam::finite_diff::forward_difference_gradient;
use crate::optimization::adam::traits::{AdamOptions, GradientReduction, StochasticObjective};
use crate::optimization::adam::validation::{
    validate_initial_parameters, validate_learning_rates, verify_learning_rate,
};
use crate::optimization::errors::{OptError, OptResult};
use crate::risk::measures::left_tail_unchecked;
use crate::stochastic::StochasticScalar;

/// Gradient-reduction strategy, fixed at construction.
type Reduction = Box<dyn Fn(&StochasticScalar) -> StochasticScalar + Send + Sync>;

/// Cloneable handle for requesting cooperative cancellation.
///
/// Obtained from [`AdamOptimizer::stop_handle`] before `run()` blocks the
/// owning thread; may be moved to any other thread. Setting the flag takes
/// effect at the next iteration boundary, never pre-emptively.
#[derive(Debug, Clone)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// Request that the optimizer stop before its next iteration.
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

/// Finite-difference Adam optimizer over an ensemble-valued parameter vector.
///
/// Owns the live iterate and all optimizer state; hands out read-only
/// snapshots via [`AdamOptimizer::best_fit_parameters`] and
/// [`AdamOptimizer::last_parameters`]. The objective is borrowed behavior:
/// injected at construction, evaluated fresh on every call, never cached.
pub struct AdamOptimizer<F> {
    objective: F,
    options: AdamOptions,
    reduce: Reduction,
    learning_rate: Vec<f64>,
    parameters: Vec<StochasticScalar>,
    first_moment: Vec<StochasticScalar>,
    second_moment: Vec<StochasticScalar>,
    iteration: usize,
    best_value: Option<f64>,
    best_parameters: Option<Vec<StochasticScalar>>,
    stop_requested: Arc<AtomicBool>,
}

impl<F> AdamOptimizer<F>
where
    F: StochasticObjective + Sync,
{
    /// Create an optimizer at the given starting point.
    ///
    /// Purpose
    /// -------
    /// Validate the configuration and starting point, broadcast the scalar
    /// learning rate over all dimensions, zero-initialize both moment
    /// vectors, and resolve the gradient-reduction mode into its strategy
    /// closure.
    ///
    /// Parameters
    /// ----------
    /// - `objective`: loss to minimize; any
    ///   `Fn(&[StochasticScalar]) -> OptResult<StochasticScalar>` closure or
    ///   [`StochasticObjective`] implementation.
    /// - `initial_parameters`: one plain value per free dimension; in
    ///   pathwise mode the parameters become ensembles as soon as the first
    ///   ensemble-valued gradient arrives.
    /// - `options`: validated configuration; re-checked here because the
    ///   fields are public.
    ///
    /// # Errors
    /// - Any [`AdamOptions::validate`] violation.
    /// - [`OptError::EmptyParameterVector`] /
    ///   [`OptError::InvalidInitialParameter`] for a bad starting point.
    pub fn new(objective: F, initial_parameters: &[f64], options: AdamOptions) -> OptResult<Self> {
        options.validate()?;
        validate_initial_parameters(initial_parameters)?;

        let reduce: Reduction = match options.reduction {
            GradientReduction::Average => {
                Box::new(|g: &StochasticScalar| StochasticScalar::scalar(g.average()))
            }
            GradientReduction::TailRisk { alpha } => Box::new(move |g: &StochasticScalar| {
                // Worst-case-weighted gradient: -ES_alpha(-g). Alpha was
                // validated by AdamOptions::validate.
                StochasticScalar::scalar(-left_tail_unchecked(&-g, alpha).average())
            }),
            GradientReduction::Pathwise => Box::new(|g: &StochasticScalar| g.clone()),
        };

        let dim = initial_parameters.len();
        Ok(Self {
            objective,
            learning_rate: vec![options.learning_rate; dim],
            options,
            reduce,
            parameters: initial_parameters
                .iter()
                .map(|&value| StochasticScalar::scalar(value))
                .collect(),
            first_moment: vec![StochasticScalar::scalar(0.0); dim],
            second_moment: vec![StochasticScalar::scalar(0.0); dim],
            iteration: 0,
            best_value: None,
            best_parameters: None,
            stop_requested: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Drive the state machine to `STOPPED` or `EXHAUSTED`.
    ///
    /// Blocking. Resumes from the current state: a second call after
    /// exhaustion performs no further iterations, and a stop requested at
    /// any earlier time (including before the first call) is honored before
    /// the next iteration begins. Cancellation is not an error — a cancelled
    /// run returns `Ok` with whatever best point had been found.
    ///
    /// # Errors
    /// Propagates a failing or non-finite *base* objective evaluation; the
    /// state recorded up to that iteration (best point, moments) remains
    /// intact and retrievable.
    pub fn run(&mut self) -> OptResult<()> {
        while self.iteration < self.options.iterations
            && !self.stop_requested.load(Ordering::Relaxed)
        {
            self.step()?;
        }
        Ok(())
    }

    /// Request cooperative cancellation from the owning thread.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::Relaxed);
    }

    /// Handle for requesting cancellation from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle { flag: Arc::clone(&self.stop_requested) }
    }

    /// Parameter vector with the lowest observed objective expectation, or
    /// `None` if no iteration has completed yet.
    pub fn best_fit_parameters(&self) -> Option<&[StochasticScalar]> {
        self.best_parameters.as_deref()
    }

    /// Lowest observed objective expectation, or `None` before the first
    /// completed iteration.
    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    /// The most recently computed iterate (not necessarily the best).
    pub fn last_parameters(&self) -> &[StochasticScalar] {
        &self.parameters
    }

    /// Number of iterations completed so far across all `run()` calls.
    pub fn iterations_completed(&self) -> usize {
        self.iteration
    }

    /// Replace the per-dimension learning rates between iterations.
    ///
    /// # Errors
    /// - [`OptError::LearningRateDimMismatch`] if `rates` does not match the
    ///   parameter dimension.
    /// - [`OptError::InvalidLearningRate`] for a non-finite or non-positive
    ///   entry.
    pub fn set_learning_rate(&mut self, rates: &[f64]) -> OptResult<()> {
        validate_learning_rates(rates, self.parameters.len())?;
        self.learning_rate.copy_from_slice(rates);
        Ok(())
    }

    /// Override the learning rate of a single dimension.
    ///
    /// # Errors
    /// - [`OptError::LearningRateIndexOutOfRange`] for a bad index.
    /// - [`OptError::InvalidLearningRate`] for a bad rate.
    pub fn set_learning_rate_for(&mut self, index: usize, rate: f64) -> OptResult<()> {
        if index >= self.parameters.len() {
            return Err(OptError::LearningRateIndexOutOfRange {
                index,
                dimension: self.parameters.len(),
            });
        }
        verify_learning_rate(rate)?;
        self.learning_rate[index] = rate;
        Ok(())
    }

    /// One full iteration: evaluate, record best, differentiate, update.
    fn step(&mut self) -> OptResult<()> {
        let value = self.objective.value(&self.parameters)?;
        let comparison = value.average();
        if !comparison.is_finite() {
            return Err(OptError::NonFiniteObjective { value: comparison });
        }
        if self.best_value.map_or(true, |best| comparison < best) {
            self.best_value = Some(comparison);
            self.best_parameters = Some(self.parameters.clone());
        }

        let gradient = forward_difference_gradient(&self.objective, &self.parameters, &value);

        let k = self.iteration;
        let (beta1, beta2) = self.options.betas;
        let bias1 = 1.0 - beta1.powi(k as i32 + 1);
        let bias2 = 1.0 - beta2.powi(k as i32 + 1);

        for (i, entry) in gradient.into_iter().enumerate() {
            let Some(raw) = entry else {
                // Locally recovered: this dimension keeps its parameter and
                // moments for this iteration.
                continue;
            };
            let g = (self.reduce)(&raw);

            self.first_moment[i] =
                &(&self.first_moment[i] * beta1) + &(&g * (1.0 - beta1));
            self.second_moment[i] =
                &(&self.second_moment[i] * beta2) + &(&g.squared() * (1.0 - beta2));

            let corrected_m = &self.first_moment[i] / bias1;
            let corrected_v = &self.second_moment[i] / bias2;
            let direction = &corrected_m / &(&corrected_v.sqrt() + self.options.epsilon);

            self.parameters[i] =
                (&self.parameters[i] - &(&direction * self.learning_rate[i])).detach();
        }

        self.iteration += 1;
        if k % 100 == 0 {
            debug!(iteration = k, value = comparison, "adam iteration");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Cancellation before and during a run, and stop persistence.
    // - Resume/exhaustion semantics of repeated `run()` calls.
    // - Best-point tracking and accessor idempotence.
    // - Learning-rate mutation rules.
    // - Convergence on a one-dimensional quadratic.
    // - Fatality of base-evaluation failures.
    //
    // They intentionally DO NOT cover:
    // - The Rosenbrock benchmark and pathwise equivalence (see
    //   `tests/integration_calibration.rs`).
    // -------------------------------------------------------------------------

    fn quadratic_towards(target: f64) -> impl Fn(&[StochasticScalar]) -> OptResult<StochasticScalar> + Sync
    {
        move |p: &[StochasticScalar]| Ok((&p[0] - target).squared())
    }

    #[test]
    // Purpose
    // -------
    // A stop requested before `run()` yields zero iterations and leaves the
    // best point at its sentinel.
    fn stop_before_run_executes_zero_iterations() {
        let options = AdamOptions::with_defaults(100, GradientReduction::Average)
            .expect("options should be valid");
        let mut optimizer = AdamOptimizer::new(quadratic_towards(3.0), &[0.0], options)
            .expect("optimizer should construct");

        optimizer.stop();
        optimizer.run().expect("cancelled run returns normally");

        assert_eq!(optimizer.iterations_completed(), 0);
        assert!(optimizer.best_fit_parameters().is_none());
        assert!(optimizer.best_value().is_none());

        // A stopped optimizer stays stopped.
        optimizer.run().expect("cancelled run returns normally");
        assert_eq!(optimizer.iterations_completed(), 0);
    }

    #[test]
    // Purpose
    // -------
    // A stop handle works from another thread while `run()` blocks.
    fn stop_handle_cancels_from_another_thread() {
        let options = AdamOptions::with_defaults(2_000_000, GradientReduction::Average)
            .expect("options should be valid");
        let mut optimizer = AdamOptimizer::new(quadratic_towards(1.0), &[0.0], options)
            .expect("optimizer should construct");
        let handle = optimizer.stop_handle();

        let stopper = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            handle.request_stop();
        });
        optimizer.run().expect("cancelled run returns normally");
        stopper.join().expect("stopper thread should finish");

        assert!(optimizer.iterations_completed() < 2_000_000);
        assert!(optimizer.best_fit_parameters().is_some());
    }

    #[test]
    // Purpose
    // -------
    // `run()` resumes rather than resets: after exhaustion a second call
    // performs no further iterations.
    fn run_resumes_and_exhausts_the_budget_once() {
        let options = AdamOptions::with_defaults(5, GradientReduction::Average)
            .expect("options should be valid");
        let mut optimizer = AdamOptimizer::new(quadratic_towards(1.0), &[0.0], options)
            .expect("optimizer should construct");

        optimizer.run().expect("run should succeed");
        assert_eq!(optimizer.iterations_completed(), 5);

        optimizer.run().expect("run should succeed");
        assert_eq!(optimizer.iterations_completed(), 5);
    }

    #[test]
    // Purpose
    // -------
    // Accessors are read-only snapshots: two calls without an intervening
    // `run()` return identical values.
    fn best_fit_accessor_is_idempotent() {
        let options = AdamOptions::with_defaults(50, GradientReduction::Average)
            .expect("options should be valid");
        let mut optimizer = AdamOptimizer::new(quadratic_towards(2.0), &[0.0], options)
            .expect("optimizer should construct");
        optimizer.run().expect("run should succeed");

        let first: Vec<StochasticScalar> =
            optimizer.best_fit_parameters().expect("best exists").to_vec();
        let second: Vec<StochasticScalar> =
            optimizer.best_fit_parameters().expect("best exists").to_vec();

        assert_eq!(first, second);
        assert_eq!(optimizer.best_value(), optimizer.best_value());
    }

    #[test]
    // Purpose
    // -------
    // Adam with averaged gradients calibrates a one-dimensional quadratic.
    //
    // Given
    // -----
    // - f(p) = (p − 3)², start 0, learning rate 0.05, 2000 iterations.
    //
    // Expect
    // ------
    // - Best parameter within 1e-2 of 3.
    fn quadratic_converges_in_average_mode() {
        let options = AdamOptions::new(2000, 0.05, 1e-8, (0.9, 0.999), GradientReduction::Average)
            .expect("options should be valid");
        let mut optimizer = AdamOptimizer::new(quadratic_towards(3.0), &[0.0], options)
            .expect("optimizer should construct");

        optimizer.run().expect("run should succeed");

        let best = optimizer.best_fit_parameters().expect("best exists");
        assert_abs_diff_eq!(best[0].average(), 3.0, epsilon = 1e-2);
        assert!(optimizer.best_value().expect("best value exists") < 1e-3);

        // The live iterate is exposed too, and has the same dimension.
        assert_eq!(optimizer.last_parameters().len(), 1);
    }

    #[test]
    // Purpose
    // -------
    // A failing base evaluation is fatal and propagates out of `run()`,
    // leaving previously recorded state intact.
    fn failing_base_evaluation_is_fatal() {
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let objective = move |p: &[StochasticScalar]| -> OptResult<StochasticScalar> {
            // Fail the third *base* evaluation. Base evaluations happen once
            // per iteration as the first call of that iteration.
            let call = calls.fetch_add(1, Ordering::Relaxed);
            if call >= 4 && p.len() == 1 && call % 2 == 0 {
                return Err(OptError::ObjectiveFailed { text: "simulation blew up".to_string() });
            }
            Ok((&p[0] - 1.0).squared())
        };
        let options = AdamOptions::with_defaults(100, GradientReduction::Average)
            .expect("options should be valid");
        let mut optimizer = AdamOptimizer::new(objective, &[0.0], options)
            .expect("optimizer should construct");

        let err = optimizer.run().expect_err("base failure should abort the run");

        assert!(matches!(err, OptError::ObjectiveFailed { .. }));
        assert!(optimizer.iterations_completed() >= 1);
        assert!(optimizer.best_fit_parameters().is_some());
    }

    #[test]
    // Purpose
    // -------
    // Learning-rate mutation enforces dimension and positivity rules and
    // takes effect for subsequent iterations.
    fn learning_rate_mutation_rules() {
        let options = AdamOptions::with_defaults(10, GradientReduction::Average)
            .expect("options should be valid");
        let mut optimizer =
            AdamOptimizer::new(quadratic_towards(1.0), &[0.0, 0.0], options)
                .expect("optimizer should construct");

        assert!(optimizer.set_learning_rate(&[0.1, 0.2]).is_ok());
        assert!(matches!(
            optimizer.set_learning_rate(&[0.1]),
            Err(OptError::LearningRateDimMismatch { .. })
        ));
        assert!(optimizer.set_learning_rate_for(1, 0.5).is_ok());
        assert!(matches!(
            optimizer.set_learning_rate_for(2, 0.5),
            Err(OptError::LearningRateIndexOutOfRange { .. })
        ));
        assert!(matches!(
            optimizer.set_learning_rate_for(0, -0.5),
            Err(OptError::InvalidLearningRate { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Tail-risk reduction on a deterministic objective degenerates to the
    // average reduction (the gradient ensemble has zero variance), so the
    // quadratic still converges.
    fn tail_risk_mode_handles_deterministic_objectives() {
        let options = AdamOptions::new(
            2000,
            0.05,
            1e-8,
            (0.9, 0.999),
            GradientReduction::TailRisk { alpha: 0.05 },
        )
        .expect("options should be valid");
        let mut optimizer = AdamOptimizer::new(quadratic_towards(-2.0), &[1.0], options)
            .expect("optimizer should construct");

        optimizer.run().expect("run should succeed");

        let best = optimizer.best_fit_parameters().expect("best exists");
        assert_abs_diff_eq!(best[0].average(), -2.0, epsilon = 1e-2);
    }
}
