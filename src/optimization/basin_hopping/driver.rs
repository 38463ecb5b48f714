//! basin_hopping::driver — the global search state machine.
//!
//! Purpose
//! -------
//! Minimize a non-convex [`Objective`] by alternating random perturbation,
//! local refinement and a Metropolis acceptance test, keeping the best local
//! minimum ever seen.
//!
//! Key behaviors
//! -------------
//! - INIT: validate `x0`, refine it locally. If the refinement fails for a
//!   solver reason, `x0` is evaluated directly and used as the start.
//! - Each iteration: PERTURB the current point (uniform, projected into the
//!   refiner's bounds), LOCAL_MINIMIZE it, ACCEPT_TEST it against the current
//!   objective, update the best point on strict improvement, feed the
//!   acceptance into [`AdaptiveStep`].
//! - Terminates after `n_iter` iterations or when the cancellation token is
//!   set (checked between iterations; the objective checks it between
//!   evaluations).
//!
//! Invariants & assumptions
//! ------------------------
//! - `best.objective` never increases across the trace.
//! - The best point is always a completed local minimum (or the directly
//!   evaluated start), never a partially evaluated trial.
//! - Objective failures ([`OptError::aborts_search`]) end the run with a
//!   [`HopAbort`] carrying the best point so far; any other refinement error
//!   only rejects its trial.
//! - The RNG is ChaCha8 seeded from `HopOptions::seed` (or a drawn seed that
//!   is logged and reported) on its own stream, so it never replays the case
//!   sampler's draws for the same seed.
//!
//! Testing notes
//! -------------
//! - Unit tests drive the loop with a scripted [`LocalRefiner`] so acceptance,
//!   failure handling and cancellation are checked without a real solver.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::optimization::{
    basin_hopping::{
        accept::Metropolis,
        options::HopOptions,
        outcome::{merge_counts, BestPoint, HopAbort, HopOutcome, IterationRecord, TerminationReason},
        step::{displace, AdaptiveStep},
    },
    cancel::CancellationToken,
    errors::{OptError, OptResult},
    local_search::{
        api::LocalRefiner,
        bounds::project_opt,
        traits::Objective,
        types::{FnEvalMap, Theta},
        validation::validate_theta_input,
    },
};

/// Stream used for the driver's RNG, distinct from the case sampler's.
const HOP_STREAM: u64 = 1;

/// Basin-hopping driver over a [`LocalRefiner`].
pub struct BasinHopping<'a, R: LocalRefiner> {
    refiner: &'a R,
    options: &'a HopOptions,
    cancel: Option<CancellationToken>,
}

impl<'a, R: LocalRefiner> BasinHopping<'a, R> {
    pub fn new(refiner: &'a R, options: &'a HopOptions) -> Self {
        Self { refiner, options, cancel: None }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Run the search from `x0`.
    ///
    /// # Errors
    /// [`HopAbort`] when the options or `x0` are invalid, or an objective
    /// failure occurs.
    /// Cancellation is not an error once a start point exists: the outcome
    /// reports [`TerminationReason::Cancelled`].
    pub fn run<F: Objective>(&self, f: &F, x0: Theta) -> Result<HopOutcome, HopAbort> {
        let opts = self.options;
        opts.validate().map_err(|error| HopAbort { error, best: None })?;
        let seed = opts.seed.unwrap_or_else(|| {
            let drawn = rand::rng().random::<u64>();
            info!(seed = drawn, "no basin-hopping seed configured; drew one");
            drawn
        });
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(HOP_STREAM);

        let mut fn_evals = FnEvalMap::new();
        let mut local_failures = 0usize;
        let mut current = self
            .initial_point(f, x0, &mut fn_evals, &mut local_failures)
            .map_err(|error| HopAbort { error, best: None })?;
        let mut best = current.clone();
        info!(objective = best.objective, "basin hopping initial local minimum");

        let metropolis = Metropolis::new(opts.temperature);
        let mut step =
            AdaptiveStep::new(opts.step_size, opts.interval, opts.target_accept_rate, opts.step_factor);
        let mut trace = Vec::with_capacity(opts.n_iter.min(4096));
        let mut accepted_total = 0usize;
        let mut iterations = 0usize;
        let mut termination = TerminationReason::MaxIterations;

        for iteration in 1..=opts.n_iter {
            if self.is_cancelled() {
                termination = TerminationReason::Cancelled;
                break;
            }
            let trial = displace(&current.theta, step.step(), self.refiner.bounds(), &mut rng);
            let (trial_objective, accepted) = match self.refiner.refine(f, trial) {
                Ok(out) => {
                    merge_counts(&mut fn_evals, &out.fn_evals);
                    let accepted = metropolis.accept(out.value, current.objective, &mut rng);
                    let candidate = BestPoint { theta: out.theta_hat, objective: out.value };
                    if candidate.objective < best.objective {
                        info!(iteration, objective = candidate.objective, "new best local minimum");
                        best = candidate.clone();
                    }
                    if accepted {
                        current = candidate;
                    }
                    (Some(out.value), accepted)
                }
                Err(OptError::Cancelled) => {
                    termination = TerminationReason::Cancelled;
                    break;
                }
                Err(error) if error.aborts_search() => {
                    warn!(iteration, %error, "objective failure; aborting basin hopping");
                    return Err(HopAbort { error, best: Some(best) });
                }
                Err(error) => {
                    local_failures += 1;
                    warn!(iteration, %error, "local refinement failed; trial rejected");
                    (None, false)
                }
            };

            iterations = iteration;
            if accepted {
                accepted_total += 1;
            }
            if let Some(new_step) = step.record(accepted) {
                debug!(iteration, step_size = new_step, "step size adapted");
            }
            info!(
                iteration,
                trial_objective = ?trial_objective,
                accepted,
                best_objective = best.objective,
                "basin hopping iteration"
            );
            trace.push(IterationRecord {
                iteration,
                trial_objective,
                accepted,
                best_objective: best.objective,
                step_size: step.step(),
            });
        }

        Ok(HopOutcome {
            best,
            iterations,
            accepted: accepted_total,
            local_failures,
            final_step_size: step.step(),
            termination,
            trace,
            fn_evals,
            seed,
        })
    }

    fn initial_point<F: Objective>(
        &self, f: &F, x0: Theta, fn_evals: &mut FnEvalMap, local_failures: &mut usize,
    ) -> OptResult<BestPoint> {
        validate_theta_input(&x0)?;
        if let Some(b) = self.refiner.bounds() {
            b.check_dim(x0.len())?;
        }
        let start = project_opt(self.refiner.bounds(), &x0);
        f.check(&start)?;

        match self.refiner.refine(f, start.clone()) {
            Ok(out) => {
                merge_counts(fn_evals, &out.fn_evals);
                Ok(BestPoint { theta: out.theta_hat, objective: out.value })
            }
            Err(error) if error.aborts_search() => Err(error),
            Err(error) => {
                *local_failures += 1;
                warn!(%error, "initial local refinement failed; evaluating the start point directly");
                let objective = f.value(&start)?;
                if !objective.is_finite() {
                    return Err(OptError::NonFiniteCost { value: objective });
                }
                Ok(BestPoint { theta: start, objective })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::local_search::{
        bounds::ParamBounds, traits::LocalOutcome, types::Cost,
    };
    use crate::oracle::OracleError;
    use argmin::core::TerminationStatus;
    use ndarray::array;
    use std::cell::{Cell, RefCell};

    // Scope
    // -----
    // Driver logic with a scripted refiner: the "local minimum" of a trial is
    // the trial itself, and scripted calls fail. Objective values come from
    // a 1-D double well so acceptance decisions are non-trivial.

    struct DoubleWell;

    impl Objective for DoubleWell {
        fn value(&self, theta: &Theta) -> OptResult<Cost> {
            let x = theta[0];
            Ok((x * x - 1.0).powi(2) + 0.1 * x)
        }

        fn check(&self, theta: &Theta) -> OptResult<()> {
            if theta.len() != 1 {
                return Err(OptError::ThetaLengthMismatch { expected: 1, actual: theta.len() });
            }
            Ok(())
        }
    }

    /// Refiner that returns the trial point as its own local minimum, failing
    /// on the scripted call numbers (1-based).
    struct Scripted {
        calls: Cell<usize>,
        failures: RefCell<Vec<(usize, OptError)>>,
        bounds: Option<ParamBounds>,
        cancel_on: Option<(usize, CancellationToken)>,
    }

    impl Scripted {
        fn new() -> Self {
            Self { calls: Cell::new(0), failures: RefCell::new(Vec::new()), bounds: None, cancel_on: None }
        }

        fn failing(self, call: usize, error: OptError) -> Self {
            self.failures.borrow_mut().push((call, error));
            self
        }
    }

    impl LocalRefiner for Scripted {
        fn refine<F: Objective>(&self, f: &F, theta0: Theta) -> OptResult<LocalOutcome> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            if let Some((at, token)) = &self.cancel_on {
                if *at == n {
                    token.cancel();
                }
            }
            if let Some((_, e)) = self.failures.borrow().iter().find(|(at, _)| *at == n) {
                return Err(e.clone());
            }
            let value = f.value(&theta0)?;
            LocalOutcome::new(
                Some(theta0),
                value,
                TerminationStatus::NotTerminated,
                1,
                FnEvalMap::from([("cost_count".to_string(), 1)]),
                None,
            )
        }

        fn bounds(&self) -> Option<&ParamBounds> {
            self.bounds.as_ref()
        }
    }

    fn opts(n_iter: usize, seed: u64) -> HopOptions {
        HopOptions { n_iter, step_size: 0.5, seed: Some(seed), ..HopOptions::default() }
    }

    #[test]
    // Purpose
    // -------
    // The best objective is non-increasing across the trace and equals the
    // minimum of the initial value and every evaluated trial.
    fn best_objective_is_monotone_and_minimal() {
        let refiner = Scripted::new();
        let options = opts(200, 7);
        let out = BasinHopping::new(&refiner, &options).run(&DoubleWell, array![1.5]).unwrap();

        assert_eq!(out.iterations, 200);
        assert_eq!(out.termination, TerminationReason::MaxIterations);
        assert!(out.trace.windows(2).all(|w| w[1].best_objective <= w[0].best_objective));

        let initial = DoubleWell.value(&array![1.5]).unwrap();
        let min_trial = out.trace.iter().filter_map(|r| r.trial_objective).fold(initial, f64::min);
        assert_eq!(out.best.objective, min_trial);
        assert_eq!(DoubleWell.value(&out.best.theta).unwrap(), out.best.objective);
        assert_eq!(out.fn_evals["cost_count"], 201);
    }

    #[test]
    // Purpose
    // -------
    // Same seed, same trajectory.
    fn seeded_runs_are_reproducible() {
        let options = opts(50, 11);
        let a = BasinHopping::new(&Scripted::new(), &options).run(&DoubleWell, array![0.3]).unwrap();
        let b = BasinHopping::new(&Scripted::new(), &options).run(&DoubleWell, array![0.3]).unwrap();
        assert_eq!(a.trace, b.trace);
        assert_eq!(a.seed, 11);
    }

    #[test]
    // Purpose
    // -------
    // A solver failure rejects only its trial; an oracle failure aborts and
    // carries the last completed best point.
    //
    // Given
    // -----
    // - Call 3 (2nd trial) fails with a line-search error.
    // - Call 5 (4th trial) fails with an oracle write error.
    //
    // Expect
    // ------
    // - HopAbort with the oracle error and `best` equal to the best of the
    //   initial point and trials 1 and 3.
    fn solver_failure_rejects_oracle_failure_aborts() {
        let refiner = Scripted::new()
            .failing(3, OptError::ConditionViolated { text: "line search".into() })
            .failing(5, OptError::Oracle(OracleError::Write { path: "/K/PRE_EXP/9".into() }));
        let options = opts(10, 3);
        let abort = BasinHopping::new(&refiner, &options).run(&DoubleWell, array![1.0]).unwrap_err();

        assert_eq!(abort.error, OptError::Oracle(OracleError::Write { path: "/K/PRE_EXP/9".into() }));
        let best = abort.best.expect("a best point exists after init");
        assert!(best.objective <= DoubleWell.value(&array![1.0]).unwrap());
        assert_eq!(refiner.calls.get(), 5);
    }

    #[test]
    // Purpose
    // -------
    // A solver failure during INIT falls back to evaluating x0 directly; an
    // objective failure during INIT aborts with no best point.
    fn init_fallback_and_init_abort() {
        let refiner = Scripted::new().failing(1, OptError::NonFiniteCost { value: f64::NAN });
        let options = opts(0, 1);
        let out = BasinHopping::new(&refiner, &options).run(&DoubleWell, array![2.0]).unwrap();
        assert_eq!(out.best.theta, array![2.0]);
        assert_eq!(out.local_failures, 1);
        assert_eq!(out.iterations, 0);

        let refiner = Scripted::new().failing(1, OptError::Oracle(OracleError::SessionClosed));
        let abort = BasinHopping::new(&refiner, &options).run(&DoubleWell, array![2.0]).unwrap_err();
        assert_eq!(abort.best, None);
    }

    #[test]
    // Purpose
    // -------
    // Cancellation stops the loop between iterations with the best point so
    // far and reason Cancelled.
    fn cancellation_stops_between_iterations() {
        let token = CancellationToken::new();
        let mut refiner = Scripted::new();
        refiner.cancel_on = Some((4, token.clone()));
        let options = opts(100, 5);
        let out = BasinHopping::new(&refiner, &options)
            .with_cancellation(token)
            .run(&DoubleWell, array![0.0])
            .unwrap();

        assert_eq!(out.termination, TerminationReason::Cancelled);
        assert_eq!(out.iterations, 3);
        assert_eq!(out.trace.len(), 3);
    }

    #[test]
    // Purpose
    // -------
    // Perturbed trials stay inside the refiner's bounds; an invalid start is
    // rejected before any refinement.
    fn trials_respect_bounds_and_invalid_start_aborts() {
        let mut refiner = Scripted::new();
        refiner.bounds = Some(ParamBounds::new(array![-0.2], array![0.2]).unwrap());
        let options = opts(30, 9);
        let out = BasinHopping::new(&refiner, &options).run(&DoubleWell, array![5.0]).unwrap();
        assert!(out.best.theta[0].abs() <= 0.2);

        let abort = BasinHopping::new(&Scripted::new(), &options)
            .run(&DoubleWell, array![f64::NAN])
            .unwrap_err();
        assert!(matches!(abort.error, OptError::InvalidThetaInput { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Out-of-range options built as struct literals abort before the first
    // refinement instead of reaching the perturbation step.
    //
    // Given
    // -----
    // - step_size -0.5.
    //
    // Expect
    // ------
    // - HopAbort naming step_size, no best point, refiner never called.
    fn invalid_options_abort_before_refinement() {
        let refiner = Scripted::new();
        let options = HopOptions { step_size: -0.5, ..opts(10, 1) };
        let abort = BasinHopping::new(&refiner, &options).run(&DoubleWell, array![1.0]).unwrap_err();
        assert!(matches!(abort.error, OptError::InvalidHopOption { name: "step_size", .. }));
        assert_eq!(abort.best, None);
        assert_eq!(refiner.calls.get(), 0);
    }
}
