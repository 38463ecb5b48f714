//! High-level entry points for local refinement.
//!
//! [`minimize`] runs one bounded L-BFGS refinement of an [`Objective`].
//! [`LocalRefiner`] is the seam the global search uses to ask for a local
//! minimum; [`LbfgsRefiner`] implements it on top of [`minimize`].
use crate::optimization::{
    errors::OptResult,
    local_search::{
        adapter::ArgMinAdapter,
        bounds::{project_opt, ParamBounds},
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LocalOutcome, LocalSearchOptions, Objective},
        types::Theta,
        validation::validate_theta_input,
    },
};

/// Minimize `f` from `theta0` with L-BFGS and the chosen line search.
///
/// # Behavior
/// - Rejects non-finite starting points and bounds of the wrong dimension.
/// - Projects `theta0` into `bounds` and validates it with `f.check`.
/// - Builds the solver from `opts` and runs it through [`run_lbfgs`].
///
/// # Errors
/// - [`OptError::InvalidThetaInput`](crate::optimization::errors::OptError::InvalidThetaInput),
///   [`OptError::BoundsDimMismatch`](crate::optimization::errors::OptError::BoundsDimMismatch).
/// - Anything `f.check` returns.
/// - Solver and objective failures from [`run_lbfgs`].
pub fn minimize<F: Objective>(
    f: &F, theta0: Theta, opts: &LocalSearchOptions, bounds: Option<&ParamBounds>,
) -> OptResult<LocalOutcome> {
    validate_theta_input(&theta0)?;
    if let Some(b) = bounds {
        b.check_dim(theta0.len())?;
    }
    let theta0 = project_opt(bounds, &theta0);
    f.check(&theta0)?;
    let problem = ArgMinAdapter::new(f, bounds);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

/// Produces a local minimum of an objective near a starting point.
pub trait LocalRefiner {
    /// # Errors
    /// Objective failures must be returned unchanged so callers can tell
    /// them apart from solver trouble
    /// ([`OptError::aborts_search`](crate::optimization::errors::OptError::aborts_search)).
    fn refine<F: Objective>(&self, f: &F, theta0: Theta) -> OptResult<LocalOutcome>;

    /// Bounds applied to every point the refiner evaluates, if any.
    fn bounds(&self) -> Option<&ParamBounds> {
        None
    }
}

/// [`LocalRefiner`] backed by bounded L-BFGS.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LbfgsRefiner {
    opts: LocalSearchOptions,
    bounds: Option<ParamBounds>,
}

impl LbfgsRefiner {
    pub fn new(opts: LocalSearchOptions, bounds: Option<ParamBounds>) -> Self {
        Self { opts, bounds }
    }

    pub fn options(&self) -> &LocalSearchOptions {
        &self.opts
    }
}

impl LocalRefiner for LbfgsRefiner {
    fn refine<F: Objective>(&self, f: &F, theta0: Theta) -> OptResult<LocalOutcome> {
        minimize(f, theta0, &self.opts, self.bounds.as_ref())
    }

    fn bounds(&self) -> Option<&ParamBounds> {
        self.bounds.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{errors::OptError, local_search::types::Cost};
    use crate::oracle::OracleError;
    use ndarray::array;
    use std::cell::Cell;

    // Scope
    // -----
    // End-to-end local refinement on toy objectives: convergence, bounds,
    // line-search choice, and propagation of objective failures.

    struct Bowl {
        center: Theta,
    }

    impl Objective for Bowl {
        fn value(&self, theta: &Theta) -> OptResult<Cost> {
            Ok((theta - &self.center).mapv(|d| d * d).sum())
        }

        fn check(&self, theta: &Theta) -> OptResult<()> {
            if theta.len() != self.center.len() {
                return Err(OptError::ThetaLengthMismatch {
                    expected: self.center.len(),
                    actual: theta.len(),
                });
            }
            Ok(())
        }
    }

    struct FailsAfter {
        calls: Cell<usize>,
        limit: usize,
    }

    impl Objective for FailsAfter {
        fn value(&self, theta: &Theta) -> OptResult<Cost> {
            self.calls.set(self.calls.get() + 1);
            if self.calls.get() > self.limit {
                return Err(OptError::Oracle(OracleError::SimulationDiverged {
                    reason: "scripted".into(),
                }));
            }
            Ok(theta.dot(theta) + 1.0)
        }

        fn check(&self, _theta: &Theta) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // Both line searches find the minimum of a shifted quadratic bowl.
    fn minimize_finds_bowl_center_with_both_line_searches() {
        let f = Bowl { center: array![1.0, -2.0] };
        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            let opts = LocalSearchOptions { line_searcher: ls, ..LocalSearchOptions::default() };
            let out = minimize(&f, array![0.0, 0.0], &opts, None).unwrap();
            assert!((out.theta_hat[0] - 1.0).abs() < 1e-2, "{ls:?}: {:?}", out.theta_hat);
            assert!((out.theta_hat[1] + 2.0).abs() < 1e-2, "{ls:?}: {:?}", out.theta_hat);
            assert!(out.value < 1e-3);
        }
    }

    #[test]
    // Purpose
    // -------
    // With the unconstrained optimum outside the box, the result lies on the
    // boundary and inside the bounds.
    //
    // Given
    // -----
    // - Bowl centered at (1, -2); box [0, 0.5] × [-1, 1].
    //
    // Expect
    // ------
    // - theta_hat is within the box and close to (0.5, -1).
    fn minimize_respects_bounds() {
        let f = Bowl { center: array![1.0, -2.0] };
        let bounds = ParamBounds::new(array![0.0, -1.0], array![0.5, 1.0]).unwrap();
        let refiner = LbfgsRefiner::new(LocalSearchOptions::default(), Some(bounds.clone()));
        let out = refiner.refine(&f, array![0.25, 0.0]).unwrap();

        assert!(bounds.contains(&out.theta_hat));
        assert!((out.theta_hat[0] - 0.5).abs() < 1e-2);
        assert!((out.theta_hat[1] + 1.0).abs() < 1e-2);
        assert_eq!(refiner.bounds(), Some(&bounds));
    }

    #[test]
    // Purpose
    // -------
    // An oracle failure mid-search comes back as an oracle error, not as a
    // generic solver error.
    fn minimize_propagates_objective_failure_kind() {
        let f = FailsAfter { calls: Cell::new(0), limit: 4 };
        let err = minimize(&f, array![3.0, 3.0], &LocalSearchOptions::default(), None).unwrap_err();

        assert!(matches!(err, OptError::Oracle(OracleError::SimulationDiverged { .. })));
        assert!(err.aborts_search());
    }

    #[test]
    // Purpose
    // -------
    // Invalid inputs are rejected before any evaluation.
    fn minimize_rejects_invalid_inputs() {
        let f = Bowl { center: array![0.0, 0.0] };
        let opts = LocalSearchOptions::default();
        assert!(matches!(
            minimize(&f, array![f64::NAN, 0.0], &opts, None),
            Err(OptError::InvalidThetaInput { index: 0, .. })
        ));
        let bounds = ParamBounds::new(array![0.0], array![1.0]).unwrap();
        assert!(matches!(
            minimize(&f, array![0.0, 0.0], &opts, Some(&bounds)),
            Err(OptError::BoundsDimMismatch { .. })
        ));
        assert!(matches!(
            minimize(&f, array![0.0], &opts, None),
            Err(OptError::ThetaLengthMismatch { .. })
        ));
    }
}
