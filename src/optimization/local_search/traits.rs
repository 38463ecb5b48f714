//! Public API surface for local refinement.
//!
//! - [`Objective`]: trait implemented by anything the optimizers minimize.
//! - [`LocalSearchOptions`] and [`Tolerances`]: solver configuration.
//! - [`LineSearcher`]: line search used by L-BFGS.
//! - [`LocalOutcome`]: normalized result of one local refinement.
//!
//! Convention: objectives are *minimized* as-is. Analytic gradients, when
//! provided, are gradients of the objective itself.
use crate::optimization::{
    errors::{OptError, OptResult},
    local_search::{
        types::{Cost, FnEvalMap, Grad, Theta},
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::TerminationStatus;
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// Scalar objective minimized by local refinement and basin hopping.
///
/// Required:
/// - `value(&Theta) -> OptResult<Cost>`: evaluate `f(θ)`. Failures of the
///   underlying system (oracle, metrics) must come back as the matching
///   [`OptError`] wrapper so the search can tell them from solver trouble.
/// - `check(&Theta) -> OptResult<()>`: reject obviously invalid `θ` before
///   optimization starts.
///
/// Optional:
/// - `grad(&Theta) -> OptResult<Grad>`: analytic gradient. When absent,
///   finite differences of `value` are used.
pub trait Objective {
    fn value(&self, theta: &Theta) -> OptResult<Cost>;
    fn check(&self, theta: &Theta) -> OptResult<()>;

    fn grad(&self, _theta: &Theta) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

impl<T: Objective + ?Sized> Objective for &T {
    fn value(&self, theta: &Theta) -> OptResult<Cost> {
        (**self).value(theta)
    }

    fn check(&self, theta: &Theta) -> OptResult<()> {
        (**self).check(theta)
    }

    fn grad(&self, theta: &Theta) -> OptResult<Grad> {
        (**self).grad(theta)
    }
}

/// Choice of line search used inside the L-BFGS solver.
///
/// Parses case-insensitively from `"MoreThuente"` / `"HagerZhang"`; unknown
/// names return [`OptError::InvalidLineSearch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Tolerance applied to both gradient norm and cost change by default.
pub const DEFAULT_LOCAL_TOL: f64 = 1e-4;

/// Iteration cap of one local refinement by default.
pub const DEFAULT_LOCAL_MAX_ITER: usize = 15_000;

/// Local solver configuration.
///
/// Fields:
/// - `tols`: stopping rules.
/// - `line_searcher`: line search used by L-BFGS.
/// - `verbose`: attach the slog observer (behind the `obs_slog` feature).
/// - `lbfgs_mem`: history size, `None` for [`DEFAULT_LBFGS_MEM`](super::DEFAULT_LBFGS_MEM).
///
/// Default: `tol_grad = tol_cost = 1e-4`, `max_iter = 15000`, More–Thuente,
/// quiet, default memory.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSearchOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl LocalSearchOptions {
    /// # Errors
    /// [`OptError::InvalidLBFGSMem`] if `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if lbfgs_mem == Some(0) {
            return Err(OptError::InvalidLBFGSMem {
                mem: 0,
                reason: "L-BFGS memory must be greater than zero.",
            });
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for LocalSearchOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances::default(),
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Numerical tolerances and iteration limits.
///
/// - `tol_grad`: stop when the gradient norm falls below this threshold.
/// - `tol_cost`: stop when the change in cost falls below this threshold.
/// - `max_iter`: hard cap on iterations.
///
/// At least one of the three must be provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == Some(0)`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if max_iter == Some(0) {
            return Err(OptError::InvalidMaxIter {
                max_iter: 0,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }

    /// Same tolerance on gradient norm and cost change.
    pub fn uniform(tol: f64) -> OptResult<Self> {
        Self::new(Some(tol), Some(tol), Some(DEFAULT_LOCAL_MAX_ITER))
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            tol_grad: Some(DEFAULT_LOCAL_TOL),
            tol_cost: Some(DEFAULT_LOCAL_TOL),
            max_iter: Some(DEFAULT_LOCAL_MAX_ITER),
        }
    }
}

/// Result of one local refinement.
///
/// - `theta_hat`: best parameter vector found (inside the bounds, if any).
/// - `value`: objective at `theta_hat`.
/// - `converged`: solver reported a terminating status.
/// - `status`: human-readable termination status.
/// - `iterations`: solver iterations performed.
/// - `fn_evals`: argmin counters (`cost_count`, `gradient_count`, ...).
/// - `grad_norm`: norm of the last gradient, if available.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl LocalOutcome {
    /// Build a validated outcome from raw solver state.
    ///
    /// # Errors
    /// Propagates validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            other => (true, format!("{other:?}")),
        };
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm,
        })
    }

    /// Number of objective evaluations the solver reported.
    pub fn cost_count(&self) -> u64 {
        self.fn_evals.get("cost_count").copied().unwrap_or(0)
    }
}
