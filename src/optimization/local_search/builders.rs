//! local_search::builders — construct L-BFGS solvers from options.
//!
//! Purpose
//! -------
//! Turn a [`LocalSearchOptions`] into a ready-to-run L-BFGS solver with the
//! requested line search, history size, and tolerances. Initial parameters
//! and the iteration cap are applied by the runner, not here.
//!
//! Conventions
//! -----------
//! - A `None` tolerance leaves Argmin's default for that stopping rule.
//! - Argmin configuration errors are converted to [`OptError`] through
//!   `From<argmin::core::Error>`.
//!
//! [`OptError`]: crate::optimization::errors::OptError
use crate::optimization::{
    errors::OptResult,
    local_search::{
        traits::LocalSearchOptions,
        types::{
            Cost, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente, MoreThuenteLS, Theta,
            DEFAULT_LBFGS_MEM,
        },
    },
};
use argmin::solver::quasinewton::LBFGS;

/// L-BFGS with the Hager–Zhang line search.
///
/// # Errors
/// Propagates tolerance rejections from [`configure_lbfgs`].
pub fn build_optimizer_hager_zhang(opts: &LocalSearchOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with the More–Thuente line search.
///
/// # Errors
/// Propagates tolerance rejections from [`configure_lbfgs`].
pub fn build_optimizer_more_thuente(opts: &LocalSearchOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply the optional gradient and cost-change tolerances to any L-BFGS
/// solver, regardless of its line search.
///
/// # Errors
/// Argmin rejections of `with_tolerance_grad` / `with_tolerance_cost`.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &LocalSearchOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::local_search::traits::{LineSearcher, Tolerances};

    // Scope
    // -----
    // Solver construction only; executor behavior is covered by the runner
    // and `minimize` tests.

    #[test]
    // Purpose
    // -------
    // Both builders accept default and explicit memory sizes.
    fn builders_accept_default_and_explicit_memory() {
        let defaults = LocalSearchOptions::default();
        assert!(build_optimizer_more_thuente(&defaults).is_ok());
        assert!(build_optimizer_hager_zhang(&defaults).is_ok());

        let explicit =
            LocalSearchOptions::new(Tolerances::default(), LineSearcher::HagerZhang, false, Some(11))
                .expect("options should be valid");
        assert!(build_optimizer_hager_zhang(&explicit).is_ok());
        assert!(build_optimizer_more_thuente(&explicit).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Absent tolerances leave the solver constructible on Argmin defaults.
    //
    // Given
    // -----
    // - Only an iteration cap is configured.
    //
    // Expect
    // ------
    // - `configure_lbfgs` returns `Ok(_)`.
    fn configure_lbfgs_respects_absent_tolerances() {
        let raw = LBFGS::new(MoreThuenteLS::new(), DEFAULT_LBFGS_MEM);
        let tols = Tolerances::new(None, None, Some(50)).expect("tolerances should be valid");
        let opts = LocalSearchOptions::new(tols, LineSearcher::MoreThuente, false, None)
            .expect("options should be valid");

        assert!(configure_lbfgs(raw, &opts).is_ok());
    }
}
