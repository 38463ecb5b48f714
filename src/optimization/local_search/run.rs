//! Execution helper that runs an `argmin` solver on an [`ArgMinAdapter`] and
//! returns a [`LocalOutcome`].
use crate::optimization::{
    errors::OptResult,
    local_search::{
        adapter::ArgMinAdapter,
        bounds::project_opt,
        traits::{LocalOutcome, LocalSearchOptions, Objective},
        types::{Grad, Theta},
    },
};
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient};
use argmin::core::{Executor, State};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

/// Run an `argmin` solver from `theta0`.
///
/// Wires the problem, the solver, the initial parameters, the optional
/// iteration cap and (with `obs_slog` and `opts.verbose`) a terminal slog
/// observer, then converts the final state. The reported `theta_hat` is
/// projected into the problem's bounds, which is the point whose objective
/// value the solver actually saw.
///
/// # Errors
/// - Any argmin runtime error, converted through `From<argmin::core::Error>`;
///   objective failures come back with their original kind.
/// - Validation errors from [`LocalOutcome::new`].
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &LocalSearchOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<LocalOutcome>
where
    F: Objective,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    let bounds = problem.bounds;
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    let best = result.take_best_param().map(|theta| project_opt(bounds, &theta));
    LocalOutcome::new(best, result.get_best_cost(), termination, iterations, function_counts, grad)
}

// ---- Helper Methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state<F: Objective>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()> {
    let f0 = problem.cost(theta0)?;
    let g0n = problem.gradient(theta0).ok().map(|g| g.l2_norm());
    tracing::debug!(f0, grad_norm = ?g0n, "local search initial state");
    Ok(())
}
