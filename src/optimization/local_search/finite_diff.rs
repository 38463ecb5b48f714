//! local_search::finite_diff — finite-difference gradients with error capture.
//!
//! Purpose
//! -------
//! Approximate objective gradients when no analytic gradient exists, which is
//! always the case for a simulation-backed objective.
//!
//! Key behaviors
//! -------------
//! - [`fd_gradient`] prefers central differences and falls back to forward
//!   differences when the central pass hit an evaluation error or produced a
//!   non-finite gradient.
//! - Errors raised by the objective inside the difference closure are captured
//!   in a shared `RefCell` (the closure itself must return `f64`) and
//!   re-raised once the pass finishes, so an oracle failure during gradient
//!   estimation is never hidden behind a NaN.
//!
//! Invariants & assumptions
//! ------------------------
//! - Any gradient returned passes [`validate_grad`].
//! - Only the *first* captured error of a pass is kept.
use crate::optimization::{
    errors::{OptError, OptResult},
    local_search::{
        types::{Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Wrap a fallible objective into the `Fn(&Theta) -> f64` shape `finitediff`
/// expects. The first error is stored in `closure_err`; NaN is returned.
pub fn capture_errors<'a, C>(
    cost: C, closure_err: &'a RefCell<Option<Error>>,
) -> impl Fn(&Theta) -> f64 + 'a
where
    C: Fn(&Theta) -> Result<f64, Error> + 'a,
{
    move |theta: &Theta| match cost(theta) {
        Ok(val) => val,
        Err(e) => {
            let mut slot = closure_err.borrow_mut();
            if slot.is_none() {
                *slot = Some(e);
            }
            f64::NAN
        }
    }
}

/// Central-difference gradient, falling back to forward differences.
///
/// Objective failures (oracle, metric, data, cancellation) seen during the
/// central pass are returned at once; other failures trigger the fallback.
///
/// # Errors
/// - An objective failure captured during either pass.
/// - Validation errors of the forward-difference gradient.
pub fn fd_gradient<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let central = theta.central_diff(func);
    match closure_err.take().map(OptError::from) {
        Some(err) if err.aborts_search() => return Err(err),
        Some(_) => {}
        None if validate_grad(&central, theta.len()).is_ok() => return Ok(central),
        None => {}
    }
    run_fd_diff(theta, func, closure_err)
}

/// Forward-difference gradient with error capture and validation.
///
/// # Errors
/// - The error captured in `closure_err` during the pass, converted through
///   `From<argmin::core::Error>` (objective failures keep their kind).
/// - [`OptError::InvalidGradient`](crate::optimization::errors::OptError::InvalidGradient)
///   for non-finite entries.
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::OracleError;
    use ndarray::array;
    use std::cell::Cell;

    // Scope
    // -----
    // Central/forward selection and error propagation. Accuracy of the
    // difference schemes themselves belongs to `finitediff`.

    #[test]
    // Purpose
    // -------
    // A smooth quadratic yields its analytic gradient through the central pass.
    fn quadratic_gradient_matches_analytic() {
        let theta: Theta = array![1.0, -2.0];
        let closure_err = RefCell::new(None);
        let f = |x: &Theta| x.dot(x);

        let g = fd_gradient(&theta, &f, &closure_err).unwrap();
        assert!((g[0] - 2.0).abs() < 1e-5);
        assert!((g[1] + 4.0).abs() < 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // An oracle failure inside the objective surfaces with its kind instead
    // of as a NaN gradient.
    //
    // Given
    // -----
    // - An objective failing on every call with an oracle read error.
    //
    // Expect
    // ------
    // - `fd_gradient` returns `OptError::Oracle(Read { .. })`.
    fn objective_failure_is_propagated() {
        let theta: Theta = array![1.0];
        let closure_err = RefCell::new(None);
        let cost = |_: &Theta| -> Result<f64, Error> {
            Err(OptError::Oracle(OracleError::Read { path: "/O/BZ".into() }).into())
        };
        let f = capture_errors(cost, &closure_err);

        let err = fd_gradient(&theta, &f, &closure_err).unwrap_err();
        assert_eq!(err, OptError::Oracle(OracleError::Read { path: "/O/BZ".into() }));
    }

    #[test]
    // Purpose
    // -------
    // A transient failure during the central pass falls back to forward
    // differences, which succeed.
    fn central_failure_falls_back_to_forward() {
        let theta: Theta = array![0.5];
        let closure_err = RefCell::new(None);
        let calls = Cell::new(0usize);
        let cost = |x: &Theta| -> Result<f64, Error> {
            calls.set(calls.get() + 1);
            if calls.get() == 1 {
                return Err(OptError::NonFiniteCost { value: f64::NAN }.into());
            }
            Ok(3.0 * x[0])
        };
        let f = capture_errors(cost, &closure_err);

        let g = fd_gradient(&theta, &f, &closure_err).unwrap();
        assert!((g[0] - 3.0).abs() < 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // A gradient that stays non-finite is reported as InvalidGradient.
    fn non_finite_gradient_is_rejected() {
        let theta: Theta = array![0.0, 1.0];
        let closure_err = RefCell::new(None);
        let f = |_x: &Theta| f64::NAN;

        assert!(matches!(
            fd_gradient(&theta, &f, &closure_err),
            Err(OptError::InvalidGradient { .. })
        ));
    }
}
