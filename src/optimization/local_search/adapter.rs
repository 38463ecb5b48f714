//! Adapter that exposes an [`Objective`] as an `argmin` problem.
//!
//! The cost is the objective evaluated at the *projected* point, so the
//! solver may step outside the bounds while the objective only ever sees
//! admissible parameters. Gradients come from the objective when it
//! implements them and from finite differences of the projected cost
//! otherwise.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    local_search::{
        bounds::{project_opt, ParamBounds},
        finite_diff::{capture_errors, fd_gradient},
        traits::Objective,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};

/// Bridges an [`Objective`] (plus optional bounds) to `argmin`'s
/// `CostFunction` and `Gradient`.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: Objective> {
    pub f: &'a F,
    pub bounds: Option<&'a ParamBounds>,
}

impl<'a, F: Objective> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, bounds: Option<&'a ParamBounds>) -> Self {
        Self { f, bounds }
    }

    fn projected_cost(&self, theta: &Theta) -> Result<Cost, Error> {
        let x = project_opt(self.bounds, theta);
        let output = self.f.value(&x)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(output)
    }
}

impl<'a, F: Objective> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `f(proj(θ))`.
    ///
    /// # Errors
    /// - Objective errors, boxed so they can be recovered by kind.
    /// - [`OptError::NonFiniteCost`] for NaN/inf values.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        self.projected_cost(theta)
    }
}

impl<'a, F: Objective> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Analytic gradient if the objective has one, finite differences
    /// (central, then forward) of the projected cost otherwise.
    ///
    /// # Errors
    /// - Objective errors raised during any difference evaluation.
    /// - Validation errors for wrong-length or non-finite gradients.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        match self.f.grad(&project_opt(self.bounds, theta)) {
            Ok(g) => {
                validate_grad(&g, dim)?;
                Ok(g)
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_func = capture_errors(|x: &Theta| self.projected_cost(x), &closure_err);
                Ok(fd_gradient(theta, &cost_func, &closure_err)?)
            }
            Err(e) => Err(e.into()),
        }
    }
}
