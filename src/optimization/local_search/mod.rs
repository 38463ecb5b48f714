//! local_search — argmin-powered, bound-aware local refinement.
//!
//! Purpose
//! -------
//! Find a local minimum of a scalar [`Objective`] near a starting point. This
//! is the inner step of the global search: every basin-hopping trial is one
//! call to [`minimize`] through the [`LocalRefiner`] seam.
//!
//! Key behaviors
//! -------------
//! - Expose [`Objective`] values to Argmin via [`adapter::ArgMinAdapter`],
//!   evaluating every point at its projection into the optional
//!   [`ParamBounds`].
//! - Run L-BFGS with a selectable line search ([`LineSearcher`]), gradient
//!   and cost-change tolerances (1e-4 by default) and an optional iteration
//!   cap ([`Tolerances`], [`LocalSearchOptions`]).
//! - Estimate gradients by finite differences ([`finite_diff`]) when the
//!   objective has none, capturing objective errors inside the difference
//!   closures so an oracle failure is never mistaken for a NaN.
//! - Normalize solver state into a [`LocalOutcome`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives are minimized as-is; no sign flip is applied anywhere.
//! - `theta_hat` of every successful outcome is finite and inside the bounds.
//! - Errors raised by the objective cross the Argmin boundary boxed and are
//!   recovered by kind (`From<argmin::core::Error> for OptError`).
//!
//! Conventions
//! -----------
//! - Parameters and gradients are [`Theta`] / [`Grad`] (`Array1<f64>`).
//! - Bounds are enforced by projection rather than by reparameterization.
//!
//! Testing notes
//! -------------
//! - Submodule tests cover projection, FD fallback and error capture, solver
//!   construction, and `minimize` on toy bowls with and without bounds.
//! - The basin-hopping tests drive [`LocalRefiner`] with mocks.

pub mod adapter;
pub mod api;
pub mod bounds;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{minimize, LbfgsRefiner, LocalRefiner};
pub use self::bounds::ParamBounds;
pub use self::traits::{
    LineSearcher, LocalOutcome, LocalSearchOptions, Objective, Tolerances, DEFAULT_LOCAL_MAX_ITER,
    DEFAULT_LOCAL_TOL,
};
pub use self::types::{Cost, FnEvalMap, Grad, Theta, DEFAULT_LBFGS_MEM};
