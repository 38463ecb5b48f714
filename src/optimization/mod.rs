//! optimization — local refinement, global search, and their error surface.
//!
//! Purpose
//! -------
//! Minimize the calibration objective over the kinetic parameter vector. The
//! objective is noisy, expensive and multi-modal, so a bounded L-BFGS
//! refinement (`local_search`) is wrapped in a basin-hopping global search
//! (`basin_hopping`).
//!
//! Key behaviors
//! -------------
//! - `local_search` adapts any [`Objective`](local_search::Objective) to
//!   Argmin, with finite-difference gradients and projection onto optional
//!   box bounds.
//! - `basin_hopping` perturbs, refines and Metropolis-tests local minima
//!   while tracking the best one.
//! - `cancel` provides the cooperative [`CancellationToken`] checked between
//!   evaluations and between iterations.
//! - `errors` unifies configuration issues, solver failures and objective
//!   failures (oracle, metric, data, cancellation) into [`OptError`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives are minimized directly; lower is better.
//! - Objective failures keep their kind across the Argmin boundary and end
//!   the global search; solver failures only reject the trial that hit them.
//!
//! Conventions
//! -----------
//! - Fallible entry points return [`OptResult<T>`]; callers never see raw
//!   Argmin errors.
//! - Progress is reported through `tracing` events (per-iteration at `info`,
//!   step adaptation at `debug`, rejected trials at `warn`).
//!
//! Downstream usage
//! ----------------
//! - The calibration run builds an
//!   [`LbfgsRefiner`](local_search::LbfgsRefiner), a
//!   [`HopOptions`](basin_hopping::HopOptions) and an objective evaluator,
//!   then calls [`BasinHopping::run`](basin_hopping::BasinHopping::run).

pub mod basin_hopping;
pub mod cancel;
pub mod errors;
pub mod local_search;

pub use self::cancel::CancellationToken;
pub use self::errors::{OptError, OptResult};

pub mod prelude {
    pub use super::basin_hopping::{
        BasinHopping, BestPoint, HopAbort, HopOptions, HopOutcome, TerminationReason,
    };
    pub use super::cancel::CancellationToken;
    pub use super::errors::{OptError, OptResult};
    pub use super::local_search::{
        minimize, LbfgsRefiner, LineSearcher, LocalOutcome, LocalRefiner, LocalSearchOptions,
        Objective, ParamBounds, Theta, Tolerances,
    };
}
