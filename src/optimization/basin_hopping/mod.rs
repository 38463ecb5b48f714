//! basin_hopping — stochastic global search over local minima.
//!
//! Purpose
//! -------
//! Escape the local minima of a rugged calibration objective by hopping
//! between basins: perturb the current local minimum, refine the perturbed
//! point locally, and accept or reject the result with a Metropolis test.
//!
//! Key behaviors
//! -------------
//! - [`HopOptions`] validates the schedule (iterations, step size, adaptation
//!   interval, temperature, target acceptance rate, step factor, seed).
//! - [`BasinHopping`] runs the loop on top of any
//!   [`LocalRefiner`](crate::optimization::local_search::LocalRefiner) and
//!   returns a [`HopOutcome`] or a [`HopAbort`] carrying the best point so
//!   far.
//! - The step size adapts every `interval` trials toward the target
//!   acceptance rate ([`AdaptiveStep`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - The reported best objective never increases during a run.
//! - Runs with the same seed, objective and refiner follow the same
//!   trajectory.
//!
//! Testing notes
//! -------------
//! - Acceptance statistics and step adaptation are tested in isolation; the
//!   driver is tested with scripted refiners.

pub mod accept;
pub mod driver;
pub mod options;
pub mod outcome;
pub mod step;

pub use self::accept::Metropolis;
pub use self::driver::BasinHopping;
pub use self::options::HopOptions;
pub use self::outcome::{BestPoint, HopAbort, HopOutcome, IterationRecord, TerminationReason};
pub use self::step::{displace, AdaptiveStep};
