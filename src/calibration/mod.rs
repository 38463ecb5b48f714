//! calibration — the objective, the run configuration, and the full pipeline.
//!
//! Purpose
//! -------
//! Bind datasets, the case sample and an oracle session into a calibration
//! objective ([`ObjectiveEvaluator`]) and run the whole calibration
//! ([`calibrate`]): preprocessing, sampling, global search, and a final
//! detailed evaluation at the best parameters ([`finalize`]).
//!
//! Key behaviors
//! -------------
//! - [`RunConfig`] validates every run option up front; defaults follow the
//!   production setup.
//! - [`calibrate`] returns a [`CalibrationReport`] or an [`AbortedRun`] that
//!   keeps the best point found before the failure.
//! - [`CalibError::kind`] flattens every failure into an [`ErrorKind`].
//!
//! Conventions
//! -----------
//! - Objectives are mean target MAPE in percent; lower is better.
//! - Progress is logged through `tracing`; the crate never installs a
//!   subscriber.

pub mod config;
pub mod errors;
pub mod evaluator;
pub mod finalize;
pub mod report;
pub mod run;

pub use self::config::{
    DEFAULT_OTHER_COMPONENTS, DEFAULT_SAMPLE_SIZE, DEFAULT_TARGET_COMPONENTS, RunConfig,
    RunConfigBuilder,
};
pub use self::errors::{AbortedRun, CalibError, CalibResult, ErrorKind};
pub use self::evaluator::ObjectiveEvaluator;
pub use self::finalize::finalize;
pub use self::report::{CalibrationReport, EvaluationReport};
pub use self::run::calibrate;
