//! metrics — MAPE and the multi-level error bookkeeping of an evaluation.
//!
//! Purpose
//! -------
//! Compute the error metrics a calibration run optimizes and reports:
//! [`mape`] for a pair of series, and [`MapeAccumulator`] for the per-case,
//! per-component, and run-level reductions of one objective evaluation.
//!
//! Conventions
//! -----------
//! - MAPE is expressed in percent.
//! - Only target components enter the objective; run-level totals are
//!   diagnostic and kept separate from it.
//! - A zero reference value is never masked: it is a [`MetricError`] for
//!   target components and an explicit `None` for diagnostic ones.

pub mod aggregate;
pub mod errors;
pub mod mape;

pub use self::aggregate::{
    AggregateMetrics, CaseMetrics, CaseRecord, ComparisonRow, ComponentRole, ComponentSetError,
    ComponentSets, ComponentTotal, MapeAccumulator,
};
pub use self::errors::{MetricError, MetricResult};
pub use self::mape::{mape, mape_single};
