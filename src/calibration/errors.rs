//! calibration::errors — run-level error surface and taxonomy.
//!
//! Purpose
//! -------
//! Collect the per-layer errors ([`DataError`], [`OracleError`],
//! [`MetricError`], [`OptError`]) and configuration failures into one
//! [`CalibError`], and expose a flat [`ErrorKind`] so callers can react to a
//! failed run without matching nested enums.
//!
//! Conventions
//! -----------
//! - Objective failures that surfaced through the optimizer are unwrapped
//!   back into their own layer (`OptError::Oracle(e)` becomes
//!   `CalibError::Oracle(e)`).
//! - [`AbortedRun`] pairs the error with the best point found before it, if
//!   the search got that far.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::{
    data::DataError,
    metrics::{ComponentSetError, MetricError},
    optimization::{basin_hopping::BestPoint, errors::OptError},
    oracle::OracleError,
};

/// Result alias for run-level operations.
pub type CalibResult<T> = Result<T, CalibError>;

#[derive(Debug, Clone, PartialEq)]
pub enum CalibError {
    // ---- Layers ----
    Data(DataError),
    Oracle(OracleError),
    Metric(MetricError),
    Optimization(OptError),

    // ---- Configuration ----
    /// Target/other component sets are unusable.
    Components(ComponentSetError),

    /// A run option is out of range or inconsistent with the data.
    InvalidConfig { reason: String },

    /// A sampled case has a zero reference value in a target component.
    ZeroReference { component: String, case: usize },
}

/// Flat classification of [`CalibError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedDataset,
    InvalidSampleSize,
    SessionOpen,
    Write(String),
    Read(String),
    SimulationDiverged,
    SimulationTimeout,
    DivisionByZero,
    InvalidConfig,
    Optimization,
    SessionClose,
}

impl CalibError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalibError::Data(err) => match err {
                DataError::InvalidSampleSize { .. } => ErrorKind::InvalidSampleSize,
                DataError::UnknownComponent { .. } => ErrorKind::InvalidConfig,
                _ => ErrorKind::MalformedDataset,
            },
            CalibError::Oracle(err) => match err {
                OracleError::SessionOpen { .. } => ErrorKind::SessionOpen,
                OracleError::SessionClose { .. } | OracleError::SessionClosed => {
                    ErrorKind::SessionClose
                }
                OracleError::InvalidLayout { .. } | OracleError::ParameterLength { .. } => {
                    ErrorKind::InvalidConfig
                }
                OracleError::Write { path } => ErrorKind::Write(path.clone()),
                OracleError::Read { path } => ErrorKind::Read(path.clone()),
                OracleError::SimulationDiverged { .. } => ErrorKind::SimulationDiverged,
                OracleError::SimulationTimeout { .. } => ErrorKind::SimulationTimeout,
            },
            CalibError::Metric(err) => match err {
                MetricError::DivisionByZero { .. } => ErrorKind::DivisionByZero,
                MetricError::MissingComponent { .. } => ErrorKind::MalformedDataset,
                MetricError::LengthMismatch { .. } | MetricError::EmptySeries => {
                    ErrorKind::Optimization
                }
            },
            CalibError::Optimization(_) => ErrorKind::Optimization,
            CalibError::Components(_) | CalibError::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            CalibError::ZeroReference { .. } => ErrorKind::DivisionByZero,
        }
    }
}

impl std::error::Error for CalibError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CalibError::Data(err) => Some(err),
            CalibError::Oracle(err) => Some(err),
            CalibError::Metric(err) => Some(err),
            CalibError::Optimization(err) => Some(err),
            CalibError::Components(err) => Some(err),
            CalibError::InvalidConfig { .. } | CalibError::ZeroReference { .. } => None,
        }
    }
}

impl std::fmt::Display for CalibError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Layers ----
            CalibError::Data(err) => write!(f, "Dataset error: {err}"),
            CalibError::Oracle(err) => write!(f, "Oracle error: {err}"),
            CalibError::Metric(err) => write!(f, "Metric error: {err}"),
            CalibError::Optimization(err) => write!(f, "Optimization error: {err}"),

            // ---- Configuration ----
            CalibError::Components(err) => write!(f, "Invalid component sets: {err}"),
            CalibError::InvalidConfig { reason } => write!(f, "Invalid run configuration: {reason}"),
            CalibError::ZeroReference { component, case } => write!(
                f,
                "Reference value of target component '{component}' is zero in sampled case {case}"
            ),
        }
    }
}

impl From<DataError> for CalibError {
    fn from(err: DataError) -> Self {
        CalibError::Data(err)
    }
}

impl From<OracleError> for CalibError {
    fn from(err: OracleError) -> Self {
        CalibError::Oracle(err)
    }
}

impl From<MetricError> for CalibError {
    fn from(err: MetricError) -> Self {
        CalibError::Metric(err)
    }
}

impl From<ComponentSetError> for CalibError {
    fn from(err: ComponentSetError) -> Self {
        CalibError::Components(err)
    }
}

impl From<OptError> for CalibError {
    fn from(err: OptError) -> Self {
        match err {
            OptError::Oracle(e) => CalibError::Oracle(e),
            OptError::Metric(e) => CalibError::Metric(e),
            OptError::Data(e) => CalibError::Data(e),
            other => CalibError::Optimization(other),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<CalibError> for PyErr {
    fn from(err: CalibError) -> PyErr {
        PyValueError::new_err(format!("CalibError ({:?}): {err}", err.kind()))
    }
}

/// A run that ended in an error, with the best point found before it.
#[derive(Debug, Clone, PartialEq)]
pub struct AbortedRun {
    pub error: CalibError,
    pub best: Option<BestPoint>,
}

impl AbortedRun {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl From<CalibError> for AbortedRun {
    fn from(error: CalibError) -> Self {
        AbortedRun { error, best: None }
    }
}

impl std::error::Error for AbortedRun {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl std::fmt::Display for AbortedRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.best {
            Some(best) => {
                write!(f, "Calibration aborted (best objective {}): {}", best.objective, self.error)
            }
            None => write!(f, "Calibration aborted: {}", self.error),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<AbortedRun> for PyErr {
    fn from(err: AbortedRun) -> PyErr {
        PyValueError::new_err(format!("CalibError ({:?}): {err}", err.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // Scope
    // -----
    // Kind classification and unwrapping of objective failures.

    #[test]
    // Purpose
    // -------
    // Oracle failures carried through the optimizer come back as oracle
    // errors and keep their path.
    fn opt_error_unwraps_to_owning_layer() {
        let err = CalibError::from(OptError::Oracle(OracleError::Write { path: "/a/b".into() }));
        assert_eq!(err, CalibError::Oracle(OracleError::Write { path: "/a/b".into() }));
        assert_eq!(err.kind(), ErrorKind::Write("/a/b".into()));

        let err = CalibError::from(OptError::Metric(MetricError::DivisionByZero { index: 2 }));
        assert_eq!(err.kind(), ErrorKind::DivisionByZero);

        let err = CalibError::from(OptError::NonFiniteCost { value: f64::NAN });
        assert_eq!(err.kind(), ErrorKind::Optimization);
    }

    #[test]
    // Purpose
    // -------
    // Each taxonomy entry is reachable.
    fn kinds_cover_the_taxonomy() {
        let cases = [
            (CalibError::Data(DataError::NoComponents), ErrorKind::MalformedDataset),
            (
                CalibError::Data(DataError::InvalidSampleSize {
                    sample_size: 0,
                    total_cases: 3,
                    reason: "zero",
                }),
                ErrorKind::InvalidSampleSize,
            ),
            (
                CalibError::Oracle(OracleError::SessionOpen { archive: "a".into(), reason: "b".into() }),
                ErrorKind::SessionOpen,
            ),
            (CalibError::Oracle(OracleError::Read { path: "/r".into() }), ErrorKind::Read("/r".into())),
            (
                CalibError::Oracle(OracleError::SimulationDiverged { reason: "x".into() }),
                ErrorKind::SimulationDiverged,
            ),
            (
                CalibError::Oracle(OracleError::SimulationTimeout {
                    elapsed: Duration::from_secs(2),
                    limit: Duration::from_secs(1),
                }),
                ErrorKind::SimulationTimeout,
            ),
            (
                CalibError::Oracle(OracleError::SessionClose { reason: "busy".into() }),
                ErrorKind::SessionClose,
            ),
            (CalibError::InvalidConfig { reason: "x".into() }, ErrorKind::InvalidConfig),
            (CalibError::Components(ComponentSetError::EmptyTarget), ErrorKind::InvalidConfig),
            (
                CalibError::ZeroReference { component: "BZ".into(), case: 4 },
                ErrorKind::DivisionByZero,
            ),
        ];
        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }
}
