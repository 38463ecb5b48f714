//! oracle::session — the narrow contract with the external simulation engine.
//!
//! Purpose
//! -------
//! Describe the external engine as two traits: an [`OracleConnector`] that
//! opens sessions from an archived configuration, and an [`OracleSession`]
//! that accepts value writes, runs, and value reads addressed by hierarchical
//! string paths.
//!
//! Invariants & assumptions
//! ------------------------
//! - A session is a single stateful resource: every call mutates it and calls
//!   are strictly sequential (`&mut self`).
//! - [`OracleSession::run`] blocks until the engine *reports* completion. The
//!   engine may report completion before its internal state has propagated;
//!   the settle delay that makes reads valid is enforced by
//!   [`OracleAdapter`](crate::oracle::adapter::OracleAdapter), not here.
//! - Paths are configuration supplied by the caller; implementations must not
//!   assume any particular tree layout.
use std::{path::PathBuf, time::Duration};

use crate::oracle::errors::{OracleError, OracleResult};

/// Settle delay of the production engine integration.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(7);

/// A live session of the external simulation engine.
pub trait OracleSession {
    /// Write `value` to the node at `path`.
    ///
    /// Errors: [`OracleError::Write`] if `path` does not resolve.
    fn write_value(&mut self, path: &str, value: f64) -> OracleResult<()>;

    /// Read the current value of the node at `path`.
    ///
    /// Errors: [`OracleError::Read`] if `path` does not resolve.
    fn read_value(&mut self, path: &str) -> OracleResult<f64>;

    /// Run the simulation and block until the engine reports completion.
    ///
    /// Errors: [`OracleError::SimulationDiverged`] or
    /// [`OracleError::SimulationTimeout`].
    fn run(&mut self) -> OracleResult<()>;

    /// Release the session. Called exactly once by
    /// [`SessionGuard`](crate::oracle::guard::SessionGuard).
    fn close(&mut self) -> OracleResult<()>;
}

impl<S: OracleSession + ?Sized> OracleSession for &mut S {
    fn write_value(&mut self, path: &str, value: f64) -> OracleResult<()> {
        (**self).write_value(path, value)
    }

    fn read_value(&mut self, path: &str) -> OracleResult<f64> {
        (**self).read_value(path)
    }

    fn run(&mut self) -> OracleResult<()> {
        (**self).run()
    }

    fn close(&mut self) -> OracleResult<()> {
        (**self).close()
    }
}

/// Opens [`OracleSession`]s from an archived simulation configuration.
pub trait OracleConnector {
    type Session: OracleSession;

    /// Initialize the engine from `config.archive`.
    ///
    /// Errors: [`OracleError::SessionOpen`] on a missing archive or an
    /// incompatible engine version.
    fn open(&self, config: &SessionConfig) -> OracleResult<Self::Session>;
}

/// How to open and drive one session.
///
/// Fields
/// ------
/// - `archive`: location of the archived simulation configuration.
/// - `visible`: whether the engine should show its user interface.
/// - `settle_delay`: pause after each run before outputs are read.
/// - `run_timeout`: upper bound on one run's wall time, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub archive: PathBuf,
    pub visible: bool,
    pub settle_delay: Duration,
    pub run_timeout: Option<Duration>,
}

impl SessionConfig {
    /// Session config with the production defaults: hidden UI, 7 s
    /// settle delay, no timeout.
    pub fn new(archive: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            visible: false,
            settle_delay: DEFAULT_SETTLE_DELAY,
            run_timeout: None,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_run_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.run_timeout = timeout;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Check that the archive exists on disk.
    ///
    /// Connectors backed by a real engine call this before dispatching.
    ///
    /// # Errors
    /// [`OracleError::SessionOpen`] if the archive path does not exist.
    pub fn require_archive(&self) -> OracleResult<()> {
        if !self.archive.exists() {
            return Err(OracleError::SessionOpen {
                archive: self.archive.display().to_string(),
                reason: "archive not found".to_string(),
            });
        }
        Ok(())
    }
}
