//! Errors raised while talking to the simulation oracle.
//!
//! Every variant is fatal to the calibration run that hit it. The variants are
//! kept distinct so a caller can decide whether retrying the whole run makes
//! sense (e.g. a timeout) or not (e.g. an unresolvable path).

use std::time::Duration;

/// Result alias for oracle operations.
pub type OracleResult<T> = Result<T, OracleError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OracleError {
    // ---- Session lifecycle ----
    /// The session could not be opened (missing archive, incompatible engine).
    SessionOpen { archive: String, reason: String },

    /// The session failed to shut down cleanly.
    SessionClose { reason: String },

    /// An operation was attempted on a session that has already been closed.
    SessionClosed,

    // ---- Addressing ----
    /// The layout (slots, path templates) is unusable.
    InvalidLayout { reason: String },

    /// A write path does not resolve inside the session.
    Write { path: String },

    /// A read path does not resolve inside the session.
    Read { path: String },

    /// Parameter vector length does not match `2 × slots`.
    ParameterLength { expected: usize, found: usize },

    // ---- Simulation ----
    /// The engine reported a failed or diverged run.
    SimulationDiverged { reason: String },

    /// The run did not complete within the configured timeout.
    SimulationTimeout { elapsed: Duration, limit: Duration },
}

impl std::error::Error for OracleError {}

impl OracleError {
    /// Classify a failed `run()` reported by the engine.
    ///
    /// An engine-side timeout becomes [`OracleError::SimulationTimeout`] with
    /// the measured `elapsed` time; `limit` falls back to `elapsed` when no
    /// timeout was configured. Anything else is a divergence.
    pub fn run_failure(
        timed_out: bool, reason: String, elapsed: Duration, limit: Option<Duration>,
    ) -> Self {
        if timed_out {
            OracleError::SimulationTimeout { elapsed, limit: limit.unwrap_or(elapsed) }
        } else {
            OracleError::SimulationDiverged { reason }
        }
    }
}

impl std::fmt::Display for OracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Session lifecycle ----
            OracleError::SessionOpen { archive, reason } => {
                write!(f, "Failed to open simulation session from '{archive}': {reason}")
            }
            OracleError::SessionClose { reason } => {
                write!(f, "Failed to close simulation session: {reason}")
            }
            OracleError::SessionClosed => {
                write!(f, "Simulation session is already closed")
            }

            // ---- Addressing ----
            OracleError::InvalidLayout { reason } => {
                write!(f, "Invalid oracle layout: {reason}")
            }
            OracleError::Write { path } => {
                write!(f, "Write path does not resolve: {path}")
            }
            OracleError::Read { path } => {
                write!(f, "Read path does not resolve: {path}")
            }
            OracleError::ParameterLength { expected, found } => {
                write!(f, "Parameter vector length mismatch: expected {expected}, found {found}")
            }

            // ---- Simulation ----
            OracleError::SimulationDiverged { reason } => {
                write!(f, "Simulation diverged: {reason}")
            }
            OracleError::SimulationTimeout { elapsed, limit } => {
                write!(f, "Simulation exceeded its time limit: {elapsed:?} > {limit:?}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Engine-side timeouts stay distinguishable from divergence.
    //
    // Given
    // -----
    // - A timed-out run with and without a configured limit, and a plain
    //   failure.
    //
    // Expect
    // ------
    // - SimulationTimeout carrying the configured limit or the elapsed time;
    //   SimulationDiverged carrying the reason.
    fn run_failure_separates_timeout_from_divergence() {
        let elapsed = Duration::from_secs(40);
        assert_eq!(
            OracleError::run_failure(true, "TimeoutError".into(), elapsed, Some(Duration::from_secs(30))),
            OracleError::SimulationTimeout { elapsed, limit: Duration::from_secs(30) }
        );
        assert_eq!(
            OracleError::run_failure(true, "TimeoutError".into(), elapsed, None),
            OracleError::SimulationTimeout { elapsed, limit: elapsed }
        );
        assert_eq!(
            OracleError::run_failure(false, "solver blew up".into(), elapsed, None),
            OracleError::SimulationDiverged { reason: "solver blew up".into() }
        );
    }
}
