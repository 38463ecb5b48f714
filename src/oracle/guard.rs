//! Scoped ownership of an open session.
//!
//! [`SessionGuard`] owns the session for the lifetime of a run. The session is
//! closed exactly once: explicitly through [`SessionGuard::close`], which
//! reports close failures, or implicitly on drop, which can only log them.
use tracing::warn;

use crate::oracle::{errors::OracleResult, session::OracleSession};

#[derive(Debug)]
pub struct SessionGuard<S: OracleSession> {
    session: Option<S>,
}

impl<S: OracleSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session: Some(session) }
    }

    /// Mutable access to the open session, or `None` once closed.
    pub fn session_mut(&mut self) -> Option<&mut S> {
        self.session.as_mut()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Close the session now and report the outcome. A second call is a no-op.
    pub fn close(&mut self) -> OracleResult<()> {
        match self.session.take() {
            Some(mut session) => session.close(),
            None => Ok(()),
        }
    }
}

impl<S: OracleSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "simulation session did not close cleanly");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::memory::InMemoryOracle;

    #[test]
    // Purpose
    // -------
    // Dropping an open guard closes the session exactly once.
    fn drop_closes_session() {
        let oracle = InMemoryOracle::builder().build();
        let log = oracle.log();
        {
            let _guard = SessionGuard::new(oracle);
        }
        assert_eq!(log.closed(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Explicit close followed by drop does not close twice.
    fn explicit_close_is_not_repeated_on_drop() {
        let oracle = InMemoryOracle::builder().build();
        let log = oracle.log();
        let mut guard = SessionGuard::new(oracle);
        guard.close().unwrap();
        assert!(!guard.is_open());
        assert!(guard.session_mut().is_none());
        drop(guard);
        assert_eq!(log.closed(), 1);
    }
}
