//! oracle — access to the external reaction simulation engine.
//!
//! Purpose
//! -------
//! Isolate everything the calibration knows about the simulator behind a
//! small path-addressed session contract ([`OracleSession`],
//! [`OracleConnector`]), with typed calibration operations on top
//! ([`OracleAdapter`]) and scoped session ownership ([`SessionGuard`]).
//!
//! Conventions
//! -----------
//! - All paths come from an [`OracleLayout`]; nothing here knows the tree of a
//!   particular simulation archive.
//! - Every operation blocks; callers never overlap calls on one session.
//! - [`InMemoryOracle`] is a full session implementation for dry runs and the
//!   test-suite.

pub mod adapter;
pub mod errors;
pub mod guard;
pub mod layout;
pub mod memory;
pub mod session;

pub use self::adapter::OracleAdapter;
pub use self::errors::{OracleError, OracleResult};
pub use self::guard::SessionGuard;
pub use self::layout::{InputAddressing, OracleLayout, PathTemplate, ReactionSlot, LEGACY_LEADING_COUNT};
pub use self::memory::{InMemoryConnector, InMemoryOracle, InMemoryOracleBuilder, PathValues, SessionLog};
pub use self::session::{OracleConnector, OracleSession, SessionConfig, DEFAULT_SETTLE_DELAY};
