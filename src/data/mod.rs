//! data — raw tables, normalized case datasets, and the run's case sample.
//!
//! Purpose
//! -------
//! Everything the calibration engine knows about historical cases before the
//! oracle is involved: normalization of raw tables ([`preprocess`]), the
//! immutable dataset types ([`table`]), and the fixed case subsample
//! ([`sampler`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Datasets and samples are created once at run start and never mutated.
//! - All errors here are [`DataError`]s and are raised before an oracle
//!   session is opened.

pub mod errors;
pub mod preprocess;
pub mod sampler;
pub mod table;

pub use self::errors::{DataError, DataResult};
pub use self::preprocess::{DEFAULT_LABEL_COLUMN, preprocess};
pub use self::sampler::{CaseSampler, SampleSet};
pub use self::table::{CalibrationData, CaseDataset, RawCell, RawTable};
