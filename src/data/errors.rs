//! Errors for dataset preprocessing and case sampling.
//!
//! This module defines [`DataError`], raised while turning raw tables into
//! [`CaseDataset`](crate::data::table::CaseDataset)s, while pairing the input
//! and reference datasets, and while drawing the case sample. Every variant is
//! detected before an oracle session is opened.
//!
//! ## Conventions
//! - **Row and column indices are 0-based** and refer to the raw table,
//!   label column included.
//! - Case indices refer to data columns after the label column has been
//!   removed.

/// Result alias for dataset and sampling operations.
pub type DataResult<T> = Result<T, DataError>;

/// Unified error type for dataset preprocessing and sampling.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    // ---- Table shape ----
    /// The configured label column is not present in the header.
    MissingLabelColumn { column: String },

    /// The table has a header but no data columns besides the label column.
    NoCaseColumns,

    /// The table has no component rows.
    NoComponents,

    /// Two header columns share the same name.
    DuplicateColumn { column: String },

    /// A row has a different number of cells than the header.
    RaggedRow { row: usize, expected: usize, found: usize },

    // ---- Labels ----
    /// A component label is empty or not text.
    InvalidLabel { row: usize },

    /// Two rows share the same component label.
    DuplicateLabel { label: String },

    // ---- Values ----
    /// A value cell could not be read as a number.
    NonNumericCell { label: String, column: String, text: String },

    /// A value cell is empty.
    EmptyCell { label: String, column: String },

    /// A value cell is NaN/±inf.
    NonFiniteCell { label: String, column: String, value: f64 },

    // ---- Dataset pairing ----
    /// Input and reference datasets disagree on the number of cases.
    CaseCountMismatch { input: usize, reference: usize },

    /// A configured component does not exist in the dataset it is read from.
    UnknownComponent { name: String, dataset: &'static str },

    /// A case index is outside the dataset.
    CaseOutOfRange { case: usize, cases: usize },

    // ---- Sampling ----
    /// Sample size must satisfy `0 < sample_size <= total_cases`.
    InvalidSampleSize { sample_size: usize, total_cases: usize, reason: &'static str },
}

impl std::error::Error for DataError {}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Table shape ----
            DataError::MissingLabelColumn { column } => {
                write!(f, "Label column '{column}' not found in table header")
            }
            DataError::NoCaseColumns => {
                write!(f, "Table has no case columns besides the label column")
            }
            DataError::NoComponents => {
                write!(f, "Table has no component rows")
            }
            DataError::DuplicateColumn { column } => {
                write!(f, "Column '{column}' appears more than once in the table header")
            }
            DataError::RaggedRow { row, expected, found } => {
                write!(f, "Row {row} has {found} cells, expected {expected}")
            }

            // ---- Labels ----
            DataError::InvalidLabel { row } => {
                write!(f, "Row {row} has an empty or non-text component label")
            }
            DataError::DuplicateLabel { label } => {
                write!(f, "Component label '{label}' appears more than once")
            }

            // ---- Values ----
            DataError::NonNumericCell { label, column, text } => {
                write!(f, "Cell ({label}, {column}) is not numeric: '{text}'")
            }
            DataError::EmptyCell { label, column } => {
                write!(f, "Cell ({label}, {column}) is empty")
            }
            DataError::NonFiniteCell { label, column, value } => {
                write!(f, "Cell ({label}, {column}) is not finite: {value}")
            }

            // ---- Dataset pairing ----
            DataError::CaseCountMismatch { input, reference } => {
                write!(
                    f,
                    "Input dataset has {input} cases but reference dataset has {reference}"
                )
            }
            DataError::UnknownComponent { name, dataset } => {
                write!(f, "Component '{name}' not found in {dataset} dataset")
            }
            DataError::CaseOutOfRange { case, cases } => {
                write!(f, "Case index {case} out of range for {cases} cases")
            }

            // ---- Sampling ----
            DataError::InvalidSampleSize { sample_size, total_cases, reason } => {
                write!(f, "Invalid sample size {sample_size} for {total_cases} cases: {reason}")
            }
        }
    }
}
