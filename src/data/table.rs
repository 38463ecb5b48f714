//! data::table — raw tables, label-indexed case datasets, and dataset pairs.
//!
//! Purpose
//! -------
//! Hold the tabular data the calibration run consumes. A [`RawTable`] is what
//! an external reader (spreadsheet, CSV, Python frame) hands over; a
//! [`CaseDataset`] is the normalized, immutable form used by the engine; a
//! [`CalibrationData`] pairs the input and reference datasets.
//!
//! Key behaviors
//! -------------
//! - Store values as an `ndarray` matrix with one row per component and one
//!   column per historical case, plus a label → row lookup.
//! - Resolve `(component, case)` lookups in O(1).
//! - Validate that the input and reference datasets describe the same set of
//!   cases before any sampling or oracle work happens.
//!
//! Invariants & assumptions
//! ------------------------
//! - Component labels are unique and non-empty; every stored value is finite.
//! - `values.nrows() == components.len()` and
//!   `values.ncols() == case_labels.len()`.
//! - Datasets are never mutated after construction.
//!
//! Conventions
//! -----------
//! - "Case index" always means a 0-based data column index after the label
//!   column has been removed.
//!
//! Testing notes
//! -------------
//! - Construction paths are exercised through the preprocessor tests; this
//!   module tests lookups and dataset pairing.
use std::collections::HashMap;

use ndarray::{Array2, ArrayView1};

use crate::data::errors::{DataError, DataResult};

/// A single cell of a raw table as produced by an external reader.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Text(String),
    Number(f64),
    Empty,
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        RawCell::Number(value)
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        RawCell::Text(value.to_string())
    }
}

impl From<String> for RawCell {
    fn from(value: String) -> Self {
        RawCell::Text(value)
    }
}

/// Untyped table: a header row and a list of rows of cells.
///
/// One of the columns holds the component labels; every other column is one
/// historical case.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self { columns, rows }
    }
}

/// CaseDataset — immutable `(component, case) → value` table.
///
/// Purpose
/// -------
/// Normalized form of one sheet of historical data (either the oracle inputs
/// or the reference measurements).
///
/// Fields
/// ------
/// - `components`: ordered component labels (row order of `values`).
/// - `case_labels`: data column labels (column order of `values`).
/// - `values`: `components.len() × case_labels.len()` matrix of finite values.
/// - `index`: label → row lookup.
///
/// Invariants
/// ----------
/// - Labels are unique; all values finite. Enforced by
///   [`preprocess`](crate::data::preprocess::preprocess) and
///   [`CaseDataset::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct CaseDataset {
    components: Vec<String>,
    case_labels: Vec<String>,
    values: Array2<f64>,
    index: HashMap<String, usize>,
}

impl CaseDataset {
    /// Build a dataset from already-parsed parts.
    ///
    /// # Errors
    /// - [`DataError::NoComponents`] / [`DataError::NoCaseColumns`] for an empty
    ///   matrix.
    /// - [`DataError::RaggedRow`] if the matrix shape disagrees with the label
    ///   lists.
    /// - [`DataError::DuplicateLabel`] for repeated component labels.
    /// - [`DataError::NonFiniteCell`] for NaN/±inf values.
    pub fn new(
        components: Vec<String>, case_labels: Vec<String>, values: Array2<f64>,
    ) -> DataResult<Self> {
        if components.is_empty() {
            return Err(DataError::NoComponents);
        }
        if case_labels.is_empty() {
            return Err(DataError::NoCaseColumns);
        }
        if values.nrows() != components.len() {
            return Err(DataError::RaggedRow {
                row: values.nrows(),
                expected: components.len(),
                found: values.nrows(),
            });
        }
        if values.ncols() != case_labels.len() {
            return Err(DataError::RaggedRow {
                row: 0,
                expected: case_labels.len(),
                found: values.ncols(),
            });
        }
        let mut index = HashMap::with_capacity(components.len());
        for (row, label) in components.iter().enumerate() {
            if index.insert(label.clone(), row).is_some() {
                return Err(DataError::DuplicateLabel { label: label.clone() });
            }
        }
        for ((row, col), &value) in values.indexed_iter() {
            if !value.is_finite() {
                return Err(DataError::NonFiniteCell {
                    label: components[row].clone(),
                    column: case_labels[col].clone(),
                    value,
                });
            }
        }
        Ok(Self { components, case_labels, values, index })
    }

    /// Ordered component labels.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Data column labels, one per case.
    pub fn case_labels(&self) -> &[String] {
        &self.case_labels
    }

    /// Number of historical cases.
    pub fn n_cases(&self) -> usize {
        self.case_labels.len()
    }

    pub fn contains(&self, component: &str) -> bool {
        self.index.contains_key(component)
    }

    /// Value for `(component, case)`, or `None` if either is unknown.
    pub fn get(&self, component: &str, case: usize) -> Option<f64> {
        let row = *self.index.get(component)?;
        self.values.get((row, case)).copied()
    }

    /// Value for `(component, case)` with a descriptive error.
    pub fn value(&self, component: &str, case: usize) -> DataResult<f64> {
        let row = *self.index.get(component).ok_or_else(|| DataError::UnknownComponent {
            name: component.to_string(),
            dataset: "case",
        })?;
        if case >= self.n_cases() {
            return Err(DataError::CaseOutOfRange { case, cases: self.n_cases() });
        }
        Ok(self.values[(row, case)])
    }

    /// All component values of one case, in component order.
    pub fn case_column(&self, case: usize) -> DataResult<ArrayView1<'_, f64>> {
        if case >= self.n_cases() {
            return Err(DataError::CaseOutOfRange { case, cases: self.n_cases() });
        }
        Ok(self.values.column(case))
    }
}

/// The input/reference dataset pair used by one calibration run.
///
/// Invariant: both datasets have the same number of cases, so a case index
/// addresses the same historical run in both.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationData {
    pub input: CaseDataset,
    pub reference: CaseDataset,
}

impl CalibrationData {
    /// Pair two datasets.
    ///
    /// # Errors
    /// [`DataError::CaseCountMismatch`] when the case counts differ.
    pub fn new(input: CaseDataset, reference: CaseDataset) -> DataResult<Self> {
        if input.n_cases() != reference.n_cases() {
            return Err(DataError::CaseCountMismatch {
                input: input.n_cases(),
                reference: reference.n_cases(),
            });
        }
        Ok(Self { input, reference })
    }

    pub fn n_cases(&self) -> usize {
        self.input.n_cases()
    }

    /// Ensure every name in `components` exists in the reference dataset.
    ///
    /// # Errors
    /// [`DataError::UnknownComponent`] for the first missing name.
    pub fn require_reference_components<'a, I>(&self, components: I) -> DataResult<()>
    where
        I: IntoIterator<Item = &'a String>,
    {
        for name in components {
            if !self.reference.contains(name) {
                return Err(DataError::UnknownComponent {
                    name: name.clone(),
                    dataset: "reference",
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    // Purpose
    // -------
    // Lookups resolve by label and case index, and reject unknown keys.
    fn case_dataset_lookup_by_label_and_case() {
        let ds = CaseDataset::new(
            labels(&["A", "B"]),
            labels(&["c0", "c1", "c2"]),
            array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
        )
        .expect("dataset should be valid");

        assert_eq!(ds.get("B", 2), Some(6.0));
        assert_eq!(ds.get("C", 0), None);
        assert_eq!(ds.get("A", 3), None);
        assert_eq!(ds.value("A", 1), Ok(2.0));
        assert_eq!(ds.value("A", 9), Err(DataError::CaseOutOfRange { case: 9, cases: 3 }));
        assert_eq!(ds.case_column(1).unwrap().to_vec(), vec![2.0, 5.0]);
    }

    #[test]
    // Purpose
    // -------
    // Duplicate labels and non-finite values are rejected at construction.
    fn case_dataset_rejects_duplicates_and_non_finite() {
        let dup = CaseDataset::new(labels(&["A", "A"]), labels(&["c0"]), array![[1.0], [2.0]]);
        assert_eq!(dup, Err(DataError::DuplicateLabel { label: "A".to_string() }));

        let nan = CaseDataset::new(labels(&["A"]), labels(&["c0"]), array![[f64::NAN]]);
        assert!(matches!(nan, Err(DataError::NonFiniteCell { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Pairing datasets with different case counts fails; missing reference
    // components are reported by name.
    fn calibration_data_validates_pairing() {
        let input = CaseDataset::new(labels(&["X"]), labels(&["c0", "c1"]), array![[1.0, 2.0]])
            .unwrap();
        let short =
            CaseDataset::new(labels(&["A"]), labels(&["c0"]), array![[1.0]]).unwrap();
        assert_eq!(
            CalibrationData::new(input.clone(), short),
            Err(DataError::CaseCountMismatch { input: 2, reference: 1 })
        );

        let reference =
            CaseDataset::new(labels(&["A"]), labels(&["c0", "c1"]), array![[1.0, 2.0]]).unwrap();
        let data = CalibrationData::new(input, reference).unwrap();
        assert!(data.require_reference_components(&labels(&["A"])).is_ok());
        assert_eq!(
            data.require_reference_components(&labels(&["A", "Z"])),
            Err(DataError::UnknownComponent { name: "Z".to_string(), dataset: "reference" })
        );
    }
}
