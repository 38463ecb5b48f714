//! data::preprocess — promote the label column of a raw table to a lookup key.
//!
//! Purpose
//! -------
//! Turn a [`RawTable`] (label column + one column per case) into a
//! [`CaseDataset`] and the ordered list of component names, removing the label
//! column from the value area.
//!
//! Key behaviors
//! -------------
//! - Locate the label column by name (spreadsheet exports of an indexed frame
//!   call it [`DEFAULT_LABEL_COLUMN`]).
//! - Parse value cells that arrive as text; reject empty, non-numeric, and
//!   non-finite cells with the offending `(label, column)` pair.
//! - Preserve row order for the component list and column order for cases.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every row has exactly `columns.len()` cells.
//! - Labels are unique, non-empty text (numbers are accepted and rendered).
//!
//! Testing notes
//! -------------
//! - Unit tests cover the happy path (label column in any position), each
//!   malformed-table error, and text-number parsing.
use std::collections::HashSet;

use ndarray::Array2;

use crate::data::{
    errors::{DataError, DataResult},
    table::{CaseDataset, RawCell, RawTable},
};

/// Header name of the label column in a spreadsheet export of an indexed frame.
pub const DEFAULT_LABEL_COLUMN: &str = "Unnamed: 0";

/// Normalize a raw table into a [`CaseDataset`] plus its component list.
///
/// Parameters
/// ----------
/// - `table`: the raw table.
/// - `label_column`: name of the column holding component labels.
///
/// Returns
/// -------
/// `(dataset, components)` where `components` is the label column in row order.
///
/// Errors
/// ------
/// - [`DataError::DuplicateColumn`] if two header columns share a name.
/// - [`DataError::MissingLabelColumn`] if `label_column` is absent.
/// - [`DataError::NoCaseColumns`] / [`DataError::NoComponents`] for degenerate tables.
/// - [`DataError::RaggedRow`], [`DataError::InvalidLabel`],
///   [`DataError::DuplicateLabel`], [`DataError::EmptyCell`],
///   [`DataError::NonNumericCell`], [`DataError::NonFiniteCell`] for malformed
///   content.
pub fn preprocess(table: &RawTable, label_column: &str) -> DataResult<(CaseDataset, Vec<String>)> {
    let mut seen = HashSet::with_capacity(table.columns.len());
    if let Some(dup) = table.columns.iter().find(|c| !seen.insert(c.as_str())) {
        return Err(DataError::DuplicateColumn { column: dup.clone() });
    }

    let label_idx = table
        .columns
        .iter()
        .position(|c| c == label_column)
        .ok_or_else(|| DataError::MissingLabelColumn { column: label_column.to_string() })?;

    let case_labels: Vec<String> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != label_idx)
        .map(|(_, c)| c.clone())
        .collect();
    if case_labels.is_empty() {
        return Err(DataError::NoCaseColumns);
    }
    if table.rows.is_empty() {
        return Err(DataError::NoComponents);
    }

    let width = table.columns.len();
    let mut components = Vec::with_capacity(table.rows.len());
    let mut values = Array2::<f64>::zeros((table.rows.len(), case_labels.len()));

    for (row_idx, row) in table.rows.iter().enumerate() {
        if row.len() != width {
            return Err(DataError::RaggedRow { row: row_idx, expected: width, found: row.len() });
        }
        let label = extract_label(&row[label_idx], row_idx)?;
        let mut col = 0;
        for (cell_idx, cell) in row.iter().enumerate() {
            if cell_idx == label_idx {
                continue;
            }
            values[(row_idx, col)] = parse_value(cell, &label, &table.columns[cell_idx])?;
            col += 1;
        }
        components.push(label);
    }

    let dataset = CaseDataset::new(components.clone(), case_labels, values)?;
    Ok((dataset, components))
}

fn extract_label(cell: &RawCell, row: usize) -> DataResult<String> {
    let label = match cell {
        RawCell::Text(s) => s.trim().to_string(),
        RawCell::Number(n) => n.to_string(),
        RawCell::Empty => String::new(),
    };
    if label.is_empty() {
        return Err(DataError::InvalidLabel { row });
    }
    Ok(label)
}

fn parse_value(cell: &RawCell, label: &str, column: &str) -> DataResult<f64> {
    let value = match cell {
        RawCell::Number(n) => *n,
        RawCell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(DataError::EmptyCell {
                    label: label.to_string(),
                    column: column.to_string(),
                });
            }
            trimmed.parse::<f64>().map_err(|_| DataError::NonNumericCell {
                label: label.to_string(),
                column: column.to_string(),
                text: s.clone(),
            })?
        }
        RawCell::Empty => {
            return Err(DataError::EmptyCell {
                label: label.to_string(),
                column: column.to_string(),
            });
        }
    };
    if !value.is_finite() {
        return Err(DataError::NonFiniteCell {
            label: label.to_string(),
            column: column.to_string(),
            value,
        });
    }
    Ok(value)
}
