//! Mean absolute percentage error.
//!
//! `mape(y, ŷ) = mean(|(y − ŷ) / y|) × 100`. The absolute value is taken over
//! the whole ratio, so the metric is non-negative for negative references as
//! well. A reference value of exactly zero makes the ratio undefined; instead
//! of returning NaN/inf, [`mape`] reports [`MetricError::DivisionByZero`] with
//! the offending index.
use statrs::statistics::Statistics;

use crate::metrics::errors::{MetricError, MetricResult};

/// Mean absolute percentage error of `y_pred` against `y_true`, in percent.
///
/// # Errors
/// - [`MetricError::LengthMismatch`] if the slices differ in length.
/// - [`MetricError::EmptySeries`] if both are empty.
/// - [`MetricError::DivisionByZero`] for the first zero in `y_true`.
pub fn mape(y_true: &[f64], y_pred: &[f64]) -> MetricResult<f64> {
    if y_true.len() != y_pred.len() {
        return Err(MetricError::LengthMismatch { true_len: y_true.len(), pred_len: y_pred.len() });
    }
    if y_true.is_empty() {
        return Err(MetricError::EmptySeries);
    }
    if let Some(index) = y_true.iter().position(|&t| t == 0.0) {
        return Err(MetricError::DivisionByZero { index });
    }
    let ratios: Vec<f64> =
        y_true.iter().zip(y_pred).map(|(&t, &p)| ((t - p) / t).abs()).collect();
    Ok(ratios.mean() * 100.0)
}

/// MAPE of a single (true, predicted) pair.
pub fn mape_single(y_true: f64, y_pred: f64) -> MetricResult<f64> {
    mape(&[y_true], &[y_pred])
}
