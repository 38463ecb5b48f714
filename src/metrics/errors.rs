//! Errors for MAPE computation and metric aggregation.

/// Result alias for metric computations.
pub type MetricResult<T> = Result<T, MetricError>;

#[derive(Debug, Clone, PartialEq)]
pub enum MetricError {
    /// A reference ("true") value is exactly zero; MAPE is undefined.
    DivisionByZero { index: usize },

    /// True and predicted series differ in length.
    LengthMismatch { true_len: usize, pred_len: usize },

    /// No values to average.
    EmptySeries,

    /// A component required by the aggregation is missing from a case record.
    MissingComponent { case: usize, component: String },
}

impl std::error::Error for MetricError {}

impl std::fmt::Display for MetricError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricError::DivisionByZero { index } => {
                write!(f, "MAPE undefined: reference value at index {index} is zero")
            }
            MetricError::LengthMismatch { true_len, pred_len } => {
                write!(
                    f,
                    "MAPE length mismatch: {true_len} reference values, {pred_len} predictions"
                )
            }
            MetricError::EmptySeries => {
                write!(f, "MAPE undefined for an empty series")
            }
            MetricError::MissingComponent { case, component } => {
                write!(f, "Case {case} has no comparison row for component '{component}'")
            }
        }
    }
}
