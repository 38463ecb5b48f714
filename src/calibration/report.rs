//! Reports produced by an evaluation and by a whole run.
use crate::{
    data::SampleSet,
    metrics::{AggregateMetrics, CaseMetrics, CaseRecord, ComponentRole, ComponentTotal},
    optimization::basin_hopping::{BestPoint, HopOutcome},
};

/// Detailed result of one objective evaluation.
///
/// `totals` are the run-level per-component MAPE values over all sampled
/// cases. They are diagnostic and never part of `objective`.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub objective: f64,
    pub per_case: Vec<CaseMetrics>,
    pub totals: Vec<ComponentTotal>,
    /// Real-vs-predicted table of the last processed case.
    pub last_case: CaseRecord,
}

impl EvaluationReport {
    pub fn total(&self, component: &str) -> Option<&ComponentTotal> {
        self.totals.iter().find(|t| t.component == component)
    }

    pub fn target_totals(&self) -> impl Iterator<Item = &ComponentTotal> {
        self.totals.iter().filter(|t| t.role == ComponentRole::Target)
    }

    pub fn other_totals(&self) -> impl Iterator<Item = &ComponentTotal> {
        self.totals.iter().filter(|t| t.role == ComponentRole::Other)
    }
}

impl From<AggregateMetrics> for EvaluationReport {
    fn from(m: AggregateMetrics) -> Self {
        EvaluationReport {
            objective: m.objective,
            per_case: m.per_case,
            totals: m.totals,
            last_case: m.last_case,
        }
    }
}

/// Output of a completed calibration run.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationReport {
    /// Best parameters and the objective the search recorded for them.
    pub best: BestPoint,
    /// Detailed re-evaluation at `best.theta`.
    pub final_report: EvaluationReport,
    pub search: HopOutcome,
    pub sample: SampleSet,
    /// Objective evaluations issued to the oracle, the final one included.
    pub evaluations: usize,
}

impl CalibrationReport {
    /// Objective of the final detailed evaluation.
    pub fn objective(&self) -> f64 {
        self.final_report.objective
    }

    pub fn best_parameters(&self) -> &[f64] {
        self.best.theta.as_slice().unwrap_or(&[])
    }
}
