//! metrics::aggregate — per-case, per-component, and run-level MAPE bookkeeping.
//!
//! Purpose
//! -------
//! Accumulate the (real, predicted) pairs of every sampled case during one
//! objective evaluation and reduce them to:
//! - the scalar objective: Σ_cases Σ_target MAPE / (n_cases × |target|);
//! - run-level total MAPE per component, computed over the concatenation of
//!   all sampled cases (not an average of per-case values), for target and
//!   other components alike.
//!
//! Key behaviors
//! -------------
//! - Target components feed the objective; a zero reference there is a hard
//!   [`MetricError::DivisionByZero`].
//! - Other components are diagnostic only; an undefined MAPE is recorded as
//!   `None` and logged, and never reaches the objective.
//! - The run-level totals are reported next to the objective and are never
//!   folded into it.
//!
//! Invariants & assumptions
//! ------------------------
//! - [`ComponentSets`] are non-empty on the target side, duplicate-free, and
//!   disjoint (validated by [`ComponentSets::new`]).
//! - Every [`CaseRecord`] contains a row for each target and other component.
use std::collections::HashSet;

use crate::metrics::{
    errors::{MetricError, MetricResult},
    mape::{mape, mape_single},
};

/// Whether a component drives the objective or is reported only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentRole {
    Target,
    Other,
}

/// Partition of reference components into optimized and diagnostic sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSets {
    target: Vec<String>,
    other: Vec<String>,
}

/// Validation failures for [`ComponentSets::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentSetError {
    EmptyTarget,
    Duplicate { name: String },
}

impl std::error::Error for ComponentSetError {}

impl std::fmt::Display for ComponentSetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentSetError::EmptyTarget => {
                write!(f, "At least one target component is required")
            }
            ComponentSetError::Duplicate { name } => {
                write!(f, "Component '{name}' listed more than once across target/other sets")
            }
        }
    }
}

impl ComponentSets {
    /// Build validated component sets.
    ///
    /// # Errors
    /// - [`ComponentSetError::EmptyTarget`] if `target` is empty.
    /// - [`ComponentSetError::Duplicate`] if a name repeats within or across sets.
    pub fn new(target: Vec<String>, other: Vec<String>) -> Result<Self, ComponentSetError> {
        if target.is_empty() {
            return Err(ComponentSetError::EmptyTarget);
        }
        let mut seen = HashSet::new();
        for name in target.iter().chain(other.iter()) {
            if !seen.insert(name.as_str()) {
                return Err(ComponentSetError::Duplicate { name: name.clone() });
            }
        }
        Ok(Self { target, other })
    }

    pub fn target(&self) -> &[String] {
        &self.target
    }

    pub fn other(&self) -> &[String] {
        &self.other
    }

    /// Target then other components, with their roles.
    pub fn iter_roles(&self) -> impl Iterator<Item = (&str, ComponentRole)> {
        self.target
            .iter()
            .map(|c| (c.as_str(), ComponentRole::Target))
            .chain(self.other.iter().map(|c| (c.as_str(), ComponentRole::Other)))
    }
}

/// One row of a real-vs-predicted comparison table.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub component: String,
    pub real: f64,
    pub predicted: f64,
}

/// Real-vs-predicted values of every reference component for one case.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRecord {
    pub case: usize,
    pub rows: Vec<ComparisonRow>,
}

impl CaseRecord {
    pub fn row(&self, component: &str) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.component == component)
    }

    fn require(&self, component: &str) -> MetricResult<&ComparisonRow> {
        self.row(component).ok_or_else(|| MetricError::MissingComponent {
            case: self.case,
            component: component.to_string(),
        })
    }
}

/// Per-case MAPE for each target and other component.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseMetrics {
    pub case: usize,
    pub target: Vec<(String, f64)>,
    pub other: Vec<(String, Option<f64>)>,
}

/// Run-level MAPE of one component over all sampled cases.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentTotal {
    pub component: String,
    pub role: ComponentRole,
    /// `None` when a reference value of this diagnostic component is zero.
    pub mape: Option<f64>,
}

/// Reduced metrics of one objective evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateMetrics {
    pub objective: f64,
    pub per_case: Vec<CaseMetrics>,
    pub totals: Vec<ComponentTotal>,
    pub last_case: CaseRecord,
}

/// Streaming accumulator, fed one [`CaseRecord`] at a time.
#[derive(Debug, Clone)]
pub struct MapeAccumulator<'a> {
    sets: &'a ComponentSets,
    target_sum: f64,
    records: Vec<CaseRecord>,
    per_case: Vec<CaseMetrics>,
}

impl<'a> MapeAccumulator<'a> {
    pub fn new(sets: &'a ComponentSets) -> Self {
        Self { sets, target_sum: 0.0, records: Vec::new(), per_case: Vec::new() }
    }

    /// Add one case, returning its per-component MAPE.
    ///
    /// # Errors
    /// - [`MetricError::MissingComponent`] if a configured component has no row.
    /// - [`MetricError::DivisionByZero`] if a target reference value is zero.
    pub fn record_case(&mut self, record: CaseRecord) -> MetricResult<CaseMetrics> {
        let mut target = Vec::with_capacity(self.sets.target().len());
        for name in self.sets.target() {
            let row = record.require(name)?;
            let value = mape_single(row.real, row.predicted)?;
            target.push((name.clone(), value));
        }
        let mut other = Vec::with_capacity(self.sets.other().len());
        for name in self.sets.other() {
            let row = record.require(name)?;
            other.push((name.clone(), mape_single(row.real, row.predicted).ok()));
        }
        self.target_sum += target.iter().map(|(_, v)| v).sum::<f64>();
        let metrics = CaseMetrics { case: record.case, target, other };
        self.per_case.push(metrics.clone());
        self.records.push(record);
        Ok(metrics)
    }

    /// Reduce all recorded cases to the objective and run-level totals.
    ///
    /// # Errors
    /// - [`MetricError::EmptySeries`] if no case was recorded.
    /// - [`MetricError::DivisionByZero`] for a zero target reference.
    pub fn finish(self) -> MetricResult<AggregateMetrics> {
        let n_cases = self.records.len();
        if n_cases == 0 {
            return Err(MetricError::EmptySeries);
        }
        let objective = self.target_sum / (n_cases as f64 * self.sets.target().len() as f64);

        let mut totals = Vec::with_capacity(self.sets.target().len() + self.sets.other().len());
        for (name, role) in self.sets.iter_roles() {
            let mut reals = Vec::with_capacity(n_cases);
            let mut preds = Vec::with_capacity(n_cases);
            for record in &self.records {
                let row = record.require(name)?;
                reals.push(row.real);
                preds.push(row.predicted);
            }
            let total = match role {
                ComponentRole::Target => Some(mape(&reals, &preds)?),
                ComponentRole::Other => mape(&reals, &preds).ok(),
            };
            totals.push(ComponentTotal { component: name.to_string(), role, mape: total });
        }

        let mut records = self.records;
        let last_case = records.pop().ok_or(MetricError::EmptySeries)?;
        Ok(AggregateMetrics { objective, per_case: self.per_case, totals, last_case })
    }
}
