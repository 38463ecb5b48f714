//! Results of a global search.
use crate::optimization::{
    errors::OptError,
    local_search::types::{FnEvalMap, Theta},
};

/// A completed local minimum: parameters and their objective value.
#[derive(Debug, Clone, PartialEq)]
pub struct BestPoint {
    pub theta: Theta,
    pub objective: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    MaxIterations,
    Cancelled,
}

/// One row of the iteration trace.
///
/// `trial_objective` is `None` when the local refinement of the trial failed
/// (the trial is then rejected).
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    pub iteration: usize,
    pub trial_objective: Option<f64>,
    pub accepted: bool,
    pub best_objective: f64,
    pub step_size: f64,
}

/// Outcome of a completed (or cancelled) basin-hopping run.
#[derive(Debug, Clone, PartialEq)]
pub struct HopOutcome {
    pub best: BestPoint,
    pub iterations: usize,
    pub accepted: usize,
    pub local_failures: usize,
    pub final_step_size: f64,
    pub termination: TerminationReason,
    pub trace: Vec<IterationRecord>,
    /// Argmin counters summed over every local refinement.
    pub fn_evals: FnEvalMap,
    /// Seed of the perturbation/acceptance stream.
    pub seed: u64,
}

/// Search aborted by an objective failure.
///
/// `best` is the last completed local minimum, `None` if the failure hit
/// the initial refinement.
#[derive(Debug, Clone, PartialEq)]
pub struct HopAbort {
    pub error: OptError,
    pub best: Option<BestPoint>,
}

impl std::error::Error for HopAbort {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl std::fmt::Display for HopAbort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.best {
            Some(best) => write!(
                f,
                "Basin hopping aborted (best objective so far {}): {}",
                best.objective, self.error
            ),
            None => write!(f, "Basin hopping aborted before the first local minimum: {}", self.error),
        }
    }
}

pub(crate) fn merge_counts(total: &mut FnEvalMap, add: &FnEvalMap) {
    for (k, v) in add {
        *total.entry(k.clone()).or_insert(0) += v;
    }
}
