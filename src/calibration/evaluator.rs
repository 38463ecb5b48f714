//! calibration::evaluator — the calibration objective.
//!
//! Purpose
//! -------
//! Turn a kinetic parameter vector into a scalar fitness by running the fixed
//! case sample through the oracle and reducing the real-vs-predicted values
//! to the mean target MAPE.
//!
//! Key behaviors
//! -------------
//! - One evaluation writes the parameters once, then for every sampled case
//!   (in draw order) writes the case inputs, runs the simulation, reads every
//!   reference component and records the comparison.
//! - [`ObjectiveEvaluator::evaluate`] returns the objective only;
//!   [`ObjectiveEvaluator::evaluate_detailed`] also returns per-case metrics,
//!   run-level totals and the last case's comparison table.
//! - Implements [`Objective`], so the optimizers can drive it directly. The
//!   optimizer path checks the cancellation token before each evaluation; the
//!   detailed path never does.
//!
//! Invariants & assumptions
//! ------------------------
//! - The sample, datasets and component sets are borrowed immutably and never
//!   change between evaluations, so equal parameters give equal objectives
//!   against a deterministic oracle.
//! - The session is used strictly sequentially through a `RefCell`; the
//!   evaluator is single-threaded by construction (`!Sync`).
//! - Any oracle, metric or data failure aborts the evaluation with the
//!   matching [`OptError`] variant.
use std::cell::{Cell, RefCell};

use tracing::{debug, info, warn};

use crate::{
    calibration::report::EvaluationReport,
    data::{CalibrationData, SampleSet},
    metrics::{CaseRecord, ComparisonRow, ComponentRole, ComponentSets, MapeAccumulator},
    optimization::{
        cancel::CancellationToken,
        errors::{OptError, OptResult},
        local_search::{traits::Objective, types::{Cost, Theta}},
    },
    oracle::{OracleAdapter, OracleSession},
};

pub struct ObjectiveEvaluator<'a, S: OracleSession> {
    adapter: RefCell<OracleAdapter<'a, S>>,
    data: &'a CalibrationData,
    sets: &'a ComponentSets,
    sample: &'a SampleSet,
    cancel: Option<CancellationToken>,
    evaluations: Cell<usize>,
}

impl<'a, S: OracleSession> ObjectiveEvaluator<'a, S> {
    pub fn new(
        adapter: OracleAdapter<'a, S>, data: &'a CalibrationData, sets: &'a ComponentSets,
        sample: &'a SampleSet,
    ) -> Self {
        Self {
            adapter: RefCell::new(adapter),
            data,
            sets,
            sample,
            cancel: None,
            evaluations: Cell::new(0),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Number of evaluations started so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }

    pub fn sample(&self) -> &SampleSet {
        self.sample
    }

    /// Objective value at `theta`.
    ///
    /// # Errors
    /// Oracle, metric and data failures as [`OptError`].
    pub fn evaluate(&self, theta: &Theta) -> OptResult<Cost> {
        self.evaluate_detailed(theta).map(|r| r.objective)
    }

    /// Objective value plus the full comparison at `theta`.
    ///
    /// # Errors
    /// Oracle, metric and data failures as [`OptError`].
    pub fn evaluate_detailed(&self, theta: &Theta) -> OptResult<EvaluationReport> {
        self.evaluations.set(self.evaluations.get() + 1);
        let mut adapter = self.adapter.borrow_mut();
        adapter.write_parameters(theta.view())?;

        let input_components = self.data.input.components();
        let reference_components = self.data.reference.components();
        let mut acc = MapeAccumulator::new(self.sets);
        for case in self.sample.iter() {
            adapter.write_case_inputs(input_components, self.data.input.case_column(case)?)?;
            adapter.run()?;
            let predicted = adapter.read_outputs(reference_components)?;

            let mut rows = Vec::with_capacity(predicted.len());
            for (component, predicted) in predicted {
                let real = self.data.reference.value(&component, case)?;
                rows.push(ComparisonRow { component, real, predicted });
            }
            let metrics = acc.record_case(CaseRecord { case, rows })?;
            for (component, mape) in &metrics.target {
                debug!(case, component = component.as_str(), mape, "case target MAPE");
            }
            for (component, mape) in &metrics.other {
                debug!(case, component = component.as_str(), mape = ?mape, "case diagnostic MAPE");
            }
        }
        drop(adapter);

        let report = EvaluationReport::from(acc.finish()?);
        for total in &report.totals {
            match (total.mape, total.role) {
                (Some(mape), _) => {
                    info!(component = total.component.as_str(), total_mape = mape, "run-level MAPE")
                }
                (None, ComponentRole::Other) => warn!(
                    component = total.component.as_str(),
                    "run-level MAPE undefined: zero reference value"
                ),
                (None, ComponentRole::Target) => {}
            }
        }
        info!(objective = report.objective, evaluation = self.evaluations(), "objective evaluated");
        Ok(report)
    }
}

impl<S: OracleSession> Objective for ObjectiveEvaluator<'_, S> {
    fn value(&self, theta: &Theta) -> OptResult<Cost> {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Err(OptError::Cancelled);
        }
        self.evaluate(theta)
    }

    fn check(&self, theta: &Theta) -> OptResult<()> {
        let expected = self.adapter.borrow().layout().n_params();
        if theta.len() != expected {
            return Err(OptError::ThetaLengthMismatch { expected, actual: theta.len() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{CaseSampler, RawCell, RawTable, preprocess},
        oracle::{InMemoryOracle, OracleError, OracleLayout, PathTemplate, ReactionSlot},
    };
    use ndarray::array;
    use std::time::Duration;

    // Scope
    // -----
    // One objective evaluation against the in-memory oracle: the objective
    // formula, run-level totals, error propagation, and cancellation.

    fn table(rows: &[(&str, &[f64])]) -> RawTable {
        let n = rows[0].1.len();
        let mut columns = vec!["Unnamed: 0".to_string()];
        columns.extend((0..n).map(|i| format!("case{i}")));
        let rows = rows
            .iter()
            .map(|(label, values)| {
                let mut row = vec![RawCell::from(*label)];
                row.extend(values.iter().map(|&v| RawCell::from(v)));
                row
            })
            .collect();
        RawTable::new(columns, rows)
    }

    fn layout() -> OracleLayout {
        OracleLayout::new(
            PathTemplate::new("/R/PRE_EXP/"),
            PathTemplate::new("/R/ACT_ENERGY/"),
            vec![ReactionSlot::from("5")],
            PathTemplate::new("/W/"),
            PathTemplate::new("/O/"),
        )
        .unwrap()
    }

    /// Oracle predicting `A = FEED * k` and `B = FEED * 2` with `k` the
    /// pre-exponential factor.
    fn oracle(layout: &OracleLayout) -> InMemoryOracle {
        InMemoryOracle::builder()
            .parameter_paths(layout)
            .writable(["/W/FEED"])
            .readable(["/O/A", "/O/B"])
            .response(|inputs, params| {
                let feed = inputs.get("/W/FEED").copied().unwrap_or(0.0);
                vec![("/O/A".to_string(), feed * params[0]), ("/O/B".to_string(), feed * 2.0)]
            })
            .build()
    }

    fn data() -> CalibrationData {
        let (input, _) = preprocess(&table(&[("FEED", &[1.0, 2.0, 4.0])]), "Unnamed: 0").unwrap();
        let (reference, _) = preprocess(
            &table(&[("A", &[1.0, 2.0, 4.0]), ("B", &[2.0, 4.0, 8.0])]),
            "Unnamed: 0",
        )
        .unwrap();
        CalibrationData::new(input, reference).unwrap()
    }

    fn sets() -> ComponentSets {
        ComponentSets::new(vec!["A".into()], vec!["B".into()]).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // The objective is the mean target MAPE over sampled cases; diagnostic
    // components are reported but excluded.
    //
    // Given
    // -----
    // - Real A = FEED, predicted A = 1.1 · FEED, so each case has 10% MAPE.
    // - B is predicted exactly.
    //
    // Expect
    // ------
    // - objective = 10, total(A) = 10, total(B) = 0.
    // - The oracle ran once per sampled case; parameters written once.
    fn objective_is_mean_target_mape() {
        let layout = layout();
        let mut session = oracle(&layout);
        let data = data();
        let sets = sets();
        let sample = CaseSampler::new(Some(3)).sample(3, 3).unwrap();
        let adapter = OracleAdapter::new(&mut session, &layout, Duration::ZERO, None);
        let eval = ObjectiveEvaluator::new(adapter, &data, &sets, &sample);

        let report = eval.evaluate_detailed(&array![1.1, 7.0]).unwrap();
        assert!((report.objective - 10.0).abs() < 1e-9);
        assert!((report.total("A").unwrap().mape.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(report.total("B").unwrap().mape, Some(0.0));
        assert_eq!(report.per_case.len(), 3);
        assert_eq!(report.last_case.case, *sample.cases().last().unwrap());
        assert_eq!(eval.evaluations(), 1);
        drop(eval);

        assert_eq!(session.run_count(), 3);
        assert_eq!(session.value("/R/ACT_ENERGY/5"), Some(7.0));
    }

    #[test]
    // Purpose
    // -------
    // Oracle failures abort the evaluation with their kind; cancellation is
    // only honored on the optimizer path.
    fn failures_and_cancellation() {
        let layout = layout();
        let data = data();
        let sets = sets();
        let sample = CaseSampler::new(Some(1)).sample(3, 2).unwrap();

        let mut failing = InMemoryOracle::builder()
            .parameter_paths(&layout)
            .writable(["/W/FEED"])
            .readable(["/O/A", "/O/B"])
            .fail_on_run(2, OracleError::SimulationDiverged { reason: "flash".into() })
            .build();
        let adapter = OracleAdapter::new(&mut failing, &layout, Duration::ZERO, None);
        let eval = ObjectiveEvaluator::new(adapter, &data, &sets, &sample);
        assert_eq!(
            eval.value(&array![1.0, 1.0]).unwrap_err(),
            OptError::Oracle(OracleError::SimulationDiverged { reason: "flash".into() })
        );

        let mut session = oracle(&layout);
        let token = CancellationToken::new();
        let adapter = OracleAdapter::new(&mut session, &layout, Duration::ZERO, None);
        let eval =
            ObjectiveEvaluator::new(adapter, &data, &sets, &sample).with_cancellation(token.clone());
        token.cancel();
        assert_eq!(eval.value(&array![1.0, 1.0]).unwrap_err(), OptError::Cancelled);
        assert!(eval.evaluate_detailed(&array![1.0, 1.0]).is_ok());
        assert!(matches!(
            eval.check(&array![1.0]),
            Err(OptError::ThetaLengthMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    // Purpose
    // -------
    // A zero reference in a target component is a metric error, not NaN.
    fn zero_target_reference_is_an_error() {
        let layout = layout();
        let mut session = oracle(&layout);
        let (input, _) = preprocess(&table(&[("FEED", &[1.0])]), "Unnamed: 0").unwrap();
        let (reference, _) =
            preprocess(&table(&[("A", &[0.0]), ("B", &[2.0])]), "Unnamed: 0").unwrap();
        let data = CalibrationData::new(input, reference).unwrap();
        let sets = sets();
        let sample = CaseSampler::new(Some(0)).sample(1, 1).unwrap();
        let adapter = OracleAdapter::new(&mut session, &layout, Duration::ZERO, None);
        let eval = ObjectiveEvaluator::new(adapter, &data, &sets, &sample);

        assert!(matches!(eval.evaluate(&array![1.0, 1.0]), Err(OptError::Metric(_))));
    }
}
