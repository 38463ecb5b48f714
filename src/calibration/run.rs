//! calibration::run — end-to-end calibration pipeline.
//!
//! Purpose
//! -------
//! Wire the layers together: normalize the raw tables, validate them against
//! the configuration, draw the case sample, scan it for unusable references,
//! then open one oracle session, drive the global search, finalize at the
//! best parameters, and release the session.
//!
//! Key behaviors
//! -------------
//! - Steps 1–4 (preprocess, validate, sample, preflight) fail fast, before any
//!   session is opened.
//! - The session lives in a [`SessionGuard`]; it is closed explicitly on
//!   success and on every error path (the guard's `Drop` covers panics).
//! - A close failure after a successful search is reported as an
//!   [`AbortedRun`] that still carries the best point.
//!
//! Invariants & assumptions
//! ------------------------
//! - The sample is drawn once and shared by every evaluation of the run.
//! - Cancellation after the first local minimum is not an error: the search
//!   stops, the best point is finalized and the report says `Cancelled`.
use tracing::{info, warn};

use crate::{
    calibration::{
        config::RunConfig,
        errors::{AbortedRun, CalibError, CalibResult},
        evaluator::ObjectiveEvaluator,
        finalize::finalize,
        report::CalibrationReport,
    },
    data::{CalibrationData, CaseSampler, RawTable, SampleSet, preprocess},
    optimization::{
        basin_hopping::{BasinHopping, HopAbort},
        cancel::CancellationToken,
        local_search::LbfgsRefiner,
    },
    oracle::{OracleAdapter, OracleConnector, OracleError, OracleSession, SessionGuard},
};

/// Run a full calibration.
///
/// # Errors
/// [`AbortedRun`] with the failing [`CalibError`] and, when the search had
/// produced one, the best point found before the failure.
pub fn calibrate<C: OracleConnector>(
    connector: &C, config: &RunConfig, input_raw: &RawTable, reference_raw: &RawTable,
    cancel: Option<&CancellationToken>,
) -> Result<CalibrationReport, AbortedRun> {
    let (data, sample) = prepare(config, input_raw, reference_raw)?;

    let session = connector.open(config.session()).map_err(CalibError::from)?;
    info!(archive = %config.session().archive.display(), "simulation session opened");
    let mut guard = SessionGuard::new(session);

    let driven = match guard.session_mut() {
        Some(session) => drive(session, config, &data, &sample, cancel),
        None => Err(CalibError::Oracle(OracleError::SessionClosed).into()),
    };
    let closed = guard.close();

    match (driven, closed) {
        (Ok(report), Ok(())) => {
            info!(
                objective = report.objective(),
                evaluations = report.evaluations,
                "calibration finished"
            );
            Ok(report)
        }
        (Ok(report), Err(err)) => {
            Err(AbortedRun { error: CalibError::Oracle(err), best: Some(report.best) })
        }
        (Err(aborted), Ok(())) => Err(aborted),
        (Err(aborted), Err(err)) => {
            warn!(error = %err, "simulation session did not close cleanly after a failed run");
            Err(aborted)
        }
    }
}

/// Steps that run before a session exists.
fn prepare(
    config: &RunConfig, input_raw: &RawTable, reference_raw: &RawTable,
) -> CalibResult<(CalibrationData, SampleSet)> {
    let (input, input_components) = preprocess(input_raw, config.label_column())?;
    let (reference, _) = preprocess(reference_raw, config.label_column())?;
    let data = CalibrationData::new(input, reference)?;
    config.validate_against(&data)?;
    info!(
        cases = data.n_cases(),
        inputs = input_components.len(),
        references = data.reference.components().len(),
        "datasets loaded"
    );

    let sample = CaseSampler::new(config.seed()).sample(data.n_cases(), config.sample_size())?;
    info!(seed = sample.seed(), cases = ?sample.cases(), "case sample drawn");
    preflight(config, &data, &sample)?;
    Ok((data, sample))
}

/// Reject sampled cases whose target reference is zero.
fn preflight(config: &RunConfig, data: &CalibrationData, sample: &SampleSet) -> CalibResult<()> {
    for case in sample.iter() {
        for component in config.components().target() {
            if data.reference.value(component, case)? == 0.0 {
                return Err(CalibError::ZeroReference { component: component.clone(), case });
            }
        }
        for component in config.components().other() {
            if data.reference.value(component, case)? == 0.0 {
                warn!(
                    component = component.as_str(),
                    case, "zero reference value; diagnostic MAPE will be undefined"
                );
            }
        }
    }
    Ok(())
}

fn drive<S: OracleSession>(
    session: &mut S, config: &RunConfig, data: &CalibrationData, sample: &SampleSet,
    cancel: Option<&CancellationToken>,
) -> Result<CalibrationReport, AbortedRun> {
    let adapter = OracleAdapter::new(
        session,
        config.layout(),
        config.session().settle_delay,
        config.session().run_timeout,
    );
    let mut evaluator = ObjectiveEvaluator::new(adapter, data, config.components(), sample);
    let refiner = LbfgsRefiner::new(config.local_options().clone(), config.bounds().cloned());
    let hop = config.hop_options();
    let mut search = BasinHopping::new(&refiner, &hop);
    if let Some(token) = cancel {
        evaluator = evaluator.with_cancellation(token.clone());
        search = search.with_cancellation(token.clone());
    }

    let outcome = search.run(&evaluator, config.initial_params().clone()).map_err(
        |HopAbort { error, best }| AbortedRun { error: CalibError::from(error), best },
    )?;
    info!(
        objective = outcome.best.objective,
        iterations = outcome.iterations,
        accepted = outcome.accepted,
        termination = ?outcome.termination,
        "global search finished"
    );

    let final_report = finalize(&evaluator, &outcome.best).map_err(|error| AbortedRun {
        error: CalibError::from(error),
        best: Some(outcome.best.clone()),
    })?;
    Ok(CalibrationReport {
        best: outcome.best.clone(),
        final_report,
        evaluations: evaluator.evaluations(),
        search: outcome,
        sample: sample.clone(),
    })
}
