//! kinetic_calibration — basin-hopping calibration of reaction kinetics
//! against a stateful simulation oracle, with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the calibration run to Python via the `_kinetic_calibration`
//! extension module (feature `python-bindings`).
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules: `data` (raw tables, datasets, case sample),
//!   `oracle` (session contract, layout, adapter, in-memory oracle),
//!   `metrics` (MAPE and aggregation), `optimization` (local refinement and
//!   basin hopping) and `calibration` (objective, configuration, pipeline).
//! - Under `python-bindings`, adapt a Python session object to
//!   [`oracle::OracleSession`] and expose `calibrate` plus a report class.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input validation and error mapping.
//! - A Python session is driven strictly sequentially, one call at a time,
//!   holding the GIL for each call.
//!
//! Conventions
//! -----------
//! - The Python session object must provide `write_value(path, value)`,
//!   `read_value(path) -> float`, `run()` and `close()`; any exception they
//!   raise maps to the matching [`oracle::OracleError`] variant. A
//!   `TimeoutError` from `run()` is a timeout, any other exception a
//!   divergence.
//! - Errors from the core are converted to `PyErr` (`ValueError`) at the
//!   boundary, with the [`calibration::ErrorKind`] in the message.
//!
//! Downstream usage
//! ----------------
//! - Rust callers use [`calibration::calibrate`] with their own
//!   [`oracle::OracleConnector`], or the in-memory oracle for dry runs.
//! - The Python package imports `_kinetic_calibration.calibrate`.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   end-to-end tests in `tests/`; the PyO3 layer is exercised from Python.

pub mod calibration;
pub mod data;
pub mod metrics;
pub mod optimization;
pub mod oracle;
pub mod utils;

#[cfg(feature = "python-bindings")]
use std::{
    path::Path,
    time::{Duration, Instant},
};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyTimeoutError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    calibration::{CalibrationReport, RunConfig},
    oracle::{OracleConnector, OracleError, OracleResult, OracleSession, SessionConfig},
    utils::{
        extract_hop_options, extract_layout, extract_local_options, extract_raw_table,
        extract_seconds, extract_theta,
    },
};

/// Python object driven as an [`OracleSession`].
#[cfg(feature = "python-bindings")]
pub struct PyOracleSession {
    obj: Py<PyAny>,
    run_timeout: Option<Duration>,
}

#[cfg(feature = "python-bindings")]
impl OracleSession for PyOracleSession {
    fn write_value(&mut self, path: &str, value: f64) -> OracleResult<()> {
        Python::with_gil(|py| {
            self.obj
                .bind(py)
                .call_method1("write_value", (path, value))
                .map(|_| ())
                .map_err(|_| OracleError::Write { path: path.to_string() })
        })
    }

    fn read_value(&mut self, path: &str) -> OracleResult<f64> {
        Python::with_gil(|py| {
            self.obj
                .bind(py)
                .call_method1("read_value", (path,))
                .and_then(|v| v.extract::<f64>())
                .map_err(|_| OracleError::Read { path: path.to_string() })
        })
    }

    fn run(&mut self) -> OracleResult<()> {
        let started = Instant::now();
        Python::with_gil(|py| {
            self.obj.bind(py).call_method0("run").map(|_| ()).map_err(|e| {
                OracleError::run_failure(
                    e.is_instance_of::<PyTimeoutError>(py),
                    e.to_string(),
                    started.elapsed(),
                    self.run_timeout,
                )
            })
        })
    }

    fn close(&mut self) -> OracleResult<()> {
        Python::with_gil(|py| {
            self.obj
                .bind(py)
                .call_method0("close")
                .map(|_| ())
                .map_err(|e| OracleError::SessionClose { reason: e.to_string() })
        })
    }
}

/// Opens sessions through a Python callable `open_session(archive, visible)`.
#[cfg(feature = "python-bindings")]
pub struct PyConnector {
    open_session: Py<PyAny>,
}

#[cfg(feature = "python-bindings")]
impl OracleConnector for PyConnector {
    type Session = PyOracleSession;

    fn open(&self, config: &SessionConfig) -> OracleResult<PyOracleSession> {
        config.require_archive()?;
        let archive = config.archive.display().to_string();
        Python::with_gil(|py| {
            self.open_session
                .bind(py)
                .call1((archive.as_str(), config.visible))
                .map(|obj| PyOracleSession { obj: obj.unbind(), run_timeout: config.run_timeout })
                .map_err(|e| OracleError::SessionOpen { archive: archive.clone(), reason: e.to_string() })
        })
    }
}

/// CalibrationReport — Python-facing view of a finished calibration.
///
/// Accessors
/// ---------
/// - `objective`: mean target MAPE of the final evaluation (percent).
/// - `best_parameters`: parameter vector at the best local minimum.
/// - `sample`, `seed`: case indices used by every evaluation and their seed.
/// - `totals`: run-level MAPE per component, `None` where undefined.
/// - `last_case`: `(component, real, predicted)` rows of the last case.
/// - `iterations`, `accepted`, `termination`, `evaluations`: search summary.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "kinetic_calibration", name = "CalibrationReport")]
pub struct PyCalibrationReport {
    inner: CalibrationReport,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyCalibrationReport {
    #[getter]
    pub fn objective(&self) -> f64 {
        self.inner.objective()
    }

    #[getter]
    pub fn best_parameters(&self) -> Vec<f64> {
        self.inner.best.theta.to_vec()
    }

    #[getter]
    pub fn best_objective(&self) -> f64 {
        self.inner.best.objective
    }

    #[getter]
    pub fn sample(&self) -> Vec<usize> {
        self.inner.sample.cases().to_vec()
    }

    #[getter]
    pub fn seed(&self) -> u64 {
        self.inner.sample.seed()
    }

    #[getter]
    pub fn totals(&self) -> Vec<(String, Option<f64>)> {
        self.inner.final_report.totals.iter().map(|t| (t.component.clone(), t.mape)).collect()
    }

    #[getter]
    pub fn last_case(&self) -> Vec<(String, f64, f64)> {
        self.inner
            .final_report
            .last_case
            .rows
            .iter()
            .map(|r| (r.component.clone(), r.real, r.predicted))
            .collect()
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.search.iterations
    }

    #[getter]
    pub fn accepted(&self) -> usize {
        self.inner.search.accepted
    }

    #[getter]
    pub fn termination(&self) -> String {
        format!("{:?}", self.inner.search.termination)
    }

    #[getter]
    pub fn evaluations(&self) -> usize {
        self.inner.evaluations
    }

    #[getter]
    pub fn best_trace(&self) -> Vec<f64> {
        self.inner.search.trace.iter().map(|r| r.best_objective).collect()
    }
}

/// Run a calibration against a Python-provided simulation session.
///
/// `input_values` / `reference_values` are `components × cases` float64
/// matrices whose rows are named by `input_labels` / `reference_labels`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (
        open_session,
        archive,
        pre_exp_path,
        act_energy_path,
        slots,
        write_base,
        read_base,
        input_labels,
        input_values,
        reference_labels,
        reference_values,
        initial_params,
        target_components = None,
        other_components = None,
        sample_size = None,
        seed = None,
        n_iter = None,
        step_size = None,
        interval = None,
        temperature = None,
        tol = None,
        max_iter = None,
        line_searcher = None,
        lbfgs_mem = None,
        settle_delay = None,
        run_timeout = None,
        legacy_leading_base = None,
    ),
    text_signature = "(open_session, archive, pre_exp_path, act_energy_path, slots, write_base, \
                      read_base, input_labels, input_values, reference_labels, reference_values, \
                      initial_params, /, target_components=None, other_components=None, \
                      sample_size=64, seed=None, n_iter=10000, step_size=0.02, interval=3, \
                      temperature=1.0, tol=1e-4, max_iter=None, line_searcher='MoreThuente', \
                      lbfgs_mem=None, settle_delay=7.0, run_timeout=None, legacy_leading_base=None)"
)]
#[allow(clippy::too_many_arguments)]
pub fn calibrate<'py>(
    py: Python<'py>, open_session: Py<PyAny>, archive: &str, pre_exp_path: &str,
    act_energy_path: &str, slots: Vec<String>, write_base: &str, read_base: &str,
    input_labels: Vec<String>, input_values: &Bound<'py, PyAny>, reference_labels: Vec<String>,
    reference_values: &Bound<'py, PyAny>, initial_params: &Bound<'py, PyAny>,
    target_components: Option<Vec<String>>, other_components: Option<Vec<String>>,
    sample_size: Option<usize>, seed: Option<u64>, n_iter: Option<usize>,
    step_size: Option<f64>, interval: Option<usize>, temperature: Option<f64>, tol: Option<f64>,
    max_iter: Option<usize>, line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
    settle_delay: Option<f64>, run_timeout: Option<f64>, legacy_leading_base: Option<&str>,
) -> PyResult<PyCalibrationReport> {
    let mut session = SessionConfig::new(Path::new(archive));
    if let Some(secs) = settle_delay {
        session = session.with_settle_delay(extract_seconds("settle_delay", secs)?);
    }
    if let Some(secs) = run_timeout {
        session = session.with_run_timeout(Some(extract_seconds("run_timeout", secs)?));
    }
    let layout = extract_layout(
        pre_exp_path,
        act_energy_path,
        slots,
        write_base,
        read_base,
        legacy_leading_base,
    )?;
    let theta0 = extract_theta(py, initial_params)?;

    let mut builder = RunConfig::builder(session, layout, theta0)
        .seed(seed)
        .hop_options(extract_hop_options(n_iter, step_size, interval, temperature)?)
        .local_options(extract_local_options(tol, max_iter, line_searcher, lbfgs_mem)?);
    if let Some(names) = target_components {
        builder = builder.target_components(names);
    }
    if let Some(names) = other_components {
        builder = builder.other_components(names);
    }
    if let Some(n) = sample_size {
        builder = builder.sample_size(n);
    }
    let config = builder.build()?;

    let input_raw = extract_raw_table(input_labels, input_values, config.label_column())?;
    let reference_raw =
        extract_raw_table(reference_labels, reference_values, config.label_column())?;
    let connector = PyConnector { open_session };
    let report =
        calibration::calibrate(&connector, &config, &input_raw, &reference_raw, None)?;
    Ok(PyCalibrationReport { inner: report })
}

#[cfg(feature = "python-bindings")]
#[pymodule]
fn _kinetic_calibration<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<PyCalibrationReport>()?;
    m.add_function(wrap_pyfunction!(calibrate, m)?)?;
    Ok(())
}
