//! oracle::memory — a deterministic in-process simulation oracle.
//!
//! Purpose
//! -------
//! Stand in for the external engine during dry runs and tests. The oracle
//! keeps a registry of writable and readable paths, stores every written
//! value, and on each run evaluates a caller-supplied response function
//! `(inputs, parameters) -> outputs`.
//!
//! Key behaviors
//! -------------
//! - Writes to unregistered paths fail with [`OracleError::Write`]; reads from
//!   paths that are neither readable nor writable fail with
//!   [`OracleError::Read`].
//! - `parameters` passed to the response are the values at the registered
//!   parameter paths, in registration order (NaN if never written).
//! - `inputs` are all other written values keyed by full path.
//! - A non-finite response output is reported as
//!   [`OracleError::SimulationDiverged`].
//! - The oracle can be scripted to fail on the n-th run and to sleep on each
//!   run (for timeout tests).
//!
//! Downstream usage
//! ----------------
//! - [`InMemoryConnector`] hands out fresh clones of a template oracle. All
//!   clones share one [`SessionLog`], so a test can inspect runs and closure
//!   after the session itself has been dropped.
use std::{
    cell::Cell,
    collections::{HashMap, HashSet},
    rc::Rc,
    time::Duration,
};

use crate::oracle::{
    errors::{OracleError, OracleResult},
    layout::OracleLayout,
    session::{OracleConnector, OracleSession, SessionConfig},
};

/// Written values keyed by full path.
pub type PathValues = HashMap<String, f64>;

type ResponseFn = dyn Fn(&PathValues, &[f64]) -> Vec<(String, f64)>;

/// Counters shared by every session cloned from the same template.
#[derive(Debug, Default)]
pub struct SessionLog {
    opened: Cell<usize>,
    closed: Cell<usize>,
    runs: Cell<usize>,
    writes: Cell<usize>,
}

impl SessionLog {
    pub fn opened(&self) -> usize {
        self.opened.get()
    }

    pub fn closed(&self) -> usize {
        self.closed.get()
    }

    pub fn runs(&self) -> usize {
        self.runs.get()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Every opened session has been closed.
    pub fn all_closed(&self) -> bool {
        self.opened.get() == self.closed.get()
    }

    fn bump(cell: &Cell<usize>) {
        cell.set(cell.get() + 1);
    }
}

/// Builder for [`InMemoryOracle`].
#[derive(Default)]
pub struct InMemoryOracleBuilder {
    writable: HashSet<String>,
    readable: HashSet<String>,
    parameter_paths: Vec<String>,
    response: Option<Rc<ResponseFn>>,
    fail_on_run: Option<(usize, OracleError)>,
    run_latency: Duration,
}

impl InMemoryOracleBuilder {
    /// Register every parameter path of `layout` as writable, in layout order.
    pub fn parameter_paths(mut self, layout: &OracleLayout) -> Self {
        for slot in layout.slots() {
            let (pre_exp, act_energy) = layout.slot_paths(slot);
            self.writable.insert(pre_exp.clone());
            self.writable.insert(act_energy.clone());
            self.parameter_paths.push(pre_exp);
            self.parameter_paths.push(act_energy);
        }
        self
    }

    pub fn writable<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.writable.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn readable<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.readable.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Set the function computing output values from written inputs and
    /// parameters. Outputs are `(full path, value)` pairs.
    pub fn response<F>(mut self, f: F) -> Self
    where
        F: Fn(&PathValues, &[f64]) -> Vec<(String, f64)> + 'static,
    {
        self.response = Some(Rc::new(f));
        self
    }

    /// Make the `n`-th run (1-based, counted across clones) fail with `error`.
    pub fn fail_on_run(mut self, n: usize, error: OracleError) -> Self {
        self.fail_on_run = Some((n, error));
        self
    }

    /// Sleep this long inside every run.
    pub fn run_latency(mut self, latency: Duration) -> Self {
        self.run_latency = latency;
        self
    }

    pub fn build(self) -> InMemoryOracle {
        let values = self.readable.iter().map(|p| (p.clone(), 0.0)).collect();
        InMemoryOracle {
            writable: Rc::new(self.writable),
            readable: Rc::new(self.readable),
            parameter_paths: Rc::new(self.parameter_paths),
            response: self.response,
            fail_on_run: self.fail_on_run,
            run_latency: self.run_latency,
            values,
            closed: false,
            log: Rc::new(SessionLog::default()),
        }
    }
}

/// Deterministic in-process [`OracleSession`].
#[derive(Clone)]
pub struct InMemoryOracle {
    writable: Rc<HashSet<String>>,
    readable: Rc<HashSet<String>>,
    parameter_paths: Rc<Vec<String>>,
    response: Option<Rc<ResponseFn>>,
    fail_on_run: Option<(usize, OracleError)>,
    run_latency: Duration,
    values: PathValues,
    closed: bool,
    log: Rc<SessionLog>,
}

impl std::fmt::Debug for InMemoryOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryOracle")
            .field("writable", &self.writable.len())
            .field("readable", &self.readable.len())
            .field("closed", &self.closed)
            .field("log", &self.log)
            .finish()
    }
}

impl InMemoryOracle {
    pub fn builder() -> InMemoryOracleBuilder {
        InMemoryOracleBuilder::default()
    }

    /// Current value at `path`, if it has been written or produced.
    pub fn value(&self, path: &str) -> Option<f64> {
        self.values.get(path).copied()
    }

    pub fn run_count(&self) -> usize {
        self.log.runs()
    }

    pub fn write_count(&self) -> usize {
        self.log.writes()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Shared counters of this oracle and all its clones.
    pub fn log(&self) -> Rc<SessionLog> {
        Rc::clone(&self.log)
    }

    fn ensure_open(&self) -> OracleResult<()> {
        if self.closed {
            return Err(OracleError::SessionClosed);
        }
        Ok(())
    }
}

impl OracleSession for InMemoryOracle {
    fn write_value(&mut self, path: &str, value: f64) -> OracleResult<()> {
        self.ensure_open()?;
        if !self.writable.contains(path) {
            return Err(OracleError::Write { path: path.to_string() });
        }
        self.values.insert(path.to_string(), value);
        SessionLog::bump(&self.log.writes);
        Ok(())
    }

    fn read_value(&mut self, path: &str) -> OracleResult<f64> {
        self.ensure_open()?;
        if !self.readable.contains(path) && !self.writable.contains(path) {
            return Err(OracleError::Read { path: path.to_string() });
        }
        self.values.get(path).copied().ok_or_else(|| OracleError::Read { path: path.to_string() })
    }

    fn run(&mut self) -> OracleResult<()> {
        self.ensure_open()?;
        SessionLog::bump(&self.log.runs);
        if !self.run_latency.is_zero() {
            std::thread::sleep(self.run_latency);
        }
        if let Some((n, error)) = &self.fail_on_run {
            if self.log.runs() == *n {
                return Err(error.clone());
            }
        }

        let Some(response) = self.response.as_ref().map(Rc::clone) else {
            return Ok(());
        };
        let params: Vec<f64> = self
            .parameter_paths
            .iter()
            .map(|p| self.values.get(p).copied().unwrap_or(f64::NAN))
            .collect();
        let inputs: PathValues = self
            .values
            .iter()
            .filter(|(p, _)| self.writable.contains(*p) && !self.parameter_paths.contains(*p))
            .map(|(p, v)| (p.clone(), *v))
            .collect();

        for (path, value) in response(&inputs, &params) {
            if !value.is_finite() {
                return Err(OracleError::SimulationDiverged {
                    reason: format!("non-finite output at {path}"),
                });
            }
            self.values.insert(path, value);
        }
        Ok(())
    }

    fn close(&mut self) -> OracleResult<()> {
        self.ensure_open()?;
        self.closed = true;
        SessionLog::bump(&self.log.closed);
        Ok(())
    }
}

/// Connector handing out fresh sessions cloned from a template.
#[derive(Debug)]
pub struct InMemoryConnector {
    template: InMemoryOracle,
    open_failure: Option<String>,
}

impl InMemoryConnector {
    pub fn new(template: InMemoryOracle) -> Self {
        Self { template, open_failure: None }
    }

    /// Make every `open` fail with `reason`.
    pub fn failing_open(mut self, reason: impl Into<String>) -> Self {
        self.open_failure = Some(reason.into());
        self
    }

    pub fn log(&self) -> Rc<SessionLog> {
        self.template.log()
    }
}

impl OracleConnector for InMemoryConnector {
    type Session = InMemoryOracle;

    fn open(&self, config: &SessionConfig) -> OracleResult<InMemoryOracle> {
        if let Some(reason) = &self.open_failure {
            return Err(OracleError::SessionOpen {
                archive: config.archive.display().to_string(),
                reason: reason.clone(),
            });
        }
        SessionLog::bump(&self.template.log.opened);
        Ok(self.template.clone())
    }
}
