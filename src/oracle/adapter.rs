//! oracle::adapter — typed calibration operations on top of a raw session.
//!
//! Purpose
//! -------
//! Translate "write this parameter vector", "write this case's inputs", "run",
//! and "read these outputs" into the path-addressed calls of an
//! [`OracleSession`], using an [`OracleLayout`] for every path.
//!
//! Key behaviors
//! -------------
//! - Parameter vectors are length-checked before the first write, so a
//!   mismatched vector never leaves the session half-updated.
//! - [`OracleAdapter::run`] measures the blocking run against the optional
//!   timeout and then waits out the settle delay. Outputs read before the
//!   delay has elapsed are not guaranteed to reflect the run.
//! - Reads return `(component, value)` pairs in the requested order.
//!
//! Conventions
//! -----------
//! - The adapter never retries. Every session error is returned unchanged.
//! - Calls are strictly sequential; the adapter is `!Sync` by construction
//!   through `&mut` access.
use std::time::{Duration, Instant};

use ndarray::ArrayView1;

use crate::oracle::{
    errors::{OracleError, OracleResult},
    layout::OracleLayout,
    session::OracleSession,
};

/// Calibration-level operations over one session.
#[derive(Debug)]
pub struct OracleAdapter<'a, S: OracleSession> {
    session: S,
    layout: &'a OracleLayout,
    settle_delay: Duration,
    run_timeout: Option<Duration>,
}

impl<'a, S: OracleSession> OracleAdapter<'a, S> {
    pub fn new(
        session: S, layout: &'a OracleLayout, settle_delay: Duration, run_timeout: Option<Duration>,
    ) -> Self {
        Self { session, layout, settle_delay, run_timeout }
    }

    pub fn layout(&self) -> &OracleLayout {
        self.layout
    }

    /// Write a full parameter vector.
    ///
    /// `theta[2i]` goes to the pre-exponential path of slot `i`, `theta[2i+1]`
    /// to its activation-energy path.
    ///
    /// # Errors
    /// - [`OracleError::ParameterLength`] before any write if
    ///   `theta.len() != 2 × slots`.
    /// - [`OracleError::Write`] for the first path that does not resolve.
    pub fn write_parameters(&mut self, theta: ArrayView1<'_, f64>) -> OracleResult<()> {
        let expected = self.layout.n_params();
        if theta.len() != expected {
            return Err(OracleError::ParameterLength { expected, found: theta.len() });
        }
        for (i, slot) in self.layout.slots().iter().enumerate() {
            let (pre_exp_path, act_energy_path) = self.layout.slot_paths(slot);
            self.session.write_value(&pre_exp_path, theta[2 * i])?;
            self.session.write_value(&act_energy_path, theta[2 * i + 1])?;
        }
        Ok(())
    }

    /// Write one case's input values, `values[k]` to input component `k`.
    ///
    /// # Errors
    /// - [`OracleError::ParameterLength`] if `components` and `values` differ
    ///   in length.
    /// - [`OracleError::Write`] for the first path that does not resolve.
    pub fn write_case_inputs(
        &mut self, components: &[String], values: ArrayView1<'_, f64>,
    ) -> OracleResult<()> {
        if components.len() != values.len() {
            return Err(OracleError::ParameterLength {
                expected: components.len(),
                found: values.len(),
            });
        }
        for (position, (component, &value)) in components.iter().zip(values.iter()).enumerate() {
            let path = self.layout.input_path(position, component);
            self.session.write_value(&path, value)?;
        }
        Ok(())
    }

    /// Run the simulation, enforce the timeout, and wait out the settle delay.
    ///
    /// # Errors
    /// - Whatever the session reports ([`OracleError::SimulationDiverged`]).
    /// - [`OracleError::SimulationTimeout`] if the run took longer than
    ///   `run_timeout`.
    pub fn run(&mut self) -> OracleResult<()> {
        let start = Instant::now();
        self.session.run()?;
        let elapsed = start.elapsed();
        if let Some(limit) = self.run_timeout {
            if elapsed > limit {
                return Err(OracleError::SimulationTimeout { elapsed, limit });
            }
        }
        if !self.settle_delay.is_zero() {
            std::thread::sleep(self.settle_delay);
        }
        Ok(())
    }

    /// Read the current value of each named output component.
    ///
    /// # Errors
    /// [`OracleError::Read`] for the first path that does not resolve.
    pub fn read_outputs(&mut self, components: &[String]) -> OracleResult<Vec<(String, f64)>> {
        let mut out = Vec::with_capacity(components.len());
        for component in components {
            let path = self.layout.output_path(component);
            let value = self.session.read_value(&path)?;
            out.push((component.clone(), value));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{
        layout::{InputAddressing, PathTemplate, ReactionSlot},
        memory::InMemoryOracle,
    };
    use ndarray::array;

    // Scope
    // -----
    // Adapter behavior against the in-memory oracle: parameter and input
    // routing, fail-before-write on length mismatch, timeout detection, and
    // read errors.

    fn layout() -> OracleLayout {
        OracleLayout::new(
            PathTemplate::new("/K/PRE_EXP/"),
            PathTemplate::new("/K/ACT_ENERGY/"),
            vec![ReactionSlot::from("1"), ReactionSlot::from("2")],
            PathTemplate::new("/W/"),
            PathTemplate::new("/O/"),
        )
        .unwrap()
    }

    fn oracle(layout: &OracleLayout) -> InMemoryOracle {
        InMemoryOracle::builder()
            .parameter_paths(layout)
            .writable(["/W/T", "/W/P", "/FEED/T"])
            .readable(["/O/BZ"])
            .response(|inputs, _params| vec![("/O/BZ".to_string(), inputs["/W/T"] * 2.0)])
            .build()
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    // Purpose
    // -------
    // Parameters alternate between the two templates in slot order.
    fn write_parameters_routes_alternating_entries() {
        let l = layout();
        let mut session = oracle(&l);
        let mut adapter = OracleAdapter::new(&mut session, &l, Duration::ZERO, None);
        adapter.write_parameters(array![1.0, 2.0, 3.0, 4.0].view()).unwrap();

        assert_eq!(session.value("/K/PRE_EXP/1"), Some(1.0));
        assert_eq!(session.value("/K/ACT_ENERGY/1"), Some(2.0));
        assert_eq!(session.value("/K/PRE_EXP/2"), Some(3.0));
        assert_eq!(session.value("/K/ACT_ENERGY/2"), Some(4.0));
    }

    #[test]
    // Purpose
    // -------
    // A wrong-length vector is rejected before the session sees any write.
    fn write_parameters_rejects_length_before_writing() {
        let l = layout();
        let mut session = oracle(&l);
        let mut adapter = OracleAdapter::new(&mut session, &l, Duration::ZERO, None);
        let err = adapter.write_parameters(array![1.0, 2.0, 3.0].view()).unwrap_err();

        assert_eq!(err, OracleError::ParameterLength { expected: 4, found: 3 });
        assert_eq!(session.write_count(), 0);
    }

    #[test]
    // Purpose
    // -------
    // Inputs, run, and reads compose: the response sees the written input.
    fn case_round_trip_through_session() {
        let l = layout();
        let mut session = oracle(&l);
        let mut adapter = OracleAdapter::new(&mut session, &l, Duration::ZERO, None);
        adapter.write_case_inputs(&names(&["T", "P"]), array![350.0, 1.0].view()).unwrap();
        adapter.run().unwrap();
        let out = adapter.read_outputs(&names(&["BZ"])).unwrap();

        assert_eq!(out, vec![("BZ".to_string(), 700.0)]);
        assert_eq!(session.run_count(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Legacy addressing sends the leading input to the feed block; an
    // unregistered path surfaces as a Write error naming it.
    fn legacy_addressing_and_unknown_write_path() {
        let l = layout().with_input_addressing(InputAddressing::Legacy {
            leading_base: PathTemplate::new("/FEED/"),
            leading_count: 1,
        });
        let mut session = oracle(&l);
        let mut adapter = OracleAdapter::new(&mut session, &l, Duration::ZERO, None);
        adapter.write_case_inputs(&names(&["T"]), array![300.0].view()).unwrap();
        let err = adapter.write_case_inputs(&names(&["T", "X"]), array![1.0, 2.0].view()).unwrap_err();

        assert_eq!(err, OracleError::Write { path: "/W/X".to_string() });
        assert_eq!(session.value("/FEED/T"), Some(1.0));
    }

    #[test]
    // Purpose
    // -------
    // A run slower than the timeout is reported as a timeout, not success.
    fn run_reports_timeout() {
        let l = layout();
        let mut session = InMemoryOracle::builder()
            .parameter_paths(&l)
            .run_latency(Duration::from_millis(20))
            .build();
        let mut adapter =
            OracleAdapter::new(&mut session, &l, Duration::ZERO, Some(Duration::from_millis(1)));

        assert!(matches!(adapter.run(), Err(OracleError::SimulationTimeout { .. })));
    }

    #[test]
    // Purpose
    // -------
    // An unknown output component is a Read error naming the full path.
    fn read_outputs_reports_unknown_path() {
        let l = layout();
        let mut session = oracle(&l);
        let mut adapter = OracleAdapter::new(&mut session, &l, Duration::ZERO, None);
        let err = adapter.read_outputs(&names(&["BZ", "EZB"])).unwrap_err();

        assert_eq!(err, OracleError::Read { path: "/O/EZB".to_string() });
    }
}
