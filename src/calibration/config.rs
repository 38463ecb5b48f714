//! calibration::config — validated run configuration.
//!
//! Purpose
//! -------
//! Gather everything a calibration run needs (session, oracle layout,
//! sampling, component sets, starting parameters, optimizer settings) into a
//! [`RunConfig`] that is checked once, before any data is touched or any
//! session is opened.
//!
//! Key behaviors
//! -------------
//! - [`RunConfigBuilder`] starts from the production defaults (64 sampled
//!   cases, targets `BZ`/`EZB`/`TOL`, diagnostics `OX`/`MX`/`PX`, label column
//!   `"Unnamed: 0"`, default [`HopOptions`] and [`LocalSearchOptions`]) and
//!   validates on [`RunConfigBuilder::build`].
//! - [`RunConfig::validate_against`] checks the configuration against the
//!   loaded datasets (component presence).
//!
//! Invariants & assumptions
//! ------------------------
//! - `initial_params.len() == layout.n_params()` and every entry is finite.
//! - Bounds, when present, have the parameter dimension.
//! - Component sets are valid [`ComponentSets`].
//! - When only the run seed is set, the global search reuses it (on its own
//!   RNG stream) so a single seed reproduces the whole run.
use crate::{
    calibration::errors::{CalibError, CalibResult},
    data::{CalibrationData, DEFAULT_LABEL_COLUMN},
    metrics::ComponentSets,
    optimization::{
        basin_hopping::HopOptions,
        local_search::{validation::validate_theta_input, LocalSearchOptions, ParamBounds, Theta},
    },
    oracle::{OracleLayout, SessionConfig},
};

/// Number of cases drawn for the objective by default.
pub const DEFAULT_SAMPLE_SIZE: usize = 64;

/// Components whose MAPE is optimized by default.
pub const DEFAULT_TARGET_COMPONENTS: [&str; 3] = ["BZ", "EZB", "TOL"];

/// Components reported for diagnostics only by default.
pub const DEFAULT_OTHER_COMPONENTS: [&str; 3] = ["OX", "MX", "PX"];

/// Validated configuration of one calibration run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    session: SessionConfig,
    layout: OracleLayout,
    components: ComponentSets,
    sample_size: usize,
    seed: Option<u64>,
    initial_params: Theta,
    label_column: String,
    hop: HopOptions,
    local: LocalSearchOptions,
    bounds: Option<ParamBounds>,
}

impl RunConfig {
    pub fn builder(
        session: SessionConfig, layout: OracleLayout, initial_params: Theta,
    ) -> RunConfigBuilder {
        RunConfigBuilder::new(session, layout, initial_params)
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    pub fn layout(&self) -> &OracleLayout {
        &self.layout
    }

    pub fn components(&self) -> &ComponentSets {
        &self.components
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn initial_params(&self) -> &Theta {
        &self.initial_params
    }

    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// Global search options, with the run seed filled in when the search
    /// has none of its own.
    pub fn hop_options(&self) -> HopOptions {
        match self.hop.seed {
            Some(_) => self.hop.clone(),
            None => self.hop.clone().with_seed(self.seed),
        }
    }

    pub fn local_options(&self) -> &LocalSearchOptions {
        &self.local
    }

    pub fn bounds(&self) -> Option<&ParamBounds> {
        self.bounds.as_ref()
    }

    /// Check that every target and other component exists in the reference
    /// dataset.
    ///
    /// # Errors
    /// [`CalibError::Data`] with
    /// [`DataError::UnknownComponent`](crate::data::DataError::UnknownComponent).
    pub fn validate_against(&self, data: &CalibrationData) -> CalibResult<()> {
        let names = self.components.target().iter().chain(self.components.other().iter());
        data.require_reference_components(names)?;
        Ok(())
    }
}

/// Builder for [`RunConfig`], seeded with the production defaults.
#[derive(Debug, Clone)]
pub struct RunConfigBuilder {
    session: SessionConfig,
    layout: OracleLayout,
    initial_params: Theta,
    target: Vec<String>,
    other: Vec<String>,
    sample_size: usize,
    seed: Option<u64>,
    label_column: String,
    hop: HopOptions,
    local: LocalSearchOptions,
    bounds: Option<ParamBounds>,
}

impl RunConfigBuilder {
    pub fn new(session: SessionConfig, layout: OracleLayout, initial_params: Theta) -> Self {
        Self {
            session,
            layout,
            initial_params,
            target: DEFAULT_TARGET_COMPONENTS.iter().map(|s| s.to_string()).collect(),
            other: DEFAULT_OTHER_COMPONENTS.iter().map(|s| s.to_string()).collect(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: None,
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            hop: HopOptions::default(),
            local: LocalSearchOptions::default(),
            bounds: None,
        }
    }

    pub fn target_components<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn other_components<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.other = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn label_column(mut self, label_column: impl Into<String>) -> Self {
        self.label_column = label_column.into();
        self
    }

    pub fn hop_options(mut self, hop: HopOptions) -> Self {
        self.hop = hop;
        self
    }

    pub fn local_options(mut self, local: LocalSearchOptions) -> Self {
        self.local = local;
        self
    }

    pub fn bounds(mut self, bounds: Option<ParamBounds>) -> Self {
        self.bounds = bounds;
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    /// - [`CalibError::InvalidConfig`] for a wrong-length or non-finite
    ///   initial parameter vector, mismatched bounds, out-of-range
    ///   basin-hopping options or an empty label column.
    ///
    /// The sample size is checked against the dataset when the run samples
    /// its cases, so a zero size surfaces as `InvalidSampleSize` there.
    /// - [`CalibError::Components`] for empty, duplicated or overlapping
    ///   component sets.
    pub fn build(self) -> CalibResult<RunConfig> {
        let expected = self.layout.n_params();
        if self.initial_params.len() != expected {
            return Err(CalibError::InvalidConfig {
                reason: format!(
                    "initial parameter vector has {} entries, layout with {} slots needs {expected}",
                    self.initial_params.len(),
                    self.layout.slots().len()
                ),
            });
        }
        validate_theta_input(&self.initial_params)
            .map_err(|e| CalibError::InvalidConfig { reason: e.to_string() })?;
        if let Some(b) = &self.bounds {
            b.check_dim(expected).map_err(|e| CalibError::InvalidConfig { reason: e.to_string() })?;
        }
        self.hop.validate().map_err(|e| CalibError::InvalidConfig { reason: e.to_string() })?;
        if self.label_column.is_empty() {
            return Err(CalibError::InvalidConfig {
                reason: "label column name must not be empty".to_string(),
            });
        }
        let components = ComponentSets::new(self.target, self.other)?;

        Ok(RunConfig {
            session: self.session,
            layout: self.layout,
            components,
            sample_size: self.sample_size,
            seed: self.seed,
            initial_params: self.initial_params,
            label_column: self.label_column,
            hop: self.hop,
            local: self.local,
            bounds: self.bounds,
        })
    }
}
