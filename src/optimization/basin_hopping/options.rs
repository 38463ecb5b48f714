//! Basin-hopping configuration.
use crate::optimization::errors::{OptError, OptResult};

/// Options of the global search.
///
/// Fields
/// ------
/// - `n_iter`: number of perturb/refine/accept iterations after the initial
///   refinement (0 means refine `x0` only).
/// - `step_size`: initial half-width of the uniform displacement.
/// - `interval`: trials between step-size adaptations.
/// - `temperature`: Metropolis temperature; 0 accepts only improvements.
/// - `target_accept_rate`: acceptance rate the step adaptation aims for.
/// - `step_factor`: multiplicative step adjustment, in (0, 1).
/// - `seed`: RNG seed; `None` draws one and records it in the outcome.
///
/// Default: 10000 iterations, step 0.02, interval 3, temperature 1.0, target
/// rate 0.5, factor 0.9, no seed.
#[derive(Debug, Clone, PartialEq)]
pub struct HopOptions {
    pub n_iter: usize,
    pub step_size: f64,
    pub interval: usize,
    pub temperature: f64,
    pub target_accept_rate: f64,
    pub step_factor: f64,
    pub seed: Option<u64>,
}

impl HopOptions {
    /// # Errors
    /// [`OptError::InvalidHopOption`] naming the first out-of-range field.
    pub fn new(
        n_iter: usize, step_size: f64, interval: usize, temperature: f64, target_accept_rate: f64,
        step_factor: f64, seed: Option<u64>,
    ) -> OptResult<Self> {
        let opts =
            Self { n_iter, step_size, interval, temperature, target_accept_rate, step_factor, seed };
        opts.validate()?;
        Ok(opts)
    }

    /// Check every field range, including options built as struct literals.
    ///
    /// # Errors
    /// [`OptError::InvalidHopOption`] naming the first out-of-range field.
    pub fn validate(&self) -> OptResult<()> {
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(OptError::InvalidHopOption {
                name: "step_size",
                value: self.step_size,
                reason: "Step size must be finite and positive.",
            });
        }
        if self.interval == 0 {
            return Err(OptError::InvalidHopOption {
                name: "interval",
                value: 0.0,
                reason: "Adaptation interval must be at least 1.",
            });
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(OptError::InvalidHopOption {
                name: "temperature",
                value: self.temperature,
                reason: "Temperature must be finite and non-negative.",
            });
        }
        if !(self.target_accept_rate > 0.0 && self.target_accept_rate < 1.0) {
            return Err(OptError::InvalidHopOption {
                name: "target_accept_rate",
                value: self.target_accept_rate,
                reason: "Target acceptance rate must lie in (0, 1).",
            });
        }
        if !(self.step_factor > 0.0 && self.step_factor < 1.0) {
            return Err(OptError::InvalidHopOption {
                name: "step_factor",
                value: self.step_factor,
                reason: "Step factor must lie in (0, 1).",
            });
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_n_iter(mut self, n_iter: usize) -> Self {
        self.n_iter = n_iter;
        self
    }
}

impl Default for HopOptions {
    fn default() -> Self {
        Self {
            n_iter: 10_000,
            step_size: 0.02,
            interval: 3,
            temperature: 1.0,
            target_accept_rate: 0.5,
            step_factor: 0.9,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Defaults pass validation unchanged.
    fn default_is_valid() {
        let d = HopOptions::default();
        let v = HopOptions::new(
            d.n_iter,
            d.step_size,
            d.interval,
            d.temperature,
            d.target_accept_rate,
            d.step_factor,
            d.seed,
        )
        .unwrap();
        assert_eq!(v, d);
    }

    #[test]
    // Purpose
    // -------
    // Each out-of-range field is named in the error.
    fn new_rejects_out_of_range_fields() {
        let name = |r: OptResult<HopOptions>| match r {
            Err(OptError::InvalidHopOption { name, .. }) => name,
            other => panic!("expected InvalidHopOption, got {other:?}"),
        };
        assert_eq!(name(HopOptions::new(1, 0.0, 3, 1.0, 0.5, 0.9, None)), "step_size");
        assert_eq!(name(HopOptions::new(1, 0.1, 0, 1.0, 0.5, 0.9, None)), "interval");
        assert_eq!(name(HopOptions::new(1, 0.1, 3, -1.0, 0.5, 0.9, None)), "temperature");
        assert_eq!(name(HopOptions::new(1, 0.1, 3, 1.0, 1.0, 0.9, None)), "target_accept_rate");
        assert_eq!(name(HopOptions::new(1, 0.1, 3, 1.0, 0.5, 1.0, None)), "step_factor");
        assert!(HopOptions::new(0, 0.1, 1, 0.0, 0.5, 0.5, Some(1)).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Struct-literal options are caught by `validate`.
    //
    // Given
    // -----
    // - Defaults with a negative, an infinite step, or a factor of 1.
    //
    // Expect
    // ------
    // - InvalidHopOption for each; the untouched defaults pass.
    fn validate_catches_struct_literal_options() {
        assert!(HopOptions::default().validate().is_ok());
        for bad in [
            HopOptions { step_size: -0.5, ..HopOptions::default() },
            HopOptions { step_size: f64::INFINITY, ..HopOptions::default() },
            HopOptions { step_factor: 1.0, ..HopOptions::default() },
        ] {
            assert!(matches!(bad.validate(), Err(OptError::InvalidHopOption { .. })));
        }
    }
}
