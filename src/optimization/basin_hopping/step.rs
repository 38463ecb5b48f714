//! Perturbation step and its adaptive step size.
//!
//! A trial starting point is the current point plus an independent uniform
//! draw from `[-step, step]` per coordinate. Every `interval` trials the step
//! is rescaled from the acceptance rate of that window: above the target the
//! step grows (`step / factor`), otherwise it shrinks (`step * factor`). The
//! window counters are reset after each adjustment. Growth stops at
//! [`MAX_STEP_GROWTH`] times the initial step.
use rand::Rng;

use crate::optimization::local_search::{bounds::ParamBounds, types::Theta};

/// Upper limit of the adapted step, as a multiple of the initial step.
pub const MAX_STEP_GROWTH: f64 = 1e6;

/// Uniform random displacement of half-width `step`, projected into bounds.
pub fn displace<R: Rng>(
    x: &Theta, step: f64, bounds: Option<&ParamBounds>, rng: &mut R,
) -> Theta {
    let mut trial = x.mapv(|xi| xi + rng.random_range(-step..=step));
    if let Some(b) = bounds {
        b.project_in_place(&mut trial);
    }
    trial
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveStep {
    step: f64,
    max_step: f64,
    interval: usize,
    target_accept_rate: f64,
    factor: f64,
    window_trials: usize,
    window_accepted: usize,
}

impl AdaptiveStep {
    pub fn new(step: f64, interval: usize, target_accept_rate: f64, factor: f64) -> Self {
        Self {
            step,
            max_step: step * MAX_STEP_GROWTH,
            interval,
            target_accept_rate,
            factor,
            window_trials: 0,
            window_accepted: 0,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Record one trial. Returns the new step size when this trial closes a
    /// window.
    pub fn record(&mut self, accepted: bool) -> Option<f64> {
        self.window_trials += 1;
        if accepted {
            self.window_accepted += 1;
        }
        if self.window_trials < self.interval {
            return None;
        }
        let rate = self.window_accepted as f64 / self.window_trials as f64;
        if rate > self.target_accept_rate {
            self.step = (self.step / self.factor).min(self.max_step);
        } else {
            self.step *= self.factor;
        }
        self.window_trials = 0;
        self.window_accepted = 0;
        Some(self.step)
    }
}
