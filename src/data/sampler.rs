//! data::sampler — fixed, reproducible case subsample for one calibration run.
//!
//! Purpose
//! -------
//! Draw the subset of historical cases that every objective evaluation of a
//! run is computed on. Reusing one fixed [`SampleSet`] is what makes repeated
//! objective evaluations comparable (a noise-free fitness landscape).
//!
//! Key behaviors
//! -------------
//! - Uniform draw without replacement over `0..total_cases`.
//! - Seeded `ChaCha8Rng`: the same seed always yields the same set in the
//!   same draw order.
//! - Without an explicit seed, a seed is drawn from the thread RNG and
//!   recorded on the [`SampleSet`] so the run can be replayed.
//!
//! Invariants & assumptions
//! ------------------------
//! - `0 < sample_size <= total_cases`; indices are unique and in range.
//! - A [`SampleSet`] is immutable; there is no API to re-draw in place.
use rand::{Rng, SeedableRng, seq::index};
use rand_chacha::ChaCha8Rng;

use crate::data::errors::{DataError, DataResult};

/// Immutable set of sampled case indices, kept in draw order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSet {
    cases: Vec<usize>,
    seed: u64,
}

impl SampleSet {
    /// Case indices in draw order.
    pub fn cases(&self) -> &[usize] {
        &self.cases
    }

    /// Seed that produced this sample.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.cases.iter().copied()
    }
}

/// Case sampler with an optional fixed seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaseSampler {
    seed: Option<u64>,
}

impl CaseSampler {
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    /// Draw `sample_size` distinct case indices from `0..total_cases`.
    ///
    /// # Errors
    /// [`DataError::InvalidSampleSize`] if `sample_size == 0` or
    /// `sample_size > total_cases`.
    pub fn sample(&self, total_cases: usize, sample_size: usize) -> DataResult<SampleSet> {
        if sample_size == 0 {
            return Err(DataError::InvalidSampleSize {
                sample_size,
                total_cases,
                reason: "Sample size must be greater than zero.",
            });
        }
        if sample_size > total_cases {
            return Err(DataError::InvalidSampleSize {
                sample_size,
                total_cases,
                reason: "Sample size cannot exceed the number of available cases.",
            });
        }
        let seed = match self.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::rng().random::<u64>();
                tracing::info!(seed, "no sampling seed configured; drew one");
                seed
            }
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let cases = index::sample(&mut rng, total_cases, sample_size).into_vec();
        Ok(SampleSet { cases, seed })
    }
}
