//! Metropolis acceptance test.
use rand::Rng;

/// Accepts a trial with probability `min(1, exp(-(f_new - f_old) / T))`.
///
/// Improvements (and ties) are always accepted. With `T = 0` only strict
/// improvements are accepted and no random number is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metropolis {
    temperature: f64,
}

impl Metropolis {
    pub fn new(temperature: f64) -> Self {
        Self { temperature }
    }

    pub fn accept<R: Rng>(&self, f_new: f64, f_old: f64, rng: &mut R) -> bool {
        if self.temperature == 0.0 {
            return f_new < f_old;
        }
        let w = (-(f_new - f_old) / self.temperature).min(0.0).exp();
        w >= rng.random::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    // Purpose
    // -------
    // Downhill moves are always accepted; zero temperature rejects uphill.
    fn downhill_always_uphill_never_at_zero_temperature() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let m = Metropolis::new(1.0);
        assert!((0..100).all(|_| m.accept(1.0, 2.0, &mut rng)));

        let cold = Metropolis::new(0.0);
        assert!(!cold.accept(2.0, 1.0, &mut rng));
        assert!(!cold.accept(1.0, 1.0, &mut rng));
        assert!(cold.accept(0.5, 1.0, &mut rng));
    }

    #[test]
    // Purpose
    // -------
    // Uphill acceptance frequency approaches exp(-Δ/T).
    //
    // Given
    // -----
    // - Δ = 1, T = 1, 20000 draws.
    //
    // Expect
    // ------
    // - Acceptance frequency within 0.02 of e^-1.
    fn uphill_frequency_matches_boltzmann_factor() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let m = Metropolis::new(1.0);
        let n = 20_000;
        let hits = (0..n).filter(|_| m.accept(2.0, 1.0, &mut rng)).count();
        let freq = hits as f64 / n as f64;
        assert!((freq - (-1.0f64).exp()).abs() < 0.02, "freq = {freq}");
    }
}
