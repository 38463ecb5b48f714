//! Box constraints enforced by projection.
//!
//! [`ParamBounds`] holds one `[lower, upper]` interval per parameter. Points
//! evaluated during local refinement and perturbed starting points are
//! clamped into the box before the objective sees them, and the reported
//! optimum is clamped the same way. Infinite limits leave a side open.
use ndarray::Array1;

use crate::optimization::{
    errors::{OptError, OptResult},
    local_search::types::Theta,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ParamBounds {
    lower: Array1<f64>,
    upper: Array1<f64>,
}

impl ParamBounds {
    /// # Errors
    /// - [`OptError::BoundsDimMismatch`] if the vectors differ in length.
    /// - [`OptError::InvalidBounds`] for a NaN limit or `lower > upper`.
    pub fn new(lower: Array1<f64>, upper: Array1<f64>) -> OptResult<Self> {
        if lower.len() != upper.len() {
            return Err(OptError::BoundsDimMismatch { expected: lower.len(), found: upper.len() });
        }
        for (index, (&lo, &hi)) in lower.iter().zip(upper.iter()).enumerate() {
            if lo.is_nan() || hi.is_nan() {
                return Err(OptError::InvalidBounds {
                    index,
                    lower: lo,
                    upper: hi,
                    reason: "Bounds must not be NaN.",
                });
            }
            if lo > hi {
                return Err(OptError::InvalidBounds {
                    index,
                    lower: lo,
                    upper: hi,
                    reason: "Lower bound exceeds upper bound.",
                });
            }
        }
        Ok(Self { lower, upper })
    }

    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    pub fn lower(&self) -> &Array1<f64> {
        &self.lower
    }

    pub fn upper(&self) -> &Array1<f64> {
        &self.upper
    }

    /// # Errors
    /// [`OptError::BoundsDimMismatch`] if the box does not have `dim` entries.
    pub fn check_dim(&self, dim: usize) -> OptResult<()> {
        if self.len() != dim {
            return Err(OptError::BoundsDimMismatch { expected: dim, found: self.len() });
        }
        Ok(())
    }

    /// Clamp `theta` into the box.
    pub fn project(&self, theta: &Theta) -> Theta {
        let mut out = theta.clone();
        self.project_in_place(&mut out);
        out
    }

    pub fn project_in_place(&self, theta: &mut Theta) {
        ndarray::Zip::from(theta)
            .and(&self.lower)
            .and(&self.upper)
            .for_each(|x, &lo, &hi| *x = (*x).clamp(lo, hi));
    }

    pub fn contains(&self, theta: &Theta) -> bool {
        theta.len() == self.len()
            && theta.iter().zip(self.lower.iter().zip(self.upper.iter())).all(|(x, (lo, hi))| lo <= x && x <= hi)
    }
}

/// Project through optional bounds.
pub fn project_opt(bounds: Option<&ParamBounds>, theta: &Theta) -> Theta {
    match bounds {
        Some(b) => b.project(theta),
        None => theta.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Projection clamps each coordinate independently and leaves interior
    // points unchanged; infinite limits are open.
    fn project_clamps_into_box() {
        let b = ParamBounds::new(array![0.0, f64::NEG_INFINITY], array![1.0, 2.0]).unwrap();
        assert_eq!(b.project(&array![-0.5, 3.0]), array![0.0, 2.0]);
        assert_eq!(b.project(&array![0.5, -1e9]), array![0.5, -1e9]);
        assert!(b.contains(&b.project(&array![9.0, 9.0])));
    }

    #[test]
    // Purpose
    // -------
    // Inverted, NaN, and mismatched bounds are rejected at construction.
    fn new_rejects_invalid_bounds() {
        assert!(matches!(
            ParamBounds::new(array![1.0], array![0.0]),
            Err(OptError::InvalidBounds { index: 0, .. })
        ));
        assert!(matches!(
            ParamBounds::new(array![f64::NAN], array![0.0]),
            Err(OptError::InvalidBounds { .. })
        ));
        assert_eq!(
            ParamBounds::new(array![0.0, 0.0], array![1.0]),
            Err(OptError::BoundsDimMismatch { expected: 2, found: 1 })
        );
        let b = ParamBounds::new(array![0.0], array![1.0]).unwrap();
        assert!(b.check_dim(2).is_err());
    }
}
