use crate::error::{DimensionMismatchSnafu, Result};
use snafu::prelude::*;

/// Squared Euclidean distance between two coordinate vectors.
///
/// Orders pairs of points exactly like [`euclidean`], without the square root,
/// so the assignment loop and inertia use it directly.
#[inline]
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> Result<f64> {
    ensure!(
        a.len() == b.len(),
        DimensionMismatchSnafu {
            expected: a.len(),
            found: b.len(),
        }
    );

    Ok(a.iter().zip(b).fold(0.0, |acc, (x, y)| {
        let d = x - y;
        d.mul_add(d, acc)
    }))
}

/// Euclidean (L2) distance between two coordinate vectors.
///
/// Fails with [`KMeansError::DimensionMismatch`](crate::KMeansError::DimensionMismatch)
/// when the vectors differ in length.
#[inline]
pub fn euclidean(a: &[f64], b: &[f64]) -> Result<f64> {
    squared_euclidean(a, b).map(f64::sqrt)
}
