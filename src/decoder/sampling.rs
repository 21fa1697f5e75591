//! Categorical sampling from probability rows.

use ndarray::{Array2, ArrayView1, Axis};
use rand::distr::weighted::{Error as WeightError, WeightedIndex};
use rand::distr::Distribution;
use rand::Rng;

/// Draws one index from a probability row.
///
/// Zero-probability entries are never returned. A row with a negative or
/// NaN entry, or with no positive entry, has no distribution.
pub fn sample_index<R: Rng>(
    probs: ArrayView1<'_, f64>,
    rng: &mut R,
) -> Result<usize, WeightError> {
    let dist = WeightedIndex::<f64>::new(probs.iter())?;
    Ok(dist.sample(rng))
}

/// Draws one index per row of a `[batch, N]` probability matrix.
///
/// On failure the index of the first row without a distribution is
/// returned.
pub fn sample_rows<R: Rng>(probs: &Array2<f64>, rng: &mut R) -> Result<Vec<usize>, usize> {
    probs
        .axis_iter(Axis(0))
        .enumerate()
        .map(|(b, row)| sample_index(row, rng).map_err(|_| b))
        .collect()
}
