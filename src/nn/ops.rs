//! Element-wise activations and row softmax.

use ndarray::{Array2, ArrayView2, Axis};

/// Rectified linear unit.
pub fn relu(x: f64) -> f64 {
    x.max(0.0)
}

/// Logistic sigmoid.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Row-wise softmax over `[rows, cols]` logits.
///
/// Entries equal to `-∞` receive exactly zero probability. A row with no
/// finite entry, or with a NaN or `+∞`, has no distribution: the index of
/// the first such row is returned as the error.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use u_neural_routing::nn::softmax_rows;
///
/// let p = softmax_rows(array![[0.0, f64::NEG_INFINITY, 0.0]].view()).unwrap();
/// assert_eq!(p[[0, 1]], 0.0);
/// assert!((p[[0, 0]] - 0.5).abs() < 1e-12);
///
/// let all_masked = array![[1.0, 2.0], [f64::NEG_INFINITY, f64::NEG_INFINITY]];
/// assert_eq!(softmax_rows(all_masked.view()), Err(1));
/// ```
pub fn softmax_rows(logits: ArrayView2<'_, f64>) -> Result<Array2<f64>, usize> {
    let mut out = Array2::zeros(logits.raw_dim());
    for (r, (row, mut dst)) in logits
        .axis_iter(Axis(0))
        .zip(out.axis_iter_mut(Axis(0)))
        .enumerate()
    {
        if row.iter().any(|v| v.is_nan() || *v == f64::INFINITY) {
            return Err(r);
        }
        let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        if max == f64::NEG_INFINITY {
            return Err(r);
        }
        let mut sum = 0.0;
        for (d, &v) in dst.iter_mut().zip(row.iter()) {
            *d = if v == f64::NEG_INFINITY {
                0.0
            } else {
                (v - max).exp()
            };
            sum += *d;
        }
        dst.mapv_inplace(|d| d / sum);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn test_relu() {
        assert_eq!(relu(-2.0), 0.0);
        assert_eq!(relu(0.0), 0.0);
        assert_eq!(relu(1.5), 1.5);
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(50.0) > 0.999);
        assert!(sigmoid(-50.0) < 0.001);
    }

    #[test]
    fn test_softmax_uniform() {
        let p = softmax_rows(array![[3.0, 3.0, 3.0, 3.0]].view()).expect("finite");
        assert!(p.iter().all(|&v| (v - 0.25).abs() < 1e-12));
    }

    #[test]
    fn test_softmax_large_logits_stable() {
        let p = softmax_rows(array![[1000.0, 999.0]].view()).expect("finite");
        assert!(p.iter().all(|v| v.is_finite()));
        assert!((p.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_softmax_rejects_nan() {
        assert_eq!(softmax_rows(array![[0.0, f64::NAN]].view()), Err(0));
        assert_eq!(softmax_rows(array![[0.0, 1.0], [f64::INFINITY, 0.0]].view()), Err(1));
    }

    proptest! {
        #[test]
        fn prop_softmax_masked_row_sums_to_one(
            logits in prop::collection::vec(-20.0f64..20.0, 2..12),
            masked_seed in 0usize..100,
        ) {
            let n = logits.len();
            let masked = masked_seed % n;
            let mut row = Array2::from_shape_vec((1, n), logits).expect("shape");
            row[[0, masked]] = f64::NEG_INFINITY;
            let p = softmax_rows(row.view()).expect("one legal entry remains");
            prop_assert!((p.sum() - 1.0).abs() < 1e-9);
            prop_assert_eq!(p[[0, masked]], 0.0);
            prop_assert!(p.iter().all(|&v| (0.0..=1.0).contains(&v)));
        }
    }
}
