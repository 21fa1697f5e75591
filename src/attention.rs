//! Additive attention used for glimpses and for the pointer.

use ndarray::{s, Array1, Array2, Array3, ArrayView2, ArrayView3, Axis, Zip};
use rand::Rng;

use crate::nn::Linear;

/// Bahdanau-style scorer over a context sequence.
///
/// For query `q` and context rows `r_j`:
///
/// ```text
/// e_j = W_r·r_j + b_r              (1×1 convolution over the sequence)
/// u_j = v · tanh(W_q·q + b_q + e_j)
/// ```
///
/// With an exploration clamp `C` the logits become `C·tanh(u_j)`. The
/// decoder owns two instances: an unclamped one for glimpses and one for
/// the pointer, clamped when configured.
///
/// # Examples
///
/// ```
/// use ndarray::{Array2, Array3};
/// use rand::{rngs::StdRng, SeedableRng};
/// use u_neural_routing::attention::Attention;
///
/// let pointer = Attention::new(4, Some(10.0), &mut StdRng::seed_from_u64(0));
/// let query = Array2::from_elem((2, 4), 0.5);
/// let context = Array3::from_elem((2, 6, 4), 0.1);
/// let (projected, logits) = pointer.score(query.view(), context.view());
/// assert_eq!(projected.dim(), (2, 6, 4));
/// assert_eq!(logits.dim(), (2, 6));
/// assert!(logits.iter().all(|l| l.abs() <= 10.0));
/// ```
#[derive(Debug, Clone)]
pub struct Attention {
    project_query: Linear,
    project_ref: Linear,
    v: Array1<f64>,
    clamp: Option<f64>,
}

impl Attention {
    /// Creates a scorer of width `dim`; `clamp` is the exploration constant
    /// `C`, or `None` for raw logits.
    pub fn new<R: Rng>(dim: usize, clamp: Option<f64>, rng: &mut R) -> Self {
        let bound = 1.0 / (dim as f64).sqrt();
        Self {
            project_query: Linear::new(dim, dim, true, rng),
            project_ref: Linear::new(dim, dim, true, rng),
            v: Array1::from_shape_fn(dim, |_| rng.random_range(-bound..=bound)),
            clamp,
        }
    }

    /// Exploration constant, if the clamp is enabled.
    pub fn clamp(&self) -> Option<f64> {
        self.clamp
    }

    /// Scores every context row against the query.
    ///
    /// `query` is `[batch, dim]` and `context` is `[batch, N, dim]`. Returns
    /// the projected context `[batch, N, dim]` and the logits `[batch, N]`.
    pub fn score(
        &self,
        query: ArrayView2<'_, f64>,
        context: ArrayView3<'_, f64>,
    ) -> (Array3<f64>, Array2<f64>) {
        let (batch, n, _) = context.dim();
        let q = self.project_query.forward(query);
        let e = self.project_ref.forward_seq(context);

        let mut logits = Array2::zeros((batch, n));
        for (b, mut row) in logits.outer_iter_mut().enumerate() {
            let qb = q.row(b);
            for (j, logit) in row.iter_mut().enumerate() {
                let mut u = 0.0;
                Zip::from(&self.v)
                    .and(&qb)
                    .and(e.slice(s![b, j, ..]))
                    .for_each(|&v, &qk, &ek| u += v * (qk + ek).tanh());
                *logit = match self.clamp {
                    Some(c) => c * u.tanh(),
                    None => u,
                };
            }
        }
        (e, logits)
    }
}

/// Pools projected context rows with per-node weights:
/// `g_b = Σ_j weights[b, j] · projected[b, j, :]`.
pub fn pool(projected: ArrayView3<'_, f64>, weights: ArrayView2<'_, f64>) -> Array2<f64> {
    let (batch, _, dim) = projected.dim();
    let mut out = Array2::zeros((batch, dim));
    for (b, mut dst) in out.outer_iter_mut().enumerate() {
        dst.assign(&weights.row(b).dot(&projected.index_axis(Axis(0), b)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn context() -> Array3<f64> {
        Array3::from_shape_fn((2, 5, 4), |(b, n, k)| ((b + 1) * (n + 1) + k) as f64 * 0.05)
    }

    #[test]
    fn test_unclamped_matches_formula() {
        let att = Attention::new(4, None, &mut StdRng::seed_from_u64(3));
        let query = Array2::from_elem((2, 4), 0.2);
        let ctx = context();
        let (e, logits) = att.score(query.view(), ctx.view());

        let q = att.project_query.forward(query.view());
        let expected: f64 = (0..4)
            .map(|k| att.v[k] * (q[[1, k]] + e[[1, 3, k]]).tanh())
            .sum();
        assert!((logits[[1, 3]] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_bounds_logits() {
        let mut rng = StdRng::seed_from_u64(3);
        let att = Attention::new(4, Some(2.5), &mut rng);
        assert_eq!(att.clamp(), Some(2.5));
        let query = Array2::from_elem((2, 4), 30.0);
        let (_, logits) = att.score(query.view(), context().view());
        assert!(logits.iter().all(|l| l.abs() <= 2.5));
    }

    #[test]
    fn test_clamp_is_scaled_tanh_of_raw() {
        let raw = Attention::new(4, None, &mut StdRng::seed_from_u64(5));
        let mut clamped = raw.clone();
        clamped.clamp = Some(10.0);
        let query = Array2::from_elem((2, 4), 0.7);
        let ctx = context();
        let (_, u) = raw.score(query.view(), ctx.view());
        let (_, l) = clamped.score(query.view(), ctx.view());
        Zip::from(&u).and(&l).for_each(|&u, &l| assert!((10.0 * u.tanh() - l).abs() < 1e-12));
    }

    #[test]
    fn test_stateless() {
        let att = Attention::new(4, Some(10.0), &mut StdRng::seed_from_u64(1));
        let query = Array2::from_elem((2, 4), 0.1);
        let ctx = context();
        assert_eq!(att.score(query.view(), ctx.view()), att.score(query.view(), ctx.view()));
    }

    #[test]
    fn test_pool() {
        let projected = Array3::from_shape_fn((1, 3, 2), |(_, n, k)| (n * 2 + k) as f64);
        let weights = array![[0.5, 0.0, 0.5]];
        let g = pool(projected.view(), weights.view());
        // rows [0,1], [2,3], [4,5]
        assert_eq!(g, array![[2.0, 3.0]]);
    }
}
