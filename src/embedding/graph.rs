//! Structure2vec graph embedding over a fully connected node set.

use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis};
use rand::Rng;

use crate::distance::DistanceMatrix;
use crate::models::{FEATURE_DIM, X, Y};
use crate::nn::{relu, Linear};

/// Message-passing embedder producing one vector per node.
///
/// Each of the `rounds` synchronous rounds updates node `i` to
///
/// ```text
/// mu_i ← relu( θ1·(Σ_j mu_j − mu_i) + θ2·Σ_j relu(θ3·d_ij) + θ_{5|4}·x_i )
/// ```
///
/// where `d_ij` is the Euclidean distance between nodes, the depot
/// (index 0) is projected from its `(x, y)` only through `θ5`, and service
/// nodes from their full feature row through `θ4`. Embeddings start at
/// zero. Every node is a neighbour of every other, so a round costs O(N²).
///
/// Instances are embedded independently: any `[k, N, 6]` sub-batch gives
/// the same rows as it would inside a larger batch.
///
/// # Examples
///
/// ```
/// use ndarray::Array3;
/// use rand::{rngs::StdRng, SeedableRng};
/// use u_neural_routing::embedding::GraphEmbedder;
///
/// let embedder = GraphEmbedder::new(8, 2, &mut StdRng::seed_from_u64(0));
/// let features = Array3::from_shape_fn((2, 4, 6), |(b, n, k)| {
///     if n == 0 && k >= 2 { 0.0 } else { (b + n + k) as f64 * 0.1 }
/// });
/// let mu = embedder.embed(features.view());
/// assert_eq!(mu.dim(), (2, 4, 8));
/// assert!(mu.iter().all(|&v| v >= 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct GraphEmbedder {
    dim: usize,
    rounds: usize,
    theta_1: Linear,
    theta_2: Linear,
    theta_3: Linear,
    theta_4: Linear,
    theta_5: Linear,
}

impl GraphEmbedder {
    /// Creates an embedder of width `dim` running `rounds` rounds.
    pub fn new<R: Rng>(dim: usize, rounds: usize, rng: &mut R) -> Self {
        Self {
            dim,
            rounds,
            theta_1: Linear::new(dim, dim, false, rng),
            theta_2: Linear::new(dim, dim, false, rng),
            theta_3: Linear::new(1, dim, false, rng),
            theta_4: Linear::new(FEATURE_DIM, dim, false, rng),
            theta_5: Linear::new(2, dim, false, rng),
        }
    }

    /// Embedding width.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of message-passing rounds.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Embeds a `[batch, N, 6]` feature tensor into `[batch, N, dim]`.
    pub fn embed(&self, features: ArrayView3<'_, f64>) -> Array3<f64> {
        let (batch, n, _) = features.dim();
        let mut out = Array3::zeros((batch, n, self.dim));
        for (mut dst, inst) in out.outer_iter_mut().zip(features.axis_iter(Axis(0))) {
            dst.assign(&self.embed_instance(inst));
        }
        out
    }

    /// Embeds a single `[N, 6]` instance into `[N, dim]`.
    pub fn embed_instance(&self, features: ArrayView2<'_, f64>) -> Array2<f64> {
        let n = features.nrows();
        let fixed = self.fixed_terms(features);

        let mut mu = Array2::<f64>::zeros((n, self.dim));
        for _ in 0..self.rounds {
            let total = mu.sum_axis(Axis(0));
            let mut others = mu.mapv(|v| -v);
            others += &total;
            let mut next = self.theta_1.forward(others.view());
            next += &fixed;
            next.mapv_inplace(relu);
            mu = next;
        }
        mu
    }

    /// Distance and raw-feature terms, which do not depend on `mu`.
    fn fixed_terms(&self, features: ArrayView2<'_, f64>) -> Array2<f64> {
        let n = features.nrows();
        let dm = DistanceMatrix::from_features(features);

        let mut fixed = self.theta_4.forward(features);
        let depot_xy = features.slice(s![0, X..=Y]);
        fixed.row_mut(0).assign(&self.theta_5.forward_vec(depot_xy));

        for (i, mut row) in fixed.outer_iter_mut().enumerate() {
            let d = Array2::from_shape_fn((n, 1), |(j, _)| dm.get(i, j));
            let signal = self.theta_3.forward(d.view()).mapv(relu).sum_axis(Axis(0));
            row += &self.theta_2.forward_vec(signal.view());
        }
        fixed
    }
}
