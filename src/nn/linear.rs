//! Fully connected layer.

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};
use rand::Rng;

/// An affine map `y = W x + b` with `W` of shape `[out, in]`.
///
/// Rows of the input are independent samples, so the same layer serves a
/// `[batch, in]` matrix, a single vector, or a `[batch, N, in]` sequence.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use u_neural_routing::nn::Linear;
///
/// let layer = Linear::from_parts(array![[1.0, 2.0], [0.0, -1.0]], Some(array![0.5, 0.0]));
/// let y = layer.forward(array![[1.0, 1.0]].view());
/// assert_eq!(y, array![[3.5, -1.0]]);
/// ```
#[derive(Debug, Clone)]
pub struct Linear {
    weight: Array2<f64>,
    bias: Option<Array1<f64>>,
}

impl Linear {
    /// Creates a layer with weights (and bias) drawn uniformly from
    /// `±1/√in_features`.
    pub fn new<R: Rng>(in_features: usize, out_features: usize, bias: bool, rng: &mut R) -> Self {
        let bound = 1.0 / (in_features.max(1) as f64).sqrt();
        Self::uniform(in_features, out_features, bias, bound, rng)
    }

    /// Creates a layer with weights (and bias) drawn uniformly from `±bound`.
    pub fn uniform<R: Rng>(
        in_features: usize,
        out_features: usize,
        bias: bool,
        bound: f64,
        rng: &mut R,
    ) -> Self {
        let weight = Array2::from_shape_fn((out_features, in_features), |_| {
            rng.random_range(-bound..=bound)
        });
        let bias = bias.then(|| {
            Array1::from_shape_fn(out_features, |_| rng.random_range(-bound..=bound))
        });
        Self { weight, bias }
    }

    /// Creates a layer from explicit parameters.
    ///
    /// # Panics
    ///
    /// Panics if the bias length differs from the weight's row count.
    pub fn from_parts(weight: Array2<f64>, bias: Option<Array1<f64>>) -> Self {
        if let Some(b) = &bias {
            assert_eq!(b.len(), weight.nrows(), "bias length must match out_features");
        }
        Self { weight, bias }
    }

    /// Input width.
    pub fn in_features(&self) -> usize {
        self.weight.ncols()
    }

    /// Output width.
    pub fn out_features(&self) -> usize {
        self.weight.nrows()
    }

    /// Weight matrix `[out, in]`.
    pub fn weight(&self) -> &Array2<f64> {
        &self.weight
    }

    /// Bias vector, if any.
    pub fn bias(&self) -> Option<&Array1<f64>> {
        self.bias.as_ref()
    }

    /// Maps `[rows, in]` to `[rows, out]`.
    pub fn forward(&self, x: ArrayView2<'_, f64>) -> Array2<f64> {
        let mut y = x.dot(&self.weight.t());
        if let Some(b) = &self.bias {
            y += b;
        }
        y
    }

    /// Maps a single `[in]` vector to `[out]`.
    pub fn forward_vec(&self, x: ArrayView1<'_, f64>) -> Array1<f64> {
        let mut y = self.weight.dot(&x);
        if let Some(b) = &self.bias {
            y += b;
        }
        y
    }

    /// Maps `[batch, N, in]` to `[batch, N, out]`.
    pub fn forward_seq(&self, x: ArrayView3<'_, f64>) -> Array3<f64> {
        let (batch, n, _) = x.dim();
        let mut out = Array3::zeros((batch, n, self.out_features()));
        for (mut dst, src) in out.outer_iter_mut().zip(x.axis_iter(Axis(0))) {
            dst.assign(&self.forward(src));
        }
        out
    }
}
