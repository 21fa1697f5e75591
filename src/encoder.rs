//! Recurrent encoder over the embedded node sequence.

use ndarray::{Array1, Array2, Array3, ArrayView3, Axis};
use rand::Rng;

use crate::nn::Lstm;

/// LSTM encoder turning `[batch, N, input_dim]` node embeddings into a
/// `[batch, N, hidden_dim]` context plus the final `(h, c)` state.
///
/// The initial state is a single pair of vectors shared by all instances
/// and broadcast to the batch on every call (zero-initialised).
///
/// # Examples
///
/// ```
/// use ndarray::Array3;
/// use rand::{rngs::StdRng, SeedableRng};
/// use u_neural_routing::encoder::SequenceEncoder;
///
/// let encoder = SequenceEncoder::new(4, 6, &mut StdRng::seed_from_u64(0));
/// let (context, (h, c)) = encoder.encode(Array3::zeros((3, 5, 4)).view());
/// assert_eq!(context.dim(), (3, 5, 6));
/// assert_eq!(h.dim(), (3, 6));
/// assert_eq!(c.dim(), (3, 6));
/// ```
#[derive(Debug, Clone)]
pub struct SequenceEncoder {
    lstm: Lstm,
    init_h: Array1<f64>,
    init_c: Array1<f64>,
}

impl SequenceEncoder {
    /// Creates an encoder with a zero initial state.
    pub fn new<R: Rng>(input_dim: usize, hidden_dim: usize, rng: &mut R) -> Self {
        Self {
            lstm: Lstm::new(input_dim, hidden_dim, rng),
            init_h: Array1::zeros(hidden_dim),
            init_c: Array1::zeros(hidden_dim),
        }
    }

    /// Hidden width.
    pub fn hidden_dim(&self) -> usize {
        self.init_h.len()
    }

    /// Input width.
    pub fn input_dim(&self) -> usize {
        self.lstm.cell().input_dim()
    }

    /// The shared initial state broadcast to `batch` rows.
    pub fn initial_state(&self, batch: usize) -> (Array2<f64>, Array2<f64>) {
        let hd = self.hidden_dim();
        let h = Array2::from_shape_fn((batch, hd), |(_, k)| self.init_h[k]);
        let c = Array2::from_shape_fn((batch, hd), |(_, k)| self.init_c[k]);
        (h, c)
    }

    /// Encodes a sequence starting from the shared initial state.
    pub fn encode(
        &self,
        embedded: ArrayView3<'_, f64>,
    ) -> (Array3<f64>, (Array2<f64>, Array2<f64>)) {
        let (h0, c0) = self.initial_state(embedded.len_of(Axis(0)));
        self.lstm.forward(embedded, h0.view(), c0.view())
    }
}
