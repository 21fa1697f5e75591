//! Single-layer LSTM.

use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis, Zip};
use rand::Rng;

use super::linear::Linear;
use super::ops::sigmoid;

/// One LSTM step over a batch.
///
/// Gate order in the stacked projections is input, forget, cell, output.
#[derive(Debug, Clone)]
pub struct LstmCell {
    input: Linear,
    recurrent: Linear,
    hidden_dim: usize,
}

impl LstmCell {
    /// Creates a cell with parameters drawn uniformly from `±1/√hidden_dim`.
    pub fn new<R: Rng>(input_dim: usize, hidden_dim: usize, rng: &mut R) -> Self {
        let bound = 1.0 / (hidden_dim as f64).sqrt();
        Self {
            input: Linear::uniform(input_dim, 4 * hidden_dim, true, bound, rng),
            recurrent: Linear::uniform(hidden_dim, 4 * hidden_dim, true, bound, rng),
            hidden_dim,
        }
    }

    /// Input width.
    pub fn input_dim(&self) -> usize {
        self.input.in_features()
    }

    /// Hidden width.
    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    /// Advances `(h, c)` by one input `x` of shape `[batch, input_dim]`.
    pub fn step(
        &self,
        x: ArrayView2<'_, f64>,
        h: ArrayView2<'_, f64>,
        c: ArrayView2<'_, f64>,
    ) -> (Array2<f64>, Array2<f64>) {
        let hd = self.hidden_dim;
        let gates = self.input.forward(x) + self.recurrent.forward(h);

        let mut c_next = Array2::zeros(c.raw_dim());
        let mut h_next = Array2::zeros(c.raw_dim());
        Zip::from(&mut c_next)
            .and(&mut h_next)
            .and(&c)
            .and(gates.slice(s![.., 0..hd]))
            .and(gates.slice(s![.., hd..2 * hd]))
            .and(gates.slice(s![.., 2 * hd..3 * hd]))
            .for_each(|cn, hn, &cp, &i, &f, &g| {
                *cn = sigmoid(f) * cp + sigmoid(i) * g.tanh();
                *hn = *cn;
            });
        Zip::from(&mut h_next)
            .and(gates.slice(s![.., 3 * hd..4 * hd]))
            .for_each(|hn, &o| *hn = sigmoid(o) * hn.tanh());
        (h_next, c_next)
    }
}

/// An LSTM unrolled over the node axis of a `[batch, N, input_dim]` tensor.
#[derive(Debug, Clone)]
pub struct Lstm {
    cell: LstmCell,
}

impl Lstm {
    /// Creates an LSTM layer.
    pub fn new<R: Rng>(input_dim: usize, hidden_dim: usize, rng: &mut R) -> Self {
        Self {
            cell: LstmCell::new(input_dim, hidden_dim, rng),
        }
    }

    /// The underlying cell.
    pub fn cell(&self) -> &LstmCell {
        &self.cell
    }

    /// Runs the sequence from `(h0, c0)`, returning the per-position
    /// outputs `[batch, N, hidden]` and the final `(h, c)`.
    pub fn forward(
        &self,
        seq: ArrayView3<'_, f64>,
        h0: ArrayView2<'_, f64>,
        c0: ArrayView2<'_, f64>,
    ) -> (Array3<f64>, (Array2<f64>, Array2<f64>)) {
        let (batch, n, _) = seq.dim();
        let mut outputs = Array3::zeros((batch, n, self.cell.hidden_dim()));
        let mut h = h0.to_owned();
        let mut c = c0.to_owned();
        for t in 0..n {
            let (h_next, c_next) = self.cell.step(seq.index_axis(Axis(1), t), h.view(), c.view());
            outputs.index_axis_mut(Axis(1), t).assign(&h_next);
            h = h_next;
            c = c_next;
        }
        (outputs, (h, c))
    }
}
