//! Autoregressive pointer decoder.

use ndarray::Array2;
use rand::Rng;
use tracing::{trace, warn};

use super::sampling::sample_rows;
use super::state::DecodeState;
use crate::attention::{pool, Attention};
use crate::config::{DecodeMode, ModelConfig};
use crate::embedding::GraphEmbedder;
use crate::encoder::SequenceEncoder;
use crate::error::ModelError;
use crate::models::Trajectory;
use crate::nn::{softmax_rows, LstmCell};

/// Pointer decoder with glimpses over the encoder context.
///
/// Each step feeds the previous node's embedding plus the vehicle's
/// `[remaining_capacity, elapsed_time]` through an LSTM cell, refines the
/// resulting query with `n_glimpses` masked attention-pooling rounds, scores
/// the nodes with the pointer, masks, normalises and samples. Instances
/// that select the depot are re-embedded and re-encoded before the next
/// step, and their recurrent state is replaced by the encoder's final
/// state.
#[derive(Debug, Clone)]
pub struct Decoder {
    cell: LstmCell,
    glimpse: Attention,
    pointer: Attention,
    n_glimpses: usize,
    node_count: usize,
    step_budget: usize,
    decode_mode: DecodeMode,
}

impl Decoder {
    /// Creates a decoder sized for `config`.
    pub fn new<R: Rng>(config: &ModelConfig, rng: &mut R) -> Self {
        let clamp = config.use_tanh.then_some(config.tanh_exploration);
        Self {
            cell: LstmCell::new(config.embedding_dim + 2, config.hidden_dim, rng),
            glimpse: Attention::new(config.hidden_dim, None, rng),
            pointer: Attention::new(config.hidden_dim, clamp, rng),
            n_glimpses: config.n_glimpses,
            node_count: config.node_count,
            step_budget: config.step_budget(),
            decode_mode: config.decode_mode,
        }
    }

    /// Fails unless the configured decode mode is implemented.
    pub fn ensure_supported(&self) -> Result<(), ModelError> {
        match self.decode_mode {
            DecodeMode::Stochastic => Ok(()),
            mode => {
                warn!(?mode, "rejecting unimplemented decode mode");
                Err(ModelError::UnsupportedDecodeMode(mode))
            }
        }
    }

    /// Sampled steps per forward pass.
    pub fn step_budget(&self) -> usize {
        self.step_budget
    }

    /// Runs the full step budget from a freshly built `state`.
    ///
    /// The forced depot start and every depot reset use the state's
    /// initial capacity.
    pub fn decode<R: Rng>(
        &self,
        state: &mut DecodeState,
        embedder: &GraphEmbedder,
        encoder: &SequenceEncoder,
        rng: &mut R,
    ) -> Result<Trajectory, ModelError> {
        self.ensure_supported()?;

        let batch = state.batch_size();
        let n = state.node_count();
        if n != self.node_count {
            return Err(ModelError::ShapeMismatch {
                what: "decode state",
                expected: vec![batch, self.node_count],
                actual: vec![batch, n],
            });
        }
        let mut trajectory = Trajectory::start(batch, n, state.initial_capacity());
        let mut selections = vec![0; batch];
        let mut input = state.decoder_input(&selections);

        for step in 0..self.step_budget {
            let probs = self.step_probabilities(state, &input, step)?;
            selections = sample_rows(&probs, rng)
                .map_err(|instance| ModelError::DegenerateDistribution { step, instance })?;

            let returned = state.advance(&selections);
            state.refresh(&returned, embedder, encoder);
            trace!(step, returned = returned.len(), "decoded step");

            input = state.decoder_input(&selections);
            trajectory.push(probs, selections.clone(), state.vehicles().to_vec());
        }
        Ok(trajectory)
    }

    /// One LSTM step plus glimpse and pointer rounds; stores the new
    /// recurrent state and returns the masked pointer distribution.
    fn step_probabilities(
        &self,
        state: &mut DecodeState,
        input: &Array2<f64>,
        step: usize,
    ) -> Result<Array2<f64>, ModelError> {
        let (hidden, cell) = self
            .cell
            .step(input.view(), state.hidden().view(), state.cell().view());

        let mut query = hidden.clone();
        for _ in 0..self.n_glimpses {
            let (projected, mut logits) = self.glimpse.score(query.view(), state.context().view());
            state.apply_mask(&mut logits);
            let weights = softmax_rows(logits.view())
                .map_err(|instance| ModelError::DegenerateDistribution { step, instance })?;
            query = pool(projected.view(), weights.view());
        }

        let (_, mut logits) = self.pointer.score(query.view(), state.context().view());
        state.apply_mask(&mut logits);
        let probs = softmax_rows(logits.view())
            .map_err(|instance| ModelError::DegenerateDistribution { step, instance })?;

        state.set_recurrent(hidden, cell);
        Ok(probs)
    }
}
