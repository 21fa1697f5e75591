//! Critic network: a scalar value estimate per instance, used as the
//! baseline of a REINFORCE update.

use ndarray::{Array1, Axis};
use rand::Rng;
use tracing::debug;

use crate::attention::{pool, Attention};
use crate::config::ModelConfig;
use crate::encoder::SequenceEncoder;
use crate::error::ModelError;
use crate::models::{Batch, FEATURE_DIM};
use crate::nn::{relu, softmax_rows, Linear};

/// LSTM encoder over raw node features, `n_process_blocks` rounds of
/// attention pooling starting from the encoder's final hidden state, then a
/// two-layer head `Linear(h, h) → ReLU → Linear(h, 1)`.
///
/// # Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use u_neural_routing::config::ModelConfig;
/// use u_neural_routing::critic::CriticNetwork;
/// use u_neural_routing::dataset::InstanceGenerator;
///
/// let config = ModelConfig::default().with_node_count(6).with_hidden_dim(8);
/// let critic = CriticNetwork::new(&config, &mut StdRng::seed_from_u64(0));
/// let batch = InstanceGenerator::new(6, 3).batch(4).unwrap();
///
/// let baseline = critic.forward(&batch).unwrap();
/// assert_eq!(baseline.len(), 4);
/// assert!(baseline.iter().all(|v| v.is_finite()));
/// ```
#[derive(Debug, Clone)]
pub struct CriticNetwork {
    encoder: SequenceEncoder,
    process_block: Attention,
    n_process_blocks: usize,
    hidden: Linear,
    output: Linear,
}

impl CriticNetwork {
    /// Creates a critic sized for `config`.
    pub fn new<R: Rng>(config: &ModelConfig, rng: &mut R) -> Self {
        let h = config.hidden_dim;
        Self {
            encoder: SequenceEncoder::new(FEATURE_DIM, h, rng),
            process_block: Attention::new(h, None, rng),
            n_process_blocks: config.n_process_blocks,
            hidden: Linear::new(h, h, true, rng),
            output: Linear::new(h, 1, true, rng),
        }
    }

    /// Number of attention-pooling rounds.
    pub fn n_process_blocks(&self) -> usize {
        self.n_process_blocks
    }

    /// Estimates one value per instance.
    pub fn forward(&self, batch: &Batch) -> Result<Array1<f64>, ModelError> {
        let (context, (mut state, _)) = self.encoder.encode(batch.features().view());

        for round in 0..self.n_process_blocks {
            let (projected, logits) = self.process_block.score(state.view(), context.view());
            let weights = softmax_rows(logits.view()).map_err(|instance| {
                ModelError::DegenerateDistribution {
                    step: round,
                    instance,
                }
            })?;
            state = pool(projected.view(), weights.view());
        }

        let hidden = self.hidden.forward(state.view()).mapv_into(relu);
        let values = self.output.forward(hidden.view()).index_axis_move(Axis(1), 0);
        debug!(batch = batch.len(), rounds = self.n_process_blocks, "critic forward pass");
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::InstanceGenerator;
    use ndarray::s;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn critic(blocks: usize) -> CriticNetwork {
        let config = ModelConfig::default()
            .with_node_count(5)
            .with_hidden_dim(8)
            .with_process_blocks(blocks);
        CriticNetwork::new(&config, &mut StdRng::seed_from_u64(11))
    }

    #[test]
    fn test_one_value_per_instance() {
        let batch = InstanceGenerator::new(5, 1).batch(6).expect("non-empty");
        let values = critic(3).forward(&batch).expect("finite input");
        assert_eq!(values.len(), 6);
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_instances_are_independent() {
        let batch = InstanceGenerator::new(5, 2).batch(3).expect("non-empty");
        let single = Batch::from_array(batch.features().slice(s![1..2, .., ..]).to_owned())
            .expect("valid slice");
        let c = critic(2);
        let all = c.forward(&batch).expect("finite input");
        let one = c.forward(&single).expect("finite input");
        assert!((all[1] - one[0]).abs() < 1e-10);
    }

    #[test]
    fn test_zero_process_blocks() {
        let batch = InstanceGenerator::new(5, 3).batch(2).expect("non-empty");
        let values = critic(0).forward(&batch).expect("finite input");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_deterministic() {
        let batch = InstanceGenerator::new(5, 4).batch(2).expect("non-empty");
        let c = critic(3);
        assert_eq!(
            c.forward(&batch).expect("finite input"),
            c.forward(&batch).expect("finite input")
        );
    }
}
