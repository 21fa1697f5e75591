//! Policy network: graph embedder, encoder and decoder wired together.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::ModelConfig;
use crate::decoder::{DecodeState, Decoder};
use crate::embedding::GraphEmbedder;
use crate::encoder::SequenceEncoder;
use crate::error::ModelError;
use crate::models::{Batch, Trajectory};

/// The actor: samples a route for every instance of a batch.
///
/// Parameters are initialised from `config.seed` and only read during a
/// forward pass, so one network can serve any number of passes.
///
/// # Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use u_neural_routing::config::ModelConfig;
/// use u_neural_routing::dataset::InstanceGenerator;
/// use u_neural_routing::policy::PolicyNetwork;
///
/// let config = ModelConfig::default()
///     .with_node_count(6)
///     .with_embedding_dim(16)
///     .with_hidden_dim(16);
/// let policy = PolicyNetwork::new(config).unwrap();
/// let batch = InstanceGenerator::new(6, 1).batch(3).unwrap();
///
/// let trajectory = policy.forward(&batch, &mut StdRng::seed_from_u64(0)).unwrap();
/// assert_eq!(trajectory.len(), 1 + 2 * 5);
/// assert_eq!(trajectory.batch_size(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct PolicyNetwork {
    config: ModelConfig,
    embedder: GraphEmbedder,
    encoder: SequenceEncoder,
    decoder: Decoder,
}

impl PolicyNetwork {
    /// Builds the network after validating `config`.
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let embedder = GraphEmbedder::new(config.embedding_dim, config.rounds, &mut rng);
        let encoder = SequenceEncoder::new(config.embedding_dim, config.hidden_dim, &mut rng);
        let decoder = Decoder::new(&config, &mut rng);
        Ok(Self {
            config,
            embedder,
            encoder,
            decoder,
        })
    }

    /// The configuration the network was built from.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// The graph embedder.
    pub fn embedder(&self) -> &GraphEmbedder {
        &self.embedder
    }

    /// The sequence encoder.
    pub fn encoder(&self) -> &SequenceEncoder {
        &self.encoder
    }

    /// Samples one trajectory per instance.
    ///
    /// The batch must have `config.node_count` nodes per instance. The
    /// decode mode and the batch shape are checked before any numeric work;
    /// the caller's batch is not modified.
    pub fn forward<R: Rng>(&self, batch: &Batch, rng: &mut R) -> Result<Trajectory, ModelError> {
        batch.ensure_node_count(self.config.node_count)?;
        self.decoder.ensure_supported()?;
        debug!(
            batch = batch.len(),
            nodes = batch.node_count(),
            steps = self.config.step_budget(),
            "policy forward pass"
        );

        let mut state = DecodeState::new(
            batch,
            &self.embedder,
            &self.encoder,
            self.config.vehicle_init_capacity,
        );
        self.decoder
            .decode(&mut state, &self.embedder, &self.encoder, rng)
    }
}
