//! Model configuration.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// How the decoder turns a probability row into a selection.
///
/// Only [`DecodeMode::Stochastic`] is implemented. The other variants exist
/// so configurations carrying them deserialize, and are rejected with
/// [`ModelError::UnsupportedDecodeMode`] before any decoding starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodeMode {
    /// Sample each selection from the pointer distribution.
    Stochastic,
    /// Arg-max selection.
    Greedy,
    /// Beam search with the given width.
    Beam {
        /// Number of beams kept per step.
        width: usize,
    },
}

/// Hyper-parameters of the policy and critic networks.
///
/// # Examples
///
/// ```
/// use u_neural_routing::config::ModelConfig;
///
/// let config = ModelConfig::default()
///     .with_node_count(11)
///     .with_embedding_dim(32)
///     .with_hidden_dim(32);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.step_budget(), 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Size of the graph embedding of each node.
    pub embedding_dim: usize,
    /// Size of the recurrent state and attention projections.
    pub hidden_dim: usize,
    /// Nodes per instance, depot included.
    pub node_count: usize,
    /// Message-passing rounds of the graph embedder.
    pub rounds: usize,
    /// Glimpse rounds before each pointer decision.
    pub n_glimpses: usize,
    /// Exploration constant `C` applied to the pointer logits.
    pub tanh_exploration: f64,
    /// Whether the pointer logits are clamped to `C·tanh(u)`.
    pub use_tanh: bool,
    /// Capacity of the vehicle when it leaves the depot.
    pub vehicle_init_capacity: f64,
    /// Decoding steps per service node.
    pub step_budget_multiplier: usize,
    /// Selection strategy.
    pub decode_mode: DecodeMode,
    /// Attention pooling rounds of the critic.
    pub n_process_blocks: usize,
    /// Seed for parameter initialisation.
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 128,
            hidden_dim: 128,
            node_count: 21,
            rounds: 4,
            n_glimpses: 1,
            tanh_exploration: 10.0,
            use_tanh: true,
            vehicle_init_capacity: 30.0,
            step_budget_multiplier: 2,
            decode_mode: DecodeMode::Stochastic,
            n_process_blocks: 3,
            seed: 111,
        }
    }
}

impl ModelConfig {
    /// Sets the graph embedding size.
    pub fn with_embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    /// Sets the recurrent hidden size.
    pub fn with_hidden_dim(mut self, dim: usize) -> Self {
        self.hidden_dim = dim;
        self
    }

    /// Sets the number of nodes per instance (depot included).
    pub fn with_node_count(mut self, n: usize) -> Self {
        self.node_count = n;
        self
    }

    /// Sets the number of message-passing rounds.
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Sets the number of glimpse rounds.
    pub fn with_glimpses(mut self, n: usize) -> Self {
        self.n_glimpses = n;
        self
    }

    /// Sets the exploration clamp; `None` disables it.
    pub fn with_tanh_exploration(mut self, c: Option<f64>) -> Self {
        match c {
            Some(c) => {
                self.use_tanh = true;
                self.tanh_exploration = c;
            }
            None => self.use_tanh = false,
        }
        self
    }

    /// Sets the initial vehicle capacity.
    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.vehicle_init_capacity = capacity;
        self
    }

    /// Sets the step budget multiplier.
    pub fn with_step_budget_multiplier(mut self, m: usize) -> Self {
        self.step_budget_multiplier = m;
        self
    }

    /// Sets the decode mode.
    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }

    /// Sets the critic's process-block count.
    pub fn with_process_blocks(mut self, n: usize) -> Self {
        self.n_process_blocks = n;
        self
    }

    /// Sets the parameter initialisation seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of sampled decoding steps per forward pass.
    pub fn step_budget(&self) -> usize {
        self.step_budget_multiplier * self.node_count.saturating_sub(1)
    }

    /// Checks every field for a usable value.
    pub fn validate(&self) -> Result<(), ModelError> {
        fn invalid(field: &'static str, reason: &str) -> Result<(), ModelError> {
            Err(ModelError::InvalidConfig {
                field,
                reason: reason.to_string(),
            })
        }

        if self.embedding_dim == 0 {
            return invalid("embedding_dim", "must be positive");
        }
        if self.hidden_dim == 0 {
            return invalid("hidden_dim", "must be positive");
        }
        if self.node_count < 2 {
            return invalid("node_count", "needs a depot and at least one service node");
        }
        if self.rounds == 0 {
            return invalid("rounds", "must be positive");
        }
        if !self.tanh_exploration.is_finite() || self.tanh_exploration <= 0.0 {
            return invalid("tanh_exploration", "must be finite and positive");
        }
        if !self.vehicle_init_capacity.is_finite() || self.vehicle_init_capacity < 0.0 {
            return invalid("vehicle_init_capacity", "must be finite and non-negative");
        }
        if self.step_budget_multiplier == 0 {
            return invalid("step_budget_multiplier", "must be positive");
        }
        Ok(())
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes this configuration to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
