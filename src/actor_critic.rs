//! Actor and critic run side by side on one batch.

use ndarray::{s, Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ModelConfig;
use crate::critic::CriticNetwork;
use crate::error::ModelError;
use crate::models::{Batch, Trajectory};
use crate::policy::PolicyNetwork;

/// Everything a REINFORCE update needs from one forward pass.
#[derive(Debug, Clone)]
pub struct ActorCriticOutput {
    /// Critic estimate per instance, `[batch]`.
    pub baseline: Array1<f64>,
    /// Probability of the selected node, one `[batch]` vector per step.
    pub selected_probabilities: Vec<Array1<f64>>,
    /// Feature rows of the selected nodes, one `[batch, 6]` matrix per step.
    pub actions: Vec<Array2<f64>>,
    /// Selected node sequences, `[batch][steps]`.
    pub action_indices: Vec<Vec<usize>>,
    /// The full trajectory the views above were taken from.
    pub trajectory: Trajectory,
}

/// Policy network plus critic baseline.
///
/// The critic is initialised from `config.seed + 1` so that actor
/// parameters do not depend on whether a critic is attached.
///
/// # Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use u_neural_routing::actor_critic::ActorCritic;
/// use u_neural_routing::config::ModelConfig;
/// use u_neural_routing::dataset::InstanceGenerator;
///
/// let config = ModelConfig::default()
///     .with_node_count(5)
///     .with_embedding_dim(8)
///     .with_hidden_dim(8);
/// let model = ActorCritic::new(config).unwrap();
/// let batch = InstanceGenerator::new(5, 0).batch(2).unwrap();
///
/// let out = model.forward(&batch, &mut StdRng::seed_from_u64(1)).unwrap();
/// assert_eq!(out.baseline.len(), 2);
/// assert_eq!(out.actions.len(), 1 + 2 * 4);
/// assert_eq!(out.actions[0].dim(), (2, 6));
/// ```
#[derive(Debug, Clone)]
pub struct ActorCritic {
    actor: PolicyNetwork,
    critic: CriticNetwork,
}

impl ActorCritic {
    /// Builds both networks after validating `config`.
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
        let critic_config = config.clone();
        let actor = PolicyNetwork::new(config)?;
        let critic = CriticNetwork::new(&critic_config, &mut rng);
        Ok(Self { actor, critic })
    }

    /// The policy network.
    pub fn actor(&self) -> &PolicyNetwork {
        &self.actor
    }

    /// The critic network.
    pub fn critic(&self) -> &CriticNetwork {
        &self.critic
    }

    /// Samples a trajectory and estimates the baseline for `batch`.
    ///
    /// Action rows are taken from the caller's batch, so their visited flag
    /// is the one the batch was built with.
    pub fn forward<R: Rng>(
        &self,
        batch: &Batch,
        rng: &mut R,
    ) -> Result<ActorCriticOutput, ModelError> {
        let trajectory = self.actor.forward(batch, rng)?;
        let baseline = self.critic.forward(batch)?;

        let features = batch.features();
        let actions = trajectory
            .selections()
            .iter()
            .map(|step| {
                let mut rows = Array2::zeros((step.len(), features.len_of(Axis(2))));
                for (b, (&idx, mut row)) in step.iter().zip(rows.outer_iter_mut()).enumerate() {
                    row.assign(&features.slice(s![b, idx, ..]));
                }
                rows
            })
            .collect();

        Ok(ActorCriticOutput {
            baseline,
            selected_probabilities: trajectory.selected_probabilities(),
            actions,
            action_indices: trajectory.action_indices(),
            trajectory,
        })
    }
}
