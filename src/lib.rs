//! # u-neural-routing
//!
//! Neural construction policy for the capacitated vehicle routing problem
//! with time windows: a graph embedder, a recurrent encoder and an attention
//! pointer decoder that sample one vehicle's route with repeated depot
//! returns, re-embedding an instance each time its vehicle comes back.
//!
//! ## Modules
//!
//! - [`models`] — Domain model types (Node, Instance, Batch, VehicleState, Trajectory)
//! - [`config`] — Model configuration with builder, validation and JSON I/O
//! - [`distance`] — Euclidean distance matrix
//! - [`nn`] — Linear, LSTM and softmax building blocks on `ndarray`
//! - [`embedding`] — structure2vec graph embedder
//! - [`encoder`] — LSTM sequence encoder
//! - [`attention`] — glimpse / pointer attention
//! - [`decoder`] — decoding state machine and sampling
//! - [`policy`] — the policy network (actor)
//! - [`critic`] — baseline value estimator
//! - [`actor_critic`] — actor and critic run on one batch
//! - [`dataset`] — seeded synthetic instances
//! - [`evaluation`] — trajectory distance, load and feasibility measurement
//!
//! ## Example
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use u_neural_routing::config::ModelConfig;
//! use u_neural_routing::dataset::InstanceGenerator;
//! use u_neural_routing::policy::PolicyNetwork;
//!
//! let config = ModelConfig::default()
//!     .with_node_count(8)
//!     .with_embedding_dim(16)
//!     .with_hidden_dim(16);
//! let policy = PolicyNetwork::new(config).unwrap();
//! let batch = InstanceGenerator::new(8, 7).batch(4).unwrap();
//!
//! let trajectory = policy.forward(&batch, &mut StdRng::seed_from_u64(7)).unwrap();
//! for b in 0..trajectory.batch_size() {
//!     assert_eq!(trajectory.actions(b)[0], 0);
//! }
//! ```

pub mod actor_critic;
pub mod attention;
pub mod config;
pub mod critic;
pub mod dataset;
pub mod decoder;
pub mod distance;
pub mod embedding;
pub mod encoder;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod nn;
pub mod policy;

pub use error::ModelError;
