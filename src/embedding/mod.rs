//! Graph embedding of routing instances.
//!
//! - [`GraphEmbedder`] — structure2vec message passing with a mean-field
//!   neighbour sum and a distance-weighted signal over all node pairs

mod graph;

pub use graph::GraphEmbedder;
