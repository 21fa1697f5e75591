//! Pairwise node distances.
//!
//! Provides a dense Euclidean distance matrix, used by the graph embedder's
//! distance term and by trajectory evaluation.

mod matrix;

pub use matrix::DistanceMatrix;
