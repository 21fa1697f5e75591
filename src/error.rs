//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

use crate::config::DecodeMode;

/// Errors raised by model construction and forward passes.
///
/// Every variant is a rejection of caller input or of a numeric state that
/// cannot be continued; nothing is retried or silently corrected.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A configuration value is out of range.
    #[error("invalid configuration `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A tensor does not have the shape the model was built for.
    #[error("shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Which input was malformed.
        what: &'static str,
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        actual: Vec<usize>,
    },

    /// A batch with no instances was supplied.
    #[error("batch contains no instances")]
    EmptyBatch,

    /// Row 0 of an instance is not a depot row (`[x, y, 0, 0, 0, 0]`).
    #[error("instance {instance} has no depot at index 0")]
    MissingDepot {
        /// Batch position of the instance.
        instance: usize,
    },

    /// A node feature is NaN or infinite.
    #[error("instance {instance}, node {node}: non-finite feature {value}")]
    InvalidFeature {
        /// Batch position of the instance.
        instance: usize,
        /// Node index within the instance.
        node: usize,
        /// The rejected value.
        value: f64,
    },

    /// The configured decode mode has no implementation.
    #[error("decode mode {0:?} is not implemented; only stochastic decoding is supported")]
    UnsupportedDecodeMode(DecodeMode),

    /// Every logit of an instance was masked or non-finite, so no
    /// probability distribution exists.
    #[error("degenerate distribution at step {step} for instance {instance}")]
    DegenerateDistribution {
        /// Decoding step (0-based, excluding the forced depot start).
        step: usize,
        /// Batch position of the instance.
        instance: usize,
    },

    /// A dataset index is past the end.
    #[error("index {index} out of range for dataset of {len} instances")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Dataset size.
        len: usize,
    },

    /// Configuration (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
