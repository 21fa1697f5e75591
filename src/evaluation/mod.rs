//! Rollout measurement.
//!
//! - [`TrajectoryEvaluator`] — replays a sampled trajectory against its batch
//! - [`RolloutMetrics`], [`TripMetrics`] — distance, load, timing and coverage
//! - [`Violation`], [`ViolationType`] — capacity and time-window violations

mod evaluator;
mod metrics;

pub use evaluator::TrajectoryEvaluator;
pub use metrics::{RolloutMetrics, TripMetrics, Violation, ViolationType};
