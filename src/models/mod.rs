//! Domain model types for neural vehicle routing.
//!
//! Provides nodes with demands and time windows, instances and lock-step
//! batches of instances as raw feature tensors, the per-instance vehicle
//! state evolved during decoding, and the trajectory a forward pass returns.

mod instance;
mod node;
mod trajectory;
mod vehicle;

pub use instance::{Batch, Instance};
pub use node::{Node, TimeWindow, DEMAND, FEATURE_DIM, TW_END, TW_START, VISITED, X, Y};
pub use trajectory::Trajectory;
pub use vehicle::VehicleState;
