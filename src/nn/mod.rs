//! Minimal neural-network building blocks on `ndarray`.
//!
//! - [`Linear`] — affine layer with seeded uniform initialisation
//! - [`LstmCell`], [`Lstm`] — single-layer LSTM, stepwise or unrolled
//! - [`relu`], [`sigmoid`], [`softmax_rows`] — activations and a masked
//!   row softmax that reports degenerate rows instead of producing NaN

mod linear;
mod lstm;
mod ops;

pub use linear::Linear;
pub use lstm::{Lstm, LstmCell};
pub use ops::{relu, sigmoid, softmax_rows};
