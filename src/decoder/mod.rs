//! Decoding state machine.
//!
//! - [`DecodeState`] — batch-indexed arena of everything a forward pass
//!   mutates: features, embeddings, context, recurrent and vehicle state
//! - [`Decoder`] — the score → mask → sample → update → re-embed loop
//! - [`sample_index`], [`sample_rows`] — categorical sampling

mod decode;
mod sampling;
mod state;

pub use decode::Decoder;
pub use sampling::{sample_index, sample_rows};
pub use state::DecodeState;
