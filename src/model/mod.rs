//! Model implementations.
//!
//! This module contains:
//! - GRU cell and the prefix encoder
//! - Attention decoder with dot-product attention
//! - WaitKModel, the incremental encoder–decoder step
//! - Loading and initialising model directories

pub mod decoder;
pub mod encoder;
pub mod gru;
pub mod loader;
pub mod seq2seq;

pub use decoder::{AttentionDecoder, DecoderStep};
pub use encoder::{Encoder, EncoderOutput};
pub use gru::GruCell;
pub use loader::{init_model, load_config, load_model, validate_vocab, ModelFiles};
pub use seq2seq::{StepOutput, WaitKModel};
