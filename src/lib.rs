//! nano-waitk: Wait-K simultaneous decoding for a small attention seq2seq model.
//!
//! This crate rewrites ambiguous sentences back into their original form with
//! a GRU encoder–decoder trained under a Wait-K schedule:
//! - Prefix-example building for training data
//! - An incremental encoder–decoder step with dot-product attention
//! - Greedy Wait-K decoding with an `<unk>` copy fallback

pub mod config;
pub mod error;

pub mod core;
pub mod dataset;
pub mod engine;
pub mod model;

pub use config::{DatasetConfig, DecodeConfig, ModelConfig};
pub use crate::core::prefix::{build_prefix_examples, prefix_len, PrefixExample, SentencePair};
pub use crate::core::tokenize::tokenize;
pub use crate::core::vocab::Vocabulary;
pub use engine::{DecodeOutput, FinishReason, Translator, WaitKDecoder};
pub use error::{Error, Result};
pub use model::{init_model, load_model, ModelFiles, WaitKModel};
