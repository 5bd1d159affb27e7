//! Decoding engine.
//!
//! This module contains:
//! - GreedySampler for masked arg-max selection and the `<unk>` copy fallback
//! - WaitKDecoder for the Wait-K greedy decode loop
//! - Translator for text-in, text-out decoding

pub mod sampler;
pub mod translator;
pub mod waitk;

pub use sampler::{resolve_unknown, GreedySampler};
pub use translator::Translator;
pub use waitk::{DecodeOutput, FinishReason, StepTrace, WaitKDecoder};
