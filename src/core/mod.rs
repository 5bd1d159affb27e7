//! Core data types for nano-waitk.
//!
//! This module contains the fundamental building blocks:
//! - Vocabulary with the four reserved tokens
//! - SentencePair and the Wait-K prefix-example builder
//! - Word-level tokenization

pub mod prefix;
pub mod tokenize;
pub mod vocab;
