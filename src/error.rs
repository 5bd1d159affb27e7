//! Error types for nano-waitk.

use thiserror::Error;

/// Result type alias for nano-waitk operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nano-waitk.
#[derive(Error, Debug)]
pub enum Error {
    /// A source sentence (or source prefix) has no tokens.
    #[error("source sequence is empty")]
    EmptySource,

    /// Parameters were sized for a different vocabulary.
    #[error("vocabulary mismatch: parameters expect {expected} tokens, vocabulary has {found}")]
    VocabMismatch { expected: usize, found: usize },

    /// A table row could not be turned into typed values.
    #[error("malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    /// A required table column is absent.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// Model loading failed.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Tokenization error.
    #[error("tokenization error: {0}")]
    Tokenization(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Tensor operation error.
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading or writing error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
