//! Configuration types for nano-waitk.

use serde::{Deserialize, Serialize};

/// Model configuration (embedding + GRU encoder/decoder with attention).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Vocabulary size, shared by encoder and decoder.
    pub vocab_size: usize,
    /// Token embedding dimension.
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
    /// GRU hidden dimension.
    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,
}

fn default_embedding_dim() -> usize {
    256
}

fn default_hidden_size() -> usize {
    512
}

impl ModelConfig {
    /// Creates a config for the given vocabulary size with default dimensions.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            embedding_dim: default_embedding_dim(),
            hidden_size: default_hidden_size(),
        }
    }

    /// Set the embedding dimension.
    pub fn embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    /// Set the hidden dimension.
    pub fn hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size;
        self
    }
}

/// Wait-K decoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Source tokens visible before the first output token (K).
    pub wait_k: usize,
    /// Maximum number of decode steps.
    pub max_len: usize,
    /// Mask `<unk>` together with `<pad>` and `<sos>` before the arg-max.
    ///
    /// When disabled, an `<unk>` prediction goes through the copy fallback.
    pub suppress_unknown: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            wait_k: 3,
            max_len: 50,
            suppress_unknown: true,
        }
    }
}

impl DecodeConfig {
    /// Creates a config with the given latency budget.
    pub fn new(wait_k: usize) -> Self {
        Self {
            wait_k,
            ..Default::default()
        }
    }

    /// Set the maximum number of decode steps.
    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Enable or disable `<unk>` suppression.
    pub fn suppress_unknown(mut self, suppress: bool) -> Self {
        self.suppress_unknown = suppress;
        self
    }
}

/// Column layout and shuffling for sentence-pair tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Column holding the ambiguous (source) sentence.
    pub source_column: String,
    /// Column holding the original (target) sentence.
    pub target_column: String,
    /// Shuffle prefix examples instead of keeping builder order.
    #[serde(default)]
    pub shuffle: bool,
    /// Seed for the deterministic example shuffle.
    pub shuffle_seed: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            source_column: "ambiguous".to_string(),
            target_column: "original".to_string(),
            shuffle: false,
            shuffle_seed: 42,
        }
    }
}

impl DatasetConfig {
    /// Enable or disable the example shuffle.
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set the shuffle seed.
    pub fn shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = seed;
        self
    }
}
