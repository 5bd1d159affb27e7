//! Source-prefix encoder.
//!
//! Embeds the visible source prefix and runs it left to right through a GRU,
//! keeping every intermediate state for attention.

use candle_core::{DType, Device, Module, Result, Tensor};
use candle_nn::{embedding, Embedding, VarBuilder};

use super::gru::GruCell;

/// Encoded source prefix.
#[derive(Debug, Clone)]
pub struct EncoderOutput {
    /// Per-position hidden states [r, hidden_size].
    pub states: Tensor,
    /// Final recurrent state [1, hidden_size].
    pub final_state: Tensor,
}

impl EncoderOutput {
    /// Number of encoded positions (r).
    pub fn len(&self) -> usize {
        self.states.dims()[0]
    }

    /// Whether no position was encoded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Embedding + GRU encoder.
#[derive(Debug, Clone)]
pub struct Encoder {
    embed_tokens: Embedding,
    gru: GruCell,
    device: Device,
    dtype: DType,
}

impl Encoder {
    /// Creates a new Encoder from a VarBuilder.
    ///
    /// Expects `embedding.weight` and `gru.{weight,bias}_{ih,hh}`.
    pub fn new(
        vocab_size: usize,
        embedding_dim: usize,
        hidden_size: usize,
        vb: VarBuilder,
    ) -> Result<Self> {
        let embed_tokens = embedding(vocab_size, embedding_dim, vb.pp("embedding"))?;
        let gru = GruCell::new(embedding_dim, hidden_size, vb.pp("gru"))?;

        Ok(Self {
            embed_tokens,
            gru,
            device: vb.device().clone(),
            dtype: vb.dtype(),
        })
    }

    /// Creates a new Encoder with random weights for testing.
    pub fn new_random(
        vocab_size: usize,
        embedding_dim: usize,
        hidden_size: usize,
        dtype: DType,
        device: &Device,
    ) -> Result<Self> {
        let weight =
            Tensor::randn(0.0f32, 1.0, (vocab_size, embedding_dim), device)?.to_dtype(dtype)?;
        let embed_tokens = Embedding::new(weight, embedding_dim);
        let gru = GruCell::new_random(embedding_dim, hidden_size, dtype, device)?;

        Ok(Self {
            embed_tokens,
            gru,
            device: device.clone(),
            dtype,
        })
    }

    /// Returns the embedding table [vocab_size, embedding_dim].
    pub fn embeddings(&self) -> &Tensor {
        self.embed_tokens.embeddings()
    }

    /// Returns the hidden size.
    pub fn hidden_size(&self) -> usize {
        self.gru.hidden_size()
    }

    /// Encodes a non-empty source prefix.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Source token IDs, length r >= 1
    ///
    /// # Returns
    ///
    /// Hidden states [r, hidden_size] and the final state [1, hidden_size]
    pub fn forward(&self, prefix: &[u32]) -> Result<EncoderOutput> {
        if prefix.is_empty() {
            candle_core::bail!("cannot encode an empty prefix");
        }

        let ids = Tensor::new(prefix, &self.device)?;
        // [r, embedding_dim]
        let embedded = self.embed_tokens.forward(&ids)?;

        let mut h = self.gru.zero_state(1, self.dtype, &self.device)?;
        let mut states = Vec::with_capacity(prefix.len());
        for pos in 0..prefix.len() {
            let x = embedded.narrow(0, pos, 1)?;
            h = self.gru.step(&x, &h)?;
            states.push(h.clone());
        }

        Ok(EncoderOutput {
            states: Tensor::cat(&states, 0)?,
            final_state: h,
        })
    }
}
