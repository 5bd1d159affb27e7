//! Attention decoder step.
//!
//! One decoder step takes the previous output token, a recurrent state and the
//! encoded source prefix, and produces vocabulary logits together with the
//! attention distribution over the prefix.
//!
//! ## Step
//!
//! ```text
//! prev_token ──► Embedding ──► GRU(state) ──► h̃
//!                                              │
//!        encoder states h_1..h_r ──► α = softmax(h̃ · h_j)
//!                                              │
//!                               c = Σ α_j h_j  │
//!                                              ▼
//!                                  [h̃; c] ──► Linear ──► logits [V]
//! ```

use candle_core::{DType, Device, IndexOp, Module, Result, Tensor};
use candle_nn::{embedding, linear, Embedding, Linear, VarBuilder};

use super::encoder::EncoderOutput;
use super::gru::GruCell;

/// Output of one decoder step.
#[derive(Debug, Clone)]
pub struct DecoderStep {
    /// Vocabulary logits [vocab_size].
    pub logits: Tensor,
    /// Updated decoder state [1, hidden_size].
    pub state: Tensor,
    /// Attention weights over the encoded prefix [r].
    pub attention: Tensor,
}

/// Embedding + GRU decoder with dot-product attention.
#[derive(Debug, Clone)]
pub struct AttentionDecoder {
    embed_tokens: Embedding,
    gru: GruCell,
    /// Projection [2 * hidden_size] -> [vocab_size].
    out_proj: Linear,
    vocab_size: usize,
    device: Device,
}

impl AttentionDecoder {
    /// Creates a new AttentionDecoder from a VarBuilder.
    ///
    /// Expects `embedding.weight`, `gru.*` and `out.{weight,bias}`.
    pub fn new(
        vocab_size: usize,
        embedding_dim: usize,
        hidden_size: usize,
        vb: VarBuilder,
    ) -> Result<Self> {
        let embed_tokens = embedding(vocab_size, embedding_dim, vb.pp("embedding"))?;
        let gru = GruCell::new(embedding_dim, hidden_size, vb.pp("gru"))?;
        let out_proj = linear(2 * hidden_size, vocab_size, vb.pp("out"))?;

        Ok(Self {
            embed_tokens,
            gru,
            out_proj,
            vocab_size,
            device: vb.device().clone(),
        })
    }

    /// Creates a new AttentionDecoder with random weights for testing.
    pub fn new_random(
        vocab_size: usize,
        embedding_dim: usize,
        hidden_size: usize,
        dtype: DType,
        device: &Device,
    ) -> Result<Self> {
        let emb = Tensor::randn(0.0f32, 1.0, (vocab_size, embedding_dim), device)?.to_dtype(dtype)?;
        let out_weight =
            Tensor::randn(0.0f32, 0.1, (vocab_size, 2 * hidden_size), device)?.to_dtype(dtype)?;
        let out_bias = Tensor::zeros(vocab_size, dtype, device)?;

        Ok(Self {
            embed_tokens: Embedding::new(emb, embedding_dim),
            gru: GruCell::new_random(embedding_dim, hidden_size, dtype, device)?,
            out_proj: Linear::new(out_weight, Some(out_bias)),
            vocab_size,
            device: device.clone(),
        })
    }

    /// Returns the embedding table [vocab_size, embedding_dim].
    pub fn embeddings(&self) -> &Tensor {
        self.embed_tokens.embeddings()
    }

    /// Returns the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Runs one decoder step.
    ///
    /// # Arguments
    ///
    /// * `prev_token` - Previous output token ID
    /// * `state` - Decoder state [1, hidden_size]
    /// * `encoded` - Encoded source prefix (r >= 1 positions)
    pub fn step(&self, prev_token: u32, state: &Tensor, encoded: &EncoderOutput) -> Result<DecoderStep> {
        if encoded.is_empty() {
            candle_core::bail!("cannot attend over an empty prefix");
        }

        let ids = Tensor::new(&[prev_token], &self.device)?;
        // [1, embedding_dim]
        let x = self.embed_tokens.forward(&ids)?;
        // [1, hidden_size]
        let h = self.gru.step(&x, state)?;

        // Scores [1, r]; softmax_last_dim subtracts the row max before exp.
        let scores = h.matmul(&encoded.states.t()?)?;
        let weights = candle_nn::ops::softmax_last_dim(&scores)?;

        // Context [1, hidden_size]
        let context = weights.matmul(&encoded.states)?;

        let combined = Tensor::cat(&[&h, &context], 1)?;
        let logits = self.out_proj.forward(&combined)?.i(0)?;

        Ok(DecoderStep {
            logits,
            state: h,
            attention: weights.i(0)?,
        })
    }
}
