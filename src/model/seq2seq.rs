//! Wait-K encoder–decoder model.
//!
//! Combines the prefix encoder and the attention decoder into the incremental
//! step used both for training examples and for Wait-K decoding: encode the
//! visible prefix, start the decoder from the encoder's final state, and emit
//! one prediction.
//!
//! Parameters are never mutated after construction. All recurrent state is
//! returned to the caller, so one model can serve any number of concurrent
//! decodes.

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;

use super::decoder::{AttentionDecoder, DecoderStep};
use super::encoder::{Encoder, EncoderOutput};
use crate::config::ModelConfig;
use crate::error::{Error, Result};

/// Output of one incremental encoder–decoder step.
#[derive(Debug, Clone)]
pub struct StepOutput {
    /// Vocabulary logits.
    pub logits: Vec<f32>,
    /// Decoder state after the step [1, hidden_size].
    pub state: Tensor,
    /// Attention weights over the prefix, length r.
    pub attention: Vec<f32>,
}

/// Encoder–decoder pair with shared configuration.
#[derive(Debug, Clone)]
pub struct WaitKModel {
    encoder: Encoder,
    decoder: AttentionDecoder,
    config: ModelConfig,
}

impl WaitKModel {
    /// Builds the model from separate encoder and decoder VarBuilders.
    pub fn new(config: &ModelConfig, encoder_vb: VarBuilder, decoder_vb: VarBuilder) -> Result<Self> {
        let encoder = Encoder::new(
            config.vocab_size,
            config.embedding_dim,
            config.hidden_size,
            encoder_vb,
        )?;
        let decoder = AttentionDecoder::new(
            config.vocab_size,
            config.embedding_dim,
            config.hidden_size,
            decoder_vb,
        )?;

        Ok(Self {
            encoder,
            decoder,
            config: config.clone(),
        })
    }

    /// Creates a model with random weights for testing.
    pub fn new_random(config: &ModelConfig, dtype: DType, device: &Device) -> Result<Self> {
        let encoder = Encoder::new_random(
            config.vocab_size,
            config.embedding_dim,
            config.hidden_size,
            dtype,
            device,
        )?;
        let decoder = AttentionDecoder::new_random(
            config.vocab_size,
            config.embedding_dim,
            config.hidden_size,
            dtype,
            device,
        )?;

        Ok(Self {
            encoder,
            decoder,
            config: config.clone(),
        })
    }

    /// Returns the model configuration.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Number of rows in the encoder and decoder embedding tables.
    ///
    /// Both must match the vocabulary the model is used with.
    pub fn embedding_rows(&self) -> (usize, usize) {
        (
            self.encoder.embeddings().dims()[0],
            self.decoder.embeddings().dims()[0],
        )
    }

    /// Encodes a source prefix. Rejects an empty prefix.
    pub fn encode(&self, source_prefix: &[u32]) -> Result<EncoderOutput> {
        if source_prefix.is_empty() {
            return Err(Error::EmptySource);
        }
        Ok(self.encoder.forward(source_prefix)?)
    }

    /// Runs the decoder once over an already encoded prefix, starting from the
    /// encoder's final state.
    pub fn decode_step(&self, encoded: &EncoderOutput, prev_token: u32) -> Result<StepOutput> {
        let DecoderStep {
            logits,
            state,
            attention,
        } = self
            .decoder
            .step(prev_token, &encoded.final_state, encoded)?;

        Ok(StepOutput {
            logits: logits.to_dtype(DType::F32)?.to_vec1()?,
            state,
            attention: attention.to_dtype(DType::F32)?.to_vec1()?,
        })
    }

    /// Incremental encoder–decoder step: encodes `source_prefix` and predicts
    /// the token following `prev_token`.
    pub fn step(&self, source_prefix: &[u32], prev_token: u32) -> Result<StepOutput> {
        let encoded = self.encode(source_prefix)?;
        self.decode_step(&encoded, prev_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_shapes() {
        let device = Device::Cpu;
        let config = ModelConfig::new(12).embedding_dim(8).hidden_size(16);
        let model = WaitKModel::new_random(&config, DType::F32, &device).unwrap();

        let out = model.step(&[4, 5, 6], 1).unwrap();
        assert_eq!(out.logits.len(), 12);
        assert_eq!(out.attention.len(), 3);
        assert_eq!(out.state.dims(), &[1, 16]);
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let device = Device::Cpu;
        let config = ModelConfig::new(8).embedding_dim(4).hidden_size(4);
        let model = WaitKModel::new_random(&config, DType::F32, &device).unwrap();

        assert!(matches!(model.step(&[], 1), Err(Error::EmptySource)));
    }
}
