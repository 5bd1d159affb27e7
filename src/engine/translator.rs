//! Sentence-level translation facade.
//!
//! Owns a loaded model and its vocabulary and turns raw text into decoded
//! text: tokenize, run the Wait-K decoder, join the output tokens.

use std::path::Path;

use candle_core::Device;

use super::waitk::{DecodeOutput, WaitKDecoder};
use crate::config::DecodeConfig;
use crate::core::tokenize::tokenize;
use crate::core::vocab::Vocabulary;
use crate::error::Result;
use crate::model::{load_model, validate_vocab, WaitKModel};

/// A model paired with the vocabulary it was trained on.
#[derive(Debug, Clone)]
pub struct Translator {
    model: WaitKModel,
    vocab: Vocabulary,
}

impl Translator {
    /// Pairs a model with a vocabulary, rejecting mismatched sizes.
    pub fn new(model: WaitKModel, vocab: Vocabulary) -> Result<Self> {
        validate_vocab(model.config(), &vocab)?;
        Ok(Self { model, vocab })
    }

    /// Loads a model directory written by [`crate::model::init_model`] or a
    /// training run.
    pub fn load(dir: impl AsRef<Path>, device: &Device) -> Result<Self> {
        let (model, vocab) = load_model(dir, device)?;
        Ok(Self { model, vocab })
    }

    /// Returns the model.
    pub fn model(&self) -> &WaitKModel {
        &self.model
    }

    /// Returns the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Decodes already tokenized input.
    pub fn decode_tokens<S: AsRef<str>>(
        &self,
        source: &[S],
        config: &DecodeConfig,
    ) -> Result<DecodeOutput> {
        WaitKDecoder::new(&self.model, &self.vocab, config.clone()).decode(source)
    }

    /// Tokenizes `text` and decodes it, returning the output tokens joined by
    /// spaces.
    pub fn translate(&self, text: &str, config: &DecodeConfig) -> Result<String> {
        let source = tokenize(text)?;
        Ok(self.decode_tokens(&source, config)?.text())
    }
}
