//! Wait-K greedy decoder.
//!
//! Produces an output sentence one token at a time while the visible source
//! prefix grows on the Wait-K schedule:
//!
//! ```text
//! t = 1, emitted = [], last = <sos>
//! loop while t <= max_len:
//!     r         = min(K + t - 1, Lx)
//!     step      = model(source[..r], last)
//!     candidate = argmax(mask(step.logits))
//!     resolved  = candidate, or the most attended source token if <unk>
//!     stop if resolved == <eos>
//!     emitted.push(resolved); last = resolved; t += 1
//! ```
//!
//! The encoder is deterministic, so the encoding of `source[..r]` is reused
//! while `r` stays the same (once `K + t - 1 >= Lx`).

use crate::config::DecodeConfig;
use crate::core::prefix::prefix_len;
use crate::core::vocab::{Vocabulary, EOS_ID, SOS_ID};
use crate::error::{Error, Result};
use crate::model::{EncoderOutput, WaitKModel};

use super::sampler::{resolve_unknown, GreedySampler};

/// Reason decoding stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// End-of-sequence token generated.
    EndOfSequence,
    /// Step limit reached.
    MaxTokens,
}

/// Trace of one decode step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepTrace {
    /// Visible source length (r).
    pub prefix_len: usize,
    /// Arg-max token before the copy fallback.
    pub candidate: u32,
    /// Token actually emitted (or `<eos>`).
    pub resolved: u32,
    /// Whether the copy fallback replaced `<unk>`.
    pub copied: bool,
}

/// Result of decoding one sentence.
#[derive(Debug, Clone)]
pub struct DecodeOutput {
    /// Emitted token IDs, `<eos>` excluded.
    pub token_ids: Vec<u32>,
    /// Emitted tokens, `<eos>` excluded.
    pub tokens: Vec<String>,
    /// Why decoding stopped.
    pub finish_reason: FinishReason,
    /// One entry per step, including the terminating `<eos>` step.
    pub steps: Vec<StepTrace>,
}

impl DecodeOutput {
    /// Emitted tokens joined by single spaces.
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Greedy Wait-K decoder over a borrowed model and vocabulary.
#[derive(Debug, Clone)]
pub struct WaitKDecoder<'a> {
    model: &'a WaitKModel,
    vocab: &'a Vocabulary,
    config: DecodeConfig,
    sampler: GreedySampler,
}

impl<'a> WaitKDecoder<'a> {
    /// Creates a decoder.
    pub fn new(model: &'a WaitKModel, vocab: &'a Vocabulary, config: DecodeConfig) -> Self {
        let sampler = GreedySampler::new(config.suppress_unknown);
        Self {
            model,
            vocab,
            config,
            sampler,
        }
    }

    /// Returns the decode configuration.
    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decodes a tokenized source sentence.
    ///
    /// Returns [`Error::EmptySource`] if `source` is empty. Always finishes
    /// within `max_len` steps.
    pub fn decode<S: AsRef<str>>(&self, source: &[S]) -> Result<DecodeOutput> {
        if source.is_empty() {
            return Err(Error::EmptySource);
        }

        let source_ids = self.vocab.encode(source);
        let source_len = source_ids.len();

        let mut token_ids = Vec::new();
        let mut steps = Vec::new();
        let mut last = SOS_ID;
        let mut finish_reason = FinishReason::MaxTokens;
        let mut cached: Option<(usize, EncoderOutput)> = None;

        for t in 1..=self.config.max_len {
            let r = prefix_len(self.config.wait_k, t, source_len);

            let encoded = match cached.take() {
                Some((len, encoded)) if len == r => encoded,
                _ => self.model.encode(&source_ids[..r])?,
            };
            let step = self.model.decode_step(&encoded, last)?;
            cached = Some((r, encoded));

            // <eos> is never masked, so a candidate always exists.
            let candidate = self
                .sampler
                .select(&step.logits)
                .unwrap_or(EOS_ID);
            let (resolved, copied) =
                resolve_unknown(candidate, &step.attention, &source[..r], self.vocab);

            tracing::debug!(
                "step {}: prefix {}/{}, candidate {}, resolved {}{}",
                t,
                r,
                source_len,
                self.vocab.id_to_token(candidate),
                self.vocab.id_to_token(resolved),
                if copied { " (copied)" } else { "" }
            );

            steps.push(StepTrace {
                prefix_len: r,
                candidate,
                resolved,
                copied,
            });

            if resolved == EOS_ID {
                finish_reason = FinishReason::EndOfSequence;
                break;
            }

            token_ids.push(resolved);
            last = resolved;
        }

        Ok(DecodeOutput {
            tokens: self.vocab.decode(&token_ids),
            token_ids,
            finish_reason,
            steps,
        })
    }
}
