//! Greedy token selection.
//!
//! Wait-K decoding is deterministic: the next token is the arg-max of the
//! logits after reserved tokens have been masked out.
//!
//! ## Selection Pipeline
//!
//! ```text
//! Logits [vocab_size]
//!     │
//!     ▼ Mask <pad>, <sos> (and <unk> when suppressed) to -inf
//! Masked logits
//!     │
//!     ▼ Arg-max (first index on ties)
//! Candidate token
//!     │
//!     ▼ <unk>? copy the most attended source token if it is in vocabulary
//! Resolved token
//! ```

use crate::core::vocab::{Vocabulary, PAD_ID, SOS_ID, UNK_ID};

/// Greedy sampler with reserved-token masking and the `<unk>` copy fallback.
#[derive(Debug, Clone)]
pub struct GreedySampler {
    /// Token IDs that can never be selected.
    masked: Vec<u32>,
}

impl GreedySampler {
    /// Creates a sampler masking `<pad>` and `<sos>`, and `<unk>` when
    /// `suppress_unknown` is set. `<eos>` is never masked.
    pub fn new(suppress_unknown: bool) -> Self {
        let mut masked = vec![PAD_ID, SOS_ID];
        if suppress_unknown {
            masked.push(UNK_ID);
        }
        Self { masked }
    }

    /// Token IDs masked before selection.
    pub fn masked(&self) -> &[u32] {
        &self.masked
    }

    /// Returns the index of the largest unmasked logit.
    ///
    /// NaN logits are never selected. Returns `None` only if every logit is
    /// masked or NaN.
    pub fn select(&self, logits: &[f32]) -> Option<u32> {
        let mut best: Option<(u32, f32)> = None;
        for (id, &value) in logits.iter().enumerate() {
            let id = id as u32;
            if value.is_nan() || self.masked.contains(&id) {
                continue;
            }
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((id, value));
            }
        }
        best.map(|(id, _)| id)
    }
}

/// Resolves an `<unk>` candidate by copying the most attended source token.
///
/// Non-`<unk>` candidates are returned unchanged. The copied token replaces
/// the candidate only if it is in the vocabulary; otherwise `<unk>` is kept.
/// Returns the resolved ID and whether a copy happened.
pub fn resolve_unknown<S: AsRef<str>>(
    candidate: u32,
    attention: &[f32],
    source_prefix: &[S],
    vocab: &Vocabulary,
) -> (u32, bool) {
    if candidate != UNK_ID {
        return (candidate, false);
    }

    let Some(position) = argmax(attention) else {
        return (candidate, false);
    };

    match source_prefix
        .get(position)
        .and_then(|token| vocab.get(token.as_ref()))
    {
        Some(id) => (id, true),
        None => {
            tracing::warn!(
                "copy fallback found no vocabulary entry at source position {}",
                position
            );
            (candidate, false)
        }
    }
}

/// Position of the largest value, first one on ties.
fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocab::EOS_ID;

    #[test]
    fn test_masks_reserved_tokens() {
        let sampler = GreedySampler::new(true);
        // pad, sos, eos, unk, w
        let logits = [10.0f32, 9.0, 1.0, 8.0, 5.0];
        assert_eq!(sampler.select(&logits), Some(4));
    }

    #[test]
    fn test_eos_is_selectable() {
        let sampler = GreedySampler::new(true);
        let logits = [10.0f32, 9.0, 7.0, 8.0, 5.0];
        assert_eq!(sampler.select(&logits), Some(EOS_ID));
    }

    #[test]
    fn test_unknown_kept_when_not_suppressed() {
        let sampler = GreedySampler::new(false);
        let logits = [0.0f32, 0.0, 0.0, 8.0, 5.0];
        assert_eq!(sampler.select(&logits), Some(UNK_ID));
    }

    #[test]
    fn test_ties_pick_first_and_nan_skipped() {
        let sampler = GreedySampler::new(true);
        let logits = [0.0f32, 0.0, f32::NAN, 0.0, 2.0, 2.0];
        assert_eq!(sampler.select(&logits), Some(4));
    }

    #[test]
    fn test_argmax_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_resolve_unknown_copies_source() {
        let vocab = Vocabulary::from_tokens(["bank", "river"]);
        let source = ["river", "bank"];

        let (id, copied) = resolve_unknown(UNK_ID, &[0.1, 0.9], &source, &vocab);
        assert!(copied);
        assert_eq!(vocab.id_to_token(id), "bank");
    }

    #[test]
    fn test_resolve_unknown_keeps_unk_for_oov_copy() {
        let vocab = Vocabulary::from_tokens(["bank"]);
        let source = ["bank", "heron"];

        assert_eq!(
            resolve_unknown(UNK_ID, &[0.2, 0.8], &source, &vocab),
            (UNK_ID, false)
        );
    }

    #[test]
    fn test_resolve_leaves_known_candidates() {
        let vocab = Vocabulary::from_tokens(["bank"]);
        assert_eq!(resolve_unknown(4, &[1.0], &["x"], &vocab), (4, false));
    }
}
