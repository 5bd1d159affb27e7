//! Wait-K prefix examples.
//!
//! A sentence pair of source length `Lx` and target length `Ly` expands into
//! `Ly` training examples. The example for target position `t` (1-indexed)
//! sees the first `r(t)` source tokens:
//!
//! ```text
//! r(t) = min(K + (t - 1), Lx)
//!
//! source:  a  b  c  d  e          K = 2
//! t = 1:  [a  b]          <sos> -> w
//! t = 2:  [a  b  c]       w     -> x
//! t = 3:  [a  b  c  d]    x     -> y
//! ```
//!
//! The visible prefix never shrinks, so output `j` depends on at most the
//! first `K + j - 1` source tokens.

use serde::{Deserialize, Serialize};

use crate::core::vocab::{Vocabulary, SOS_TOKEN};
use crate::error::{Error, Result};

/// An (ambiguous source, original target) pair of token sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentencePair {
    source: Vec<String>,
    target: Vec<String>,
}

impl SentencePair {
    /// Creates a new sentence pair.
    pub fn new<S: Into<String>, T: Into<String>>(
        source: impl IntoIterator<Item = S>,
        target: impl IntoIterator<Item = T>,
    ) -> Self {
        Self {
            source: source.into_iter().map(Into::into).collect(),
            target: target.into_iter().map(Into::into).collect(),
        }
    }

    /// Source tokens.
    pub fn source(&self) -> &[String] {
        &self.source
    }

    /// Target tokens.
    pub fn target(&self) -> &[String] {
        &self.target
    }

    /// Source length (`Lx`).
    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    /// Target length (`Ly`).
    pub fn target_len(&self) -> usize {
        self.target.len()
    }
}

/// One training instance: visible source prefix, previous target token, and
/// the target token to predict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixExample {
    pub source_prefix: Vec<String>,
    pub prev_target: String,
    pub target_word: String,
}

impl PrefixExample {
    /// Maps the example to vocabulary indices, unknown tokens becoming `<unk>`.
    pub fn encode(&self, vocab: &Vocabulary) -> EncodedExample {
        EncodedExample {
            source_prefix: vocab.encode(&self.source_prefix),
            prev_target: vocab.token_to_id(&self.prev_target),
            target_word: vocab.token_to_id(&self.target_word),
        }
    }
}

/// A prefix example in index form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedExample {
    pub source_prefix: Vec<u32>,
    pub prev_target: u32,
    pub target_word: u32,
}

/// Visible source length for target position `t` (1-indexed).
///
/// Clamped to `[1, source_len]`; with `K = 0` the first position still sees
/// one source token.
pub fn prefix_len(wait_k: usize, t: usize, source_len: usize) -> usize {
    debug_assert!(t >= 1, "target positions are 1-indexed");
    wait_k
        .saturating_add(t.saturating_sub(1))
        .min(source_len)
        .max(1)
}

/// Expands one sentence pair into its `Ly` prefix examples under latency `K`.
///
/// Returns [`Error::EmptySource`] when the source has no tokens.
pub fn build_prefix_examples(pair: &SentencePair, wait_k: usize) -> Result<Vec<PrefixExample>> {
    let source_len = pair.source_len();
    if source_len == 0 {
        return Err(Error::EmptySource);
    }

    let examples = pair
        .target
        .iter()
        .enumerate()
        .map(|(i, target_word)| {
            let t = i + 1;
            let r = prefix_len(wait_k, t, source_len);
            let prev_target = if i == 0 {
                SOS_TOKEN.to_string()
            } else {
                pair.target[i - 1].clone()
            };
            PrefixExample {
                source_prefix: pair.source[..r].to_vec(),
                prev_target,
                target_word: target_word.clone(),
            }
        })
        .collect();

    Ok(examples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> SentencePair {
        SentencePair::new(["a", "b", "c", "d", "e"], ["w", "x", "y"])
    }

    #[test]
    fn test_prefix_len_formula() {
        assert_eq!(prefix_len(2, 1, 5), 2);
        assert_eq!(prefix_len(2, 3, 5), 4);
        assert_eq!(prefix_len(2, 9, 5), 5);
        assert_eq!(prefix_len(0, 1, 5), 1);
        assert_eq!(prefix_len(usize::MAX, 2, 5), 5);
    }

    #[test]
    fn test_wait_two() {
        let examples = build_prefix_examples(&pair(), 2).unwrap();

        assert_eq!(examples.len(), 3);
        assert_eq!(examples[0].source_prefix, vec!["a", "b"]);
        assert_eq!(examples[0].prev_target, SOS_TOKEN);
        assert_eq!(examples[0].target_word, "w");
        assert_eq!(examples[2].source_prefix, vec!["a", "b", "c", "d"]);
        assert_eq!(examples[2].prev_target, "x");
    }

    #[test]
    fn test_empty_source_rejected() {
        let pair = SentencePair::new(Vec::<String>::new(), ["w"]);
        assert!(matches!(
            build_prefix_examples(&pair, 2),
            Err(Error::EmptySource)
        ));
    }

    #[test]
    fn test_empty_target_yields_nothing() {
        let pair = SentencePair::new(["a"], Vec::<String>::new());
        assert!(build_prefix_examples(&pair, 2).unwrap().is_empty());
    }

    #[test]
    fn test_encode_example() {
        let vocab = Vocabulary::from_tokens(["a", "b", "w"]);
        let example = PrefixExample {
            source_prefix: vec!["a".into(), "zzz".into()],
            prev_target: SOS_TOKEN.into(),
            target_word: "w".into(),
        };

        let encoded = example.encode(&vocab);
        assert_eq!(encoded.source_prefix, vec![4, crate::core::vocab::UNK_ID]);
        assert_eq!(encoded.prev_target, crate::core::vocab::SOS_ID);
        assert_eq!(encoded.target_word, 6);
    }
}
