//! Token vocabulary.
//!
//! A `Vocabulary` is an immutable bijection between tokens and indices. It is
//! built once from a token inventory and passed explicitly to every component
//! that translates between the two.
//!
//! ## Index layout
//!
//! ```text
//! 0      1      2      3      4 ..
//! <pad>  <sos>  <eos>  <unk>  sorted, deduplicated inventory
//! ```
//!
//! The layout is deterministic so that indices survive a save/load cycle and
//! line up with persisted model parameters.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::{Error, Result};

/// Padding token.
pub const PAD_TOKEN: &str = "<pad>";
/// Start-of-sequence token.
pub const SOS_TOKEN: &str = "<sos>";
/// End-of-sequence token.
pub const EOS_TOKEN: &str = "<eos>";
/// Unknown token.
pub const UNK_TOKEN: &str = "<unk>";

/// Reserved tokens in index order.
pub const RESERVED_TOKENS: [&str; 4] = [PAD_TOKEN, SOS_TOKEN, EOS_TOKEN, UNK_TOKEN];

/// Index of `<pad>`.
pub const PAD_ID: u32 = 0;
/// Index of `<sos>`.
pub const SOS_ID: u32 = 1;
/// Index of `<eos>`.
pub const EOS_ID: u32 = 2;
/// Index of `<unk>`.
pub const UNK_ID: u32 = 3;

/// Immutable token ↔ index mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    /// `tokens[id]` is the token for `id`.
    tokens: Vec<String>,
    /// Reverse lookup.
    index: HashMap<String, u32>,
}

impl Vocabulary {
    /// Builds a vocabulary from a token inventory.
    ///
    /// Duplicates and reserved tokens in the inventory are dropped; the rest is
    /// sorted lexicographically and placed after the four reserved tokens.
    pub fn from_tokens<I, S>(inventory: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sorted: BTreeSet<String> = inventory
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .filter(|t| !t.is_empty() && !RESERVED_TOKENS.contains(&t.as_str()))
            .collect();

        let tokens: Vec<String> = RESERVED_TOKENS
            .iter()
            .map(|t| t.to_string())
            .chain(sorted)
            .collect();

        Self::from_ordered(tokens)
    }

    /// Rebuilds a vocabulary from tokens already in index order.
    ///
    /// Fails if the reserved tokens are not at indices 0..4 or a token repeats.
    pub fn from_ordered_tokens(tokens: Vec<String>) -> Result<Self> {
        if tokens.len() < RESERVED_TOKENS.len()
            || tokens
                .iter()
                .zip(RESERVED_TOKENS.iter())
                .any(|(t, r)| t != r)
        {
            return Err(Error::Config(format!(
                "vocabulary must start with {RESERVED_TOKENS:?}"
            )));
        }

        let vocab = Self::from_ordered(tokens);
        if vocab.index.len() != vocab.tokens.len() {
            return Err(Error::Config("vocabulary contains duplicate tokens".into()));
        }
        Ok(vocab)
    }

    fn from_ordered(tokens: Vec<String>) -> Self {
        let index = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as u32))
            .collect();
        Self { tokens, index }
    }

    /// Loads a vocabulary saved with [`Vocabulary::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let tokens: Vec<String> = serde_json::from_str(&content)?;
        Self::from_ordered_tokens(tokens)
    }

    /// Saves the vocabulary as a JSON list of tokens in index order.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.tokens)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Number of tokens, reserved tokens included.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false: the reserved tokens are always present.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Index of `token`, if present.
    pub fn get(&self, token: &str) -> Option<u32> {
        self.index.get(token).copied()
    }

    /// Index of `token`, falling back to `<unk>`.
    pub fn token_to_id(&self, token: &str) -> u32 {
        self.get(token).unwrap_or(UNK_ID)
    }

    /// Token for `id`, falling back to `<unk>` for out-of-range ids.
    pub fn id_to_token(&self, id: u32) -> &str {
        self.tokens
            .get(id as usize)
            .map(String::as_str)
            .unwrap_or(UNK_TOKEN)
    }

    /// Maps a token sequence to indices.
    pub fn encode<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<u32> {
        tokens.iter().map(|t| self.token_to_id(t.as_ref())).collect()
    }

    /// Maps indices back to tokens.
    pub fn decode(&self, ids: &[u32]) -> Vec<String> {
        ids.iter().map(|&id| self.id_to_token(id).to_string()).collect()
    }

    /// All tokens in index order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_layout() {
        let vocab = Vocabulary::from_tokens(["b", "a"]);

        assert_eq!(vocab.get(PAD_TOKEN), Some(PAD_ID));
        assert_eq!(vocab.get(SOS_TOKEN), Some(SOS_ID));
        assert_eq!(vocab.get(EOS_TOKEN), Some(EOS_ID));
        assert_eq!(vocab.get(UNK_TOKEN), Some(UNK_ID));
        assert_eq!(vocab.get("a"), Some(4));
        assert_eq!(vocab.get("b"), Some(5));
    }

    #[test]
    fn test_reserved_tokens_in_inventory_are_not_duplicated() {
        let vocab = Vocabulary::from_tokens(["<eos>", "x", "<unk>", "x"]);

        assert_eq!(vocab.len(), 5);
        assert_eq!(vocab.id_to_token(4), "x");
    }

    #[test]
    fn test_lookup_fallbacks() {
        let vocab = Vocabulary::from_tokens(["a"]);

        assert_eq!(vocab.token_to_id("missing"), UNK_ID);
        assert_eq!(vocab.id_to_token(999), UNK_TOKEN);
    }

    #[test]
    fn test_from_ordered_tokens_rejects_bad_prefix() {
        let tokens = vec!["a".to_string(), "<pad>".to_string()];
        assert!(Vocabulary::from_ordered_tokens(tokens).is_err());
    }

    #[test]
    fn test_from_ordered_tokens_rejects_duplicates() {
        let mut tokens: Vec<String> = RESERVED_TOKENS.iter().map(|t| t.to_string()).collect();
        tokens.push("a".into());
        tokens.push("a".into());
        assert!(Vocabulary::from_ordered_tokens(tokens).is_err());
    }
}
