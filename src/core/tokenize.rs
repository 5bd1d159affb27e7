//! Word-level tokenization.
//!
//! Splits text on whitespace and punctuation with the BERT pre-tokenizer and
//! lowercases every piece, giving the flat word/punctuation token lists the
//! vocabulary and prefix builder work with.
//!
//! Every punctuation character becomes its own token, so contractions split at
//! the apostrophe (`don't` -> `don ' t`). Token-list cells are not passed
//! through here and keep their own splits (`do n't`); raw text only matches
//! such vocabulary entries where the splits agree.

use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::{OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer};

use crate::error::{Error, Result};

/// Tokenizes `text` into lowercase word and punctuation tokens.
pub fn tokenize(text: &str) -> Result<Vec<String>> {
    let mut pretokenized = PreTokenizedString::from(text);
    BertPreTokenizer
        .pre_tokenize(&mut pretokenized)
        .map_err(|e| Error::Tokenization(e.to_string()))?;

    Ok(pretokenized
        .get_splits(OffsetReferential::Original, OffsetType::Byte)
        .into_iter()
        .map(|(piece, _, _)| piece.trim().to_lowercase())
        .filter(|piece| !piece.is_empty())
        .collect())
}
