//! Tabular (CSV) boundary.
//!
//! Cells in the source tables hold serialized token lists, either Python-style
//! (`['the', "bank's", ',']`) or JSON (`["the", "bank"]`). They are parsed into
//! typed token sequences here, once, and any malformed row fails the whole
//! load.
//!
//! The prefix-example table has exactly three columns:
//!
//! ```text
//! source_prefix,prev_target,target_word
//! "the bank",<sos>,the
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::DatasetConfig;
use crate::core::prefix::{PrefixExample, SentencePair};
use crate::core::tokenize::tokenize;
use crate::error::{Error, Result};

/// Parses a serialized token-list cell.
///
/// Accepts single- or double-quoted string items separated by commas, with
/// backslash escapes. An empty list (`[]`) is valid, an empty item or an item
/// containing whitespace is not: prefix tables store tokens space-joined.
pub fn parse_token_list(cell: &str) -> std::result::Result<Vec<String>, String> {
    let trimmed = cell.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| format!("expected a bracketed list, got {trimmed:?}"))?;

    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let quote = match chars.next() {
            None => break,
            Some(q @ ('\'' | '"')) => q,
            Some(c) => return Err(format!("expected a quoted item, found {c:?}")),
        };

        let mut item = String::new();
        loop {
            match chars.next() {
                None => return Err("unterminated string item".to_string()),
                Some('\\') => match chars.next() {
                    Some('n') => item.push('\n'),
                    Some('t') => item.push('\t'),
                    Some(c) => item.push(c),
                    None => return Err("dangling escape".to_string()),
                },
                Some(c) if c == quote => break,
                Some(c) => item.push(c),
            }
        }
        if item.is_empty() {
            return Err(format!("empty token at item {}", items.len() + 1));
        }
        if item.chars().any(char::is_whitespace) {
            return Err(format!("token {item:?} contains whitespace"));
        }
        items.push(item);

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(c) => return Err(format!("expected ',' between items, found {c:?}")),
        }
    }

    Ok(items)
}

/// Reads a cell that is either a serialized list or raw text.
fn parse_sentence_cell(cell: &str) -> std::result::Result<Vec<String>, String> {
    if cell.trim_start().starts_with('[') {
        parse_token_list(cell)
    } else {
        tokenize(cell).map_err(|e| e.to_string())
    }
}

/// Flattens every list cell of every column into one token inventory.
///
/// The first row is treated as the header (group labels). Empty cells are
/// skipped.
pub fn read_token_inventory(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut inventory = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for cell in record.iter().filter(|c| !c.trim().is_empty()) {
            let tokens = parse_token_list(cell).map_err(|reason| Error::MalformedRow {
                row: row + 1,
                reason,
            })?;
            inventory.extend(tokens);
        }
    }

    tracing::info!(
        "Read {} tokens from {}",
        inventory.len(),
        path.as_ref().display()
    );
    Ok(inventory)
}

/// Reads sentence pairs from the columns named in `config`.
pub fn read_sentence_pairs(
    path: impl AsRef<Path>,
    config: &DatasetConfig,
) -> Result<Vec<SentencePair>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let headers = reader.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    };
    let source_idx = column(&config.source_column)?;
    let target_idx = column(&config.target_column)?;

    let mut pairs = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let malformed = |reason: String| Error::MalformedRow {
            row: row + 1,
            reason,
        };

        let source = record
            .get(source_idx)
            .ok_or_else(|| malformed("missing source cell".into()))?;
        let target = record
            .get(target_idx)
            .ok_or_else(|| malformed("missing target cell".into()))?;

        pairs.push(SentencePair::new(
            parse_sentence_cell(source).map_err(malformed)?,
            parse_sentence_cell(target).map_err(malformed)?,
        ));
    }

    tracing::info!(
        "Read {} sentence pairs from {}",
        pairs.len(),
        path.as_ref().display()
    );
    Ok(pairs)
}

#[derive(Debug, Serialize, Deserialize)]
struct PrefixRow {
    source_prefix: String,
    prev_target: String,
    target_word: String,
}

/// Writes prefix examples in emission order.
pub fn write_prefix_examples(path: impl AsRef<Path>, examples: &[PrefixExample]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for example in examples {
        writer.serialize(PrefixRow {
            source_prefix: example.source_prefix.join(" "),
            prev_target: example.prev_target.clone(),
            target_word: example.target_word.clone(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a prefix-example table written by [`write_prefix_examples`].
pub fn read_prefix_examples(path: impl AsRef<Path>) -> Result<Vec<PrefixExample>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut examples = Vec::new();

    for (row, result) in reader.deserialize::<PrefixRow>().enumerate() {
        let record = result?;
        let source_prefix: Vec<String> = record
            .source_prefix
            .split_whitespace()
            .map(str::to_string)
            .collect();

        if source_prefix.is_empty() || record.prev_target.is_empty() || record.target_word.is_empty()
        {
            return Err(Error::MalformedRow {
                row: row + 1,
                reason: "empty field".into(),
            });
        }

        examples.push(PrefixExample {
            source_prefix,
            prev_target: record.prev_target,
            target_word: record.target_word,
        });
    }

    Ok(examples)
}
