//! Dataset preparation.
//!
//! This module contains:
//! - Prefix dataset construction over many sentence pairs
//! - Deterministic shuffling and train/test splitting
//! - The CSV boundary for vocabulary sources, pairs and prefix tables

pub mod table;

use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::DatasetConfig;
use crate::core::prefix::{build_prefix_examples, PrefixExample, SentencePair};
use crate::error::{Error, Result};

pub use table::{
    parse_token_list, read_prefix_examples, read_sentence_pairs, read_token_inventory,
    write_prefix_examples,
};

/// Builds prefix examples for every pair, in pair order.
///
/// Fails on the first pair with an empty source.
pub fn build_prefix_dataset(pairs: &[SentencePair], wait_k: usize) -> Result<Vec<PrefixExample>> {
    let mut examples = Vec::with_capacity(pairs.iter().map(SentencePair::target_len).sum());
    for pair in pairs {
        examples.extend(build_prefix_examples(pair, wait_k)?);
    }

    tracing::info!(
        "Built {} prefix examples from {} pairs (wait_k = {})",
        examples.len(),
        pairs.len(),
        wait_k
    );
    Ok(examples)
}

/// Builds the prefix dataset and applies the shuffle configured in `config`.
pub fn prepare_prefix_dataset(
    pairs: &[SentencePair],
    wait_k: usize,
    config: &DatasetConfig,
) -> Result<Vec<PrefixExample>> {
    let mut examples = build_prefix_dataset(pairs, wait_k)?;
    if config.shuffle {
        tracing::debug!("Shuffling with seed {}", config.shuffle_seed);
        shuffle_examples(&mut examples, config.shuffle_seed);
    }
    Ok(examples)
}

/// Shuffles examples in place; the same seed always gives the same order.
pub fn shuffle_examples(examples: &mut [PrefixExample], seed: u64) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    examples.shuffle(&mut rng);
}

/// Splits examples into `(train, test)`, putting the last
/// `ceil(len * test_fraction)` examples in the test set.
pub fn train_test_split(
    examples: Vec<PrefixExample>,
    test_fraction: f64,
) -> Result<(Vec<PrefixExample>, Vec<PrefixExample>)> {
    if !(0.0..=1.0).contains(&test_fraction) {
        return Err(Error::Config(format!(
            "test fraction must be in [0, 1], got {test_fraction}"
        )));
    }

    let mut train = examples;
    let test_len = (train.len() as f64 * test_fraction).ceil() as usize;
    let test = train.split_off(train.len() - test_len);
    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn examples(n: usize) -> Vec<PrefixExample> {
        (0..n)
            .map(|i| PrefixExample {
                source_prefix: vec![format!("s{i}")],
                prev_target: "<sos>".into(),
                target_word: format!("t{i}"),
            })
            .collect()
    }

    #[test]
    fn test_shuffle_is_reproducible() {
        let mut a = examples(20);
        let mut b = examples(20);
        shuffle_examples(&mut a, 7);
        shuffle_examples(&mut b, 7);

        assert_eq!(a, b);
        assert_ne!(a, examples(20));
    }

    #[test]
    fn test_prepare_follows_config() {
        let pairs: Vec<_> = (0..10)
            .map(|i| SentencePair::new([format!("s{i}")], [format!("t{i}"), format!("u{i}")]))
            .collect();
        let ordered = build_prefix_dataset(&pairs, 1).unwrap();

        let kept = prepare_prefix_dataset(&pairs, 1, &DatasetConfig::default()).unwrap();
        assert_eq!(kept, ordered);

        let config = DatasetConfig::default().shuffle(true).shuffle_seed(9);
        let shuffled = prepare_prefix_dataset(&pairs, 1, &config).unwrap();
        let mut expected = ordered.clone();
        shuffle_examples(&mut expected, 9);
        assert_eq!(shuffled, expected);
        assert_ne!(shuffled, ordered);
    }

    #[test]
    fn test_split_sizes() {
        let (train, test) = train_test_split(examples(10), 0.25).unwrap();
        assert_eq!(train.len(), 7);
        assert_eq!(test.len(), 3);
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        assert!(train_test_split(examples(3), 1.5).is_err());
    }

    #[test]
    fn test_dataset_concatenates_in_order() {
        let pairs = vec![
            SentencePair::new(["a"], ["x", "y"]),
            SentencePair::new(["b", "c"], ["z"]),
        ];
        let dataset = build_prefix_dataset(&pairs, 1).unwrap();

        let targets: Vec<_> = dataset.iter().map(|e| e.target_word.as_str()).collect();
        assert_eq!(targets, vec!["x", "y", "z"]);
    }
}
