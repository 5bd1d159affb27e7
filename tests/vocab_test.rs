//! Integration tests for Vocabulary.

use nano_waitk::core::vocab::{EOS_ID, PAD_ID, RESERVED_TOKENS, SOS_ID, UNK_ID, UNK_TOKEN};
use nano_waitk::dataset::read_token_inventory;
use nano_waitk::Vocabulary;
use tempfile::TempDir;

#[test]
fn test_reserved_then_sorted() {
    let vocab = Vocabulary::from_tokens(["river", "bank", "duck", "bank"]);

    let tokens: Vec<&str> = vocab.tokens().iter().map(String::as_str).collect();
    assert_eq!(
        tokens,
        vec!["<pad>", "<sos>", "<eos>", "<unk>", "bank", "duck", "river"]
    );
    assert_eq!(vocab.token_to_id("<pad>"), PAD_ID);
    assert_eq!(vocab.token_to_id("<sos>"), SOS_ID);
    assert_eq!(vocab.token_to_id("<eos>"), EOS_ID);
    assert_eq!(vocab.token_to_id("<unk>"), UNK_ID);
}

#[test]
fn test_index_assignment_is_order_independent() {
    let a = Vocabulary::from_tokens(["c", "a", "b"]);
    let b = Vocabulary::from_tokens(["b", "c", "a", "a"]);
    assert_eq!(a, b);
}

#[test]
fn test_encode_decode() {
    let vocab = Vocabulary::from_tokens(["i", "saw", "her", "duck"]);

    let ids = vocab.encode(&["i", "saw", "a", "duck"]);
    assert_eq!(ids[2], UNK_ID);
    assert_eq!(vocab.decode(&ids), vec!["i", "saw", UNK_TOKEN, "duck"]);
}

#[test]
fn test_save_and_load_preserve_indices() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vocab.json");
    let vocab = Vocabulary::from_tokens(["zebra", "apple", "mango"]);

    vocab.save(&path).unwrap();
    let loaded = Vocabulary::load(&path).unwrap();

    assert_eq!(loaded, vocab);
    assert_eq!(loaded.get("mango"), vocab.get("mango"));
}

#[test]
fn test_load_rejects_missing_reserved_tokens() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vocab.json");
    std::fs::write(&path, r#"["apple", "mango"]"#).unwrap();

    assert!(Vocabulary::load(&path).is_err());
}

#[test]
fn test_from_token_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tokens.csv");
    std::fs::write(
        &path,
        "nouns,verbs\n\"['bank', 'duck']\",\"['saw']\"\n\"['river']\",\n",
    )
    .unwrap();

    let vocab = Vocabulary::from_tokens(read_token_inventory(&path).unwrap());

    assert_eq!(vocab.len(), RESERVED_TOKENS.len() + 4);
    assert_eq!(vocab.get("bank"), Some(4));
    assert_eq!(vocab.get("saw"), Some(7));
}

#[test]
fn test_malformed_token_table_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tokens.csv");
    std::fs::write(&path, "nouns\n\"['bank'\"\n").unwrap();

    assert!(read_token_inventory(&path).is_err());
}
