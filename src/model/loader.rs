//! Model loading utilities.
//!
//! A model directory holds:
//! - `config.json`: the [`ModelConfig`]
//! - `vocab.json`: the vocabulary, tokens in index order
//! - `encoder.safetensors` / `decoder.safetensors`: the two parameter blobs
//!
//! Loading is all-or-nothing: any missing file or mismatch aborts it.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};

use super::seq2seq::WaitKModel;
use crate::config::ModelConfig;
use crate::core::vocab::Vocabulary;
use crate::error::{Error, Result};

/// Paths to the files of one model directory.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    /// Path to config.json.
    pub config: PathBuf,
    /// Path to vocab.json.
    pub vocab: PathBuf,
    /// Encoder parameters (SafeTensors).
    pub encoder: PathBuf,
    /// Decoder parameters (SafeTensors).
    pub decoder: PathBuf,
}

impl ModelFiles {
    /// Standard file layout inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            config: dir.join("config.json"),
            vocab: dir.join("vocab.json"),
            encoder: dir.join("encoder.safetensors"),
            decoder: dir.join("decoder.safetensors"),
        }
    }

    fn ensure_exist(&self) -> Result<()> {
        for path in [&self.config, &self.vocab, &self.encoder, &self.decoder] {
            if !path.exists() {
                return Err(Error::ModelLoad(format!("missing {}", path.display())));
            }
        }
        Ok(())
    }
}

/// Loads a [`ModelConfig`] from config.json.
pub fn load_config(path: impl AsRef<Path>) -> Result<ModelConfig> {
    let content = std::fs::read_to_string(path.as_ref())
        .map_err(|e| Error::ModelLoad(format!("Failed to read config.json: {e}")))?;

    let config: ModelConfig = serde_json::from_str(&content)
        .map_err(|e| Error::ModelLoad(format!("Failed to parse config.json: {e}")))?;

    Ok(config)
}

/// Checks that parameters sized for `config` fit `vocab`.
pub fn validate_vocab(config: &ModelConfig, vocab: &Vocabulary) -> Result<()> {
    if config.vocab_size != vocab.len() {
        return Err(Error::VocabMismatch {
            expected: config.vocab_size,
            found: vocab.len(),
        });
    }
    Ok(())
}

/// Creates a VarBuilder from a SafeTensors file.
///
/// # Safety
///
/// Uses memory-mapped file access. This is safe as long as the file is not
/// modified while being read.
#[allow(unsafe_code)]
fn load_safetensors(path: &Path, dtype: DType, device: &Device) -> Result<VarBuilder<'static>> {
    let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[path], dtype, device)? };
    Ok(vb)
}

/// Writes a freshly initialised model for `vocab` into `dir`.
pub fn init_model(
    dir: impl AsRef<Path>,
    vocab: &Vocabulary,
    config: &ModelConfig,
) -> Result<ModelFiles> {
    validate_vocab(config, vocab)?;

    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let files = ModelFiles::in_dir(dir);
    let device = Device::Cpu;

    let encoder_vars = VarMap::new();
    let decoder_vars = VarMap::new();
    // Building the model populates both var maps.
    WaitKModel::new(
        config,
        VarBuilder::from_varmap(&encoder_vars, DType::F32, &device),
        VarBuilder::from_varmap(&decoder_vars, DType::F32, &device),
    )?;

    encoder_vars.save(&files.encoder)?;
    decoder_vars.save(&files.decoder)?;
    std::fs::write(&files.config, serde_json::to_string_pretty(config)?)?;
    vocab.save(&files.vocab)?;

    tracing::info!(
        "Initialised model in {} (vocab {}, embedding {}, hidden {})",
        dir.display(),
        config.vocab_size,
        config.embedding_dim,
        config.hidden_size
    );
    Ok(files)
}

/// Loads the vocabulary and model stored in `dir`.
///
/// The configured vocabulary size is checked against `vocab.json` before any
/// parameter is read.
pub fn load_model(dir: impl AsRef<Path>, device: &Device) -> Result<(WaitKModel, Vocabulary)> {
    let files = ModelFiles::in_dir(dir.as_ref());
    files.ensure_exist()?;

    let config = load_config(&files.config)?;
    let vocab = Vocabulary::load(&files.vocab)?;
    validate_vocab(&config, &vocab)?;

    tracing::info!("Loading model weights from {}", dir.as_ref().display());
    let encoder_vb = load_safetensors(&files.encoder, DType::F32, device)?;
    let decoder_vb = load_safetensors(&files.decoder, DType::F32, device)?;

    let model = WaitKModel::new(&config, encoder_vb, decoder_vb).map_err(|e| match e {
        Error::Tensor(err) => Error::ModelLoad(format!("parameters do not fit config: {err}")),
        other => other,
    })?;

    Ok((model, vocab))
}
