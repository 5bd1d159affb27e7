use std::path::PathBuf;

use anyhow::{Context, Result};
use candle_core::Device;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nano_waitk::dataset::{
    prepare_prefix_dataset, read_sentence_pairs, read_token_inventory, write_prefix_examples,
};
use nano_waitk::{init_model, DatasetConfig, DecodeConfig, ModelConfig, Translator, Vocabulary};

#[derive(Parser)]
#[command(name = "nano-waitk")]
#[command(about = "Wait-K prefix building and greedy decoding", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a vocabulary from a table of token-list cells
    Vocab {
        /// CSV whose cells hold serialized token lists
        #[arg(short, long)]
        table: PathBuf,

        /// Output vocab.json
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Expand sentence pairs into a Wait-K prefix-example table
    Prefixes {
        /// CSV with source and target sentence columns
        #[arg(short, long)]
        pairs: PathBuf,

        /// Output CSV (source_prefix, prev_target, target_word)
        #[arg(short, long)]
        out: PathBuf,

        /// Source tokens visible before the first target token
        #[arg(short = 'k', long, default_value = "3")]
        wait_k: usize,

        /// Source column name [default: ambiguous]
        #[arg(long)]
        source_column: Option<String>,

        /// Target column name [default: original]
        #[arg(long)]
        target_column: Option<String>,

        /// Shuffle rows instead of keeping builder order
        #[arg(long)]
        shuffle: bool,

        /// Shuffle seed [default: 42]; implies --shuffle
        #[arg(long)]
        shuffle_seed: Option<u64>,
    },

    /// Write a randomly initialised model directory
    Init {
        /// vocab.json to size the model for
        #[arg(short, long)]
        vocab: PathBuf,

        /// Model directory
        #[arg(short, long)]
        model: PathBuf,

        /// Embedding dimension
        #[arg(long, default_value = "256")]
        embedding_dim: usize,

        /// GRU hidden dimension
        #[arg(long, default_value = "512")]
        hidden_size: usize,
    },

    /// Decode a sentence with the Wait-K greedy decoder
    Decode {
        /// Model directory
        #[arg(short, long)]
        model: PathBuf,

        /// Input sentence
        #[arg(short, long)]
        input: String,

        /// Source tokens visible before the first output token
        #[arg(short = 'k', long, default_value = "3")]
        wait_k: usize,

        /// Maximum decode steps
        #[arg(short = 'n', long, default_value = "50")]
        max_len: usize,

        /// Let <unk> predictions through to the copy fallback
        #[arg(long)]
        allow_unknown: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Vocab { table, out } => {
            let inventory = read_token_inventory(&table)
                .with_context(|| format!("Failed to read {}", table.display()))?;
            let vocab = Vocabulary::from_tokens(inventory);
            vocab.save(&out)?;
            println!("Wrote {} tokens to {}", vocab.len(), out.display());
        }

        Commands::Prefixes {
            pairs,
            out,
            wait_k,
            source_column,
            target_column,
            shuffle,
            shuffle_seed,
        } => {
            let mut config = DatasetConfig::default().shuffle(shuffle || shuffle_seed.is_some());
            if let Some(column) = source_column {
                config.source_column = column;
            }
            if let Some(column) = target_column {
                config.target_column = column;
            }
            if let Some(seed) = shuffle_seed {
                config = config.shuffle_seed(seed);
            }

            let pairs = read_sentence_pairs(&pairs, &config)
                .with_context(|| format!("Failed to read {}", pairs.display()))?;
            let examples = prepare_prefix_dataset(&pairs, wait_k, &config)?;
            write_prefix_examples(&out, &examples)?;
            println!("Wrote {} prefix examples to {}", examples.len(), out.display());
        }

        Commands::Init {
            vocab,
            model,
            embedding_dim,
            hidden_size,
        } => {
            let vocab = Vocabulary::load(&vocab)
                .with_context(|| format!("Failed to load {}", vocab.display()))?;
            let config = ModelConfig::new(vocab.len())
                .embedding_dim(embedding_dim)
                .hidden_size(hidden_size);
            let files = init_model(&model, &vocab, &config)?;
            println!(
                "Wrote {} and {}",
                files.encoder.display(),
                files.decoder.display()
            );
        }

        Commands::Decode {
            model,
            input,
            wait_k,
            max_len,
            allow_unknown,
        } => {
            let translator = Translator::load(&model, &Device::Cpu)
                .with_context(|| format!("Failed to load model from {}", model.display()))?;
            let config = DecodeConfig::new(wait_k)
                .max_len(max_len)
                .suppress_unknown(!allow_unknown);

            let output = translator.translate(&input, &config)?;
            println!("{output}");
        }
    }

    Ok(())
}
