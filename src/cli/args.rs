//! Command-line argument parsing for csqa
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::embedding::EmbeddingBackend;

/// csqa - Answer computer-science questions from a reference corpus
#[derive(Parser, Debug)]
#[command(name = "csqa")]
#[command(version)]
#[command(about = "Retrieval-augmented question answering over a CS intents corpus", long_about = None)]
pub struct Args {
    /// Questions to answer, in order (starts the REPL when empty)
    #[arg(value_name = "QUESTION")]
    pub questions: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Intents JSON corpus
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Ollama base URL
    #[arg(long)]
    pub ollama_url: Option<String>,

    /// Ollama generation model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Embedding backend
    #[arg(long, value_enum)]
    pub embedding_backend: Option<EmbeddingBackend>,

    /// Embedding model (HF repo for candle, Ollama tag for ollama)
    #[arg(long)]
    pub embedding_model: Option<String>,

    /// Passages fetched from the index before reranking
    #[arg(short = 'k', long)]
    pub candidates: Option<usize>,

    /// Minimum rerank similarity
    #[arg(long, allow_negative_numbers = true)]
    pub threshold: Option<f32>,

    /// Maximum passages kept after reranking
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Context token budget
    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Print surviving passages and their scores
    #[arg(long)]
    pub show_context: bool,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress everything except answers)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start interactive question prompt
    Repl,
    /// Display the effective configuration
    Config,
    /// Load the corpus and print statistics
    Corpus,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Check argument combinations and ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.command.is_some() && !self.questions.is_empty() {
            return Err("Cannot specify questions with a subcommand.".to_string());
        }

        if let Some(threshold) = self.threshold {
            if !(-1.0..=1.0).contains(&threshold) {
                return Err(format!("Threshold {} is outside [-1, 1].", threshold));
            }
        }

        if self.candidates == Some(0) {
            return Err("-k must be at least 1.".to_string());
        }

        Ok(())
    }

    /// Whether the interactive prompt should run
    pub fn interactive(&self) -> bool {
        match &self.command {
            Some(Commands::Repl) => true,
            Some(_) => false,
            None => self.questions.is_empty(),
        }
    }

    /// Apply command-line overrides on top of file configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(corpus) = &self.corpus {
            config.corpus.path = corpus.clone();
        }
        if let Some(url) = &self.ollama_url {
            config.models.ollama_url = url.clone();
        }
        if let Some(model) = &self.model {
            config.models.generation_model = model.clone();
        }
        if let Some(backend) = self.embedding_backend {
            config.models.embedding_backend = backend;
        }
        if let Some(model) = &self.embedding_model {
            config.models.embedding_model = model.clone();
        }
        if let Some(k) = self.candidates {
            config.retrieval.k = k;
        }
        if let Some(threshold) = self.threshold {
            config.rerank.threshold = threshold;
        }
        if let Some(top_k) = self.top_k {
            config.rerank.top_k = top_k;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.context.max_tokens = max_tokens;
        }
    }
}

impl Verbosity {
    /// Log filter used when RUST_LOG is not set
    pub fn log_level(&self) -> log::LevelFilter {
        match self {
            Verbosity::Quiet => log::LevelFilter::Error,
            Verbosity::Normal => log::LevelFilter::Warn,
            Verbosity::Verbose => log::LevelFilter::Info,
            Verbosity::VeryVerbose => log::LevelFilter::Debug,
        }
    }

    /// Check if should show progress bars
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
