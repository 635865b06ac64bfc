use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::embedding::{EmbeddingBackend, Pooling, DEFAULT_EMBEDDING_MODEL};
use crate::generation::{GenerationParams, DEFAULT_MODEL, DEFAULT_OLLAMA_URL, DEFAULT_TOKENIZER_MODEL};
use crate::rag::{ContextConfig, RAGConfig, ReRankConfig, SearchParams};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub retrieval: SearchParams,
    #[serde(default)]
    pub rerank: ReRankConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub generation: GenerationParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Ollama server used for generation (and embeddings with the ollama backend)
    pub ollama_url: String,
    /// Ollama model tag used for generation
    pub generation_model: String,
    /// Hugging Face repo, or local tokenizer.json, matching the generation model
    pub tokenizer_model: String,
    pub embedding_backend: EmbeddingBackend,
    /// Hugging Face repo (candle) or Ollama tag (ollama) of the embedding model
    pub embedding_model: String,
    pub pooling: Pooling,
    /// Environment variable holding a Hugging Face token
    pub hf_token_env: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            generation_model: DEFAULT_MODEL.to_string(),
            tokenizer_model: DEFAULT_TOKENIZER_MODEL.to_string(),
            embedding_backend: EmbeddingBackend::Candle,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            pooling: Pooling::Cls,
            hf_token_env: "HF_TOKEN".to_string(),
        }
    }
}

impl ModelsConfig {
    /// Hugging Face token from the configured environment variable
    pub fn hf_token(&self) -> Option<String> {
        std::env::var(&self.hf_token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Intents JSON file
    pub path: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("intents.json"),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Config::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        fs::write(path, self.to_toml()?)
            .context("Failed to write config file")?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Directory holding config and REPL history
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Could not determine home directory")?;

        Ok(home.join(".csqa"))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Reject settings that would make every query fail
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.k == 0 {
            bail!("retrieval.k must be at least 1");
        }
        if !(-1.0..=1.0).contains(&self.rerank.threshold) {
            bail!(
                "rerank.threshold {} is outside [-1, 1]",
                self.rerank.threshold
            );
        }
        Ok(())
    }

    /// Pipeline settings
    pub fn rag_config(&self) -> RAGConfig {
        RAGConfig {
            retrieval: self.retrieval.clone(),
            rerank: self.rerank.clone(),
            context: self.context.clone(),
            generation: self.generation.clone(),
        }
    }
}
