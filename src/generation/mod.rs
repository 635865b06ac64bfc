//! Text generation service abstraction
//!
//! The pipeline depends on the [`Generator`] trait for both tokenization
//! (context budgeting) and completion.

pub mod ollama;
pub mod tokenizer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub use ollama::{OllamaGenerator, DEFAULT_MODEL, DEFAULT_OLLAMA_URL};
pub use tokenizer::{HfTokenizer, DEFAULT_TOKENIZER_MODEL};

/// Sampling parameters for one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Maximum number of tokens to generate
    pub max_new_tokens: usize,
    /// Sampling temperature (ignored when `do_sample` is false)
    pub temperature: f32,
    /// Nucleus-sampling threshold
    pub top_p: f32,
    /// Penalty applied to repeated tokens
    pub repetition_penalty: f32,
    /// false = greedy decoding
    pub do_sample: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 256,
            temperature: 0.7,
            top_p: 0.9,
            repetition_penalty: 1.1,
            do_sample: false,
        }
    }
}

impl GenerationParams {
    /// Temperature actually sent to the backend
    pub fn effective_temperature(&self) -> f32 {
        if self.do_sample {
            self.temperature
        } else {
            0.0
        }
    }
}

/// Maps a prompt to a continuation and exposes the model's tokenizer
#[async_trait]
pub trait Generator: Send + Sync {
    /// Tokenize text into model token ids, including any special tokens the
    /// model prepends
    fn tokenize(&self, text: &str) -> Result<Vec<u32>>;

    /// Decode token ids back to text, skipping special tokens
    fn detokenize(&self, ids: &[u32]) -> Result<String>;

    /// Generate a continuation for `prompt`
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;
}
