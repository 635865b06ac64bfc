//! Embedding service abstraction
//!
//! The pipeline only depends on the [`Embedder`] trait; concrete backends
//! are a local Candle model or an Ollama server.

pub mod engine;
pub mod ollama;

use async_trait::async_trait;

use crate::errors::Result;

pub use engine::{CandleEmbedder, Pooling, DEFAULT_EMBEDDING_MODEL};
pub use ollama::OllamaEmbedder;

/// Fixed-length vector representation of a text
pub type Embedding = Vec<f32>;

/// Maps text to a fixed-dimension vector.
///
/// Implementations must be deterministic for identical input within a
/// session and return vectors of the same dimension on every call.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embed several texts, preserving input order
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}

/// Which embedding backend to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Local BERT-family model through Candle
    Candle,
    /// Ollama `/api/embeddings`
    Ollama,
}

impl Default for EmbeddingBackend {
    fn default() -> Self {
        Self::Candle
    }
}

/// Cosine similarity of two vectors.
///
/// Returns 0.0 when either vector has zero norm or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x64 = f64::from(x);
        let y64 = f64::from(y);
        dot += x64 * y64;
        norm_a += x64 * x64;
        norm_b += y64 * y64;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return 0.0;
    }

    (dot / denom).clamp(-1.0, 1.0) as f32
}
