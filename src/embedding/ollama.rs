//! Ollama-backed embeddings
//!
//! Calls `POST /api/embeddings` once per text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::embedding::{Embedder, Embedding};
use crate::errors::{RagError, Result};

/// Request timeout for a single embedding call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Embedding client for an Ollama server
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    /// Create an embedder for `model` served at `base_url`
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(RagError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let url = format!("{}/api/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| RagError::Embedding(format!("Failed to reach Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagError::Embedding(format!("HTTP {}: {}", status, body)));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("Failed to parse response: {}", e)))?;

        if parsed.embedding.is_empty() {
            return Err(RagError::Embedding(format!(
                "Model '{}' returned an empty embedding",
                self.model
            )));
        }

        Ok(parsed.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation_trims_slash() {
        let embedder = OllamaEmbedder::new("http://127.0.0.1:11434/", "nomic-embed-text").unwrap();
        assert_eq!(embedder.base_url, "http://127.0.0.1:11434");
        assert_eq!(embedder.model, "nomic-embed-text");
    }

    #[test]
    fn test_request_serialization() {
        let request = EmbeddingRequest {
            model: "nomic-embed-text",
            prompt: "hello",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "nomic-embed-text");
        assert_eq!(json["prompt"], "hello");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_embedding_error() {
        let embedder = OllamaEmbedder::new("http://127.0.0.1:1", "nomic-embed-text").unwrap();
        let result = embedder.embed("hello").await;
        assert!(matches!(result, Err(RagError::Embedding(_))));
    }

    #[tokio::test]
    #[ignore] // Requires Ollama running
    async fn test_embed_integration() {
        let embedder = OllamaEmbedder::new("http://127.0.0.1:11434", "nomic-embed-text").unwrap();
        let embedding = embedder.embed("Hello world").await.unwrap();
        assert!(!embedding.is_empty());
    }
}
