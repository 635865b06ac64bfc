//! Error types for csqa
//!
//! Startup failures (empty corpus, model loading, configuration) propagate
//! to the caller. Per-query failures are contained by the pipeline and
//! rendered as a warning string.

use thiserror::Error;

/// Main error type for the question-answering pipeline
#[derive(Error, Debug)]
pub enum RagError {
    /// Index construction with zero passages
    #[error("Cannot build a vector index from an empty corpus")]
    EmptyIndex,

    /// Caller supplied an out-of-range parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Embedding vectors of different lengths were mixed
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Embedding service failures
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Generation service failures
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Tokenizer failures
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Model download or load failures
    #[error("Model load failed: {0}")]
    ModelLoad(String),

    /// Corpus file could not be read or parsed
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RagError>;

impl From<anyhow::Error> for RagError {
    fn from(err: anyhow::Error) -> Self {
        RagError::Generic(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RagError::DimensionMismatch {
            expected: 768,
            actual: 384,
        };
        assert!(err.to_string().contains("768"));
        assert!(err.to_string().contains("384"));
    }

    #[test]
    fn test_empty_index_message() {
        assert!(RagError::EmptyIndex.to_string().contains("empty corpus"));
    }

    #[test]
    fn test_from_anyhow_keeps_context_chain() {
        let err = anyhow::anyhow!("connection refused").context("Failed to reach Ollama");
        let converted = RagError::from(err);
        let text = converted.to_string();
        assert!(text.contains("Failed to reach Ollama"));
        assert!(text.contains("connection refused"));
    }
}
