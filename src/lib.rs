//! csqa - Computer-science question answering over an intents corpus
//!
//! Retrieval-augmented generation: passages from a Q/A corpus are embedded
//! into an in-memory vector index, candidates for a question are re-scored
//! against a relevance threshold, and the survivors are handed to an
//! instruction-tuned model as context.
//!
//! # Architecture
//!
//! - **corpus**: intents JSON loading and text normalization
//! - **embedding**: `Embedder` trait with Candle and Ollama backends
//! - **index**: exact cosine nearest-neighbour search
//! - **generation**: `Generator` trait, tokenizer and Ollama client
//! - **rag**: retrieval, reranking, context, prompt, extraction, pipeline
//! - **cli** / **repl**: one-shot and interactive front ends

pub mod errors;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod index;
pub mod generation;
pub mod rag;
pub mod cli;
pub mod repl;

// Re-export commonly used types
pub use errors::{RagError, Result};
pub use rag::{PipelineOutcome, RAGPipeline};
