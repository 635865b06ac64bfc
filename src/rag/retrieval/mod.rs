// Retrieval Engine Module
pub mod engine;

pub use engine::{RetrievalEngine, SearchParams};
