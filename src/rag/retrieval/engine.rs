// Retrieval engine: embed the query, look up nearest passages
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::embedding::Embedder;
use crate::errors::Result;
use crate::index::{ScoredPassage, VectorIndex};

/// Search parameters for retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Number of nearest passages to fetch
    pub k: usize,
    /// Instruction prepended to the query before embedding,
    /// e.g. "Represent this sentence for searching relevant passages: "
    pub query_instruction: Option<String>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            k: 5,
            query_instruction: None,
        }
    }
}

impl SearchParams {
    /// Query text as it is sent to the embedder
    pub fn instructed_query(&self, query: &str) -> String {
        match &self.query_instruction {
            Some(instruction) => format!("{}{}", instruction, query),
            None => query.to_string(),
        }
    }
}

/// Retrieval engine for semantic search
pub struct RetrievalEngine {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    default_params: SearchParams,
}

impl RetrievalEngine {
    /// Create with custom default parameters
    pub fn with_params(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn Embedder>,
        params: SearchParams,
    ) -> Self {
        Self {
            index,
            embedder,
            default_params: params,
        }
    }

    /// Retrieve passages matching query
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredPassage>> {
        self.retrieve_with_params(query, &self.default_params).await
    }

    /// Retrieve with custom parameters
    pub async fn retrieve_with_params(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<Vec<ScoredPassage>> {
        let query_embedding = self
            .embedder
            .embed(&params.instructed_query(query))
            .await?;

        let results = self
            .index
            .query(&query_embedding, params.k)?;

        log::debug!("Retrieved {} passages for query", results.len());
        Ok(results)
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}
