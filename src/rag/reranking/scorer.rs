// Re-ranking scorer: exact query/passage similarity with threshold filtering
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::corpus::Passage;
use crate::embedding::{cosine_similarity, Embedder};
use crate::errors::{RagError, Result};
use crate::index::ScoredPassage;

/// Re-ranking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReRankConfig {
    /// Minimum cosine similarity a passage needs to survive
    pub threshold: f32,
    /// Maximum number of passages kept
    pub top_k: usize,
    /// Instruction prepended to the query before re-embedding
    pub query_prefix: Option<String>,
}

impl Default for ReRankConfig {
    fn default() -> Self {
        Self {
            threshold: 0.60,
            top_k: 4,
            query_prefix: None,
        }
    }
}

/// Passage with its re-ranked score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPassage {
    pub passage: Passage,
    /// Score reported by the vector index
    pub retrieval_score: f32,
    /// Cosine similarity from fresh embeddings
    pub score: f32,
}

/// Re-ranker for retrieval results
pub struct ReRanker {
    embedder: Arc<dyn Embedder>,
    config: ReRankConfig,
}

impl ReRanker {
    /// Create with custom configuration
    pub fn with_config(embedder: Arc<dyn Embedder>, config: ReRankConfig) -> Self {
        Self { embedder, config }
    }

    /// Re-embed query and candidates, sort by similarity, drop everything
    /// below `threshold`, keep at most `top_k`.
    ///
    /// An empty result means nothing relevant was found; it is not an error.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: Vec<ScoredPassage>,
        threshold: f32,
        top_k: usize,
    ) -> Result<Vec<RankedPassage>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let query_text = match &self.config.query_prefix {
            Some(prefix) => format!("{}{}", prefix, query),
            None => query.to_string(),
        };
        let query_embedding = self.embedder.embed(&query_text).await?;

        let texts: Vec<&str> = candidates.iter().map(|c| c.passage.content.as_str()).collect();
        let passage_embeddings = self.embedder.embed_batch(&texts).await?;
        if passage_embeddings.len() != candidates.len() {
            return Err(RagError::Embedding(format!(
                "Expected {} embeddings, got {}",
                candidates.len(),
                passage_embeddings.len()
            )));
        }

        let mut ranked: Vec<RankedPassage> = candidates
            .into_iter()
            .zip(passage_embeddings.iter())
            .map(|(candidate, embedding)| RankedPassage {
                score: cosine_similarity(&query_embedding, embedding),
                retrieval_score: candidate.score,
                passage: candidate.passage,
            })
            .collect();

        // Stable sort: equal scores keep retrieval order
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for candidate in &ranked {
            log::debug!(
                "Rerank score {:.4} for passage {} ({})",
                candidate.score,
                candidate.passage.id,
                candidate.passage.tag
            );
        }

        ranked.retain(|candidate| candidate.score >= threshold);
        ranked.truncate(top_k);

        Ok(ranked)
    }
}
