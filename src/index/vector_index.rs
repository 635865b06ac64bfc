// In-memory vector index with exact cosine search
use serde::{Deserialize, Serialize};

use crate::corpus::Passage;
use crate::embedding::{cosine_similarity, Embedder, Embedding};
use crate::errors::{RagError, Result};

/// Number of passages embedded per batch during index construction
pub const BUILD_BATCH_SIZE: usize = 32;

/// A passage paired with its embedding
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub passage: Passage,
    pub embedding: Embedding,
}

/// A passage paired with its similarity to a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub score: f32,
}

/// Read-only nearest-neighbour index over corpus passages
#[derive(Debug, Clone)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimension: usize,
}

impl VectorIndex {
    /// Embed every passage and build the index
    pub async fn build(passages: Vec<Passage>, embedder: &dyn Embedder) -> Result<Self> {
        Self::build_with_progress(passages, embedder, BUILD_BATCH_SIZE, |_, _| {}).await
    }

    /// Build the index, reporting `(embedded, total)` after each batch
    pub async fn build_with_progress<F>(
        passages: Vec<Passage>,
        embedder: &dyn Embedder,
        batch_size: usize,
        mut progress: F,
    ) -> Result<Self>
    where
        F: FnMut(usize, usize) + Send,
    {
        if passages.is_empty() {
            return Err(RagError::EmptyIndex);
        }
        if batch_size == 0 {
            return Err(RagError::InvalidParameter(
                "batch size must be positive".to_string(),
            ));
        }

        let total = passages.len();
        let mut embeddings: Vec<Embedding> = Vec::with_capacity(total);

        for chunk in passages.chunks(batch_size) {
            let texts: Vec<&str> = chunk.iter().map(|p| p.content.as_str()).collect();
            let batch = embedder.embed_batch(&texts).await?;
            if batch.len() != texts.len() {
                return Err(RagError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    texts.len(),
                    batch.len()
                )));
            }
            embeddings.extend(batch);
            progress(embeddings.len(), total);
        }

        let entries = passages
            .into_iter()
            .zip(embeddings)
            .map(|(passage, embedding)| IndexEntry { passage, embedding })
            .collect();

        let index = Self::from_entries(entries)?;
        log::info!(
            "Built vector index: {} passages, {} dimensions",
            index.len(),
            index.dimension()
        );
        Ok(index)
    }

    /// Build from precomputed entries
    pub fn from_entries(entries: Vec<IndexEntry>) -> Result<Self> {
        let dimension = match entries.first() {
            Some(entry) => entry.embedding.len(),
            None => return Err(RagError::EmptyIndex),
        };

        for entry in &entries {
            if entry.embedding.len() != dimension {
                return Err(RagError::DimensionMismatch {
                    expected: dimension,
                    actual: entry.embedding.len(),
                });
            }
        }

        Ok(Self { entries, dimension })
    }

    /// Return the `k` passages nearest to `query_embedding`, nearest first.
    ///
    /// Equal scores keep corpus order. Asking for more than the corpus
    /// holds returns every entry.
    pub fn query(&self, query_embedding: &[f32], k: usize) -> Result<Vec<ScoredPassage>> {
        if k == 0 {
            return Err(RagError::InvalidParameter("k must be positive".to_string()));
        }
        if query_embedding.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: query_embedding.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query_embedding, &entry.embedding)))
            .collect();

        // sort_by is stable, so ties stay in insertion order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| ScoredPassage {
                passage: self.entries[i].passage.clone(),
                score,
            })
            .collect())
    }

    /// Number of indexed passages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension shared by every entry
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}
