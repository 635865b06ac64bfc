// End-to-end RAG pipeline: retrieve -> rerank -> context -> prompt -> generate -> extract
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::embedding::Embedder;
use crate::errors::Result;
use crate::generation::{GenerationParams, Generator};
use crate::index::VectorIndex;
use crate::rag::context::{ContextBuilder, ContextConfig};
use crate::rag::extract::extract_answer;
use crate::rag::prompt::build_prompt;
use crate::rag::reranking::{RankedPassage, ReRankConfig, ReRanker};
use crate::rag::retrieval::{RetrievalEngine, SearchParams};

/// Fixed answer when no passage clears the relevance threshold
pub const INSUFFICIENT_EVIDENCE_ANSWER: &str = "I do not know, I do not have enough data.";

/// Prefix of every answer produced from a caught failure
pub const WARNING_MARKER: &str = "⚠️";

/// RAG pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RAGConfig {
    /// Search parameters for retrieval
    pub retrieval: SearchParams,
    /// Re-ranking configuration
    pub rerank: ReRankConfig,
    /// Context assembly configuration
    pub context: ContextConfig,
    /// Sampling parameters for generation
    pub generation: GenerationParams,
}

/// Per-query knobs of the answer contract
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnswerParams {
    pub threshold: f32,
    pub top_k: usize,
    pub max_tokens: usize,
}

impl Default for AnswerParams {
    fn default() -> Self {
        Self {
            threshold: 0.60,
            top_k: 4,
            max_tokens: 512,
        }
    }
}

impl From<&RAGConfig> for AnswerParams {
    fn from(config: &RAGConfig) -> Self {
        Self {
            threshold: config.rerank.threshold,
            top_k: config.rerank.top_k,
            max_tokens: config.context.max_tokens,
        }
    }
}

/// What happened while answering one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryReport {
    /// Original query
    pub query: String,
    /// Number of passages returned by the vector index
    pub documents_retrieved: usize,
    /// Passages that survived reranking, best first
    pub passages: Vec<RankedPassage>,
    /// Tokens in the assembled context
    pub context_tokens: usize,
    /// Whether the context hit the token budget
    pub context_truncated: bool,
}

/// Result of one pass through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Generation ran and produced a cleaned answer
    Answered { answer: String, report: QueryReport },
    /// No passage cleared the threshold
    InsufficientEvidence { report: QueryReport },
    /// An upstream service failed
    Failed { reason: String },
}

impl PipelineOutcome {
    /// The user-facing answer string
    pub fn to_answer_string(&self) -> String {
        self.to_string()
    }

    /// Diagnostics, when the query got far enough to produce any
    pub fn report(&self) -> Option<&QueryReport> {
        match self {
            Self::Answered { report, .. } | Self::InsufficientEvidence { report } => Some(report),
            Self::Failed { .. } => None,
        }
    }
}

impl fmt::Display for PipelineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Answered { answer, .. } => write!(f, "{}", answer),
            Self::InsufficientEvidence { .. } => write!(f, "{}", INSUFFICIENT_EVIDENCE_ANSWER),
            Self::Failed { reason } => write!(f, "{} Error: {}", WARNING_MARKER, reason),
        }
    }
}

/// End-to-end RAG pipeline
pub struct RAGPipeline {
    retrieval_engine: RetrievalEngine,
    reranker: ReRanker,
    context_builder: ContextBuilder,
    generator: Arc<dyn Generator>,
    config: RAGConfig,
}

impl RAGPipeline {
    /// Wire the stages around a built index
    pub fn with_config(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        config: RAGConfig,
    ) -> Self {
        Self {
            retrieval_engine: RetrievalEngine::with_params(
                index,
                embedder.clone(),
                config.retrieval.clone(),
            ),
            reranker: ReRanker::with_config(embedder, config.rerank.clone()),
            context_builder: ContextBuilder::new(generator.clone()),
            generator,
            config,
        }
    }

    /// Answer with the configured threshold, top_k and token budget
    pub async fn answer(&self, query: &str) -> String {
        self.answer_with(query, &AnswerParams::from(&self.config)).await
    }

    /// Answer a query; never fails, failures become warning strings
    pub async fn answer_with(&self, query: &str, params: &AnswerParams) -> String {
        self.run(query, params).await.to_answer_string()
    }

    /// Execute the pipeline and return a structured outcome
    pub async fn run(&self, query: &str, params: &AnswerParams) -> PipelineOutcome {
        match self.execute(query, params).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("Query failed: {}", e);
                PipelineOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn execute(&self, query: &str, params: &AnswerParams) -> Result<PipelineOutcome> {
        // Step 1: Retrieve candidate passages
        let retrieved = self.retrieval_engine.retrieve(query).await?;
        let documents_retrieved = retrieved.len();
        log::info!("Retrieved {} passages", documents_retrieved);

        // Step 2: Re-rank and apply threshold
        let passages = self
            .reranker
            .rerank(query, retrieved, params.threshold, params.top_k)
            .await?;

        if passages.is_empty() {
            log::info!("No passages passed the similarity threshold {:.2}", params.threshold);
            return Ok(PipelineOutcome::InsufficientEvidence {
                report: QueryReport {
                    query: query.to_string(),
                    documents_retrieved,
                    passages,
                    context_tokens: 0,
                    context_truncated: false,
                },
            });
        }
        log::info!("{} passages passed reranking", passages.len());

        // Step 3: Assemble context and prompt
        let context = self.context_builder.build(&passages, params.max_tokens)?;
        let prompt = build_prompt(&context.text, query);
        log::debug!("Prompt uses {} context tokens", context.token_count);

        // Step 4: Generate
        let raw = self
            .generator
            .generate(&prompt, &self.config.generation)
            .await?;

        // Step 5: Clean output
        let answer = extract_answer(&raw);

        Ok(PipelineOutcome::Answered {
            answer,
            report: QueryReport {
                query: query.to_string(),
                documents_retrieved,
                passages,
                context_tokens: context.token_count,
                context_truncated: context.truncated,
            },
        })
    }

    /// Get current configuration
    pub fn config(&self) -> &RAGConfig {
        &self.config
    }

    /// Number of passages behind the retriever
    pub fn corpus_size(&self) -> usize {
        self.retrieval_engine.index().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Passage;

    fn report() -> QueryReport {
        QueryReport {
            query: "test query".to_string(),
            documents_retrieved: 5,
            passages: vec![RankedPassage {
                passage: Passage {
                    id: 0,
                    tag: "t".to_string(),
                    content: "content".to_string(),
                },
                retrieval_score: 0.9,
                score: 0.8,
            }],
            context_tokens: 3,
            context_truncated: false,
        }
    }

    #[test]
    fn test_rag_config_default() {
        let config = RAGConfig::default();
        assert_eq!(config.retrieval.k, 5);
        assert_eq!(config.rerank.threshold, 0.60);
        assert_eq!(config.rerank.top_k, 4);
        assert_eq!(config.context.max_tokens, 512);
    }

    #[test]
    fn test_answer_params_from_config() {
        let config = RAGConfig {
            rerank: ReRankConfig {
                threshold: 0.3,
                top_k: 2,
                query_prefix: None,
            },
            ..Default::default()
        };
        let params = AnswerParams::from(&config);
        assert_eq!(params.threshold, 0.3);
        assert_eq!(params.top_k, 2);
        assert_eq!(params.max_tokens, 512);
        assert_eq!(AnswerParams::from(&RAGConfig::default()), AnswerParams::default());
    }

    #[test]
    fn test_outcome_display() {
        let answered = PipelineOutcome::Answered {
            answer: "X is Y.".to_string(),
            report: report(),
        };
        assert_eq!(answered.to_answer_string(), "X is Y.");
        assert!(matches!(answered, PipelineOutcome::Answered { .. }));

        let empty = PipelineOutcome::InsufficientEvidence { report: report() };
        assert_eq!(empty.to_answer_string(), INSUFFICIENT_EVIDENCE_ANSWER);

        let failed = PipelineOutcome::Failed {
            reason: "Embedding failed: offline".to_string(),
        };
        assert_eq!(failed.to_answer_string(), "⚠️ Error: Embedding failed: offline");
        assert!(failed.report().is_none());
    }
}
