// RAG (Retrieval-Augmented Generation) Pipeline
//
// Components:
// - Retrieval Engine: nearest passages from the vector index
// - Re-ranking: fresh-embedding similarity, threshold, top-k
// - Context Builder: newline join truncated to a token budget
// - Prompt: Mistral instruction template
// - Extract: strip template echo and a cut-off trailing sentence
// - Pipeline: end-to-end orchestration with soft failure

pub mod retrieval;
pub mod reranking;
pub mod context;
pub mod prompt;
pub mod extract;
pub mod pipeline;

// Re-export key types
pub use retrieval::{RetrievalEngine, SearchParams};
pub use reranking::{RankedPassage, ReRankConfig, ReRanker};
pub use context::{AssembledContext, ContextBuilder, ContextConfig};
pub use prompt::build_prompt;
pub use extract::extract_answer;
pub use pipeline::{
    AnswerParams, PipelineOutcome, QueryReport, RAGConfig, RAGPipeline,
    INSUFFICIENT_EVIDENCE_ANSWER, WARNING_MARKER,
};
