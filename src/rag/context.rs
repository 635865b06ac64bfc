// Context builder: join surviving passages and cut to a token budget
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::Result;
use crate::generation::Generator;
use crate::rag::reranking::RankedPassage;

/// Context assembly configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Maximum tokens for the assembled context
    pub max_tokens: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self { max_tokens: 512 }
    }
}

/// Assembled context for prompt construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledContext {
    /// Passage contents joined by newlines, possibly truncated
    pub text: String,
    /// Number of passages included
    pub passage_count: usize,
    /// Token count of `text` as measured before detokenizing
    pub token_count: usize,
    /// Whether the budget cut the text
    pub truncated: bool,
}

/// Context builder backed by the generation model's tokenizer
pub struct ContextBuilder {
    generator: Arc<dyn Generator>,
}

impl ContextBuilder {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Join passages in rank order and keep the first `max_tokens` tokens.
    ///
    /// Text within budget is returned unchanged. Over-budget text is
    /// detokenized from the truncated ids, which can end mid-word.
    pub fn build(&self, passages: &[RankedPassage], max_tokens: usize) -> Result<AssembledContext> {
        let joined = passages
            .iter()
            .map(|p| p.passage.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let ids = self.generator.tokenize(&joined)?;

        if ids.len() <= max_tokens {
            return Ok(AssembledContext {
                text: joined,
                passage_count: passages.len(),
                token_count: ids.len(),
                truncated: false,
            });
        }

        let text = self.generator.detokenize(&ids[..max_tokens])?;
        log::debug!("Context truncated from {} to {} tokens", ids.len(), max_tokens);

        Ok(AssembledContext {
            text,
            passage_count: passages.len(),
            token_count: max_tokens,
            truncated: true,
        })
    }
}
