// Hugging Face tokenizer for context budgeting
use anyhow::{anyhow, Context};
use hf_hub::{api::sync::ApiBuilder, Repo, RepoType};
use std::path::Path;
use tokenizers::Tokenizer;

use crate::errors::{RagError, Result};

pub const DEFAULT_TOKENIZER_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.1";

/// Tokenizer matching the generation model
pub struct HfTokenizer {
    tokenizer: Tokenizer,
}

impl HfTokenizer {
    /// Load from a local `tokenizer.json` when `source` names an existing
    /// file, otherwise treat it as a Hub repository id.
    pub fn load(source: &str, hf_token: Option<String>) -> Result<Self> {
        let path = Path::new(source);
        if path.is_file() {
            log::info!("Loading tokenizer from {}", path.display());
            Self::from_file(path)
        } else {
            Self::from_hub(source, hf_token)
        }
    }

    /// Download `tokenizer.json` for `model_id` from the Hugging Face Hub.
    ///
    /// Gated repositories need `hf_token`.
    pub fn from_hub(model_id: &str, hf_token: Option<String>) -> Result<Self> {
        let load = || -> anyhow::Result<Tokenizer> {
            let api = ApiBuilder::new()
                .with_token(hf_token)
                .build()
                .context("Failed to create HuggingFace API client")?;
            let path = api
                .repo(Repo::new(model_id.to_string(), RepoType::Model))
                .get("tokenizer.json")
                .context("Failed to download tokenizer")?;
            Tokenizer::from_file(path).map_err(|e| anyhow!("Failed to load tokenizer: {}", e))
        };

        let tokenizer = load().map_err(|e| RagError::ModelLoad(format!("{:#}", e)))?;
        log::info!("Loaded tokenizer for {}", model_id);
        Ok(Self { tokenizer })
    }

    /// Load a local `tokenizer.json`
    pub fn from_file(path: &Path) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| RagError::ModelLoad(format!("Failed to load {}: {}", path.display(), e)))?;
        Ok(Self { tokenizer })
    }

    /// Token ids including the model's special tokens (`<s>` for Mistral),
    /// so a context budget counts them too.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| RagError::Tokenizer(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.tokenizer
            .decode(ids, true)
            .map_err(|e| RagError::Tokenizer(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_missing_file() {
        let result = HfTokenizer::from_file(Path::new("/nonexistent/tokenizer.json"));
        assert!(matches!(result, Err(RagError::ModelLoad(_))));
    }

    /// Word-level vocabulary with a `<s>` prefix added by the post-processor
    const BOS_TOKENIZER_JSON: &str = r#"{
      "version": "1.0",
      "truncation": null,
      "padding": null,
      "added_tokens": [
        {"id": 0, "content": "<s>", "single_word": false, "lstrip": false,
         "rstrip": false, "normalized": false, "special": true}
      ],
      "normalizer": null,
      "pre_tokenizer": {"type": "WhitespaceSplit"},
      "post_processor": {
        "type": "TemplateProcessing",
        "single": [
          {"SpecialToken": {"id": "<s>", "type_id": 0}},
          {"Sequence": {"id": "A", "type_id": 0}}
        ],
        "pair": [
          {"SpecialToken": {"id": "<s>", "type_id": 0}},
          {"Sequence": {"id": "A", "type_id": 0}},
          {"Sequence": {"id": "B", "type_id": 1}}
        ],
        "special_tokens": {
          "<s>": {"id": "<s>", "ids": [0], "tokens": ["<s>"]}
        }
      },
      "decoder": null,
      "model": {
        "type": "WordLevel",
        "vocab": {"<s>": 0, "what": 1, "is": 2, "sql": 3, "[UNK]": 4},
        "unk_token": "[UNK]"
      }
    }"#;

    fn write_tokenizer(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("tokenizer.json");
        std::fs::write(&path, BOS_TOKENIZER_JSON).unwrap();
        path
    }

    #[test]
    fn test_encode_includes_bos() {
        let dir = tempfile::TempDir::new().unwrap();
        let tokenizer = HfTokenizer::from_file(&write_tokenizer(&dir)).unwrap();

        assert_eq!(tokenizer.encode("what is sql").unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(tokenizer.decode(&[0, 1, 2]).unwrap(), "what is");
    }

    #[test]
    fn test_load_prefers_local_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_tokenizer(&dir);

        let tokenizer = HfTokenizer::load(path.to_str().unwrap(), None).unwrap();
        assert_eq!(tokenizer.encode("sql").unwrap(), vec![0, 3]);
    }

    #[test]
    fn test_bos_counts_against_context_budget() {
        use crate::corpus::Passage;
        use crate::generation::OllamaGenerator;
        use crate::rag::{ContextBuilder, RankedPassage};
        use std::sync::Arc;

        let dir = tempfile::TempDir::new().unwrap();
        let tokenizer = HfTokenizer::from_file(&write_tokenizer(&dir)).unwrap();
        let generator =
            OllamaGenerator::with_config("http://127.0.0.1:1", "test", Arc::new(tokenizer)).unwrap();
        let builder = ContextBuilder::new(Arc::new(generator));
        let passage = RankedPassage {
            passage: Passage {
                id: 0,
                tag: "sql".to_string(),
                content: "what is sql".to_string(),
            },
            retrieval_score: 1.0,
            score: 1.0,
        };

        // three content tokens plus <s> fit in four
        let fits = builder.build(&[passage.clone()], 4).unwrap();
        assert_eq!(fits.text, "what is sql");
        assert!(!fits.truncated);

        // a budget of three keeps <s> and two words
        let cut = builder.build(&[passage], 3).unwrap();
        assert_eq!(cut.text, "what is");
        assert_eq!(cut.token_count, 3);
        assert!(cut.truncated);
    }

    #[test]
    #[ignore] // Requires network access and a Hugging Face token
    fn test_from_hub() {
        let token = std::env::var("HF_TOKEN").ok();
        let tokenizer = HfTokenizer::from_hub(DEFAULT_TOKENIZER_MODEL, token).unwrap();
        let ids = tokenizer.encode("What is big data?").unwrap();
        assert!(!ids.is_empty());
    }
}
