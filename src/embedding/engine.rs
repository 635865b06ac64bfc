// Local embeddings via a BERT-family model running on Candle
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::ApiBuilder, Repo, RepoType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};

use crate::embedding::{Embedder, Embedding};
use crate::errors::{RagError, Result};

pub const DEFAULT_EMBEDDING_MODEL: &str = "BAAI/bge-base-en-v1.5";

/// BERT position embeddings cap the sequence length
const MAX_SEQUENCE_LENGTH: usize = 512;

/// How token states are reduced to one vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pooling {
    /// First ([CLS]) token state, as BGE models expect
    Cls,
    /// Attention-masked mean over all token states
    Mean,
}

impl Default for Pooling {
    fn default() -> Self {
        Self::Cls
    }
}

/// Embedding engine using a Hugging Face BERT model via Candle
pub struct CandleEmbedder {
    model: Arc<BertModel>,
    tokenizer: Arc<Tokenizer>,
    device: Device,
    pooling: Pooling,
}

impl CandleEmbedder {
    /// Create a new embedder (downloads the model on first use)
    pub fn new(model_id: &str, pooling: Pooling, hf_token: Option<String>) -> Result<Self> {
        Self::load(model_id, pooling, hf_token)
            .map_err(|e| RagError::ModelLoad(format!("{:#}", e)))
    }

    fn load(model_id: &str, pooling: Pooling, hf_token: Option<String>) -> anyhow::Result<Self> {
        let device = Device::Cpu;

        let api = ApiBuilder::new()
            .with_token(hf_token)
            .build()
            .context("Failed to create HuggingFace API client")?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo.get("config.json")
            .context("Failed to download model config")?;
        let tokenizer_path = repo.get("tokenizer.json")
            .context("Failed to download tokenizer")?;
        let weights_path = repo.get("model.safetensors")
            .context("Failed to download model weights")?;

        let config_contents = std::fs::read_to_string(config_path)
            .context("Failed to read config file")?;
        let config: Config = serde_json::from_str(&config_contents)
            .context("Failed to parse model config")?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .context("Failed to load model weights")?
        };

        let model = BertModel::load(vb, &config)
            .context("Failed to create BERT model")?;

        log::info!("Loaded embedding model {} ({} dims)", model_id, config.hidden_size);

        Ok(Self {
            model: Arc::new(model),
            tokenizer: Arc::new(tokenizer),
            device,
            pooling,
        })
    }

    /// Run one padded batch through the model
    fn encode(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self.tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let max_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);
        let batch_size = texts.len();

        let mut flat_ids = vec![0u32; batch_size * max_len];
        let mut flat_mask = vec![0u32; batch_size * max_len];
        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let offset = i * max_len;
            flat_ids[offset..offset + ids.len()].copy_from_slice(ids);
            flat_mask[offset..offset + mask.len()].copy_from_slice(mask);
        }

        let token_ids = Tensor::from_vec(flat_ids, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(flat_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = token_ids.zeros_like()?;

        let hidden = self.model.forward(&token_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = match self.pooling {
            Pooling::Cls => hidden.i((.., 0))?,
            Pooling::Mean => Self::mean_pool(&hidden, &attention_mask)?,
        };

        Ok(Self::l2_normalize(&pooled)?.to_vec2::<f32>()?)
    }

    /// Mean pooling with attention mask
    fn mean_pool(embeddings: &Tensor, attention_mask: &Tensor) -> anyhow::Result<Tensor> {
        let mask_expanded = attention_mask
            .unsqueeze(2)?
            .expand(embeddings.shape())?
            .to_dtype(embeddings.dtype())?;

        let sum_embeddings = (embeddings * &mask_expanded)?.sum(1)?;
        let sum_mask = mask_expanded.sum(1)?.clamp(1e-9, f64::MAX)?;

        Ok(sum_embeddings.broadcast_div(&sum_mask)?)
    }

    fn l2_normalize(pooled: &Tensor) -> anyhow::Result<Tensor> {
        let norm = pooled.sqr()?.sum_keepdim(1)?.sqrt()?.clamp(1e-12, f64::MAX)?;
        Ok(pooled.broadcast_div(&norm)?)
    }
}

#[async_trait]
impl Embedder for CandleEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.encode(&[text])
            .map_err(|e| RagError::Embedding(format!("{:#}", e)))?
            .pop()
            .ok_or_else(|| RagError::Embedding("Model returned no embedding".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        self.encode(texts)
            .map_err(|e| RagError::Embedding(format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pooling_is_cls() {
        assert_eq!(Pooling::default(), Pooling::Cls);
    }

    #[test]
    fn test_mean_pool_respects_mask() {
        let device = Device::Cpu;
        // batch 1, seq 2, hidden 2; second token is padding
        let states = Tensor::from_vec(vec![1.0f32, 3.0, 100.0, 100.0], (1, 2, 2), &device).unwrap();
        let mask = Tensor::from_vec(vec![1u32, 0], (1, 2), &device).unwrap();

        let pooled = CandleEmbedder::mean_pool(&states, &mask).unwrap();
        assert_eq!(pooled.to_vec2::<f32>().unwrap(), vec![vec![1.0, 3.0]]);
    }

    #[test]
    fn test_l2_normalize() {
        let device = Device::Cpu;
        let pooled = Tensor::from_vec(vec![3.0f32, 4.0], (1, 2), &device).unwrap();
        let normalized = CandleEmbedder::l2_normalize(&pooled).unwrap().to_vec2::<f32>().unwrap();
        assert!((normalized[0][0] - 0.6).abs() < 1e-6);
        assert!((normalized[0][1] - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    #[ignore] // Integration test - requires model download
    async fn test_embed_single_text() {
        let engine = CandleEmbedder::new(DEFAULT_EMBEDDING_MODEL, Pooling::Cls, None)
            .expect("Failed to create engine");
        let embedding = engine.embed("Hello world").await.expect("Failed to embed");
        assert_eq!(embedding.len(), 768);
    }

    #[tokio::test]
    #[ignore] // Integration test - requires model download
    async fn test_embed_batch() {
        let engine = CandleEmbedder::new(DEFAULT_EMBEDDING_MODEL, Pooling::Cls, None)
            .expect("Failed to create engine");
        let embeddings = engine.embed_batch(&["Hello", "World", "Test"]).await.unwrap();
        assert_eq!(embeddings.len(), 3);
        assert!(embeddings.iter().all(|e| e.len() == 768));
    }
}
