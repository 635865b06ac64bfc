//! Deterministic stand-ins for the embedding and generation services

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use csqa::corpus::Passage;
use csqa::embedding::{Embedder, Embedding};
use csqa::generation::{GenerationParams, Generator};
use csqa::{RagError, Result};

pub const HASH_DIMENSION: usize = 256;

/// Bag-of-words embedder: lowercase alphanumeric words hashed into buckets
pub struct HashEmbedder;

fn bucket(word: &str) -> usize {
    // FNV-1a
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in word.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    (hash % HASH_DIMENSION as u64) as usize
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut vector = vec![0.0f32; HASH_DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[bucket(&word.to_lowercase())] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(vector)
    }
}

/// Embedder whose service is always down
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding> {
        Err(RagError::Embedding("connection refused".to_string()))
    }
}

/// Whitespace tokenizer whose generation echoes the prompt, then a fixed reply
pub struct ScriptedGenerator {
    reply: String,
    vocab: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            vocab: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn tokenize(&self, text: &str) -> Result<Vec<u32>> {
        let mut vocab = self.vocab.lock().unwrap();
        Ok(text
            .split_whitespace()
            .map(|word| {
                let id = match vocab.iter().position(|w| w == word) {
                    Some(id) => id,
                    None => {
                        vocab.push(word.to_string());
                        vocab.len() - 1
                    }
                };
                id as u32
            })
            .collect())
    }

    fn detokenize(&self, ids: &[u32]) -> Result<String> {
        let vocab = self.vocab.lock().unwrap();
        let words = ids
            .iter()
            .map(|&id| {
                vocab
                    .get(id as usize)
                    .cloned()
                    .ok_or_else(|| RagError::Tokenizer(format!("unknown id {}", id)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(words.join(" "))
    }

    async fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(format!("{}{}", prompt, self.reply))
    }
}

/// Generator that tokenizes fine but whose model server is down
pub struct FailingGenerator {
    inner: Arc<ScriptedGenerator>,
}

impl FailingGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: ScriptedGenerator::new(""),
        })
    }
}

#[async_trait]
impl Generator for FailingGenerator {
    fn tokenize(&self, text: &str) -> Result<Vec<u32>> {
        self.inner.tokenize(text)
    }

    fn detokenize(&self, ids: &[u32]) -> Result<String> {
        self.inner.detokenize(ids)
    }

    async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String> {
        Err(RagError::Generation("model server unavailable".to_string()))
    }
}

pub fn passage(id: usize, tag: &str, content: &str) -> Passage {
    Passage {
        id,
        tag: tag.to_string(),
        content: content.to_string(),
    }
}

/// Small CS corpus with distinct vocabulary per passage
pub fn sample_passages() -> Vec<Passage> {
    vec![
        passage(0, "sql", "Q: What is SQL? A: SQL is a language for querying relational databases."),
        passage(1, "nosql", "Q: What is NoSQL? A: NoSQL stores trade schemas for horizontal scaling."),
        passage(2, "stack", "Q: What is a stack? A: A stack is a last in first out collection."),
        passage(3, "queue", "Q: Define queue. A: Queues serve elements in arrival order."),
        passage(4, "tcp", "Q: Explain TCP. A: TCP provides reliable ordered byte streams over networks."),
    ]
}

pub const SAMPLE_INTENTS: &str = r#"{
  "intents": [
    {
      "tag": "sql",
      "patterns": ["What is SQL?", "Explain <b>SQL</b>"],
      "responses": ["SQL is a language for querying relational databases."]
    },
    {
      "tag": "tcp",
      "patterns": ["What is TCP?"],
      "responses": ["TCP provides reliable &amp; ordered byte streams."]
    }
  ]
}"#;
