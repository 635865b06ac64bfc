// Intents corpus loading
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::corpus::cleaner::format_passage;
use crate::errors::{RagError, Result};

/// One indexed unit of retrievable reference text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Position in corpus order
    pub id: usize,
    /// Intent tag the passage came from
    pub tag: String,
    /// Cleaned "Q: ... A: ..." text
    pub content: String,
}

/// A tagged group of patterns and responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub tag: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub responses: Vec<String>,
}

/// Top-level intents document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentsFile {
    pub intents: Vec<Intent>,
}

impl IntentsFile {
    /// Parse an intents document from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| RagError::Corpus(format!("Failed to parse intents JSON: {}", e)))
    }

    /// Flatten into passages: every pattern paired with every response
    pub fn into_passages(self) -> Vec<Passage> {
        let mut passages = Vec::new();

        for intent in self.intents {
            for pattern in &intent.patterns {
                for response in &intent.responses {
                    passages.push(Passage {
                        id: passages.len(),
                        tag: intent.tag.clone(),
                        content: format_passage(pattern, response),
                    });
                }
            }
        }

        passages
    }
}

/// Load and flatten an intents JSON file
pub fn load_intents(path: &Path) -> Result<Vec<Passage>> {
    let contents = fs::read_to_string(path).map_err(|e| {
        RagError::Corpus(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let passages = IntentsFile::from_json(&contents)?.into_passages();
    log::info!(
        "Loaded {} passages from {}",
        passages.len(),
        path.display()
    );

    Ok(passages)
}

/// Count distinct intent tags among passages
pub fn count_tags(passages: &[Passage]) -> usize {
    let mut tags: Vec<&str> = passages.iter().map(|p| p.tag.as_str()).collect();
    tags.sort_unstable();
    tags.dedup();
    tags.len()
}
