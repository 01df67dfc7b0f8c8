//! Retrieval and context assembly configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Result size cap per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Similarity below which a chunk is considered irrelevant noise.
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,
    /// Apply the keyword-overlap re-ranking pass.
    #[serde(default = "default_rerank")]
    pub rerank: bool,
    /// Cap on chunks from a single document, for source diversity.
    #[serde(default = "default_max_per_document")]
    pub max_per_document: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_similarity: default_min_similarity(),
            rerank: default_rerank(),
            max_per_document: default_max_per_document(),
        }
    }
}

impl crate::validation::Validate for RetrievalConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;

        if self.top_k == 0 {
            return Err(ConfigError::InvalidInteger {
                field: "retrieval.top_k".to_string(),
                value: self.top_k,
                min: 0,
            });
        }
        if self.max_per_document == 0 {
            return Err(ConfigError::InvalidInteger {
                field: "retrieval.max_per_document".to_string(),
                value: self.max_per_document,
                min: 0,
            });
        }
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(ConfigError::OutOfRange {
                field: "retrieval.min_similarity".to_string(),
                value: self.min_similarity,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Token budget for the assembled prompt context.
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: usize,
    /// Word-set similarity above which two chunks are near-duplicates
    /// and only the higher-ranked one is kept.
    #[serde(default = "default_dedup_similarity")]
    pub dedup_similarity: f32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: default_max_context_tokens(),
            dedup_similarity: default_dedup_similarity(),
        }
    }
}

impl crate::validation::Validate for ContextConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;

        if self.max_context_tokens == 0 {
            return Err(ConfigError::InvalidInteger {
                field: "context.max_context_tokens".to_string(),
                value: self.max_context_tokens,
                min: 0,
            });
        }
        if !(0.0..=1.0).contains(&self.dedup_similarity) {
            return Err(ConfigError::OutOfRange {
                field: "context.dedup_similarity".to_string(),
                value: self.dedup_similarity,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(())
    }
}

fn default_top_k() -> usize {
    5
}

fn default_min_similarity() -> f32 {
    0.25
}

fn default_rerank() -> bool {
    true
}

fn default_max_per_document() -> usize {
    2
}

fn default_max_context_tokens() -> usize {
    3000
}

fn default_dedup_similarity() -> f32 {
    0.9
}
