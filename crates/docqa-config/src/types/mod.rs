pub mod chunking;
pub mod embedding;
pub mod eval;
pub mod generation;
pub mod index;
pub mod retrieval;

pub use chunking::ChunkingConfig;
pub use embedding::{EmbeddingBackend, EmbeddingConfig};
pub use eval::{EvalConfig, MetricWeights};
pub use generation::GenerationConfig;
pub use index::{IndexConfig, SimilarityMetric};
pub use retrieval::{ContextConfig, RetrievalConfig};

use crate::error::Result;
use crate::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration struct aggregating all settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub eval: EvalConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Load from `.docqa.yml` in the working directory, falling back to
    /// defaults when no file exists. The result is always validated.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config_path = path.unwrap_or_else(|| Path::new(".docqa.yml"));
        let config = if config_path.exists() {
            let content =
                std::fs::read_to_string(config_path).map_err(|source| {
                    crate::error::ConfigError::IoError {
                        path: config_path.to_path_buf(),
                        source,
                    }
                })?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }
}

/// Retry discipline for calls that block on external latency
/// (embedder, generator). Transient failures only; permanent errors
/// are never re-attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Validate for RetryConfig {
    fn validate(&self) -> Result<()> {
        use crate::error::ConfigError;
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidInteger {
                field: "retry.max_attempts".to_string(),
                value: self.max_attempts,
                min: 0,
            });
        }
        Ok(())
    }
}

fn default_max_attempts() -> usize {
    3
}

fn default_base_backoff_ms() -> u64 {
    500
}

fn default_timeout_ms() -> u64 {
    30_000
}
