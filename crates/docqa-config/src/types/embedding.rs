//! Embedding provider configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// Model name for the selected backend.
    ///
    /// Examples:
    /// - OpenAI: "text-embedding-3-small", "text-embedding-3-large"
    /// - Ollama: "nomic-embed-text", "mxbai-embed-large"
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Expected output dimension. The index is built with this dimension
    /// and any embedder returning a different length is a fatal error.
    #[serde(default = "default_dimension")]
    pub dimension: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// OpenAI API (requires OPENAI_API_KEY)
    #[serde(rename = "openai")]
    OpenAi,
    /// Local Ollama server
    Ollama,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model_name: default_model_name(),
            dimension: default_dimension(),
        }
    }
}

impl Default for EmbeddingBackend {
    fn default() -> Self {
        EmbeddingBackend::Ollama
    }
}

impl crate::validation::Validate for EmbeddingConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;

        if self.model_name.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "embedding.model_name".to_string(),
                message: "Model name cannot be empty".to_string(),
            });
        }
        if self.dimension == 0 {
            return Err(ConfigError::InvalidInteger {
                field: "embedding.dimension".to_string(),
                value: self.dimension,
                min: 0,
            });
        }
        Ok(())
    }
}

fn default_model_name() -> String {
    "nomic-embed-text".to_string()
}

fn default_dimension() -> usize {
    768
}
