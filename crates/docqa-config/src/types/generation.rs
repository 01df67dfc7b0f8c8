//! Answer generation configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Backing chat model id.
    #[serde(default = "default_model")]
    pub model: String,
    /// Output length cap.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Creativity/determinism trade-off. Kept low: answers must stay
    /// close to the supplied context.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl crate::validation::Validate for GenerationConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;

        if self.model.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "generation.model".to_string(),
                message: "Model id cannot be empty".to_string(),
            });
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::InvalidInteger {
                field: "generation.max_tokens".to_string(),
                value: self.max_tokens,
                min: 0,
            });
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::OutOfRange {
                field: "generation.temperature".to_string(),
                value: self.temperature,
                min: 0.0,
                max: 2.0,
            });
        }
        Ok(())
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> usize {
    1024
}

fn default_temperature() -> f32 {
    0.2
}
