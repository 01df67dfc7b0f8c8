//! Chunking configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Target window size per chunk, in tokens.
    #[serde(default = "default_window_tokens")]
    pub window_tokens: usize,
    /// Tokens carried over from the end of one window into the next.
    #[serde(default = "default_overlap_tokens")]
    pub overlap_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            window_tokens: default_window_tokens(),
            overlap_tokens: default_overlap_tokens(),
        }
    }
}

impl crate::validation::Validate for ChunkingConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;

        if self.window_tokens == 0 {
            return Err(ConfigError::InvalidInteger {
                field: "chunking.window_tokens".to_string(),
                value: self.window_tokens,
                min: 0,
            });
        }
        if self.overlap_tokens >= self.window_tokens {
            return Err(ConfigError::ValidationError {
                field: "chunking.overlap_tokens".to_string(),
                message: format!(
                    "overlap ({}) must be smaller than the window ({})",
                    self.overlap_tokens, self.window_tokens
                ),
            });
        }
        Ok(())
    }
}

fn default_window_tokens() -> usize {
    512
}

// ~12.5% of the default window, inside the 10-20% band.
fn default_overlap_tokens() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validate;

    #[test]
    fn default_is_valid() {
        assert!(ChunkingConfig::default().validate().is_ok());
    }

    #[test]
    fn overlap_must_be_smaller_than_window() {
        let config = ChunkingConfig {
            window_tokens: 100,
            overlap_tokens: 100,
        };
        assert!(config.validate().is_err());
    }
}
