//! Config validation

use crate::error::Result;

/// Trait for config validation
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for crate::types::Config {
    fn validate(&self) -> Result<()> {
        self.index.validate()?;
        self.chunking.validate()?;
        self.embedding.validate()?;
        self.generation.validate()?;
        self.retrieval.validate()?;
        self.context.validate()?;
        self.eval.validate()?;
        self.retry.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Config;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn invalid_subsection_fails_whole_config() {
        let mut config = Config::default();
        config.retrieval.min_similarity = 1.5;
        assert!(config.validate().is_err());
    }
}
