//! Index artifact configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory holding the persisted index artifact.
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// Similarity metric, fixed at build time. Changing it requires a
    /// rebuild; load fails fast on mismatch.
    #[serde(default)]
    pub metric: SimilarityMetric,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    Cosine,
    Dot,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            metric: SimilarityMetric::default(),
        }
    }
}

impl Default for SimilarityMetric {
    fn default() -> Self {
        SimilarityMetric::Cosine
    }
}

impl std::fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimilarityMetric::Cosine => write!(f, "cosine"),
            SimilarityMetric::Dot => write!(f, "dot"),
        }
    }
}

impl crate::validation::Validate for IndexConfig {
    fn validate(&self) -> crate::error::Result<()> {
        Ok(())
    }
}

fn default_path() -> PathBuf {
    PathBuf::from(".docqa/index")
}
