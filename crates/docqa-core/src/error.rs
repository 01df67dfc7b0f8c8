use thiserror::Error;

/// Error taxonomy for the answering pipeline.
///
/// Configuration errors (`DimensionMismatch`, `IndexNotBuilt`) abort
/// startup. Transient external failures are retried per policy and then
/// surfaced as a degraded answer, never as a crash.
#[derive(Debug, Error)]
pub enum DocqaError {
    /// Bad ingestion input. Fatal for that document only: skipped and logged.
    #[error("invalid document {id}: {reason}")]
    InvalidDocument { id: String, reason: String },

    /// Embedding dimension disagrees with the index/configured dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The vector index was queried before build() or load().
    #[error("vector index queried before it was built or loaded")]
    IndexNotBuilt,

    /// The generator call failed (timeout, quota, malformed response).
    #[error("generation failed: {message}")]
    Generation { message: String, transient: bool },

    /// The embedder call failed.
    #[error("embedding failed: {message}")]
    Embedding { message: String, transient: bool },

    /// Persisted index artifact is missing, corrupt, or from a different
    /// build configuration.
    #[error("index artifact error: {0}")]
    IndexArtifact(String),
}

impl DocqaError {
    pub fn generation(message: impl Into<String>, transient: bool) -> Self {
        Self::Generation {
            message: message.into(),
            transient,
        }
    }

    pub fn embedding(message: impl Into<String>, transient: bool) -> Self {
        Self::Embedding {
            message: message.into(),
            transient,
        }
    }

    /// Whether the retry policy may re-attempt the failed call.
    pub fn is_transient(&self) -> bool {
        match self {
            DocqaError::Generation { transient, .. } => *transient,
            DocqaError::Embedding { transient, .. } => *transient,
            _ => false,
        }
    }
}
