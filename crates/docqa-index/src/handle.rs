use crate::vector::VectorIndex;
use docqa_core::DocqaError;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared handle over the current index snapshot.
///
/// The index itself is immutable; a rebuild produces a fresh
/// [`VectorIndex`] which is swapped in atomically here. Readers clone the
/// `Arc` and keep querying whatever snapshot they started with.
pub struct IndexHandle {
    current: RwLock<Option<Arc<VectorIndex>>>,
}

impl IndexHandle {
    pub fn empty() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    pub fn new(index: VectorIndex) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(index))),
        }
    }

    /// Replace the current snapshot. In-flight readers are unaffected.
    pub fn swap(&self, index: VectorIndex) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(Arc::new(index));
    }

    /// The current snapshot, or `IndexNotBuilt` when nothing has been
    /// built or loaded yet.
    pub fn snapshot(&self) -> Result<Arc<VectorIndex>, DocqaError> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(DocqaError::IndexNotBuilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_config::{ChunkingConfig, SimilarityMetric};

    #[test]
    fn empty_handle_reports_not_built() {
        let handle = IndexHandle::empty();
        assert!(matches!(
            handle.snapshot(),
            Err(DocqaError::IndexNotBuilt)
        ));
    }

    #[test]
    fn swap_replaces_snapshot() {
        let handle = IndexHandle::empty();
        let index = VectorIndex::build(
            Vec::new(),
            4,
            SimilarityMetric::Cosine,
            ChunkingConfig::default(),
        )
        .unwrap();
        handle.swap(index);
        assert_eq!(handle.snapshot().unwrap().len(), 0);
    }
}
