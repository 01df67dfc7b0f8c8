use docqa_config::{ChunkingConfig, SimilarityMetric};
use docqa_core::models::{Chunk, ScoredChunk};
use docqa_core::DocqaError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

const FORMAT_VERSION: u32 = 1;
const MANIFEST_FILE: &str = "manifest.json";
const ENTRIES_FILE: &str = "entries.bin";

/// Build-time metadata persisted alongside the vectors. Loading fails
/// fast when any of it is missing or disagrees with the current
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    pub dimension: usize,
    pub metric: SimilarityMetric,
    pub chunking: ChunkingConfig,
    pub entry_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// Immutable in-memory vector index. Append-only at build time, read-only
/// afterwards; the only mutation path is a full rebuild swapped in through
/// [`crate::IndexHandle`].
#[derive(Debug)]
pub struct VectorIndex {
    manifest: IndexManifest,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build an index from chunk/embedding pairs. Under `Cosine` the
    /// vectors are L2-normalized once here so querying is a plain dot
    /// product for either metric.
    pub fn build(
        pairs: Vec<(Chunk, Vec<f32>)>,
        dimension: usize,
        metric: SimilarityMetric,
        chunking: ChunkingConfig,
    ) -> Result<Self, DocqaError> {
        let mut entries = Vec::with_capacity(pairs.len());
        for (chunk, mut embedding) in pairs {
            if embedding.len() != dimension {
                return Err(DocqaError::DimensionMismatch {
                    expected: dimension,
                    actual: embedding.len(),
                });
            }
            if metric == SimilarityMetric::Cosine {
                normalize(&mut embedding);
            }
            entries.push(IndexEntry { chunk, embedding });
        }

        info!(entries = entries.len(), %metric, dimension, "built vector index");
        Ok(Self {
            manifest: IndexManifest {
                format_version: FORMAT_VERSION,
                dimension,
                metric,
                chunking,
                entry_count: entries.len(),
            },
            entries,
        })
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nearest neighbours of `query`: at most `k` results with similarity
    /// >= `min_similarity`, ordered by descending similarity with ties
    /// broken by ascending chunk id. An empty result is a valid outcome.
    pub fn query(
        &self,
        query: &[f32],
        k: usize,
        min_similarity: f32,
    ) -> Result<Vec<ScoredChunk>, DocqaError> {
        if query.len() != self.manifest.dimension {
            return Err(DocqaError::DimensionMismatch {
                expected: self.manifest.dimension,
                actual: query.len(),
            });
        }

        let query = match self.manifest.metric {
            SimilarityMetric::Cosine => {
                let mut q = query.to_vec();
                normalize(&mut q);
                q
            }
            SimilarityMetric::Dot => query.to_vec(),
        };

        let mut scored: Vec<(f32, &Chunk)> = self
            .entries
            .iter()
            .map(|e| (dot(&query, &e.embedding), &e.chunk))
            .filter(|(score, _)| *score >= min_similarity)
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.id.cmp(&b.1.id))
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .enumerate()
            .map(|(i, (score, chunk))| ScoredChunk {
                chunk: chunk.clone(),
                score,
                rank: i + 1,
            })
            .collect())
    }

    /// Write the artifact to a temporary sibling directory and swap it
    /// into place, so readers never observe a partially written index.
    pub fn persist(&self, path: &Path) -> Result<(), DocqaError> {
        let tmp = path.with_extension("tmp");
        if tmp.exists() {
            std::fs::remove_dir_all(&tmp).map_err(artifact_err)?;
        }
        std::fs::create_dir_all(&tmp).map_err(artifact_err)?;

        let manifest_json =
            serde_json::to_string_pretty(&self.manifest).map_err(artifact_err)?;
        std::fs::write(tmp.join(MANIFEST_FILE), manifest_json).map_err(artifact_err)?;

        let payload = bincode::serialize(&self.entries).map_err(artifact_err)?;
        std::fs::write(tmp.join(ENTRIES_FILE), payload).map_err(artifact_err)?;

        if path.exists() {
            std::fs::remove_dir_all(path).map_err(artifact_err)?;
        }
        std::fs::rename(&tmp, path).map_err(artifact_err)?;

        info!(path = %path.display(), entries = self.entries.len(), "persisted index");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, DocqaError> {
        let manifest_path = path.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(DocqaError::IndexArtifact(format!(
                "no manifest at {}; build the index first",
                manifest_path.display()
            )));
        }
        let manifest_json = std::fs::read_to_string(&manifest_path).map_err(artifact_err)?;
        let manifest: IndexManifest =
            serde_json::from_str(&manifest_json).map_err(artifact_err)?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(DocqaError::IndexArtifact(format!(
                "unsupported index format version {} (expected {})",
                manifest.format_version, FORMAT_VERSION
            )));
        }

        let payload = std::fs::read(path.join(ENTRIES_FILE)).map_err(artifact_err)?;
        let entries: Vec<IndexEntry> = bincode::deserialize(&payload).map_err(artifact_err)?;
        if entries.len() != manifest.entry_count {
            return Err(DocqaError::IndexArtifact(format!(
                "entry count mismatch: manifest says {}, payload has {}",
                manifest.entry_count,
                entries.len()
            )));
        }
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != manifest.dimension) {
            return Err(DocqaError::IndexArtifact(format!(
                "chunk {} has embedding dimension {} but manifest says {}",
                bad.chunk.id,
                bad.embedding.len(),
                manifest.dimension
            )));
        }

        info!(path = %path.display(), entries = entries.len(), "loaded index");
        Ok(Self { manifest, entries })
    }

    /// Startup check: the loaded artifact must agree with the current
    /// configuration or queries would be meaningless.
    pub fn ensure_compatible(
        &self,
        dimension: usize,
        metric: SimilarityMetric,
        chunking: &ChunkingConfig,
    ) -> Result<(), DocqaError> {
        if self.manifest.dimension != dimension {
            return Err(DocqaError::DimensionMismatch {
                expected: dimension,
                actual: self.manifest.dimension,
            });
        }
        if self.manifest.metric != metric {
            return Err(DocqaError::IndexArtifact(format!(
                "index was built with metric {}, configuration says {}",
                self.manifest.metric, metric
            )));
        }
        if &self.manifest.chunking != chunking {
            return Err(DocqaError::IndexArtifact(
                "index was built with a different chunking configuration; rebuild required"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

fn artifact_err(e: impl std::fmt::Display) -> DocqaError {
    DocqaError::IndexArtifact(e.to_string())
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
