use docqa_config::{ChunkingConfig, SimilarityMetric};
use docqa_core::models::Chunk;
use docqa_core::DocqaError;
use docqa_index::VectorIndex;
use tempfile::tempdir;

fn chunk(id: &str, text: &str) -> Chunk {
    Chunk {
        id: id.to_string(),
        document_id: "doc-1".to_string(),
        source_uri: "docs/handbook.md".to_string(),
        text: text.to_string(),
        start_offset: 0,
        end_offset: text.len().max(1),
        token_count: text.split_whitespace().count(),
    }
}

fn build(pairs: Vec<(Chunk, Vec<f32>)>) -> VectorIndex {
    VectorIndex::build(
        pairs,
        3,
        SimilarityMetric::Cosine,
        ChunkingConfig::default(),
    )
    .unwrap()
}

#[test]
fn query_orders_by_similarity_then_chunk_id() {
    // b and c are identical vectors: the tie must break on chunk id.
    let index = build(vec![
        (chunk("a", "alpha"), vec![1.0, 0.0, 0.0]),
        (chunk("c", "gamma"), vec![0.0, 1.0, 0.0]),
        (chunk("b", "beta"), vec![0.0, 1.0, 0.0]),
    ]);

    let results = index.query(&[0.1, 1.0, 0.0], 10, 0.0).unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.chunk.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);
    assert_eq!(results[0].rank, 1);
    assert!(results[0].score >= results[1].score);
}

#[test]
fn query_caps_results_at_k() {
    let index = build(vec![
        (chunk("a", "alpha"), vec![1.0, 0.0, 0.0]),
        (chunk("b", "beta"), vec![0.9, 0.1, 0.0]),
        (chunk("c", "gamma"), vec![0.8, 0.2, 0.0]),
    ]);
    let results = index.query(&[1.0, 0.0, 0.0], 2, 0.0).unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn query_filters_below_min_similarity() {
    let index = build(vec![
        (chunk("a", "alpha"), vec![1.0, 0.0, 0.0]),
        (chunk("b", "beta"), vec![0.0, 1.0, 0.0]),
    ]);
    // orthogonal chunk scores 0.0 and must be excluded
    let results = index.query(&[1.0, 0.0, 0.0], 10, 0.5).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.id, "a");
}

#[test]
fn empty_index_returns_empty_not_error() {
    let index = build(Vec::new());
    let results = index.query(&[1.0, 0.0, 0.0], 5, 0.0).unwrap();
    assert!(results.is_empty());
}

#[test]
fn query_rejects_wrong_dimension() {
    let index = build(vec![(chunk("a", "alpha"), vec![1.0, 0.0, 0.0])]);
    let err = index.query(&[1.0, 0.0], 5, 0.0).unwrap_err();
    assert!(matches!(
        err,
        DocqaError::DimensionMismatch {
            expected: 3,
            actual: 2
        }
    ));
}

#[test]
fn build_rejects_wrong_dimension() {
    let err = VectorIndex::build(
        vec![(chunk("a", "alpha"), vec![1.0, 0.0])],
        3,
        SimilarityMetric::Cosine,
        ChunkingConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, DocqaError::DimensionMismatch { .. }));
}

#[test]
fn persist_load_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index");

    let index = build(vec![
        (chunk("a", "alpha"), vec![1.0, 0.0, 0.0]),
        (chunk("b", "beta"), vec![0.0, 1.0, 0.0]),
    ]);
    index.persist(&path).unwrap();

    let loaded = VectorIndex::load(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.manifest().dimension, 3);
    assert_eq!(loaded.manifest().metric, SimilarityMetric::Cosine);

    let results = loaded.query(&[1.0, 0.0, 0.0], 1, 0.0).unwrap();
    assert_eq!(results[0].chunk.id, "a");
    assert_eq!(results[0].chunk.text, "alpha");
}

#[test]
fn load_missing_manifest_fails_fast() {
    let dir = tempdir().unwrap();
    let err = VectorIndex::load(&dir.path().join("nowhere")).unwrap_err();
    assert!(matches!(err, DocqaError::IndexArtifact(_)));
}

#[test]
fn compatibility_check_catches_config_drift() {
    let index = build(vec![(chunk("a", "alpha"), vec![1.0, 0.0, 0.0])]);

    assert!(index
        .ensure_compatible(3, SimilarityMetric::Cosine, &ChunkingConfig::default())
        .is_ok());
    assert!(matches!(
        index.ensure_compatible(8, SimilarityMetric::Cosine, &ChunkingConfig::default()),
        Err(DocqaError::DimensionMismatch { .. })
    ));
    assert!(index
        .ensure_compatible(3, SimilarityMetric::Dot, &ChunkingConfig::default())
        .is_err());
    let other_chunking = ChunkingConfig {
        window_tokens: 128,
        overlap_tokens: 16,
    };
    assert!(index
        .ensure_compatible(3, SimilarityMetric::Cosine, &other_chunking)
        .is_err());
}

#[test]
fn persist_replaces_existing_artifact() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index");

    build(vec![(chunk("a", "alpha"), vec![1.0, 0.0, 0.0])])
        .persist(&path)
        .unwrap();
    build(vec![
        (chunk("a", "alpha"), vec![1.0, 0.0, 0.0]),
        (chunk("b", "beta"), vec![0.0, 1.0, 0.0]),
    ])
    .persist(&path)
    .unwrap();

    assert_eq!(VectorIndex::load(&path).unwrap().len(), 2);
}
