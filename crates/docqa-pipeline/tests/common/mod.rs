//! Deterministic in-process fakes for the external capabilities, so the
//! pipeline is testable without live embedding or generation calls.
#![allow(dead_code)]

use async_trait::async_trait;
use docqa_config::{Config, RetryConfig, SimilarityMetric};
use docqa_core::chunking::Chunker;
use docqa_core::models::{Document, DocumentMetadata};
use docqa_core::traits::{Embedder, GenerationOptions, Generator};
use docqa_core::DocqaError;
use docqa_index::{IndexHandle, VectorIndex};
use docqa_pipeline::QueryPipeline;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub const DIM: usize = 256;

/// Hashed bag-of-words embedding: deterministic, and texts sharing words
/// land close under cosine similarity.
pub struct HashEmbedder;

pub fn bag_of_words(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIM];
    for word in text.to_lowercase().split_whitespace() {
        let word = word.trim_matches(|c: char| !c.is_alphanumeric());
        if word.is_empty() {
            continue;
        }
        let mut hasher = DefaultHasher::new();
        word.hash(&mut hasher);
        v[(hasher.finish() % DIM as u64) as usize] += 1.0;
    }
    v
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DocqaError> {
        Ok(bag_of_words(text))
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

/// Always returns the same canned answer.
pub struct StaticGenerator(pub String);

#[async_trait]
impl Generator for StaticGenerator {
    async fn generate(
        &self,
        _system_prompt: &str,
        _prompt: &str,
        _opts: &GenerationOptions,
    ) -> Result<String, DocqaError> {
        Ok(self.0.clone())
    }
}

/// Always fails, optionally as a transient error.
pub struct FailingGenerator {
    pub transient: bool,
}

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(
        &self,
        _system_prompt: &str,
        _prompt: &str,
        _opts: &GenerationOptions,
    ) -> Result<String, DocqaError> {
        Err(DocqaError::generation("quota exceeded", self.transient))
    }
}

pub fn document(id: &str, uri: &str, text: &str) -> Document {
    Document {
        id: id.to_string(),
        source_uri: uri.to_string(),
        raw_text: text.to_string(),
        metadata: DocumentMetadata {
            title: id.to_string(),
            ingested_at: 0,
        },
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.embedding.dimension = DIM;
    // Bag-of-words cosine scores run lower than real embeddings; keep the
    // gate above stray hash-collision overlap but below topical overlap.
    config.retrieval.min_similarity = 0.35;
    config.retry = RetryConfig {
        max_attempts: 2,
        base_backoff_ms: 1,
        timeout_ms: 2_000,
    };
    config
}

/// Chunk and index the corpus with the fake embedder, then wire up a
/// pipeline around the given generator.
pub async fn build_pipeline(
    documents: &[Document],
    generator: Arc<dyn Generator>,
) -> Arc<QueryPipeline> {
    let config = test_config();
    let chunker = Chunker::new(config.chunking.clone());
    let embedder = Arc::new(HashEmbedder);

    let mut pairs = Vec::new();
    for doc in documents {
        for chunk in chunker.chunk(doc).expect("chunking test corpus") {
            let embedding = embedder.embed(&chunk.text).await.expect("fake embed");
            pairs.push((chunk, embedding));
        }
    }

    let index = VectorIndex::build(
        pairs,
        DIM,
        SimilarityMetric::Cosine,
        config.chunking.clone(),
    )
    .expect("building test index");

    Arc::new(QueryPipeline::new(
        Arc::new(IndexHandle::new(index)),
        embedder,
        generator,
        &config,
    ))
}

pub fn sample_corpus() -> Vec<Document> {
    vec![
        document(
            "mission",
            "docs/mission.md",
            "Our mission is to deliver results efficiently, and we measure outcomes \
             every quarter.",
        ),
        document(
            "vacation",
            "docs/vacation.md",
            "Employees receive twenty vacation days each year. Manager approval comes \
             first; submit requests two weeks ahead.",
        ),
    ]
}
