use crate::retry::{with_retry, CallKind};
use docqa_config::{RetrievalConfig, RetryConfig};
use docqa_core::models::ScoredChunk;
use docqa_core::traits::Embedder;
use docqa_core::DocqaError;
use docqa_index::IndexHandle;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Embeds a question and pulls ranked, thresholded candidates from the
/// current index snapshot. Deterministic for identical index state and
/// question text; an empty result is a valid "no grounding" outcome.
pub struct Retriever {
    index: Arc<IndexHandle>,
    embedder: Arc<dyn Embedder>,
    config: RetrievalConfig,
    retry: RetryConfig,
}

impl Retriever {
    pub fn new(
        index: Arc<IndexHandle>,
        embedder: Arc<dyn Embedder>,
        config: RetrievalConfig,
        retry: RetryConfig,
    ) -> Self {
        Self {
            index,
            embedder,
            config,
            retry,
        }
    }

    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>, DocqaError> {
        let snapshot = self.index.snapshot()?;

        let embedder = self.embedder.clone();
        let query_text = question.to_string();
        let embedding = with_retry(&self.retry, CallKind::Embedding, || {
            let embedder = embedder.clone();
            let text = query_text.clone();
            async move { embedder.embed(&text).await }
        })
        .await?;

        // Over-fetch so the diversity cap still leaves top_k candidates.
        let fetch_k = self.config.top_k * 3;
        let mut hits = snapshot.query(&embedding, fetch_k, self.config.min_similarity)?;
        debug!(hits = hits.len(), "index candidates");

        if self.config.rerank {
            boost_keyword_matches(question, &mut hits);
        }
        let mut hits = cap_per_document(hits, self.config.max_per_document);

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        hits.truncate(self.config.top_k);
        for (i, hit) in hits.iter_mut().enumerate() {
            hit.rank = i + 1;
        }

        Ok(hits)
    }
}

/// Additive keyword boost: each query term found in the chunk adds 0.05,
/// capped at 0.15, and the total score stays within 1.0.
fn boost_keyword_matches(question: &str, hits: &mut [ScoredChunk]) {
    let query_terms: Vec<String> = question
        .to_lowercase()
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|t| !t.is_empty())
        .collect();

    for hit in hits.iter_mut() {
        let content = hit.chunk.text.to_lowercase();
        let matches = query_terms.iter().filter(|t| content.contains(*t)).count();
        let boost = (matches as f32 * 0.05).min(0.15);
        hit.score = (hit.score + boost).min(1.0);
    }
}

/// Keep at most `max_per_document` chunks per source document, in rank
/// order, so one document cannot crowd out the rest of the corpus.
fn cap_per_document(hits: Vec<ScoredChunk>, max_per_document: usize) -> Vec<ScoredChunk> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    hits.into_iter()
        .filter(|hit| {
            let count = seen.entry(hit.chunk.document_id.clone()).or_insert(0);
            *count += 1;
            *count <= max_per_document
        })
        .collect()
}
