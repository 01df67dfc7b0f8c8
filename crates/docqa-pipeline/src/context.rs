use docqa_config::ContextConfig;
use docqa_core::models::{Citation, ScoredChunk};
use std::collections::HashSet;
use tracing::debug;

/// The bounded prompt context plus the citation handles that map the
/// generated answer back to its sources.
#[derive(Debug, Clone, Default)]
pub struct AssembledContext {
    pub text: String,
    pub citations: Vec<Citation>,
    pub token_count: usize,
}

impl AssembledContext {
    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }
}

/// Greedily packs chunks in rank order into the token budget. A chunk
/// that does not fit is dropped wholesale, never truncated mid-sentence;
/// near-duplicates of already-included text are skipped.
pub struct ContextAssembler {
    config: ContextConfig,
}

impl ContextAssembler {
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    pub fn assemble(&self, hits: &[ScoredChunk]) -> AssembledContext {
        let budget = self.config.max_context_tokens;
        let mut included: Vec<&ScoredChunk> = Vec::new();
        let mut used_tokens = 0usize;

        for hit in hits {
            if used_tokens + hit.chunk.token_count > budget {
                debug!(chunk = %hit.chunk.id, "dropped: over token budget");
                continue;
            }
            if included
                .iter()
                .any(|inc| word_jaccard(&inc.chunk.text, &hit.chunk.text) >= self.config.dedup_similarity)
            {
                debug!(chunk = %hit.chunk.id, "dropped: near-duplicate");
                continue;
            }
            used_tokens += hit.chunk.token_count;
            included.push(hit);
        }

        let mut text = String::new();
        let mut citations = Vec::with_capacity(included.len());
        for (i, hit) in included.iter().enumerate() {
            let handle = i + 1;
            text.push_str(&format!(
                "[Source {}: {} (relevance: {:.2})]\n{}\n\n",
                handle, hit.chunk.source_uri, hit.score, hit.chunk.text
            ));
            citations.push(Citation {
                handle,
                chunk_id: hit.chunk.id.clone(),
                source_uri: hit.chunk.source_uri.clone(),
                score: hit.score,
            });
        }

        AssembledContext {
            text,
            citations,
            token_count: used_tokens,
        }
    }
}

/// Jaccard similarity over lowercase word sets; cheap near-duplicate
/// detection between chunk texts.
fn word_jaccard(a: &str, b: &str) -> f32 {
    let set_a: HashSet<&str> = a.split_whitespace().collect();
    let set_b: HashSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f32 / union as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::models::Chunk;

    fn hit(id: &str, text: &str, tokens: usize, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                id: id.to_string(),
                document_id: "d1".to_string(),
                source_uri: "docs/handbook.md".to_string(),
                text: text.to_string(),
                start_offset: 0,
                end_offset: text.len().max(1),
                token_count: tokens,
            },
            score,
            rank: 0,
        }
    }

    fn assembler(max_tokens: usize) -> ContextAssembler {
        ContextAssembler::new(ContextConfig {
            max_context_tokens: max_tokens,
            dedup_similarity: 0.9,
        })
    }

    #[test]
    fn chunks_are_included_whole_or_not_at_all() {
        let hits = vec![
            hit("a", "first passage", 60, 0.9),
            hit("b", "second passage, too large to fit", 60, 0.8),
            hit("c", "third passage", 30, 0.7),
        ];
        let ctx = assembler(100).assemble(&hits);

        // b is dropped wholesale; c still fits after it.
        assert_eq!(ctx.citations.len(), 2);
        assert_eq!(ctx.citations[0].chunk_id, "a");
        assert_eq!(ctx.citations[1].chunk_id, "c");
        assert!(ctx.token_count <= 100);
        assert!(ctx.text.contains("first passage"));
        assert!(!ctx.text.contains("second passage"));
    }

    #[test]
    fn near_duplicates_are_skipped() {
        let hits = vec![
            hit("a", "the vacation policy allows twenty days", 10, 0.9),
            hit("b", "the vacation policy allows twenty days", 10, 0.8),
            hit("c", "expenses are reimbursed monthly", 10, 0.7),
        ];
        let ctx = assembler(100).assemble(&hits);
        let ids: Vec<&str> = ctx.citations.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn handles_are_sequential_from_one() {
        let hits = vec![
            hit("a", "alpha text", 5, 0.9),
            hit("b", "beta text", 5, 0.8),
        ];
        let ctx = assembler(100).assemble(&hits);
        assert_eq!(ctx.citations[0].handle, 1);
        assert_eq!(ctx.citations[1].handle, 2);
        assert!(ctx.text.contains("[Source 1: docs/handbook.md"));
        assert!(ctx.text.contains("[Source 2: docs/handbook.md"));
    }

    #[test]
    fn empty_input_yields_empty_context() {
        let ctx = assembler(100).assemble(&[]);
        assert!(ctx.is_empty());
        assert!(ctx.text.is_empty());
    }
}
