use serde::{Deserialize, Serialize};

/// A normalized source document as supplied by the ingestion layer.
/// Immutable once created; only the chunker consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub source_uri: String,
    pub raw_text: String,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    /// Unix timestamp (seconds) recorded at ingestion time.
    pub ingested_at: u64,
}

/// A bounded passage of document text, the unit of retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub source_uri: String,
    pub text: String,
    /// Byte offsets into the originating document's raw_text.
    pub start_offset: usize,
    pub end_offset: usize,
    pub token_count: usize,
}

/// A retrieval hit. Ephemeral: produced per query, never persisted.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
    pub rank: usize,
}

/// Ties part of an answer back to the chunk it derives from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Small 1-based integer referenced inline in the prompt as [Source N].
    pub handle: usize,
    pub chunk_id: String,
    pub source_uri: String,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Conversational,
    OutOfScope,
    Knowledge,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Classification::Conversational => "conversational",
            Classification::OutOfScope => "out_of_scope",
            Classification::Knowledge => "knowledge",
        };
        write!(f, "{}", name)
    }
}

/// Confidence signal attached to every answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    /// Generated from non-empty context, no hallucination indicators.
    Grounded,
    /// Generated text could not be tied to the assembled context.
    Ungrounded,
    /// Conversational or out-of-scope: answered without retrieval.
    Declined,
    /// The generation call failed after retries.
    Unavailable,
}

/// The structured outcome of one query. Always well-formed: pipeline
/// errors are folded into `status`, never propagated to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub question: String,
    pub classification: Classification,
    pub answer: String,
    pub citations: Vec<Citation>,
    pub status: AnswerStatus,
    pub model: String,
    pub latency_ms: u64,
    /// Set when a pipeline error was folded into this result.
    pub error: Option<String>,
}
