use crate::compose::{
    compose_answer, CAPABILITIES_ANSWER, GREETING_ANSWER, NO_GROUNDING_ANSWER, UNAVAILABLE_ANSWER,
};
use crate::context::ContextAssembler;
use crate::prompt::{build_query_prompt, SYSTEM_PROMPT};
use crate::retriever::Retriever;
use crate::retry::{with_retry, CallKind};
use docqa_config::{Config, GenerationConfig, RetryConfig};
use docqa_core::classify::{classify, is_greeting};
use docqa_core::models::{
    AnswerStatus, Classification, QueryResult, ScoredChunk,
};
use docqa_core::traits::{Embedder, GenerationOptions, Generator};
use docqa_core::DocqaError;
use docqa_index::IndexHandle;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// A query result plus the intermediates the offline evaluator scores
/// against. Callers outside evaluation use [`QueryPipeline::query`] and
/// never see these.
pub struct QueryOutcome {
    pub result: QueryResult,
    pub retrieved: Vec<ScoredChunk>,
    pub context_text: String,
}

/// The sequential query-time path: classify → retrieve → assemble →
/// generate → compose. Stateless between requests apart from the shared
/// read-only index snapshot, so independent queries may run concurrently.
pub struct QueryPipeline {
    retriever: Retriever,
    assembler: ContextAssembler,
    generator: Arc<dyn Generator>,
    generation: GenerationConfig,
    retry: RetryConfig,
}

impl QueryPipeline {
    pub fn new(
        index: Arc<IndexHandle>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        config: &Config,
    ) -> Self {
        Self {
            retriever: Retriever::new(
                index,
                embedder,
                config.retrieval.clone(),
                config.retry.clone(),
            ),
            assembler: ContextAssembler::new(config.context.clone()),
            generator,
            generation: config.generation.clone(),
            retry: config.retry.clone(),
        }
    }

    /// Answer a question. Always returns a well-formed result: pipeline
    /// errors become a structured "temporarily unavailable" answer, never
    /// a propagated error.
    pub async fn query(&self, question: &str, max_sources: Option<usize>) -> QueryResult {
        self.query_detailed(question, max_sources).await.result
    }

    pub async fn query_detailed(&self, question: &str, max_sources: Option<usize>) -> QueryOutcome {
        let started = Instant::now();
        let question = question.trim();

        // Conversational questions short-circuit retrieval entirely.
        if classify(question, None) == Classification::Conversational {
            info!(question, "conversational query, skipping retrieval");
            let answer = if is_greeting(question) {
                GREETING_ANSWER
            } else {
                CAPABILITIES_ANSWER
            };
            return self.outcome(
                question,
                Classification::Conversational,
                answer.to_string(),
                Vec::new(),
                AnswerStatus::Declined,
                None,
                started,
                Vec::new(),
                String::new(),
            );
        }

        match self.answer_knowledge(question, max_sources, started).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, question, "query pipeline failure");
                self.outcome(
                    question,
                    Classification::Knowledge,
                    UNAVAILABLE_ANSWER.to_string(),
                    Vec::new(),
                    AnswerStatus::Unavailable,
                    Some(err.to_string()),
                    started,
                    Vec::new(),
                    String::new(),
                )
            }
        }
    }

    async fn answer_knowledge(
        &self,
        question: &str,
        max_sources: Option<usize>,
        started: Instant,
    ) -> Result<QueryOutcome, DocqaError> {
        let mut hits = self.retriever.retrieve(question).await?;
        if let Some(cap) = max_sources {
            hits.truncate(cap);
        }

        let classification = classify(question, Some(&hits));
        if classification == Classification::OutOfScope {
            info!(question, "no grounding found, declining");
            return Ok(self.outcome(
                question,
                classification,
                NO_GROUNDING_ANSWER.to_string(),
                Vec::new(),
                AnswerStatus::Declined,
                None,
                started,
                hits,
                String::new(),
            ));
        }

        let ctx = self.assembler.assemble(&hits);
        let prompt = build_query_prompt(&ctx.text, question);
        let opts = GenerationOptions {
            model: self.generation.model.clone(),
            max_tokens: self.generation.max_tokens,
            temperature: self.generation.temperature,
        };

        let generated = with_retry(&self.retry, CallKind::Generation, || {
            let generator = self.generator.clone();
            let prompt = prompt.clone();
            let opts = opts.clone();
            async move { generator.generate(SYSTEM_PROMPT, &prompt, &opts).await }
        })
        .await;

        match generated {
            Ok(text) => {
                let (answer, status) = compose_answer(text, &ctx.citations);
                Ok(self.outcome(
                    question,
                    classification,
                    answer,
                    ctx.citations,
                    status,
                    None,
                    started,
                    hits,
                    ctx.text,
                ))
            }
            // Generation failure after retries degrades to a structured
            // unavailable answer instead of crashing the query.
            Err(err @ DocqaError::Generation { .. }) => {
                error!(error = %err, "generation failed after retries");
                Ok(self.outcome(
                    question,
                    classification,
                    UNAVAILABLE_ANSWER.to_string(),
                    Vec::new(),
                    AnswerStatus::Unavailable,
                    Some(err.to_string()),
                    started,
                    hits,
                    ctx.text,
                ))
            }
            Err(err) => Err(err),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn outcome(
        &self,
        question: &str,
        classification: Classification,
        answer: String,
        citations: Vec<docqa_core::models::Citation>,
        status: AnswerStatus,
        error: Option<String>,
        started: Instant,
        retrieved: Vec<ScoredChunk>,
        context_text: String,
    ) -> QueryOutcome {
        QueryOutcome {
            result: QueryResult {
                question: question.to_string(),
                classification,
                answer,
                citations,
                status,
                model: self.generation.model.clone(),
                latency_ms: started.elapsed().as_millis() as u64,
                error,
            },
            retrieved,
            context_text,
        }
    }
}
