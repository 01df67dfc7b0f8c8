mod common;

use common::{build_pipeline, sample_corpus, test_config, FailingGenerator, StaticGenerator};
use docqa_core::models::{AnswerStatus, Classification};
use docqa_index::IndexHandle;
use docqa_pipeline::QueryPipeline;
use std::sync::Arc;

#[tokio::test]
async fn knowledge_query_is_grounded_and_cited() {
    let pipeline = build_pipeline(
        &sample_corpus(),
        Arc::new(StaticGenerator(
            "Our mission is to deliver results efficiently [Source 1].".to_string(),
        )),
    )
    .await;

    let result = pipeline.query("What is our mission?", None).await;

    assert_eq!(result.classification, Classification::Knowledge);
    assert_eq!(result.status, AnswerStatus::Grounded);
    assert!(!result.citations.is_empty());
    assert_eq!(result.citations[0].source_uri, "docs/mission.md");
    assert!(result.error.is_none());
}

#[tokio::test]
async fn greeting_short_circuits_retrieval() {
    // A failing generator proves neither retrieval nor generation runs.
    let pipeline = build_pipeline(
        &sample_corpus(),
        Arc::new(FailingGenerator { transient: false }),
    )
    .await;

    for question in ["Hi!", "Hello", "What can you do?"] {
        let result = pipeline.query(question, None).await;
        assert_eq!(
            result.classification,
            Classification::Conversational,
            "{question}"
        );
        assert_eq!(result.status, AnswerStatus::Declined);
        assert!(result.citations.is_empty());
        assert!(result.error.is_none());
    }
}

#[tokio::test]
async fn unanswerable_query_declines_without_fabricating() {
    let pipeline = build_pipeline(
        &sample_corpus(),
        Arc::new(StaticGenerator("should never be used".to_string())),
    )
    .await;

    let result = pipeline.query("What's the weather today?", None).await;

    assert_eq!(result.classification, Classification::OutOfScope);
    assert_eq!(result.status, AnswerStatus::Declined);
    assert!(result.citations.is_empty());
    assert!(result.answer.contains("don't have enough information"));
}

#[tokio::test]
async fn generation_failure_degrades_to_unavailable() {
    let pipeline = build_pipeline(
        &sample_corpus(),
        Arc::new(FailingGenerator { transient: true }),
    )
    .await;

    let result = pipeline.query("What is our mission?", None).await;

    assert_eq!(result.status, AnswerStatus::Unavailable);
    assert!(result.citations.is_empty());
    assert!(result.error.is_some());
    assert!(result.answer.contains("temporarily unable"));
}

#[tokio::test]
async fn querying_before_build_yields_structured_failure() {
    let config = test_config();
    let pipeline = QueryPipeline::new(
        Arc::new(IndexHandle::empty()),
        Arc::new(common::HashEmbedder),
        Arc::new(StaticGenerator("unused".to_string())),
        &config,
    );

    let result = pipeline.query("What is our mission?", None).await;
    assert_eq!(result.status, AnswerStatus::Unavailable);
    assert!(result.error.is_some());
}

#[tokio::test]
async fn max_sources_caps_citations() {
    let pipeline = build_pipeline(
        &sample_corpus(),
        Arc::new(StaticGenerator(
            "Vacation days require manager approval [Source 1].".to_string(),
        )),
    )
    .await;

    let result = pipeline
        .query("How many vacation days do employees receive each year?", Some(1))
        .await;
    assert!(result.citations.len() <= 1);
}
