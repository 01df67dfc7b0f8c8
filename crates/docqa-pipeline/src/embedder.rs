use anyhow::{anyhow, Result};
use async_trait::async_trait;
use docqa_config::{EmbeddingBackend, EmbeddingConfig};
use docqa_core::traits::Embedder;
use docqa_core::DocqaError;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::sync::Arc;

/// Select an embedder from configuration and available environment.
/// Prefer OpenAI when a key is present, otherwise fall back to Ollama.
pub fn select_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    if let Ok(api_key) = env::var("OPENAI_API_KEY") {
        let model = if config.backend == EmbeddingBackend::OpenAi && !config.model_name.is_empty()
        {
            config.model_name.clone()
        } else {
            "text-embedding-3-small".to_string()
        };
        return Ok(Arc::new(OpenAiEmbedder::new(
            model,
            api_key,
            config.dimension,
        )));
    }

    if config.backend == EmbeddingBackend::OpenAi {
        return Err(anyhow!(
            "embedding.backend is 'openai' but OPENAI_API_KEY is not set"
        ));
    }

    let model = if config.model_name.is_empty() {
        "nomic-embed-text".to_string()
    } else {
        config.model_name.clone()
    };
    Ok(Arc::new(OllamaEmbedder::new(model, config.dimension)))
}

/// Retryable network/server failures vs. permanent client errors.
fn transport_error(e: reqwest::Error) -> DocqaError {
    let transient = e.is_timeout() || e.is_connect() || e.status().is_none();
    DocqaError::embedding(e.to_string(), transient)
}

fn status_error(status: reqwest::StatusCode, body: String) -> DocqaError {
    let transient = status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS;
    DocqaError::embedding(format!("embedding request failed ({status}): {body}"), transient)
}

/// The configured dimension is a process-wide constant; an embedder
/// returning anything else is a fatal configuration error.
fn check_dimension(vector: Vec<f32>, expected: usize) -> Result<Vec<f32>, DocqaError> {
    if vector.len() != expected {
        return Err(DocqaError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(vector)
}

pub struct OpenAiEmbedder {
    model: String,
    api_key: String,
    dimension: usize,
    client: Client,
}

impl OpenAiEmbedder {
    pub fn new(model: String, api_key: String, dimension: usize) -> Self {
        Self {
            model,
            api_key,
            dimension,
            client: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingItem {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DocqaError> {
        let mut list = self.embed_batch(&[text.to_string()]).await?;
        list.pop()
            .ok_or_else(|| DocqaError::embedding("empty embedding response", false))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DocqaError> {
        let resp = self
            .client
            .post("https://api.openai.com/v1/embeddings")
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "input": texts,
            }))
            .send()
            .await
            .map_err(transport_error)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let parsed: OpenAiEmbeddingResponse =
            resp.json().await.map_err(|e| DocqaError::embedding(e.to_string(), false))?;
        if parsed.data.len() != texts.len() {
            return Err(DocqaError::embedding(
                format!(
                    "mismatched embedding count: got {}, expected {}",
                    parsed.data.len(),
                    texts.len()
                ),
                false,
            ));
        }
        parsed
            .data
            .into_iter()
            .map(|d| check_dimension(d.embedding, self.dimension))
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

pub struct OllamaEmbedder {
    model: String,
    base_url: String,
    dimension: usize,
    client: Client,
}

impl OllamaEmbedder {
    pub fn new(model: String, dimension: usize) -> Self {
        let base_url =
            env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());
        Self {
            model,
            base_url,
            dimension,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DocqaError> {
        let resp = self
            .client
            .post(format!(
                "{}/api/embeddings",
                self.base_url.trim_end_matches('/')
            ))
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": text,
            }))
            .send()
            .await
            .map_err(transport_error)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let json: serde_json::Value =
            resp.json().await.map_err(|e| DocqaError::embedding(e.to_string(), false))?;
        let embedding = json["embedding"]
            .as_array()
            .ok_or_else(|| {
                DocqaError::embedding("no embedding field in Ollama response", false)
            })?
            .iter()
            .filter_map(|v| v.as_f64())
            .map(|f| f as f32)
            .collect::<Vec<f32>>();
        check_dimension(embedding, self.dimension)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
