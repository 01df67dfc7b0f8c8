use async_trait::async_trait;
use docqa_core::traits::{GenerationOptions, Generator};
use docqa_core::DocqaError;
use reqwest::Client;
use serde_json::json;
use std::env;
use std::sync::Arc;

/// Chat-completion generator over any OpenAI-compatible endpoint.
/// Prefers OpenAI when a key is present, otherwise a local Ollama server.
#[derive(Clone)]
pub struct ChatGenerator {
    client: Client,
    api_key: String,
    api_url: String,
}

impl ChatGenerator {
    pub fn from_env() -> Self {
        let (default_url, api_key) = match env::var("OPENAI_API_KEY") {
            Ok(key) => ("https://api.openai.com/v1", key),
            Err(_) => ("http://localhost:11434/v1", "dummy".to_string()),
        };
        let api_url = env::var("LLM_API_BASE").unwrap_or_else(|_| default_url.to_string());
        let endpoint = if api_url.ends_with("/chat/completions") {
            api_url
        } else {
            format!("{}/chat/completions", api_url.trim_end_matches('/'))
        };

        Self {
            client: Client::new(),
            api_key,
            api_url: endpoint,
        }
    }
}

pub fn select_generator() -> Arc<dyn Generator> {
    Arc::new(ChatGenerator::from_env())
}

#[async_trait]
impl Generator for ChatGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        prompt: &str,
        opts: &GenerationOptions,
    ) -> Result<String, DocqaError> {
        let resp = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": opts.model,
                "messages": [
                    {"role": "system", "content": system_prompt},
                    {"role": "user", "content": prompt},
                ],
                "temperature": opts.temperature,
                "max_tokens": opts.max_tokens,
            }))
            .send()
            .await
            .map_err(|e| {
                let transient = e.is_timeout() || e.is_connect() || e.status().is_none();
                DocqaError::generation(e.to_string(), transient)
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let transient =
                status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS;
            let body = resp.text().await.unwrap_or_default();
            return Err(DocqaError::generation(
                format!("chat completion failed ({status}): {body}"),
                transient,
            ));
        }

        let res: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| DocqaError::generation(e.to_string(), false))?;

        let content = res
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                DocqaError::generation(format!("malformed response from LLM: {res}"), false)
            })?;

        Ok(content.trim().to_string())
    }
}
