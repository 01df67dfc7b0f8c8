use crate::error::DocqaError;
use async_trait::async_trait;

/// Maps text to a fixed-length vector. Deterministic for a fixed model
/// version; implementations report their dimension so the index can fail
/// fast on mismatch.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DocqaError>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DocqaError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Output vector length for the configured model.
    fn dimension(&self) -> usize;
}

#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
}

/// Produces an answer from a fully assembled prompt. The returned text is
/// not ground truth; the composer pairs it with the citations that were
/// actually assembled.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        prompt: &str,
        opts: &GenerationOptions,
    ) -> Result<String, DocqaError>;
}
