//! Hosted embedding model clients.
//!
//! Same shape as [`crate::llm`]: an enum over backends, constructed once by
//! [`EmbeddingProvider::build`], cloned freely. Every returned vector is
//! checked against the configured dimension so a mis-configured model cannot
//! poison the index.

pub mod huggingface;
pub mod openai;

use thiserror::Error;
use tracing::debug;

use crate::config::EmbeddingConfig;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("unknown embedding provider: {0}")]
    UnknownProvider(String),
    #[error("embedding config error: {0}")]
    Config(String),
    #[error("embedding request failed: {0}")]
    Transport(String),
    #[error("embedding API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("failed to parse embedding response: {0}")]
    Parse(String),
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    Dimension { expected: usize, got: usize },
}

#[derive(Debug, Clone)]
pub enum EmbeddingProvider {
    HuggingFace(huggingface::HuggingFaceEmbedder),
    OpenAi(openai::OpenAiEmbedder),
}

impl EmbeddingProvider {
    pub fn build(config: &EmbeddingConfig, api_key: Option<String>) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| EmbeddingError::Config(format!("failed to build HTTP client: {e}")))?;

        match config.provider.as_str() {
            "huggingface" => Ok(EmbeddingProvider::HuggingFace(huggingface::HuggingFaceEmbedder::new(
                client,
                &config.api_base_url,
                &config.model,
                config.dimension,
                api_key,
            ))),
            "openai" | "openai-compatible" => Ok(EmbeddingProvider::OpenAi(openai::OpenAiEmbedder::new(
                client,
                &config.api_base_url,
                &config.model,
                config.dimension,
                api_key,
            ))),
            other => Err(EmbeddingError::UnknownProvider(other.to_string())),
        }
    }

    pub fn model(&self) -> &str {
        match self {
            EmbeddingProvider::HuggingFace(p) => p.model(),
            EmbeddingProvider::OpenAi(p) => p.model(),
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            EmbeddingProvider::HuggingFace(p) => p.dimension(),
            EmbeddingProvider::OpenAi(p) => p.dimension(),
        }
    }

    /// Embed a batch of texts, one vector per input, in input order.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = match self {
            EmbeddingProvider::HuggingFace(p) => p.embed_batch(texts).await?,
            EmbeddingProvider::OpenAi(p) => p.embed_batch(texts).await?,
        };
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::Parse(format!(
                "expected {} vectors, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        let expected = self.dimension();
        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(EmbeddingError::Dimension { expected, got: bad.len() });
        }
        debug!(count = vectors.len(), dimension = expected, "embedded batch");
        Ok(vectors)
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| EmbeddingError::Parse("empty embedding response".into()))
    }

    /// Embed an arbitrary number of texts in `batch_size` requests.
    pub async fn embed_all(&self, texts: &[String], batch_size: usize) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(batch_size.max(1)) {
            out.extend(self.embed_batch(batch).await?);
        }
        Ok(out)
    }
}

/// Shared non-2xx handling for both backends.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, EmbeddingError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());
    Err(EmbeddingError::Api { status: status.as_u16(), message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn hf(url: &str, dimension: usize) -> EmbeddingProvider {
        let mut cfg = Config::test_default().embedding;
        cfg.api_base_url = url.to_string();
        cfg.model = "sentence-transformers/all-MiniLM-L6-v2".into();
        cfg.dimension = dimension;
        EmbeddingProvider::build(&cfg, Some("hf_test".into())).unwrap()
    }

    #[test]
    fn unknown_provider_rejected() {
        let mut cfg = Config::test_default().embedding;
        cfg.provider = "word2vec-on-a-napkin".into();
        assert!(matches!(
            EmbeddingProvider::build(&cfg, None),
            Err(EmbeddingError::UnknownProvider(_))
        ));
    }

    #[tokio::test]
    async fn empty_batch_makes_no_request() {
        let p = hf("http://localhost:0", 3);
        assert!(p.embed_batch(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_dimension_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/sentence-transformers/all-MiniLM-L6-v2/pipeline/feature-extraction")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[[0.1, 0.2]]")
            .create_async()
            .await;

        let p = hf(&server.url(), 3);
        let err = p.embed("fever").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Dimension { expected: 3, got: 2 }));
    }

    #[tokio::test]
    async fn embed_all_splits_into_batches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/sentence-transformers/all-MiniLM-L6-v2/pipeline/feature-extraction")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[[1.0, 0.0], [0.0, 1.0]]")
            .expect(2)
            .create_async()
            .await;

        let p = hf(&server.url(), 2);
        let texts: Vec<String> = (0..4).map(|i| format!("chunk {i}")).collect();
        let vectors = p.embed_all(&texts, 2).await.unwrap();
        assert_eq!(vectors.len(), 4);
        mock.assert_async().await;
    }
}
