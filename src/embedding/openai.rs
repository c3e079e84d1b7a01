//! OpenAI-compatible embeddings endpoint (`/v1/embeddings`), for
//! self-hosted servers (text-embeddings-inference, Ollama…) serving the
//! same MiniLM model.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::{EmbeddingError, check_status};

#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimension: usize,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(client: Client, base_url: &str, model: &str, dimension: usize, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: embeddings_endpoint(base_url),
            model: model.to_string(),
            dimension,
            api_key,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut req = self
            .client
            .post(&self.endpoint)
            .json(&EmbeddingRequest { model: &self.model, input: texts });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            error!(url = %self.endpoint, error = %e, "embedding request failed (transport)");
            EmbeddingError::Transport(e.to_string())
        })?;

        let mut data = check_status(response)
            .await?
            .json::<EmbeddingResponse>()
            .await
            .map_err(|e| EmbeddingError::Parse(e.to_string()))?
            .data;
        // Servers may return items out of order; `index` is authoritative.
        data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

fn embeddings_endpoint(base_url: &str) -> String {
    let normalized = base_url.trim_end_matches('/');
    if normalized.ends_with("/embeddings") {
        normalized.to_string()
    } else if normalized.ends_with("/v1") {
        format!("{normalized}/embeddings")
    } else {
        format!("{normalized}/v1/embeddings")
    }
}
