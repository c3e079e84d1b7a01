//! Hugging Face Inference feature-extraction pipeline.
//!
//! `POST {base}/{model}/pipeline/feature-extraction` with `{"inputs": [...]}`
//! returns one pooled vector per input for sentence-transformers models.

use reqwest::Client;
use serde::Serialize;
use tracing::error;

use super::{EmbeddingError, check_status};

#[derive(Debug, Clone)]
pub struct HuggingFaceEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimension: usize,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
}

impl HuggingFaceEmbedder {
    pub fn new(client: Client, base_url: &str, model: &str, dimension: usize, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: feature_extraction_endpoint(base_url, model),
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
            .json(&FeatureExtractionRequest { inputs: texts });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            error!(url = %self.endpoint, error = %e, "embedding request failed (transport)");
            EmbeddingError::Transport(e.to_string())
        })?;

        check_status(response)
            .await?
            .json::<Vec<Vec<f32>>>()
            .await
            .map_err(|e| EmbeddingError::Parse(e.to_string()))
    }
}

fn feature_extraction_endpoint(base_url: &str, model: &str) -> String {
    format!(
        "{}/{}/pipeline/feature-extraction",
        base_url.trim_end_matches('/'),
        model.trim_matches('/')
    )
}
