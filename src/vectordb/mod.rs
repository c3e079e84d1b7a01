//! Hosted vector database access.
//!
//! Only Pinecone is supported. The control plane ([`pinecone::PineconeClient`])
//! manages indexes; the data plane ([`pinecone::PineconeIndex`]) upserts and
//! queries vectors against one index host.

pub mod pinecone;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorDbError {
    #[error("vector db config error: {0}")]
    Config(String),
    #[error("vector db request failed: {0}")]
    Transport(String),
    #[error("vector db API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("failed to parse vector db response: {0}")]
    Parse(String),
    #[error("index not found: {0}")]
    NotFound(String),
    #[error("timed out waiting for {0}")]
    Timeout(String),
}

/// Metadata stored alongside every vector. `text` carries the chunk itself so
/// retrieval needs no second lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub text: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, deserialize_with = "page_number")]
    pub page: u32,
}

// Pinecone hands numeric metadata back as floats (`3.0`).
fn page_number<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let n = f64::deserialize(d)?;
    Ok(n.max(0.0) as u32)
}

/// One vector to upsert.
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: ChunkMetadata,
}

/// One similarity-search hit.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    /// `None` when the stored metadata was missing or malformed.
    pub metadata: Option<ChunkMetadata>,
}

impl QueryMatch {
    /// Chunk text, when the match carried usable metadata.
    pub fn text(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.text.as_str())
    }
}

/// Desired shape of a freshly created index.
#[derive(Debug, Clone)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
}

impl IndexSpec {
    pub fn from_config(cfg: &crate::config::VectorDbConfig) -> Self {
        Self {
            name: cfg.index_name.clone(),
            dimension: cfg.dimension,
            metric: cfg.metric.clone(),
            cloud: cfg.cloud.clone(),
            region: cfg.region.clone(),
        }
    }
}
