//! Public configuration structs consumed by the server and the indexer.

use std::path::PathBuf;

/// Fully-resolved configuration for both binaries.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub vectordb: VectorDbConfig,
    pub memory: MemoryConfig,
    pub ingest: IngestConfig,
    /// Credentials sourced from the environment. Never read from TOML.
    pub secrets: Secrets,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the HTTP listener binds to.
    pub bind: String,
    /// Master secret the session-cookie signing key is derived from.
    /// `None` means a random key per process.
    pub session_secret: Option<String>,
}

/// Chat-completion provider configuration (`[llm]`).
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which backend is active: `"groq"`, `"openai"`, `"openai-compatible"`
    /// or `"dummy"`.
    pub provider: String,
    /// Name used in user-facing error replies (e.g. `"Groq"`).
    pub display_name: String,
    pub openai: OpenAiConfig,
}

/// OpenAI-compatible endpoint settings (`[llm.openai]`). Groq speaks this
/// protocol, so it is the default backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_seconds: u64,
}

/// Embedding service configuration (`[embedding]`).
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// `"huggingface"` (feature-extraction pipeline) or `"openai"`
    /// (`/v1/embeddings`).
    pub provider: String,
    pub api_base_url: String,
    pub model: String,
    /// Expected vector length; responses of any other length are rejected.
    pub dimension: usize,
    pub batch_size: usize,
    pub timeout_seconds: u64,
}

/// Pinecone configuration (`[vectordb]`).
#[derive(Debug, Clone)]
pub struct VectorDbConfig {
    pub control_plane_url: String,
    pub api_version: String,
    pub index_name: String,
    /// Index dimension; always equal to `embedding.dimension`.
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
    pub namespace: String,
    /// Number of chunks retrieved per chat turn.
    pub top_k: usize,
    pub upsert_batch_size: usize,
    pub timeout_seconds: u64,
    pub poll_interval_ms: u64,
    pub ready_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Number of (human, ai) exchanges kept per session.
    pub window: usize,
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub data_dir: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Pages whose trimmed text is shorter than this are dropped.
    pub min_chars: usize,
    pub smoke_query: String,
}

/// API keys, each `None` when its env var is unset or empty.
#[derive(Clone, Default)]
pub struct Secrets {
    pub llm_api_key: Option<String>,
    pub vectordb_api_key: Option<String>,
    pub embedding_api_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |s: &Option<String>| if s.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Secrets")
            .field("llm_api_key", &mask(&self.llm_api_key))
            .field("vectordb_api_key", &mask(&self.vectordb_api_key))
            .field("embedding_api_key", &mask(&self.embedding_api_key))
            .finish()
    }
}

/// Values taken from the process environment. Tests build this directly
/// instead of mutating env vars.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub log_level: Option<String>,
    pub bind: Option<String>,
    pub data_dir: Option<String>,
    pub session_secret: Option<String>,
    pub groq_api_key: Option<String>,
    pub pinecone_api_key: Option<String>,
    pub hf_token: Option<String>,
    pub embedding_api_key: Option<String>,
}
