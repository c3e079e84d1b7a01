//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory (or
//! the file named by `MEDICHAT_CONFIG`), then applies `MEDICHAT_*` overrides.
//! API keys are only ever taken from the environment.
//!
//! # Module layout
//!
//! - **types** — public structs consumed by the binaries (`Config`,
//!   `LlmConfig`, `VectorDbConfig`, …).
//! - **raw** — private TOML deserialization types with serde defaults.
//! - **load** — `load`, `load_from`, `expand_home`.

mod load;
mod raw;
mod types;

pub use load::{expand_home, load, load_from};
pub use types::*;

impl Config {
    /// `Config` for tests: dummy LLM, no API keys, unroutable endpoints.
    pub fn test_default() -> Self {
        Self {
            log_level: "info".into(),
            server: ServerConfig {
                bind: "127.0.0.1:0".into(),
                session_secret: Some("test-secret".into()),
            },
            llm: LlmConfig {
                provider: "dummy".into(),
                display_name: "Groq".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    max_tokens: None,
                    timeout_seconds: 1,
                },
            },
            embedding: EmbeddingConfig {
                provider: "huggingface".into(),
                api_base_url: "http://localhost:0".into(),
                model: "test-embedder".into(),
                dimension: 4,
                batch_size: 2,
                timeout_seconds: 1,
            },
            vectordb: VectorDbConfig {
                control_plane_url: "http://localhost:0".into(),
                api_version: "2025-01".into(),
                index_name: "test-index".into(),
                dimension: 4,
                metric: "cosine".into(),
                cloud: "aws".into(),
                region: "us-east-1".into(),
                namespace: String::new(),
                top_k: 3,
                upsert_batch_size: 2,
                timeout_seconds: 1,
                poll_interval_ms: 1,
                ready_timeout_seconds: 1,
            },
            memory: MemoryConfig { window: 10 },
            ingest: IngestConfig {
                data_dir: "data".into(),
                chunk_size: 500,
                chunk_overlap: 20,
                min_chars: 1,
                smoke_query: "What are the symptoms of diabetes?".into(),
            },
            secrets: Secrets::default(),
        }
    }
}
