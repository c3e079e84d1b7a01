//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults, so an
//! empty file is a valid config. The `load` module resolves them into the
//! public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub server: RawServer,
    #[serde(default)]
    pub llm: RawLlm,
    #[serde(default)]
    pub embedding: RawEmbedding,
    #[serde(default)]
    pub vectordb: RawVectorDb,
    #[serde(default)]
    pub memory: RawMemory,
    #[serde(default)]
    pub ingest: RawIngest,
}

// ── Server ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawServer {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for RawServer {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

// ── LLM ──────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_display_name")]
    pub display_name: String,
    #[serde(default)]
    pub openai: RawOpenAi,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            display_name: default_llm_display_name(),
            openai: RawOpenAi::default(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawOpenAi {
    #[serde(default = "default_llm_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_llm_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawOpenAi {
    fn default() -> Self {
        Self {
            api_base_url: default_llm_api_base_url(),
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            max_tokens: default_llm_max_tokens(),
            timeout_seconds: default_llm_timeout_seconds(),
        }
    }
}

// ── Embedding ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawEmbedding {
    #[serde(rename = "default", default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    #[serde(default = "default_embedding_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_remote_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawEmbedding {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            api_base_url: default_embedding_api_base_url(),
            model: default_embedding_model(),
            dimension: default_dimension(),
            batch_size: default_embedding_batch_size(),
            timeout_seconds: default_remote_timeout_seconds(),
        }
    }
}

// ── Vector database ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawVectorDb {
    #[serde(default = "default_control_plane_url")]
    pub control_plane_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_index_name")]
    pub index_name: String,
    #[serde(default = "default_metric")]
    pub metric: String,
    #[serde(default = "default_cloud")]
    pub cloud: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_upsert_batch_size")]
    pub upsert_batch_size: usize,
    #[serde(default = "default_remote_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_ready_timeout_seconds")]
    pub ready_timeout_seconds: u64,
}

impl Default for RawVectorDb {
    fn default() -> Self {
        Self {
            control_plane_url: default_control_plane_url(),
            api_version: default_api_version(),
            index_name: default_index_name(),
            metric: default_metric(),
            cloud: default_cloud(),
            region: default_region(),
            namespace: String::new(),
            top_k: default_top_k(),
            upsert_batch_size: default_upsert_batch_size(),
            timeout_seconds: default_remote_timeout_seconds(),
            poll_interval_ms: default_poll_interval_ms(),
            ready_timeout_seconds: default_ready_timeout_seconds(),
        }
    }
}

// ── Memory ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawMemory {
    #[serde(default = "default_window")]
    pub window: usize,
}

impl Default for RawMemory {
    fn default() -> Self {
        Self { window: default_window() }
    }
}

// ── Ingest ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawIngest {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    #[serde(default = "default_smoke_query")]
    pub smoke_query: String,
}

impl Default for RawIngest {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            min_chars: default_min_chars(),
            smoke_query: default_smoke_query(),
        }
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

pub(super) fn default_log_level() -> String { "info".to_string() }
pub(super) fn default_bind() -> String { "0.0.0.0:8080".to_string() }

fn default_llm_provider() -> String { "groq".to_string() }
fn default_llm_display_name() -> String { "Groq".to_string() }
fn default_llm_api_base_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}
fn default_llm_model() -> String { "llama-3.1-8b-instant".to_string() }
fn default_llm_temperature() -> f32 { 0.3 }
fn default_llm_max_tokens() -> Option<u32> { Some(1000) }
fn default_llm_timeout_seconds() -> u64 { 60 }

fn default_embedding_provider() -> String { "huggingface".to_string() }
fn default_embedding_api_base_url() -> String {
    "https://router.huggingface.co/hf-inference/models".to_string()
}
fn default_embedding_model() -> String { "sentence-transformers/all-MiniLM-L6-v2".to_string() }
fn default_dimension() -> usize { 384 }
fn default_embedding_batch_size() -> usize { 32 }
fn default_remote_timeout_seconds() -> u64 { 30 }

fn default_control_plane_url() -> String { "https://api.pinecone.io".to_string() }
fn default_api_version() -> String { "2025-01".to_string() }
fn default_index_name() -> String { "medical-chatbot".to_string() }
fn default_metric() -> String { "cosine".to_string() }
fn default_cloud() -> String { "aws".to_string() }
fn default_region() -> String { "us-east-1".to_string() }
fn default_top_k() -> usize { 3 }
fn default_upsert_batch_size() -> usize { 100 }
fn default_poll_interval_ms() -> u64 { 1000 }
fn default_ready_timeout_seconds() -> u64 { 120 }

fn default_window() -> usize { 10 }

fn default_data_dir() -> String { "data".to_string() }
fn default_chunk_size() -> usize { 500 }
fn default_chunk_overlap() -> usize { 20 }
fn default_min_chars() -> usize { 1 }
fn default_smoke_query() -> String { "What are the symptoms of diabetes?".to_string() }
