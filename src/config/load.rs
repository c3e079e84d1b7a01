//! Configuration loading with env-var overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::logger;

use super::raw::{self, RawConfig};
use super::types::*;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

impl EnvOverrides {
    /// Read every override and credential from the process environment.
    /// Empty values count as unset.
    pub fn from_process() -> Self {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            log_level: var("MEDICHAT_LOG_LEVEL"),
            bind: var("MEDICHAT_BIND"),
            data_dir: var("MEDICHAT_DATA_DIR"),
            session_secret: var("MEDICHAT_SESSION_SECRET"),
            groq_api_key: var("GROQ_API_KEY"),
            pinecone_api_key: var("PINECONE_API_KEY"),
            hf_token: var("HF_TOKEN"),
            embedding_api_key: var("EMBEDDING_API_KEY"),
        }
    }
}

/// Load config from `MEDICHAT_CONFIG`, or `config/default.toml`, then apply
/// env-var overrides. A missing default file falls back to built-in defaults;
/// a missing explicitly named file is an error.
pub fn load() -> Result<Config, AppError> {
    let overrides = EnvOverrides::from_process();
    match env::var("MEDICHAT_CONFIG").ok().filter(|p| !p.is_empty()) {
        Some(path) => load_from(&expand_home(&path), &overrides),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                load_from(default_path, &overrides)
            } else {
                resolve(RawConfig::default(), &overrides)
            }
        }
    }
}

/// Load from an explicit path with the given overrides.
pub fn load_from(path: &Path, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    let raw: RawConfig = toml::from_str(&text)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;
    resolve(raw, overrides)
}

fn resolve(raw: RawConfig, ov: &EnvOverrides) -> Result<Config, AppError> {
    let log_level = ov
        .log_level
        .clone()
        .or(raw.log_level)
        .unwrap_or_else(raw::default_log_level);
    logger::parse_level(&log_level)
        .map_err(|e| AppError::Config(format!("log_level: {e}")))?;

    let dimension = raw.embedding.dimension;

    let embedding_api_key = match raw.embedding.provider.as_str() {
        "huggingface" => ov.hf_token.clone(),
        _ => ov.embedding_api_key.clone(),
    };

    let config = Config {
        log_level,
        server: ServerConfig {
            bind: ov.bind.clone().unwrap_or(raw.server.bind),
            session_secret: ov.session_secret.clone(),
        },
        llm: LlmConfig {
            provider: raw.llm.provider,
            display_name: raw.llm.display_name,
            openai: OpenAiConfig {
                api_base_url: raw.llm.openai.api_base_url,
                model: raw.llm.openai.model,
                temperature: raw.llm.openai.temperature,
                max_tokens: raw.llm.openai.max_tokens.filter(|n| *n > 0),
                timeout_seconds: raw.llm.openai.timeout_seconds,
            },
        },
        embedding: EmbeddingConfig {
            provider: raw.embedding.provider,
            api_base_url: raw.embedding.api_base_url,
            model: raw.embedding.model,
            dimension,
            batch_size: raw.embedding.batch_size,
            timeout_seconds: raw.embedding.timeout_seconds,
        },
        vectordb: VectorDbConfig {
            control_plane_url: raw.vectordb.control_plane_url,
            api_version: raw.vectordb.api_version,
            index_name: raw.vectordb.index_name,
            dimension,
            metric: raw.vectordb.metric,
            cloud: raw.vectordb.cloud,
            region: raw.vectordb.region,
            namespace: raw.vectordb.namespace,
            top_k: raw.vectordb.top_k,
            upsert_batch_size: raw.vectordb.upsert_batch_size,
            timeout_seconds: raw.vectordb.timeout_seconds,
            poll_interval_ms: raw.vectordb.poll_interval_ms,
            ready_timeout_seconds: raw.vectordb.ready_timeout_seconds,
        },
        memory: MemoryConfig { window: raw.memory.window },
        ingest: IngestConfig {
            data_dir: expand_home(ov.data_dir.as_deref().unwrap_or(&raw.ingest.data_dir)),
            chunk_size: raw.ingest.chunk_size,
            chunk_overlap: raw.ingest.chunk_overlap,
            min_chars: raw.ingest.min_chars,
            smoke_query: raw.ingest.smoke_query,
        },
        secrets: Secrets {
            llm_api_key: ov.groq_api_key.clone(),
            vectordb_api_key: ov.pinecone_api_key.clone(),
            embedding_api_key,
        },
    };

    validate(&config)?;
    Ok(config)
}

fn validate(c: &Config) -> Result<(), AppError> {
    let nonzero = [
        ("embedding.dimension", c.embedding.dimension),
        ("embedding.batch_size", c.embedding.batch_size),
        ("vectordb.top_k", c.vectordb.top_k),
        ("vectordb.upsert_batch_size", c.vectordb.upsert_batch_size),
        ("memory.window", c.memory.window),
        ("ingest.chunk_size", c.ingest.chunk_size),
    ];
    for (name, value) in nonzero {
        if value == 0 {
            return Err(AppError::Config(format!("{name} must be > 0")));
        }
    }
    if c.ingest.chunk_overlap >= c.ingest.chunk_size {
        return Err(AppError::Config(format!(
            "ingest.chunk_overlap ({}) must be smaller than ingest.chunk_size ({})",
            c.ingest.chunk_overlap, c.ingest.chunk_size
        )));
    }
    Ok(())
}

/// Expand a leading `~` to the user's home directory.
/// Paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
