//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations. Add a new
//! variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities; clone them freely.
//! `complete` takes the whole message sequence (system, history, new input);
//! conversation state lives in [`crate::memory`], not here.

pub mod providers;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Messages ──────────────────────────────────────────────────────────────────

/// Author of a chat message. Serialises as `"system"`, `"human"`, `"ai"`,
/// which is also the shape `/history` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self { role: Role::Human, content: content.into() }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self { role: Role::Ai, content: content.into() }
    }
}

/// Token usage reported by the provider, when available.
#[derive(Debug, Clone, Copy, Default)]
pub struct LlmUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Option<LlmUsage>,
}

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider config error: {0}")]
    Config(String),
    #[error("provider request failed: {0}")]
    Transport(String),
    #[error("HTTP {status}{}: {message}", code.as_deref().map(|c| format!(" [code={c}]")).unwrap_or_default())]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("failed to parse provider response: {0}")]
    Parse(String),
}

/// User-facing failure taxonomy for a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Quota,
    RateLimit,
    Auth,
    Other,
}

impl ProviderError {
    /// Classify the failure. Structured fields (HTTP status, error code) are
    /// consulted first; the message text is the fallback.
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::Api { status, code, message } => {
                let hint = format!("{} {message}", code.as_deref().unwrap_or_default());
                match classify_text(&hint) {
                    Some(kind) => kind,
                    None if *status == 429 => FailureKind::Quota,
                    None if *status == 401 || *status == 403 => FailureKind::Auth,
                    None => FailureKind::Other,
                }
            }
            ProviderError::Transport(msg) | ProviderError::Parse(msg) | ProviderError::Config(msg) => {
                classify_text(msg).unwrap_or(FailureKind::Other)
            }
            ProviderError::UnknownProvider(_) => FailureKind::Other,
        }
    }
}

fn classify_text(text: &str) -> Option<FailureKind> {
    let lower = text.to_lowercase();
    if lower.contains("insufficient_quota") {
        Some(FailureKind::Quota)
    } else if lower.contains("rate_limit") {
        Some(FailureKind::RateLimit)
    } else if lower.contains("api_key") || lower.contains("authentication") {
        Some(FailureKind::Auth)
    } else {
        None
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
}

impl LlmProvider {
    /// Send the message sequence to the provider and return its reply.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<LlmResponse, ProviderError> {
        match self {
            LlmProvider::Dummy(p) => p.complete(messages).await,
            LlmProvider::OpenAiCompatible(p) => p.complete(messages).await,
        }
    }

    /// Model identifier for startup logs.
    pub fn model(&self) -> &str {
        match self {
            LlmProvider::Dummy(_) => "dummy",
            LlmProvider::OpenAiCompatible(p) => p.model(),
        }
    }
}
