//! LLM provider implementations.
//!
//! `build(config, api_key)` is the factory — called once at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod openai_compatible;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Construct the configured provider.
///
/// Hosted backends need an API key; without one this returns `Ok(None)` and
/// chat is disabled rather than failing startup. `api_key` is sourced from
/// `GROQ_API_KEY` (never TOML).
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<Option<LlmProvider>, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(Some(LlmProvider::Dummy(dummy::DummyProvider))),
        "groq" | "openai" | "openai-compatible" => {
            let Some(api_key) = api_key else {
                return Ok(None);
            };
            let oai = &config.openai;
            let p = openai_compatible::OpenAiCompatibleProvider::new(
                oai.api_base_url.clone(),
                oai.model.clone(),
                oai.temperature,
                oai.max_tokens,
                oai.timeout_seconds,
                Some(api_key),
            )?;
            Ok(Some(LlmProvider::OpenAiCompatible(p)))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}
