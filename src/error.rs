//! Application-wide error types.
//!
//! Remote-service clients carry their own error enums (`ProviderError`,
//! `EmbeddingError`, `VectorDbError`); they are folded into [`AppError`] only
//! at the binary boundary, usually as an ingestion stage failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("{stage} failed: {message}")]
    Ingest { stage: &'static str, message: String },
}

impl AppError {
    /// Wrap any displayable error as a failure of the named ingestion stage.
    pub fn ingest(stage: &'static str, err: impl std::fmt::Display) -> Self {
        AppError::Ingest { stage, message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(e.to_string().contains("missing field"));
        assert!(e.to_string().starts_with("config error"));
    }

    #[test]
    fn logger_error_display() {
        let e = AppError::Logger("already initialized".into());
        assert!(e.to_string().contains("already initialized"));
    }

    #[test]
    fn ingest_error_names_stage() {
        let e = AppError::ingest("load pdfs", "no such directory");
        assert_eq!(e.to_string(), "load pdfs failed: no such directory");
    }
}
