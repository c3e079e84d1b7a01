//! Healthcare information chatbot.
//!
//! Two entry points share this library:
//!
//! - `medichat` — the web server ([`server`]) answering chat turns with
//!   retrieval-augmented prompts ([`chat`], [`rag`]).
//! - `medichat-index` — the offline PDF indexer ([`ingest`]).

pub mod chat;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod logger;
pub mod memory;
pub mod rag;
pub mod server;
pub mod vectordb;
