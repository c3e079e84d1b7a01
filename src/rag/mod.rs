//! Retrieval-augmented prompting: fetch context for a query, then fold it
//! together with history into the message sequence the LLM sees.

pub mod prompt;
pub mod retriever;

pub use prompt::{SYSTEM_PROMPT, build_messages};
pub use retriever::{ContextRetriever, NO_CONTEXT, Retrieved};
