//! One chat turn: memory → retrieval → prompt → LLM → memory.
//!
//! Replies are always plain text. Provider failures become one of four
//! user-facing messages and are never written to memory.

use tracing::{error, info};

use crate::llm::{FailureKind, LlmProvider, ProviderError};
use crate::logger::{preview, short_id};
use crate::memory::SessionMemory;
use crate::rag::{ContextRetriever, build_messages};

pub const NO_LLM_REPLY: &str = "No AI API configured. Please add GROQ_API_KEY to your .env file.";

#[derive(Debug, Clone)]
pub struct ChatService {
    llm: Option<LlmProvider>,
    display_name: String,
    retriever: ContextRetriever,
    memory: SessionMemory,
}

impl ChatService {
    pub fn new(
        llm: Option<LlmProvider>,
        display_name: impl Into<String>,
        retriever: ContextRetriever,
        memory: SessionMemory,
    ) -> Self {
        Self { llm, display_name: display_name.into(), retriever, memory }
    }

    pub fn memory(&self) -> &SessionMemory {
        &self.memory
    }

    pub fn llm_enabled(&self) -> bool {
        self.llm.is_some()
    }

    pub fn retrieval_enabled(&self) -> bool {
        self.retriever.is_enabled()
    }

    /// Answer `input` within `session_id`'s conversation.
    pub async fn reply(&self, session_id: &str, input: &str) -> String {
        let Some(llm) = &self.llm else {
            return NO_LLM_REPLY.to_string();
        };
        info!(session = %short_id(session_id), input = %preview(input, 80), "user input");

        // Turns in one session run one after another; the history itself is
        // copied out so readers are not blocked on the remote calls below.
        let _turn = self.memory.begin_turn(session_id).await;
        let history = self.memory.get_or_create(session_id).await.messages();

        let retrieved = self.retriever.retrieve(input).await;
        let messages = build_messages(&retrieved.context, &history, input);

        match llm.complete(&messages).await {
            Ok(response) => {
                if let Some(usage) = response.usage {
                    info!(
                        input_tokens = usage.input_tokens,
                        output_tokens = usage.output_tokens,
                        "llm usage"
                    );
                }
                let kept = self.memory.append(session_id, input, &response.text).await;
                info!(
                    session = %short_id(session_id),
                    history_messages = kept * 2,
                    reply = %preview(&response.text, 80),
                    "reply generated"
                );
                response.text
            }
            Err(e) => {
                error!(session = %short_id(session_id), error = %e, "llm call failed");
                self.failure_reply(&e)
            }
        }
    }

    fn failure_reply(&self, e: &ProviderError) -> String {
        let name = &self.display_name;
        match e.kind() {
            FailureKind::Quota => format!("{name} API quota exceeded. Please check your billing and usage."),
            FailureKind::RateLimit => {
                format!("{name} API rate limit exceeded. Please wait a moment and try again.")
            }
            FailureKind::Auth => format!("{name} API key is invalid. Please check your API key configuration."),
            FailureKind::Other => format!("Error with {name}: {e}"),
        }
    }
}
