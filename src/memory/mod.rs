//! Per-session conversation memory.
//!
//! Process-local only; everything is lost on restart. Each session keeps two
//! locks: a turn lock that serialises chat turns for that session across
//! their remote calls, and a short-lived conversation lock that readers such
//! as `/history` take without waiting on an in-flight turn.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::llm::ChatMessage;
use crate::logger::short_id;

/// One human input and the reply it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub human: String,
    pub ai: String,
}

/// Sliding window over the most recent exchanges, oldest evicted first.
#[derive(Debug, Clone)]
pub struct Conversation {
    window: usize,
    exchanges: VecDeque<Exchange>,
}

impl Conversation {
    pub fn new(window: usize) -> Self {
        Self { window, exchanges: VecDeque::with_capacity(window) }
    }

    pub fn push(&mut self, human: impl Into<String>, ai: impl Into<String>) {
        self.exchanges.push_back(Exchange { human: human.into(), ai: ai.into() });
        while self.exchanges.len() > self.window {
            self.exchanges.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Flattened `human, ai, human, ai, …` in insertion order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.exchanges
            .iter()
            .flat_map(|e| [ChatMessage::human(&e.human), ChatMessage::ai(&e.ai)])
            .collect()
    }
}

#[derive(Debug)]
struct Session {
    turn: Arc<Mutex<()>>,
    conversation: Mutex<Conversation>,
}

/// Held for the duration of one chat turn.
pub type TurnGuard = OwnedMutexGuard<()>;

/// Session id → conversation.
#[derive(Debug, Clone)]
pub struct SessionMemory {
    window: usize,
    sessions: Arc<Mutex<HashMap<String, Arc<Session>>>>,
}

impl SessionMemory {
    pub fn new(window: usize) -> Self {
        Self { window, sessions: Arc::new(Mutex::new(HashMap::new())) }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    async fn session(&self, session_id: &str) -> Arc<Session> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!(session = %short_id(session_id), "new conversation");
                Arc::new(Session {
                    turn: Arc::new(Mutex::new(())),
                    conversation: Mutex::new(Conversation::new(self.window)),
                })
            })
            .clone()
    }

    /// Copy of the conversation for `session_id`, creating an empty one if
    /// unknown. The copy is detached; record exchanges with [`Self::append`].
    pub async fn get_or_create(&self, session_id: &str) -> Conversation {
        let session = self.session(session_id).await;
        let conversation = session.conversation.lock().await;
        conversation.clone()
    }

    /// Wait for any other turn in `session_id` to finish, creating the
    /// session if needed. Drop the guard once the exchange is appended.
    pub async fn begin_turn(&self, session_id: &str) -> TurnGuard {
        let turn = self.session(session_id).await.turn.clone();
        turn.lock_owned().await
    }

    /// Record one exchange; returns the number of exchanges now kept.
    pub async fn append(&self, session_id: &str, human: &str, ai: &str) -> usize {
        let session = self.session(session_id).await;
        let mut conversation = session.conversation.lock().await;
        conversation.push(human, ai);
        conversation.len()
    }

    /// Drop the conversation entirely. A turn already in flight records its
    /// exchange into the session created after the clear.
    pub async fn clear(&self, session_id: &str) -> bool {
        self.sessions.lock().await.remove(session_id).is_some()
    }

    /// Ordered messages for `session_id`; empty (and nothing created) when unknown.
    pub async fn list(&self, session_id: &str) -> Vec<ChatMessage> {
        let session = self.sessions.lock().await.get(session_id).cloned();
        match session {
            Some(s) => s.conversation.lock().await.messages(),
            None => Vec::new(),
        }
    }

    #[cfg(test)]
    async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
