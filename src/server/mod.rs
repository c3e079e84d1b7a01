//! HTTP front end.
//!
//! ## URL layout
//!
//! ```text
//! GET       /          chat page (issues the session cookie)
//! GET|POST  /get       form field `msg` → plain-text reply
//! POST      /clear     forget this session's conversation
//! GET       /history   this session's messages as JSON
//! GET       /health    liveness + which backends are enabled
//! GET       /favicon.ico → 204
//! ```
//!
//! Sessions are identified by a signed `medichat_session` cookie holding a
//! random UUID.

mod api;
mod ui;

use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::chat::ChatService;
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "medichat_session";

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    key: Key,
}

impl AppState {
    pub fn new(chat: ChatService, session_secret: Option<&str>) -> Self {
        Self { chat: Arc::new(chat), key: session_key(session_secret) }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

/// Cookie signing key. Derived from the configured secret so sessions survive
/// restarts; random (sessions reset on restart) when none is set.
fn session_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) => Key::from(Sha512::digest(secret.as_bytes()).as_slice()),
        None => {
            warn!("MEDICHAT_SESSION_SECRET not set, using a random cookie key");
            Key::generate()
        }
    }
}

// ── Server loop ───────────────────────────────────────────────────────────────

pub async fn run(bind_addr: &str, state: AppState, shutdown: CancellationToken) -> Result<(), AppError> {
    let router = build_router(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%bind_addr, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("http server error: {e}")))?;

    info!("http server shut down");
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/",            get(ui::root))
        .route("/get",         get(api::chat).post(api::chat))
        .route("/clear",       post(api::clear))
        .route("/history",     get(api::history))
        .route("/health",      get(api::health))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .with_state(state)
}
