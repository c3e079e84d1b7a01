//! Chat and session handlers.
//!
//! Every handler returns `(SignedCookieJar, Response)`-shaped output so a
//! newly minted session cookie rides along with the reply.

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::NO_LLM_REPLY;
use crate::logger::short_id;

use super::{AppState, SESSION_COOKIE};

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct ChatForm {
    msg: String,
}

// ── Session helpers ───────────────────────────────────────────────────────────

/// Session id from the signed cookie, if present and untampered.
pub(super) fn current_session(jar: &SignedCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Existing session id, or a fresh one with its cookie added to the jar.
pub(super) fn ensure_session(jar: SignedCookieJar) -> (SignedCookieJar, String) {
    if let Some(id) = current_session(&jar) {
        return (jar, id);
    }
    let id = Uuid::new_v4().to_string();
    let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    info!(session = %short_id(&id), "new session");
    (jar.add(cookie), id)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET|POST /get — one chat turn. Always 200 `text/plain` once `msg` parses.
///
/// Without an LLM the fixed reply is returned before the form is looked at.
pub(super) async fn chat(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    form: Result<Form<ChatForm>, FormRejection>,
) -> Response {
    if !state.chat.llm_enabled() {
        return NO_LLM_REPLY.into_response();
    }
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            warn!(error = %rejection, "rejected /get request");
            return (StatusCode::BAD_REQUEST, rejection.body_text()).into_response();
        }
    };
    let (jar, session_id) = ensure_session(jar);
    let reply = state.chat.reply(&session_id, &form.msg).await;
    (jar, reply).into_response()
}

/// POST /clear
pub(super) async fn clear(State(state): State<AppState>, jar: SignedCookieJar) -> Json<serde_json::Value> {
    if let Some(session_id) = current_session(&jar) {
        if state.chat.memory().clear(&session_id).await {
            info!(session = %short_id(&session_id), "cleared conversation history");
        }
    }
    Json(json!({ "status": "cleared" }))
}

/// GET /history
pub(super) async fn history(State(state): State<AppState>, jar: SignedCookieJar) -> Json<serde_json::Value> {
    let messages = match current_session(&jar) {
        Some(session_id) => state.chat.memory().list(&session_id).await,
        None => Vec::new(),
    };
    Json(json!({ "history": messages }))
}

/// GET /health
pub(super) async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "llm": state.chat.llm_enabled(),
        "retrieval": state.chat.retrieval_enabled(),
    }))
}
