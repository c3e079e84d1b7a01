//! Router-level tests: drive `build_router` with `tower::ServiceExt::oneshot`
//! using the dummy LLM and disabled retrieval, so nothing leaves the process.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use medichat::chat::{ChatService, NO_LLM_REPLY};
use medichat::config::Config;
use medichat::llm::providers;
use medichat::memory::SessionMemory;
use medichat::rag::ContextRetriever;
use medichat::server::{AppState, SESSION_COOKIE, build_router};

fn app_with(llm_enabled: bool) -> Router {
    let cfg = Config::test_default();
    let llm = if llm_enabled { providers::build(&cfg.llm, None).unwrap() } else { None };
    let chat = ChatService::new(llm, "Groq", ContextRetriever::disabled(), SessionMemory::new(cfg.memory.window));
    build_router(AppState::new(chat, cfg.server.session_secret.as_deref()))
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// `name=value` from the response's `Set-Cookie`, ready for a `Cookie` header.
fn session_cookie(resp: &axum::response::Response) -> String {
    let raw = resp
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(SESSION_COOKIE))
        .expect("session cookie set");
    raw.split(';').next().unwrap().to_string()
}

async fn start_session(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    session_cookie(&resp)
}

async fn post_msg(app: &Router, cookie: &str, msg: &str) -> String {
    let body = format!("msg={}", msg.replace(' ', "+"));
    let req = Request::post("/get")
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_text(resp).await
}

async fn history(app: &Router, cookie: &str) -> Vec<Value> {
    let req = Request::get("/history").header(header::COOKIE, cookie).body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let json: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    json["history"].as_array().unwrap().clone()
}

#[tokio::test]
async fn index_serves_chat_page_and_cookie() {
    let app = app_with(true);
    let resp = app.clone().oneshot(Request::get("/").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(session_cookie(&resp).starts_with(&format!("{SESSION_COOKIE}=")));
    assert!(body_text(resp).await.contains("Medical Chatbot"));
}

#[tokio::test]
async fn chat_then_history_round_trip() {
    let app = app_with(true);
    let cookie = start_session(&app).await;

    let reply = post_msg(&app, &cookie, "I feel dizzy").await;
    assert_eq!(reply, "[echo] I feel dizzy");

    let h = history(&app, &cookie).await;
    assert_eq!(h.len(), 2);
    assert_eq!(h[0]["type"], "human");
    assert_eq!(h[0]["content"], "I feel dizzy");
    assert_eq!(h[1]["type"], "ai");
    assert_eq!(h[1]["content"], "[echo] I feel dizzy");
}

#[tokio::test]
async fn get_method_reads_query_string() {
    let app = app_with(true);
    let cookie = start_session(&app).await;
    let req = Request::get("/get?msg=hello")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/plain")
    );
    assert_eq!(body_text(resp).await, "[echo] hello");
}

#[tokio::test]
async fn history_keeps_last_ten_exchanges() {
    let app = app_with(true);
    let cookie = start_session(&app).await;
    for i in 0..12 {
        post_msg(&app, &cookie, &format!("q{i}")).await;
    }
    let h = history(&app, &cookie).await;
    assert_eq!(h.len(), 20);
    assert_eq!(h[0]["content"], "q2");
    assert_eq!(h[19]["content"], "[echo] q11");
}

#[tokio::test]
async fn clear_empties_history() {
    let app = app_with(true);
    let cookie = start_session(&app).await;
    post_msg(&app, &cookie, "hello").await;

    let req = Request::post("/clear").header(header::COOKIE, &cookie).body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let json: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["status"], "cleared");
    assert!(history(&app, &cookie).await.is_empty());
}

#[tokio::test]
async fn sessions_do_not_share_history() {
    let app = app_with(true);
    let alice = start_session(&app).await;
    let bob = start_session(&app).await;
    assert_ne!(alice, bob);
    post_msg(&app, &alice, "private question").await;
    assert!(history(&app, &bob).await.is_empty());
}

#[tokio::test]
async fn no_cookie_history_is_empty() {
    let app = app_with(true);
    let resp = app.clone().oneshot(Request::get("/history").body(Body::empty()).unwrap()).await.unwrap();
    let json: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["history"], serde_json::json!([]));
}

#[tokio::test]
async fn tampered_cookie_is_ignored() {
    let app = app_with(true);
    let cookie = start_session(&app).await;
    post_msg(&app, &cookie, "hello").await;
    let forged = format!("{SESSION_COOKIE}=forged-value");
    assert!(history(&app, &forged).await.is_empty());
}

#[tokio::test]
async fn get_without_cookie_starts_session() {
    let app = app_with(true);
    let req = Request::post("/get")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("msg=hi"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let cookie = session_cookie(&resp);
    assert_eq!(body_text(resp).await, "[echo] hi");
    assert_eq!(history(&app, &cookie).await.len(), 2);
}

#[tokio::test]
async fn missing_msg_is_bad_request() {
    let app = app_with(true);
    let req = Request::post("/get")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("other=1"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn without_llm_returns_fixed_message() {
    let app = app_with(false);
    let cookie = start_session(&app).await;
    assert_eq!(post_msg(&app, &cookie, "hello").await, NO_LLM_REPLY);
    assert!(history(&app, &cookie).await.is_empty());
}

#[tokio::test]
async fn without_llm_missing_msg_still_gets_fixed_message() {
    let app = app_with(false);
    let req = Request::post("/get")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert!(
        resp.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/plain")
    );
    assert_eq!(body_text(resp).await, NO_LLM_REPLY);

    let resp = app.clone().oneshot(Request::get("/get").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, NO_LLM_REPLY);
}

#[tokio::test]
async fn health_reports_backends() {
    let app = app_with(true);
    let resp = app.clone().oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    let json: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json, serde_json::json!({ "status": "ok", "llm": true, "retrieval": false }));
}
