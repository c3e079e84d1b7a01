//! Chat page served at `/`.
//!
//! Self-contained: inline CSS and a small script that posts `msg` to `/get`,
//! replays `/history` on load and calls `/clear`.

use axum::response::{Html, IntoResponse};
use axum_extra::extract::cookie::SignedCookieJar;

use super::api::ensure_session;

const CHAT_PAGE_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Medical Chatbot</title>
  <style>
    *, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
    body {
      font-family: system-ui, -apple-system, sans-serif;
      background: #f2f5f7; color: #1d2a33;
      display: flex; justify-content: center; height: 100vh;
    }
    .chat {
      display: flex; flex-direction: column;
      width: 100%; max-width: 720px; height: 100%;
      background: #fff; border-left: 1px solid #dde3e8; border-right: 1px solid #dde3e8;
    }
    header {
      display: flex; align-items: center; justify-content: space-between;
      padding: 1rem 1.25rem; border-bottom: 1px solid #dde3e8;
    }
    header h1 { font-size: 1.1rem; }
    header p  { font-size: 0.8rem; color: #6b7b86; }
    #messages { flex: 1; overflow-y: auto; padding: 1rem 1.25rem; }
    .msg {
      max-width: 80%; margin-bottom: 0.75rem; padding: 0.6rem 0.9rem;
      border-radius: 12px; white-space: pre-wrap; line-height: 1.4;
    }
    .human { margin-left: auto; background: #1f7a8c; color: #fff; }
    .ai    { margin-right: auto; background: #eef2f5; }
    .pending { opacity: 0.6; font-style: italic; }
    form { display: flex; gap: 0.5rem; padding: 1rem 1.25rem; border-top: 1px solid #dde3e8; }
    input[type=text] {
      flex: 1; padding: 0.6rem 0.8rem;
      border: 1px solid #c9d3da; border-radius: 8px; font-size: 0.95rem;
    }
    button {
      padding: 0.6rem 1rem; border: 0; border-radius: 8px;
      background: #1f7a8c; color: #fff; font-size: 0.9rem; cursor: pointer;
    }
    button.secondary { background: #eef2f5; color: #1d2a33; }
    button:disabled { opacity: 0.5; cursor: default; }
  </style>
</head>
<body>
  <div class="chat">
    <header>
      <div>
        <h1>Medical Chatbot</h1>
        <p>General health information. Always consult a healthcare professional.</p>
      </div>
      <button id="clear" class="secondary" type="button">New conversation</button>
    </header>
    <div id="messages"></div>
    <form id="composer" autocomplete="off">
      <input id="msg" name="msg" type="text" placeholder="Ask a medical question..." required />
      <button id="send" type="submit">Send</button>
    </form>
  </div>
  <script>
    const messages = document.getElementById("messages");
    const composer = document.getElementById("composer");
    const input = document.getElementById("msg");
    const send = document.getElementById("send");

    function append(kind, text) {
      const div = document.createElement("div");
      div.className = "msg " + kind;
      div.textContent = text;
      messages.appendChild(div);
      messages.scrollTop = messages.scrollHeight;
      return div;
    }

    async function loadHistory() {
      const res = await fetch("/history");
      if (!res.ok) return;
      const body = await res.json();
      for (const m of body.history) append(m.type, m.content);
    }

    composer.addEventListener("submit", async (ev) => {
      ev.preventDefault();
      const text = input.value.trim();
      if (!text) return;
      append("human", text);
      input.value = "";
      send.disabled = true;
      const pending = append("ai pending", "Thinking...");
      try {
        const res = await fetch("/get", {
          method: "POST",
          headers: { "Content-Type": "application/x-www-form-urlencoded" },
          body: new URLSearchParams({ msg: text }),
        });
        pending.textContent = await res.text();
      } catch (err) {
        pending.textContent = "Network error: " + err;
      }
      pending.className = "msg ai";
      send.disabled = false;
      input.focus();
    });

    document.getElementById("clear").addEventListener("click", async () => {
      await fetch("/clear", { method: "POST" });
      messages.innerHTML = "";
    });

    loadHistory();
  </script>
</body>
</html>
"#;

/// GET / — chat page; starts a session if the browser has none.
pub(super) async fn root(jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, _) = ensure_session(jar);
    (jar, Html(CHAT_PAGE_HTML))
}
