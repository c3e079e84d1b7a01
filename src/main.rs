//! Medichat web server.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config (TOML + env overrides)
//!   3. Init logger
//!   4. Build the LLM provider (absent key → chat disabled)
//!   5. Connect the retriever (absent key or failure → no-context mode)
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Serve until shutdown

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use medichat::chat::ChatService;
use medichat::error::AppError;
use medichat::llm::providers;
use medichat::memory::SessionMemory;
use medichat::rag::ContextRetriever;
use medichat::server::{self, AppState};
use medichat::{config, logger};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    let prefer_level = std::env::var_os("MEDICHAT_LOG_LEVEL").is_some();
    logger::init(&config.log_level, prefer_level)?;

    info!(
        bind = %config.server.bind,
        log_level = %config.log_level,
        memory_window = config.memory.window,
        "config loaded"
    );

    let llm = providers::build(&config.llm, config.secrets.llm_api_key.clone())
        .map_err(|e| AppError::Config(e.to_string()))?;
    match &llm {
        Some(p) => info!(provider = %config.llm.display_name, model = %p.model(), "llm ready"),
        None => warn!("no GROQ_API_KEY found, chat is disabled"),
    }

    let retriever = ContextRetriever::from_config(&config).await;

    let chat = ChatService::new(
        llm,
        config.llm.display_name.clone(),
        retriever,
        SessionMemory::new(config.memory.window),
    );
    info!(
        llm = chat.llm_enabled(),
        retrieval = chat.retrieval_enabled(),
        "starting medical chatbot"
    );

    let state = AppState::new(chat, config.server.session_secret.as_deref());

    // Shared shutdown token — Ctrl-C cancels it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    server::run(&config.server.bind, state, shutdown).await
}
