//! Campus chat - terminal client for the university assistant
//!
//! Wires the Gemini-backed completion client into the chat orchestrator
//! and drives it from stdin.

mod completion;
mod config;
mod identity;
mod language;
mod llm;
mod reveal;
mod runtime;
mod state_machine;
mod system_prompt;
mod terminal;
mod transcript;

use completion::{CompletionClient, TokioSleeper};
use config::ChatConfig;
use llm::{GeminiService, LlmService, LoggingService};
use runtime::ChatHandle;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout belongs to the conversation, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_chat=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ChatConfig::from_env();
    if !config.has_api_key() {
        tracing::warn!("GEMINI_API_KEY is not set; every question will fail to connect");
    }
    tracing::info!(app_id = %config.app_id, model = %config.gemini.model, "Configuration loaded");

    // The id is informational only; the chat never waits on it
    let identity_config = config.identity.clone();
    tokio::spawn(async move {
        let user_id = identity::bootstrap_identity(&identity_config).await;
        tracing::info!(user_id = %user_id, "Session identity ready");
    });

    let gemini: Arc<dyn LlmService> = Arc::new(GeminiService::new(config.gemini.clone())?);
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(gemini));
    let completer = CompletionClient::new(llm, TokioSleeper);

    let (handle, ui_rx) = ChatHandle::spawn(completer, config.language);
    terminal::run(handle, ui_rx, config.language).await?;

    Ok(())
}
