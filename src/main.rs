mod config;
mod error;
mod llm;
mod routes;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::services::assistant::GeminiSessionFactory;
use crate::services::history::HistoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sheetmaster=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let state = state::AppState::new(HistoryStore::new(config.history_path.clone()), GeminiSessionFactory::from_env());

    // Non-fatal: a missing credential leaves the assistant unavailable and
    // it is retried on the first message.
    if state.assistant.lock().await.ensure_session() {
        tracing::info!("assistant session initialized");
    }

    let app = routes::app(state, &config.static_dir);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;

    tracing::info!(port = config.port, history = %config.history_path.display(), "sheetmaster listening");
    axum::serve(listener, app).await?;
    Ok(())
}
