mod analysis;
mod config;
mod db;
mod errors;
mod ingest;
mod llm_client;
mod mailer;
mod models;
mod notifications;
mod routes;
mod scoring;
mod state;
mod storage;

use anyhow::Result;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::mailer::Mailer;
use crate::notifications::NotificationService;
use crate::routes::build_router;
use crate::scoring::GeminiScorer;
use crate::state::AppState;
use crate::storage::build_storage;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration errors (bad numbers, inverted thresholds) stop startup.
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Recruit API v{}", env!("CARGO_PKG_VERSION"));

    let storage = build_storage(&config).await?;

    // Scoring calls fail per analysis until a key is configured.
    if config.gemini_api_key.trim().is_empty() {
        warn!("GEMINI_API_KEY is not set; analyses will fail until it is configured");
    }
    let llm = LlmClient::new(config.gemini_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let mailer = Mailer::from_config(&config.smtp)?;
    if !mailer.is_enabled() {
        warn!("Completion emails disabled; set SMTP_USER and SMTP_PASS to enable them");
    }
    info!(
        "Thresholds: shortlist >= {}, reject < {}",
        config.thresholds.shortlist, config.thresholds.rejection
    );

    let state = AppState {
        storage,
        scorer: Arc::new(GeminiScorer(llm)),
        notifications: Arc::new(NotificationService::new()),
        mailer: Arc::new(mailer),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
