mod auth;
mod catalog;
mod config;
mod db;
mod errors;
mod llm_client;
mod refinement;
mod routes;
mod state;
mod submissions;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::refinement::{AbstractRefiner, LlmAbstractRefiner, UnconfiguredRefiner};
use crate::routes::build_router;
use crate::state::AppState;
use crate::submissions::store::SubmissionStore;

#[tokio::main]
async fn main() -> Result<()> {
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

    info!("Starting EcoInvent API v{}", env!("CARGO_PKG_VERSION"));

    // The database file is opened lazily so that an absent file reads as "no submissions yet".
    let store = SubmissionStore::new(config.database_path.clone());
    info!("Submission store at {}", store.path().display());

    let refiner: Arc<dyn AbstractRefiner> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmAbstractRefiner(llm))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; abstract refinement is disabled");
            Arc::new(UnconfiguredRefiner)
        }
    };

    if config.admin_api_token.is_none() {
        warn!("ADMIN_API_TOKEN not set; admin routes are unauthenticated");
    }

    let state = AppState {
        store,
        refiner,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
