mod adaptive;
mod assessment;
mod config;
mod db;
mod errors;
mod jobs;
mod llm_client;
mod models;
mod profiles;
mod questionnaire;
mod roadmap;
mod routes;
mod state;
mod store;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::jobs::JobRegistry;
use crate::llm_client::GeminiClient;
use crate::profiles::PgProfileStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::FileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pathfinder API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (psychometric profiles)
    let db = create_pool(&config.database_url).await?;
    let profiles = Arc::new(PgProfileStore::new(db));

    // Initialize completion client
    let llm = Arc::new(GeminiClient::new(config.gemini_api_key.clone()));
    info!("Completion client initialized (model: {})", llm_client::MODEL);

    // Per-user document store
    let store = Arc::new(FileStore::new(config.data_dir.clone()));
    info!("Document store rooted at {}", config.data_dir.display());

    let state = AppState {
        profiles,
        llm,
        store,
        jobs: JobRegistry::new(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
