mod config;
mod db;
mod embedding;
mod errors;
mod matching;
mod models;
mod resumes;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::embedding::build_provider;
use crate::matching::artifact::build_model_store;
use crate::matching::ml_ranker::MlRanker;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{InMemoryResumeStore, PgResumeStore, ResumeStore};

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

    info!("Starting Ranker API v{}", env!("CARGO_PKG_VERSION"));

    // Resume store: PostgreSQL when configured, process memory otherwise
    let store: Arc<dyn ResumeStore> = match &config.database_url {
        Some(url) => Arc::new(PgResumeStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL is not set; resumes are kept in memory and lost on restart");
            Arc::new(InMemoryResumeStore::new())
        }
    };

    // Embedding provider (model handle is loaded lazily on first use)
    let embedder = build_provider(&config)?;
    info!("Embedding provider initialized (model: {})", embedder.model_id());

    // Hire-probability ranker, restored from the last saved artifact if any
    let model_store = build_model_store(&config).await?;
    let ranker = Arc::new(MlRanker::new(model_store));
    if let Err(e) = ranker.restore().await {
        warn!("Could not restore hire model, starting untrained: {e}");
    }

    let state = AppState {
        store,
        embedder,
        ranker,
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
