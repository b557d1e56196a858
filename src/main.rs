// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ScrimStats ingestion API server.

use scrimstats_ingest::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, MemoryStore, StatsStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.store_backend,
        max_stats = config.max_stats_per_request,
        "Starting ScrimStats ingestion API"
    );

    let store = connect_store(&config).await?;

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
    });

    let app = scrimstats_ingest::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the configured persistent store.
async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn StatsStore>> {
    match config.store_backend {
        StoreBackend::Firestore => {
            let project_id = config
                .gcp_project_id
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("GCP_PROJECT_ID is required for Firestore"))?;
            let db = FirestoreDb::new(project_id).await?;
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            let store = match &config.store_seed_file {
                Some(path) => {
                    tracing::info!(path = %path.display(), "Loading store seed file");
                    MemoryStore::load_seed(path)?
                }
                None => MemoryStore::new(),
            };
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(store))
        }
    }
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("scrimstats_ingest=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
