// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier

//! Sweatstakes API server.
//!
//! Reference wiring of the game-state engine: in-memory store, optional
//! HTTP fitness source, and log-only commentary. A production deployment
//! swaps those ports for real implementations.

use std::sync::Arc;
use std::time::Duration;

use sweatstakes::{
    config::Config,
    services::{
        FitnessSource, HttpFitnessSource, LoggingCommentary, NullFitnessSource, SnapshotService,
        StatsHydrator, VoteResolutionService,
    },
    store::MemoryStore,
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Sweatstakes API");

    let store: Arc<dyn sweatstakes::store::SeasonStore> = Arc::new(MemoryStore::new());

    let fitness: Arc<dyn FitnessSource> = match &config.fitness_source_url {
        Some(url) => {
            tracing::info!(url = %url, "Using HTTP fitness source");
            Arc::new(HttpFitnessSource::new(url.clone()))
        }
        None => {
            tracing::info!("No fitness source configured, linked players get no external workouts");
            Arc::new(NullFitnessSource)
        }
    };

    let commentary = Arc::new(LoggingCommentary);

    let hydrator = StatsHydrator::new(
        store.clone(),
        fitness,
        Duration::from_secs(config.fitness_fetch_timeout_secs),
    );
    let votes = VoteResolutionService::new(store.clone(), commentary.clone());
    let snapshots = SnapshotService::new(store.clone(), hydrator, votes.clone(), commentary);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        votes,
        snapshots,
    });

    // Build router
    let app = sweatstakes::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sweatstakes=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
