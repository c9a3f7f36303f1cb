// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! City Wellbeing API Server
//!
//! Aggregates population, air quality and weather data per city and stores
//! users' saved wellbeing scores.

use city_wellbeing::{config::Config, db::FirestoreDb, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting City Wellbeing API");

    // One store client for the whole process
    let db = FirestoreDb::connect(config.gcp_project_id.as_deref()).await?;

    tracing::info!(
        timeout_secs = config.upstream_timeout.as_secs(),
        static_dir = %config.static_dir,
        "External API clients initialized"
    );

    let port = config.port;
    let state = Arc::new(AppState::new(config, db)?);

    // Build router
    let app = city_wellbeing::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("city_wellbeing=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
