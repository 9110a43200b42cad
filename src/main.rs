// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mutual-match API server
//!
//! Records swipes from the mobile app and turns mutual likes into matches.

use mutual_match::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, MemoryDb, Store},
    services::{ExpoPushNotifier, LogNotifier, Notifier},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, backend = ?config.store_backend, "Starting mutual-match API");

    // Initialize the store
    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryDb::new())
        }
    };

    // Initialize the notifier
    let notifier: Arc<dyn Notifier> = if config.push_enabled {
        tracing::info!(url = %config.expo_push_url, "Expo push notifications enabled");
        Arc::new(ExpoPushNotifier::new(
            config.expo_push_url.clone(),
            config.expo_access_token.clone(),
            store.clone(),
        ))
    } else {
        Arc::new(LogNotifier)
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store, notifier));

    // Build router
    let app = mutual_match::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mutual_match=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
