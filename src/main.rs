// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! QuestPass API Server
//!
//! Serves the event catalogue, quiz proxy, profile and quest APIs, and the
//! ingestion and database-trigger entry points.

use questpass::{config::Config, db::FirestoreDb, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting QuestPass API");

    if config.jambase_key.is_none() {
        tracing::warn!("JAMBASE_KEY not set; ingestion runs will fail");
    }
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; quiz generation is disabled");
    }
    if config.trigger_token.is_empty() {
        tracing::warn!("TRIGGER_TOKEN not set; trigger endpoints will reject all calls");
    }

    // Initialize Firestore database
    let db = Arc::new(FirestoreDb::new(&config.gcp_project_id).await?);

    // One HTTP client shared by the JamBase, Gemini and EmailJS callers
    let http = reqwest::Client::builder()
        .user_agent(concat!("questpass/", env!("CARGO_PKG_VERSION")))
        .build()?;

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db, http));

    // Build router
    let app = questpass::routes::create_router(state);

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
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("questpass=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
