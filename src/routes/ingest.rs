// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Ingestion trigger, hit by the scheduler or by hand.

use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::Utc;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/ingest/events",
        get(ingest_events).post(ingest_events).options(preflight),
    )
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Run one ingestion pass and report in plain text.
async fn ingest_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.ingestion.run(Utc::now()).await {
        Ok(report) => (
            StatusCode::OK,
            format!("Successfully populated {} events.", report.written),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Event ingestion failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
        }
    }
}
