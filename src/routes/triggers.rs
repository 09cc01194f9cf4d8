// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Database trigger handlers.
//!
//! The document-trigger bridge calls these after writes to `events` and
//! `event_progress`. Both handlers are idempotent, so redelivery is harmless.

use crate::models::EventStatsSummary;
use crate::services::reward_code::{ensure_reward_code, RewardCodeOutcome};
use crate::AppState;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/triggers/event-created", post(event_created))
        .route("/triggers/progress-written", post(progress_written))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCreatedPayload {
    pub event_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCreatedResponse {
    pub event_id: String,
    /// `assigned`, `existing` or `missing`
    pub result: &'static str,
}

/// Assign a reward code to a newly created event.
async fn event_created(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EventCreatedPayload>,
) -> Result<Json<EventCreatedResponse>, StatusCode> {
    if payload.event_id.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let outcome = ensure_reward_code(state.events.as_ref(), &payload.event_id)
        .await
        .map_err(|e| {
            tracing::error!(event_id = %payload.event_id, error = %e, "Reward code assignment failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let result = match outcome {
        RewardCodeOutcome::Assigned(_) => "assigned",
        RewardCodeOutcome::Existing(_) => "existing",
        // Deleted before the trigger ran; nothing to retry.
        RewardCodeOutcome::EventMissing => "missing",
    };

    Ok(Json(EventCreatedResponse {
        event_id: payload.event_id,
        result,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ProgressWrittenPayload {
    pub uid: String,
}

/// Recompute the user's event summary after any progress write.
async fn progress_written(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProgressWrittenPayload>,
) -> Result<Json<EventStatsSummary>, StatusCode> {
    if payload.uid.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    state
        .stats
        .recompute(&payload.uid)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!(uid = %payload.uid, error = %e, "Stats recompute failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
