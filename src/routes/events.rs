// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Public event catalogue.

use crate::error::{AppError, Result};
use crate::models::EventRecord;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/{id}", get(get_event))
}

/// All stored events, soonest first, with status as of now.
async fn list_events(State(state): State<Arc<AppState>>) -> Result<Json<Vec<EventRecord>>> {
    let now = Utc::now();
    let events = state.events.list_events().await?;

    Ok(Json(
        events.iter().map(|event| event.for_display(now)).collect(),
    ))
}

async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EventRecord>> {
    let event = state
        .events
        .get_event(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))?;

    Ok(Json(event.for_display(Utc::now())))
}
