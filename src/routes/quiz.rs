// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Artist trivia quiz proxy.

use crate::error::{AppError, Result};
use crate::models::QuizQuestion;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/quiz", post(generate_quiz).options(preflight))
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[derive(Debug, Default, Deserialize)]
pub struct QuizRequest {
    #[serde(default)]
    pub artist: Option<Value>,
}

impl QuizRequest {
    /// Trimmed artist name; numbers are accepted as text.
    pub fn artist(&self) -> String {
        match &self.artist {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }
}

/// Generate five questions about the requested artist.
async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<QuizRequest>, JsonRejection>,
) -> Result<Json<Vec<QuizQuestion>>> {
    // Malformed or missing bodies read as a missing artist.
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let artist = request.artist();
    if artist.is_empty() {
        return Err(AppError::MissingField("artist"));
    }

    let questions = state.gemini.generate_quiz(&artist).await?;
    Ok(Json(questions))
}
