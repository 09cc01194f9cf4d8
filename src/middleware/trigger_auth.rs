// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Shared-token authentication for `/triggers/*` routes.

use crate::config::TRIGGER_TOKEN_HEADER;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Require the trigger bridge's shared token.
pub async fn require_trigger_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected = state.config.trigger_token.as_bytes();
    if expected.is_empty() {
        tracing::warn!("Blocked trigger request: TRIGGER_TOKEN not configured");
        return Err(StatusCode::FORBIDDEN);
    }

    let provided = request
        .headers()
        .get(TRIGGER_TOKEN_HEADER)
        .map(|h| h.as_bytes())
        .unwrap_or_default();

    if !bool::from(provided.ct_eq(expected)) {
        tracing::warn!(
            path = %request.uri().path(),
            "Blocked trigger request with invalid token"
        );
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(request).await)
}
