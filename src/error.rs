// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Application error types with consistent API responses.

use crate::models::QuizFailure;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// A required body field was absent or blank.
    #[error("Missing {0}")]
    MissingField(&'static str),

    /// The model answered but nothing usable could be extracted.
    #[error("Invalid model response: {0}")]
    InvalidModelResponse(QuizFailure),

    /// Transport or HTTP failure talking to the model API.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("{0} not configured")]
    NotConfigured(&'static str),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string(), None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token".to_string(), None),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "not_found".to_string(),
                Some(msg.clone()),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "bad_request".to_string(),
                Some(msg.clone()),
            ),
            AppError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                format!("Missing {}", field),
                None,
            ),
            AppError::InvalidModelResponse(reason) => {
                tracing::warn!(reason = reason.as_str(), "Model returned no usable questions");
                (
                    StatusCode::BAD_GATEWAY,
                    "Invalid model response".to_string(),
                    Some(reason.as_str().to_string()),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!(error = %msg, "Upstream request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Quiz generation failed".to_string(),
                    Some(msg.clone()),
                )
            }
            AppError::NotConfigured(what) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{} not configured", what),
                None,
            ),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error".to_string(),
                    None,
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse { error, details };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
