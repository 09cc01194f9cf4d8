// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Caller for the quiz endpoint with retries, endpoint fallthrough and
//! cancellation.

use crate::models::QuizQuestion;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Last-resort endpoint: the proxy served by a local backend.
pub const LOCAL_QUIZ_ENDPOINT: &str = "http://localhost:8080/api/quiz";
pub const MAX_ATTEMPTS_PER_ENDPOINT: u32 = 3;

const RETRYABLE_STATUS: [u16; 3] = [404, 502, 503];
const BASE_DELAY: Duration = Duration::from_millis(1000);
const MAX_DELAY: Duration = Duration::from_millis(5000);
const MAX_JITTER_MS: u64 = 250;

#[derive(Debug, thiserror::Error)]
pub enum QuizClientError {
    #[error("Quiz request cancelled")]
    Cancelled,

    /// Non-retryable error status; carries the server's message.
    #[error("Failed to fetch quiz from backend (HTTP {status}). {message}")]
    Server { status: u16, message: String },

    #[error("Quiz service unavailable after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    #[error("Invalid quiz payload: {0}")]
    Decode(String),

    #[error("No quiz endpoints configured")]
    NoEndpoints,
}

#[derive(Serialize)]
struct QuizRequest<'a> {
    artist: &'a str,
}

/// Backoff before retry number `attempt + 1`, without jitter.
pub fn backoff_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor).min(max)
}

/// Build the server's error text from a non-retryable response body.
fn describe_error_body(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    let primary = ["message", "error"]
        .iter()
        .find_map(|k| json.get(*k).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| json.to_string());

    match json.get("details") {
        Some(Value::String(details)) => format!("{} Details: {}", primary, details),
        Some(Value::Null) | None => primary,
        Some(details) => format!("{} Details: {}", primary, details),
    }
}

enum AttemptResult {
    Done(Vec<QuizQuestion>),
    Retry(String),
}

#[derive(Clone)]
pub struct QuizClient {
    http: reqwest::Client,
    endpoints: Vec<String>,
    base_delay: Duration,
    max_delay: Duration,
    max_jitter_ms: u64,
}

impl QuizClient {
    /// Candidate order: explicit override, deployed endpoint, local proxy.
    pub fn new(http: reqwest::Client, override_url: Option<&str>, deployed_url: Option<&str>) -> Self {
        let candidates = [override_url, deployed_url, Some(LOCAL_QUIZ_ENDPOINT)];
        Self::with_endpoints(
            http,
            candidates
                .into_iter()
                .flatten()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        )
    }

    /// Use exactly these endpoints, in order, skipping duplicates.
    pub fn with_endpoints(http: reqwest::Client, endpoints: impl IntoIterator<Item = String>) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for endpoint in endpoints {
            if !unique.contains(&endpoint) {
                unique.push(endpoint);
            }
        }
        Self {
            http,
            endpoints: unique,
            base_delay: BASE_DELAY,
            max_delay: MAX_DELAY,
            max_jitter_ms: MAX_JITTER_MS,
        }
    }

    pub fn with_backoff(mut self, base: Duration, max: Duration, max_jitter_ms: u64) -> Self {
        self.base_delay = base;
        self.max_delay = max;
        self.max_jitter_ms = max_jitter_ms;
        self
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    fn retry_delay(&self, attempt: u32) -> Duration {
        let jitter = if self.max_jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..self.max_jitter_ms)
        };
        backoff_delay(attempt, self.base_delay, self.max_delay) + Duration::from_millis(jitter)
    }

    /// Fetch a quiz, trying each endpoint up to three times.
    pub async fn fetch_quiz(
        &self,
        artist: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<QuizQuestion>, QuizClientError> {
        if self.endpoints.is_empty() {
            return Err(QuizClientError::NoEndpoints);
        }

        let mut total_attempts = 0;
        let mut last_error = String::new();

        for endpoint in &self.endpoints {
            for attempt in 1..=MAX_ATTEMPTS_PER_ENDPOINT {
                if cancel.is_cancelled() {
                    return Err(QuizClientError::Cancelled);
                }
                total_attempts += 1;

                let outcome = tokio::select! {
                    _ = cancel.cancelled() => return Err(QuizClientError::Cancelled),
                    outcome = self.attempt(endpoint, artist) => outcome?,
                };

                match outcome {
                    AttemptResult::Done(questions) => return Ok(questions),
                    AttemptResult::Retry(reason) => {
                        tracing::warn!(
                            endpoint = %endpoint,
                            attempt,
                            reason = %reason,
                            "Quiz request failed"
                        );
                        last_error = reason;
                    }
                }

                if attempt < MAX_ATTEMPTS_PER_ENDPOINT {
                    let delay = self.retry_delay(attempt);
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(QuizClientError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
            tracing::warn!(endpoint = %endpoint, "Quiz endpoint exhausted, trying next");
        }

        Err(QuizClientError::Exhausted {
            attempts: total_attempts,
            last_error,
        })
    }

    async fn attempt(&self, endpoint: &str, artist: &str) -> Result<AttemptResult, QuizClientError> {
        let response = match self
            .http
            .post(endpoint)
            .json(&QuizRequest { artist })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Ok(AttemptResult::Retry(format!("network error: {}", e))),
        };

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Vec<QuizQuestion>>()
                .await
                .map(AttemptResult::Done)
                .map_err(|e| QuizClientError::Decode(e.to_string()));
        }

        if RETRYABLE_STATUS.contains(&status.as_u16()) {
            return Ok(AttemptResult::Retry(format!("HTTP {}", status.as_u16())));
        }

        let body = response.text().await.unwrap_or_default();
        Err(QuizClientError::Server {
            status: status.as_u16(),
            message: describe_error_body(&body),
        })
    }
}
