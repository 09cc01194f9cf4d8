// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Gemini `generateContent` client for trivia generation.

use crate::error::AppError;
use crate::models::quiz::{parse_quiz_text, QUIZ_QUESTION_COUNT};
use crate::models::{QuizFailure, QuizQuestion};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 1024;

pub fn quiz_prompt(artist: &str) -> String {
    format!(
        "You are a music trivia generator. Create exactly {} multiple-choice questions about \
         the artist \"{}\". Return ONLY a JSON array with {{\"question\": string, \"options\": \
         [string, string, string, string], \"correctAnswer\": string}}.",
        QUIZ_QUESTION_COUNT, artist
    )
}

// ─── Wire Types ──────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub text: Option<String>,
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InlineData {
    pub data: Option<String>,
}

/// Text of the first part of the first candidate.
///
/// Base64 inline data wins over plain text; undecodable inline data falls
/// back to text.
pub fn candidate_text(response: &GenerateResponse) -> Result<String, QuizFailure> {
    let candidate = response.candidates.first().ok_or(QuizFailure::NoCandidate)?;
    let Some(part) = candidate.content.as_ref().and_then(|c| c.parts.first()) else {
        return Ok(String::new());
    };

    if let Some(data) = part.inline_data.as_ref().and_then(|d| d.data.as_deref()) {
        match STANDARD
            .decode(data)
            .map_err(|e| e.to_string())
            .and_then(|bytes| String::from_utf8(bytes).map_err(|e| e.to_string()))
        {
            Ok(text) if !text.is_empty() => return Ok(text),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to decode inline model data"),
        }
    }

    Ok(part.text.clone().unwrap_or_default())
}

/// Extract questions from a decoded model response.
pub fn questions_from_response(
    response: &GenerateResponse,
) -> Result<Vec<QuizQuestion>, QuizFailure> {
    parse_quiz_text(&candidate_text(response)?)
}

// ─── Client ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, base_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Ask the model for a quiz about `artist`.
    pub async fn generate_quiz(&self, artist: &str) -> Result<Vec<QuizQuestion>, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AppError::NotConfigured("GEMINI_API_KEY"))?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(api_key)
        );
        let prompt = quiz_prompt(artist);
        let body = GenerateRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .http
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Gemini returned HTTP {}: {}",
                status.as_u16(),
                text
            )));
        }

        let decoded: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Unreadable Gemini response: {}", e)))?;

        let questions =
            questions_from_response(&decoded).map_err(AppError::InvalidModelResponse)?;
        tracing::info!(artist, count = questions.len(), "Generated quiz");
        Ok(questions)
    }
}
