// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! `/api/quiz` against a local mock of the Gemini API.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use questpass::config::Config;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

const FIVE_QUESTIONS: &str = r#"[
  {"question": "Q1", "options": ["a", "b", "c", "d"], "correctAnswer": "a"},
  {"question": "Q2", "options": ["a", "b", "c", "d"], "correctAnswer": "b"},
  {"question": "Q3", "options": ["a", "b", "c", "d"], "correctAnswer": "c"},
  {"question": "Q4", "options": ["a", "b", "c", "d"], "correctAnswer": "d"},
  {"question": "Q5", "options": ["a", "b", "c", "d"], "correctAnswer": "a"}
]"#;

fn text_response(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

async fn mock_gemini(status: StatusCode, body: Value) -> String {
    let app = Router::new().route(
        "/models/{call}",
        post(move |Json(request): Json<Value>| {
            let body = body.clone();
            async move {
                assert_eq!(request["generationConfig"]["maxOutputTokens"], 1024);
                assert_eq!(
                    request["generationConfig"]["responseMimeType"],
                    "application/json"
                );
                (status, Json(body))
            }
        }),
    );
    common::spawn_mock(app).await
}

fn config_for(base_url: &str) -> Config {
    Config {
        gemini_api_url: base_url.to_string(),
        gemini_api_key: Some("gemini-key".to_string()),
        ..Config::test_default()
    }
}

fn quiz_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/quiz")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_missing_artist_is_400() {
    let (app, _, _) = common::create_test_app();

    for body in [r#"{}"#, r#"{"artist": "   "}"#, "not json"] {
        let response = app.clone().oneshot(quiz_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(
            common::body_json(response).await,
            json!({ "error": "Missing artist" })
        );
    }
}

#[tokio::test]
async fn test_missing_api_key_is_500() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(quiz_request(r#"{"artist": "Beyoncé"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        common::body_json(response).await,
        json!({ "error": "GEMINI_API_KEY not configured" })
    );
}

#[tokio::test]
async fn test_quiz_success_returns_five_questions() {
    let base = mock_gemini(StatusCode::OK, text_response(FIVE_QUESTIONS)).await;
    let (app, _, _) = common::create_test_app_with(config_for(&base));

    let response = app
        .oneshot(quiz_request(r#"{"artist": "Beyoncé"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let questions = body.as_array().unwrap();
    assert_eq!(questions.len(), 5);
    assert_eq!(questions[1]["correctAnswer"], "b");
}

#[tokio::test]
async fn test_quiz_reads_inline_data_first() {
    let encoded = STANDARD.encode(FIVE_QUESTIONS);
    let body = json!({ "candidates": [{ "content": { "parts": [{
        "inlineData": { "mimeType": "application/json", "data": encoded },
        "text": "ignored"
    }] } }] });
    let base = mock_gemini(StatusCode::OK, body).await;
    let (app, _, _) = common::create_test_app_with(config_for(&base));

    let response = app
        .oneshot(quiz_request(r#"{"artist": "Beyoncé"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_json(response).await.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_quiz_recovers_array_from_prose() {
    let text = format!("Here you go!\n```json\n{}\n```\nEnjoy.", FIVE_QUESTIONS);
    let base = mock_gemini(StatusCode::OK, text_response(&text)).await;
    let (app, _, _) = common::create_test_app_with(config_for(&base));

    let response = app
        .oneshot(quiz_request(r#"{"artist": "Beyoncé"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_no_candidate_is_502() {
    let base = mock_gemini(StatusCode::OK, json!({ "candidates": [] })).await;
    let (app, _, _) = common::create_test_app_with(config_for(&base));

    let response = app
        .oneshot(quiz_request(r#"{"artist": "Beyoncé"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        common::body_json(response).await,
        json!({ "error": "Invalid model response", "details": "NO_CANDIDATE" })
    );
}

#[tokio::test]
async fn test_unusable_text_is_502() {
    let base = mock_gemini(StatusCode::OK, text_response("I cannot help with that.")).await;
    let (app, _, _) = common::create_test_app_with(config_for(&base));

    let response = app
        .oneshot(quiz_request(r#"{"artist": "Beyoncé"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        common::body_json(response).await["details"],
        "INVALID_RESPONSE"
    );
}

#[tokio::test]
async fn test_upstream_error_is_500() {
    let base = mock_gemini(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "message": "quota" } }),
    )
    .await;
    let (app, _, _) = common::create_test_app_with(config_for(&base));

    let response = app
        .oneshot(quiz_request(r#"{"artist": "Beyoncé"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "Quiz generation failed");
    assert!(body["details"].as_str().unwrap().contains("429"));
}

#[tokio::test]
async fn test_quiz_preflight_allows_any_origin() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/quiz")
                .header("Origin", "https://fan-site.example")
                .header("Access-Control-Request-Method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
