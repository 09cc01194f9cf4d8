// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Quiz caller retries, endpoint fallthrough and cancellation.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use questpass::services::quiz_client::{QuizClient, QuizClientError};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

mod common;

/// Mock quiz endpoint answering with `statuses` in order, then 200.
async fn scripted_endpoint(statuses: Vec<StatusCode>) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let statuses = Arc::new(statuses);

    let app = Router::new()
        .route(
            "/api/quiz",
            post(
                |State((hits, statuses)): State<(Arc<AtomicUsize>, Arc<Vec<StatusCode>>)>| async move {
                    let n = hits.fetch_add(1, Ordering::SeqCst);
                    match statuses.get(n) {
                        Some(status) => (
                            *status,
                            Json(json!({"error": "Quiz generation failed", "details": "boom"})),
                        )
                            .into_response(),
                        None => Json(json!([{
                            "question": "Which city?",
                            "options": ["Houston", "Austin"],
                            "correctAnswer": "Houston"
                        }]))
                        .into_response(),
                    }
                },
            ),
        )
        .with_state((hits.clone(), statuses));

    let base = common::spawn_mock(app).await;
    (format!("{}/api/quiz", base), hits)
}

fn fast_client(endpoints: Vec<String>) -> QuizClient {
    QuizClient::with_endpoints(reqwest::Client::new(), endpoints).with_backoff(
        Duration::from_millis(5),
        Duration::from_millis(20),
        0,
    )
}

#[tokio::test]
async fn test_retries_502_then_succeeds() {
    let (url, hits) = scripted_endpoint(vec![StatusCode::BAD_GATEWAY]).await;
    let client = fast_client(vec![url]);

    let quiz = client
        .fetch_quiz("Beyoncé", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(quiz.len(), 1);
    assert_eq!(quiz[0].correct_answer, "Houston");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_falls_through_to_next_endpoint() {
    let (first, first_hits) = scripted_endpoint(vec![StatusCode::SERVICE_UNAVAILABLE; 3]).await;
    let (second, second_hits) = scripted_endpoint(vec![]).await;
    let client = fast_client(vec![first, second]);

    let quiz = client
        .fetch_quiz("Beyoncé", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(quiz.len(), 1);
    assert_eq!(first_hits.load(Ordering::SeqCst), 3);
    assert_eq!(second_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_exhausted_when_every_endpoint_fails() {
    let (url, hits) = scripted_endpoint(vec![StatusCode::NOT_FOUND; 10]).await;
    let client = fast_client(vec![url]);

    let err = client
        .fetch_quiz("Beyoncé", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, QuizClientError::Exhausted { attempts: 3, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_non_retryable_status_stops_immediately() {
    let (first, first_hits) = scripted_endpoint(vec![StatusCode::INTERNAL_SERVER_ERROR]).await;
    let (second, second_hits) = scripted_endpoint(vec![]).await;
    let client = fast_client(vec![first, second]);

    let err = client
        .fetch_quiz("Beyoncé", &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        QuizClientError::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Quiz generation failed Details: boom");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(first_hits.load(Ordering::SeqCst), 1);
    assert_eq!(second_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancelled_before_first_attempt() {
    let (url, hits) = scripted_endpoint(vec![]).await;
    let client = fast_client(vec![url]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = client.fetch_quiz("Beyoncé", &cancel).await.unwrap_err();

    assert!(matches!(err, QuizClientError::Cancelled));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancelled_during_backoff() {
    let (url, hits) = scripted_endpoint(vec![StatusCode::BAD_GATEWAY; 3]).await;
    let client = QuizClient::with_endpoints(reqwest::Client::new(), vec![url]).with_backoff(
        Duration::from_secs(30),
        Duration::from_secs(30),
        0,
    );
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    let err = tokio::time::timeout(Duration::from_secs(5), client.fetch_quiz("Beyoncé", &cancel))
        .await
        .expect("cancellation should end the backoff")
        .unwrap_err();

    assert!(matches!(err, QuizClientError::Cancelled));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_no_endpoints() {
    let client = fast_client(vec![]);
    let err = client
        .fetch_quiz("Beyoncé", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, QuizClientError::NoEndpoints));
}
