// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use questpass::config::Config;
use questpass::db::{EventStore, FieldPath, FirestoreDb, ProfileStore, ProgressStore};
use questpass::error::AppError;
use questpass::middleware::auth::create_jwt;
use questpass::models::event::{build_event_document, EVENT_DOCUMENT_FIELDS};
use questpass::models::{
    EventDraft, EventProgress, EventRecord, EventSource, EventStatsSummary, Identity,
    MiniGameSession, UserProfile,
};
use questpass::routes::create_router;
use questpass::AppState;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

// ─── In-memory store ─────────────────────────────────────────

/// Document store with Firestore-like merge semantics.
///
/// Documents are kept as JSON so partial merges behave like field-path
/// updates. Failure flags let tests force individual writes to fail.
#[derive(Default)]
pub struct InMemoryStore {
    pub users: Mutex<BTreeMap<String, Value>>,
    pub events: Mutex<BTreeMap<String, Value>>,
    pub progress: Mutex<BTreeMap<String, EventProgress>>,
    pub sessions: Mutex<Vec<(String, MiniGameSession)>>,
    /// Size of every committed event chunk, in order.
    pub committed_chunks: Mutex<Vec<usize>>,
    pub fail_increment: AtomicBool,
    pub fail_merge: AtomicBool,
    /// Zero-based index of the chunk call that should fail.
    pub fail_chunk: Mutex<Option<usize>>,
    chunk_calls: AtomicUsize,
}

fn db_error(what: &str) -> AppError {
    AppError::Database(format!("injected {} failure", what))
}

/// Copy the value at `path` from `source` into `target`, creating
/// intermediate maps as needed.
fn merge_path(target: &mut Value, source: &Value, path: &[String]) {
    let mut src = source;
    for segment in path {
        match src.get(segment) {
            Some(v) => src = v,
            None => return,
        }
    }

    let mut dst = target;
    for segment in &path[..path.len() - 1] {
        if !dst.is_object() {
            *dst = Value::Object(Map::new());
        }
        dst = dst
            .as_object_mut()
            .unwrap()
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !dst.is_object() {
        *dst = Value::Object(Map::new());
    }
    dst.as_object_mut()
        .unwrap()
        .insert(path[path.len() - 1].clone(), src.clone());
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed_event(&self, event: &EventRecord) {
        self.events
            .lock()
            .unwrap()
            .insert(event.id.clone(), serde_json::to_value(event).unwrap());
    }

    pub fn seed_profile(&self, profile: &UserProfile) {
        self.users
            .lock()
            .unwrap()
            .insert(profile.uid.clone(), serde_json::to_value(profile).unwrap());
    }

    pub fn seed_progress(&self, progress: &EventProgress) {
        self.progress.lock().unwrap().insert(
            EventProgress::doc_id(&progress.uid, &progress.event_id),
            progress.clone(),
        );
    }

    pub fn raw_profile(&self, uid: &str) -> Option<Value> {
        self.users.lock().unwrap().get(uid).cloned()
    }

    pub fn stored_profile(&self, uid: &str) -> Option<UserProfile> {
        self.raw_profile(uid)
            .map(|v| serde_json::from_value(v).unwrap())
    }

    pub fn stored_event(&self, id: &str) -> Option<EventRecord> {
        self.events
            .lock()
            .unwrap()
            .get(id)
            .map(|v| serde_json::from_value(v.clone()).unwrap())
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self.stored_profile(uid))
    }

    async fn create_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        self.seed_profile(profile);
        Ok(())
    }

    async fn merge_profile_fields(
        &self,
        profile: &UserProfile,
        fields: &[FieldPath],
    ) -> Result<(), AppError> {
        if self.fail_merge.load(Ordering::SeqCst) {
            return Err(db_error("merge"));
        }
        let source = serde_json::to_value(profile).unwrap();
        let mut users = self.users.lock().unwrap();
        let doc = users
            .entry(profile.uid.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        for field in fields {
            merge_path(doc, &source, field.segments());
        }
        Ok(())
    }

    async fn increment_points(&self, profile: &UserProfile, delta: i64) -> Result<(), AppError> {
        if self.fail_increment.load(Ordering::SeqCst) {
            return Err(db_error("increment"));
        }
        let source = serde_json::to_value(profile).unwrap();
        let mut users = self.users.lock().unwrap();
        let doc = users
            .entry(profile.uid.clone())
            .or_insert_with(|| Value::Object(Map::new()));

        let current = doc.get("totalPoints").and_then(Value::as_i64).unwrap_or(0);
        doc["totalPoints"] = Value::from(current + delta);
        for field in questpass::db::PROGRESS_FIELDS
            .iter()
            .chain(std::iter::once(&"lastPointsUpdate"))
        {
            merge_path(doc, &source, &[field.to_string()]);
        }
        Ok(())
    }

    async fn append_mini_game_session(
        &self,
        session: &MiniGameSession,
    ) -> Result<String, AppError> {
        let id = questpass::db::session_doc_id(session);
        self.sessions
            .lock()
            .unwrap()
            .push((id.clone(), session.clone()));
        Ok(id)
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn get_event(&self, id: &str) -> Result<Option<EventRecord>, AppError> {
        Ok(self.stored_event(id))
    }

    async fn list_events(&self) -> Result<Vec<EventRecord>, AppError> {
        let mut events: Vec<EventRecord> = self
            .events
            .lock()
            .unwrap()
            .values()
            .map(|v| serde_json::from_value(v.clone()).unwrap())
            .collect();
        events.sort_by_key(|e| e.start_date);
        Ok(events)
    }

    async fn upsert_event_chunk(&self, events: &[EventRecord]) -> Result<(), AppError> {
        let call = self.chunk_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_chunk.lock().unwrap() == Some(call) {
            return Err(db_error("chunk"));
        }

        let mut stored = self.events.lock().unwrap();
        for event in events {
            let source = serde_json::to_value(event).unwrap();
            let doc = stored
                .entry(event.id.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            for field in EVENT_DOCUMENT_FIELDS {
                merge_path(doc, &source, &[field.to_string()]);
            }
        }
        self.committed_chunks.lock().unwrap().push(events.len());
        Ok(())
    }

    async fn set_reward_code(&self, id: &str, code: &str) -> Result<(), AppError> {
        let mut stored = self.events.lock().unwrap();
        let doc = stored
            .entry(id.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        doc["rewardCode"] = Value::from(code);
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for InMemoryStore {
    async fn get_progress(
        &self,
        uid: &str,
        event_id: &str,
    ) -> Result<Option<EventProgress>, AppError> {
        Ok(self
            .progress
            .lock()
            .unwrap()
            .get(&EventProgress::doc_id(uid, event_id))
            .cloned())
    }

    async fn put_progress(&self, progress: &EventProgress) -> Result<(), AppError> {
        self.seed_progress(progress);
        Ok(())
    }

    async fn list_progress_for_user(&self, uid: &str) -> Result<Vec<EventProgress>, AppError> {
        Ok(self
            .progress
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.uid == uid)
            .cloned()
            .collect())
    }

    async fn write_event_stats(
        &self,
        uid: &str,
        summary: &EventStatsSummary,
    ) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        let doc = users
            .entry(uid.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        doc["eventStats"] = serde_json::to_value(summary).unwrap();
        Ok(())
    }
}

// ─── App and fixtures ────────────────────────────────────────

/// Create a test app over a fresh in-memory store.
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<InMemoryStore>) {
    create_test_app_with(Config::test_default())
}

pub fn create_test_app_with(
    config: Config,
) -> (axum::Router, Arc<AppState>, Arc<InMemoryStore>) {
    let store = InMemoryStore::new();
    let state = Arc::new(AppState::new(config, store.clone(), reqwest::Client::new()));
    (create_router(state.clone()), state, store)
}

pub fn test_identity(uid: &str) -> Identity {
    Identity {
        uid: uid.to_string(),
        email: Some(format!("{}@example.com", uid)),
        display_name: Some("Test Fan".to_string()),
        photo_url: None,
    }
}

/// Create a test JWT token.
pub fn create_test_jwt(uid: &str, signing_key: &[u8]) -> String {
    create_jwt(&test_identity(uid), signing_key).unwrap()
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// A stored event starting a week after `fixed_now`.
pub fn sample_event(id: &str, reward_points_goal: i64) -> EventRecord {
    build_event_document(
        EventDraft {
            id: id.to_string(),
            title: format!("{} Live", id),
            artist_name: "Beyoncé".to_string(),
            venue_name: Some("The Fillmore".to_string()),
            venue_location: Some("San Francisco, CA".to_string()),
            start_date: Some("2026-03-08T20:00:00Z".into()),
            source: EventSource::Curated,
            reward_points_goal: Some(reward_points_goal),
            ..Default::default()
        },
        fixed_now(),
    )
    .unwrap()
}

/// Serve `router` on an ephemeral local port; returns its base URL.
pub async fn spawn_mock(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Collect a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
