// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles, points, mini-game aggregates)
//! - Mini-game sessions (append-only log)
//! - Events (catalogue, reward codes)
//! - Event progress (per-user quest progress and its summary)

use crate::db::{
    collections, session_doc_id, EventStore, FieldPath, ProfileStore, ProgressStore,
    PROGRESS_FIELDS,
};
use crate::error::AppError;
use crate::models::event::EVENT_DOCUMENT_FIELDS;
use crate::models::{EventProgress, EventRecord, EventStatsSummary, MiniGameSession, UserProfile};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
pub const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RewardCodePatch {
    reward_code: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventStatsPatch {
    event_stats: EventStatsSummary,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator needs no credentials; skip the default token lookup.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }
}

// ─── User Operations ─────────────────────────────────────────

#[async_trait]
impl ProfileStore for FirestoreDb {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn create_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn merge_profile_fields(
        &self,
        profile: &UserProfile,
        fields: &[FieldPath],
    ) -> Result<(), AppError> {
        if fields.is_empty() {
            return Ok(());
        }
        let paths: Vec<String> = fields.iter().map(FieldPath::to_firestore).collect();

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(paths)
            .in_col(collections::USERS)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn increment_points(&self, profile: &UserProfile, delta: i64) -> Result<(), AppError> {
        // totalPoints and lastPointsUpdate are transforms, so they stay out
        // of the mask.
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(PROGRESS_FIELDS.iter().copied())
            .in_col(collections::USERS)
            .document_id(&profile.uid)
            .object(profile)
            .transforms(|t| {
                t.fields([
                    t.field("totalPoints").increment(delta),
                    t.field("lastPointsUpdate")
                        .server_value(firestore::FirestoreTransformServerValue::RequestTime),
                ])
            })
            .execute()
            .await
            .map_err(|e| AppError::Database(format!("Points increment failed: {}", e)))?;
        Ok(())
    }

    async fn append_mini_game_session(
        &self,
        session: &MiniGameSession,
    ) -> Result<String, AppError> {
        let doc_id = session_doc_id(session);

        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::MINI_GAME_SESSIONS)
            .document_id(&doc_id)
            .object(session)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(doc_id)
    }
}

// ─── Event Operations ────────────────────────────────────────

#[async_trait]
impl EventStore for FirestoreDb {
    async fn get_event(&self, id: &str) -> Result<Option<EventRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EVENTS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_events(&self) -> Result<Vec<EventRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::EVENTS)
            .order_by([("startDate", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_event_chunk(&self, events: &[EventRecord]) -> Result<(), AppError> {
        if events.len() > BATCH_SIZE {
            return Err(AppError::Database(format!(
                "Chunk of {} exceeds batch limit {}",
                events.len(),
                BATCH_SIZE
            )));
        }
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for event in events {
            client
                .fluent()
                .update()
                .fields(EVENT_DOCUMENT_FIELDS.iter().copied())
                .in_col(collections::EVENTS)
                .document_id(&event.id)
                .object(event)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to add event {} to transaction: {}",
                        event.id, e
                    ))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit event chunk: {}", e)))?;

        tracing::debug!(count = events.len(), "Event chunk committed");
        Ok(())
    }

    async fn set_reward_code(&self, id: &str, code: &str) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(["rewardCode"])
            .in_col(collections::EVENTS)
            .document_id(id)
            .object(&RewardCodePatch {
                reward_code: code.to_string(),
            })
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

// ─── Event Progress Operations ───────────────────────────────

#[async_trait]
impl ProgressStore for FirestoreDb {
    async fn get_progress(
        &self,
        uid: &str,
        event_id: &str,
    ) -> Result<Option<EventProgress>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EVENT_PROGRESS)
            .obj()
            .one(&EventProgress::doc_id(uid, event_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn put_progress(&self, progress: &EventProgress) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::EVENT_PROGRESS)
            .document_id(EventProgress::doc_id(&progress.uid, &progress.event_id))
            .object(progress)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn list_progress_for_user(&self, uid: &str) -> Result<Vec<EventProgress>, AppError> {
        let uid = uid.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::EVENT_PROGRESS)
            .filter(move |q| q.for_all([q.field("uid").eq(uid.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn write_event_stats(
        &self,
        uid: &str,
        summary: &EventStatsSummary,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(["eventStats"])
            .in_col(collections::USERS)
            .document_id(uid)
            .object(&EventStatsPatch {
                event_stats: summary.clone(),
            })
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
