// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Database layer (Firestore) and the storage traits services depend on.

pub mod firestore;

pub use firestore::FirestoreDb;

use crate::error::AppError;
use crate::models::{EventProgress, EventRecord, EventStatsSummary, MiniGameSession, UserProfile};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const EVENTS: &str = "events";
    /// Immutable mini-game session log, keyed `{uid}_{millis}_{nonce}`
    pub const MINI_GAME_SESSIONS: &str = "mini_game_sessions";
    /// Per-user quest progress, keyed `{uid}_{eventId}`
    pub const EVENT_PROGRESS: &str = "event_progress";
}

/// A document field path such as `miniGames.heardle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn field(name: &str) -> Self {
        Self(vec![name.to_string()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Firestore path syntax; segments that aren't plain identifiers are
    /// backtick-quoted.
    pub fn to_firestore(&self) -> String {
        self.0
            .iter()
            .map(|segment| {
                let plain = segment
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                    && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
                if plain {
                    segment.clone()
                } else {
                    format!("`{}`", segment.replace('\\', "\\\\").replace('`', "\\`"))
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Profile fields that mirror `totalPoints`.
pub const PROGRESS_FIELDS: &[&str] = &[
    "level",
    "currentTier",
    "levelProgress",
    "pointsIntoLevel",
    "pointsPerLevel",
    "pointsToNextLevel",
];

/// Fresh id for a session log entry: `{uid}_{millis}_{nonce}`.
pub fn session_doc_id(session: &MiniGameSession) -> String {
    let nonce: u32 = rand::random();
    format!(
        "{}_{}_{:08x}",
        session.uid,
        session.created_at.timestamp_millis(),
        nonce
    )
}

/// Storage for `users/{uid}` and the mini-game session log.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError>;

    /// Write a whole profile, replacing any existing document.
    async fn create_profile(&self, profile: &UserProfile) -> Result<(), AppError>;

    /// Merge only `fields` of `profile` into the stored document.
    async fn merge_profile_fields(
        &self,
        profile: &UserProfile,
        fields: &[FieldPath],
    ) -> Result<(), AppError>;

    /// Server-side increment of `totalPoints` by `delta`, writing the
    /// derived fields and `lastPointsUpdate` from `profile` alongside.
    async fn increment_points(&self, profile: &UserProfile, delta: i64) -> Result<(), AppError>;

    /// Append a session log entry; returns the new document id.
    async fn append_mini_game_session(&self, session: &MiniGameSession)
        -> Result<String, AppError>;
}

/// Storage for `events/{id}`.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get_event(&self, id: &str) -> Result<Option<EventRecord>, AppError>;

    async fn list_events(&self) -> Result<Vec<EventRecord>, AppError>;

    /// Merge-upsert one chunk as a unit. Never touches `rewardCode`.
    async fn upsert_event_chunk(&self, events: &[EventRecord]) -> Result<(), AppError>;

    async fn set_reward_code(&self, id: &str, code: &str) -> Result<(), AppError>;
}

/// Storage for `event_progress/{uid}_{eventId}` and the summary it feeds.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn get_progress(
        &self,
        uid: &str,
        event_id: &str,
    ) -> Result<Option<EventProgress>, AppError>;

    async fn put_progress(&self, progress: &EventProgress) -> Result<(), AppError>;

    async fn list_progress_for_user(&self, uid: &str) -> Result<Vec<EventProgress>, AppError>;

    /// Merge `eventStats` onto the user's profile.
    async fn write_event_stats(
        &self,
        uid: &str,
        summary: &EventStatsSummary,
    ) -> Result<(), AppError>;
}
