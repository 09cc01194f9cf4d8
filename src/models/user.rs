// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! User profile, mini-game aggregates and session log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::event_progress::EventStatsSummary;
use crate::models::progress::{calculate_progress, Progress, Tier};
use crate::time_utils::{format_day, format_utc_rfc3339, DateInput};

pub const DEFAULT_DISPLAY_NAME: &str = "New User";
pub const DEFAULT_AVATAR: &str = "https://placehold.co/100x100?text=User";

/// Mini-games every profile carries stats for.
pub const KNOWN_MINI_GAMES: &[&str] = &["heardle"];

/// Authenticated identity the profile is keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// User profile stored at `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: String,
    /// First sign-in day (YYYY-MM-DD)
    #[serde(default)]
    pub join_date: String,

    // ─── Points ──────────────────────────────────────────────────
    /// Cumulative points; every derived field below follows from it.
    #[serde(default)]
    pub total_points: i64,
    #[serde(default)]
    pub level: i64,
    #[serde(default)]
    pub current_tier: Tier,
    #[serde(default)]
    pub level_progress: i64,
    #[serde(default)]
    pub points_into_level: i64,
    #[serde(default)]
    pub points_per_level: i64,
    #[serde(default)]
    pub points_to_next_level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_points_update: Option<DateTime<Utc>>,

    // ─── Activity ────────────────────────────────────────────────
    #[serde(default)]
    pub completed_quests: u32,
    /// Absent on profiles created before onboarding existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_seen_instructions: Option<bool>,
    #[serde(default)]
    pub mini_games: BTreeMap<String, MiniGameStats>,
    /// Written by the stats aggregator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_stats: Option<EventStatsSummary>,
}

impl UserProfile {
    /// Fresh profile for a first sign-in.
    pub fn new_default(identity: &Identity, now: DateTime<Utc>) -> Self {
        let mut profile = Self {
            id: identity.uid.clone(),
            uid: identity.uid.clone(),
            name: identity
                .display_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            email: identity.email.clone(),
            avatar: identity
                .photo_url
                .clone()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            join_date: format_day(now),
            total_points: 0,
            level: 0,
            current_tier: Tier::Bronze,
            level_progress: 0,
            points_into_level: 0,
            points_per_level: 0,
            points_to_next_level: 0,
            last_points_update: None,
            completed_quests: 0,
            has_seen_instructions: Some(false),
            mini_games: BTreeMap::new(),
            event_stats: None,
        };
        ensure_mini_game_structure(&mut profile.mini_games);
        profile.apply_progress(calculate_progress(0));
        profile
    }

    /// The derived fields as currently stored on this profile.
    pub fn stored_progress(&self) -> Progress {
        Progress {
            level: self.level,
            current_tier: self.current_tier,
            level_progress: self.level_progress,
            points_into_level: self.points_into_level,
            points_per_level: self.points_per_level,
            points_to_next_level: self.points_to_next_level,
        }
    }

    /// The derived fields recomputed from `total_points`.
    pub fn progress(&self) -> Progress {
        calculate_progress(self.total_points)
    }

    pub fn apply_progress(&mut self, progress: Progress) {
        self.level = progress.level;
        self.current_tier = progress.current_tier;
        self.level_progress = progress.level_progress;
        self.points_into_level = progress.points_into_level;
        self.points_per_level = progress.points_per_level;
        self.points_to_next_level = progress.points_to_next_level;
    }

    /// Replace the point total and recompute everything derived from it.
    pub fn set_total_points(&mut self, total_points: i64) {
        self.total_points = total_points.max(0);
        self.apply_progress(calculate_progress(self.total_points));
    }

    /// True when stored derived fields disagree with `total_points`.
    pub fn progress_drifted(&self) -> bool {
        self.stored_progress() != self.progress()
    }
}

/// Add default stats for every known mini-game that is missing.
///
/// Unknown games already in the map are left untouched. Returns the keys
/// that were added.
pub fn ensure_mini_game_structure(games: &mut BTreeMap<String, MiniGameStats>) -> Vec<String> {
    let mut added = Vec::new();
    for key in KNOWN_MINI_GAMES {
        if !games.contains_key(*key) {
            games.insert((*key).to_string(), MiniGameStats::default());
            added.push((*key).to_string());
        }
    }
    added
}

// ─── Mini-games ──────────────────────────────────────────────────

/// Aggregate stats for one mini-game on a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MiniGameStats {
    pub games_played: u32,
    pub total_points_earned: i64,
    pub last_score: i64,
    pub best_score: i64,
    pub last_outcome: Option<String>,
    pub last_attempts: Option<u32>,
    pub last_played_at_iso: Option<String>,
}

impl MiniGameStats {
    /// Fold one finished session into the aggregate.
    pub fn record(&self, session: &MiniGameSession) -> Self {
        Self {
            games_played: self.games_played.saturating_add(1),
            total_points_earned: self
                .total_points_earned
                .saturating_add(session.points_earned.max(0)),
            last_score: session.points_earned,
            best_score: self.best_score.max(session.points_earned),
            last_outcome: Some(session.outcome.clone()),
            last_attempts: session.attempt_count.or(self.last_attempts),
            last_played_at_iso: Some(session.completed_at_iso.clone()),
        }
    }
}

/// One guess within a mini-game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAttempt {
    pub id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub is_correct: bool,
}

/// Track reference for the correct answer of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackRef {
    pub id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
}

/// Immutable session log entry (`mini_game_sessions` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniGameSession {
    pub uid: String,
    pub game_key: String,
    pub points_earned: i64,
    pub outcome: String,
    pub attempt_count: Option<u32>,
    pub attempts: Vec<SessionAttempt>,
    pub answer: Option<TrackRef>,
    pub session_started_at_iso: Option<String>,
    pub completed_at_iso: String,
    pub created_at: DateTime<Utc>,
}

/// Session payload as reported by the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MiniGameSessionInput {
    pub points_earned: Option<f64>,
    pub outcome: Option<String>,
    pub attempt_count: Option<f64>,
    pub attempts: Vec<AttemptInput>,
    pub answer: Option<TrackRef>,
    #[serde(alias = "completedAtIso")]
    pub completed_at: Option<DateInput>,
    #[serde(alias = "startedAt")]
    pub session_started_at: Option<DateInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttemptInput {
    pub id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub is_correct: Option<bool>,
}

impl MiniGameSessionInput {
    /// Normalize the client payload into a log entry.
    ///
    /// Unparsable timestamps are dropped; a missing completion time is `now`.
    pub fn into_session(self, uid: &str, game_key: &str, now: DateTime<Utc>) -> MiniGameSession {
        let points_earned = self
            .points_earned
            .filter(|p| p.is_finite())
            .map(|p| p.trunc() as i64)
            .unwrap_or(0);

        let attempt_count = self
            .attempt_count
            .filter(|c| c.is_finite() && *c >= 0.0)
            .map(|c| c as u32);

        let outcome = match self.outcome.map(|o| o.trim().to_string()) {
            Some(o) if !o.is_empty() => o,
            _ if points_earned > 0 => "win".to_string(),
            _ => "loss".to_string(),
        };

        let iso = |input: Option<DateInput>| {
            input
                .and_then(|d| d.resolve().ok())
                .map(format_utc_rfc3339)
        };

        MiniGameSession {
            uid: uid.to_string(),
            game_key: game_key.to_string(),
            points_earned,
            outcome,
            attempt_count,
            attempts: self
                .attempts
                .into_iter()
                .map(|a| SessionAttempt {
                    id: a.id,
                    title: a.title,
                    artist: a.artist,
                    is_correct: a.is_correct == Some(true),
                })
                .collect(),
            answer: self.answer,
            session_started_at_iso: iso(self.session_started_at),
            completed_at_iso: iso(self.completed_at).unwrap_or_else(|| format_utc_rfc3339(now)),
            created_at: now,
        }
    }
}
