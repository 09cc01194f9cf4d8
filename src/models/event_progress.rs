// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Per-user, per-event quest progress and the summary derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Listening quest ceiling: 30 matching tracks at 10 points each.
pub const MAX_LISTENING_POINTS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestActivity {
    Listening,
    Trivia,
}

/// Stored at `event_progress/{uid}_{eventId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventProgress {
    pub uid: String,
    pub event_id: String,
    #[serde(default)]
    pub event_title: String,
    #[serde(default)]
    pub listening_points: i64,
    #[serde(default)]
    pub trivia_points: i64,
    #[serde(default)]
    pub claimed: bool,
    #[serde(default)]
    pub claimed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl EventProgress {
    pub fn new(uid: &str, event_id: &str, event_title: &str, now: DateTime<Utc>) -> Self {
        Self {
            uid: uid.to_string(),
            event_id: event_id.to_string(),
            event_title: event_title.to_string(),
            listening_points: 0,
            trivia_points: 0,
            claimed: false,
            claimed_at: None,
            updated_at: now,
        }
    }

    pub fn doc_id(uid: &str, event_id: &str) -> String {
        format!("{}_{}", uid, event_id)
    }

    pub fn total_points(&self) -> i64 {
        self.listening_points.saturating_add(self.trivia_points)
    }

    /// Keep the best score for `activity` and return the improvement.
    ///
    /// Listening scores are capped. A lower score leaves the record alone
    /// and yields 0.
    pub fn record_score(&mut self, activity: QuestActivity, points: i64, now: DateTime<Utc>) -> i64 {
        let points = points.max(0);
        let slot = match activity {
            QuestActivity::Listening => &mut self.listening_points,
            QuestActivity::Trivia => &mut self.trivia_points,
        };
        let capped = match activity {
            QuestActivity::Listening => points.min(MAX_LISTENING_POINTS),
            QuestActivity::Trivia => points,
        };

        if capped <= *slot {
            return 0;
        }
        let improvement = capped - *slot;
        *slot = capped;
        self.updated_at = now;
        improvement
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UnlockedEvent {
    pub event_id: String,
    pub event_title: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub claimed_at: Option<DateTime<Utc>>,
}

/// Aggregate written to `users/{uid}.eventStats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EventStatsSummary {
    pub total_points: i64,
    pub unlocked_count: u32,
    pub unlocked_events: Vec<UnlockedEvent>,
}

/// Claimed-at descending; unset claims last; ties by event id.
fn unlocked_order(a: &UnlockedEvent, b: &UnlockedEvent) -> Ordering {
    match (a.claimed_at, b.claimed_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.event_id.cmp(&b.event_id))
}

/// Fold a user's progress records into a summary.
///
/// Pure: no clock is consulted, so identical input gives identical output
/// regardless of record order.
pub fn summarize_progress(records: &[EventProgress]) -> EventStatsSummary {
    let total_points = records
        .iter()
        .fold(0i64, |acc, r| acc.saturating_add(r.total_points()));

    let mut unlocked_events: Vec<UnlockedEvent> = records
        .iter()
        .filter(|r| r.claimed)
        .map(|r| UnlockedEvent {
            event_id: r.event_id.clone(),
            event_title: r.event_title.clone(),
            claimed_at: r.claimed_at,
        })
        .collect();
    unlocked_events.sort_by(unlocked_order);

    EventStatsSummary {
        total_points,
        unlocked_count: unlocked_events.len() as u32,
        unlocked_events,
    }
}
