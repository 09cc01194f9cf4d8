// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Event catalogue records and their derived lifecycle fields.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::{format_display_date, DateInput, DateParseError};

pub const DEFAULT_VENUE_NAME: &str = "Venue TBA";
pub const DEFAULT_VENUE_LOCATION: &str = "Location TBA";
pub const DEFAULT_BANNER_IMAGE: &str = "https://placehold.co/1200x400/a78bfa/ffffff?text=Event";
pub const DEFAULT_CARD_IMAGE: &str = "https://placehold.co/600x400/a78bfa/ffffff?text=Event";
pub const DEFAULT_REWARD_POINTS_GOAL: i64 = 1000;

/// Assumed running time when an event has no end.
const DEFAULT_EVENT_LENGTH_HOURS: i64 = 3;

/// Every field written by ingestion. `rewardCode` is deliberately absent so
/// a merge write never clears an assigned code.
pub const EVENT_DOCUMENT_FIELDS: &[&str] = &[
    "id",
    "jambaseId",
    "title",
    "description",
    "artistName",
    "venue",
    "bannerImage",
    "cardImage",
    "startDate",
    "endDate",
    "date",
    "status",
    "rewardPointsGoal",
    "source",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum EventStatus {
    Upcoming,
    Current,
    Past,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum EventSource {
    #[default]
    Jambase,
    Curated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Venue {
    pub name: String,
    pub location: String,
}

/// Event document stored at `events/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EventRecord {
    pub id: String,
    /// Only set for JamBase-sourced events.
    #[serde(default)]
    pub jambase_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub artist_name: String,
    pub venue: Venue,
    pub banner_image: String,
    pub card_image: String,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub end_date: Option<DateTime<Utc>>,
    /// Display string; goes stale along with `status`.
    pub date: String,
    pub status: EventStatus,
    #[serde(default = "default_reward_points_goal")]
    pub reward_points_goal: i64,
    /// Assigned once, never regenerated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_code: Option<String>,
    #[serde(default)]
    pub source: EventSource,
}

fn default_reward_points_goal() -> i64 {
    DEFAULT_REWARD_POINTS_GOAL
}

impl EventRecord {
    /// Copy suitable for public responses: status recomputed, code withheld.
    pub fn for_display(&self, now: DateTime<Utc>) -> Self {
        Self {
            status: resolve_status(self.start_date, self.end_date, now),
            reward_code: None,
            ..self.clone()
        }
    }
}

/// Lifecycle status at `now`.
///
/// Without an end time the event is assumed to run three hours.
pub fn resolve_status(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> EventStatus {
    let Some(start) = start else {
        return EventStatus::Upcoming;
    };
    let effective_end = end.unwrap_or(start + Duration::hours(DEFAULT_EVENT_LENGTH_HOURS));

    if now >= start && now <= effective_end {
        EventStatus::Current
    } else if now < start {
        EventStatus::Upcoming
    } else {
        EventStatus::Past
    }
}

/// Loosely typed event input, as produced by the JamBase mapper or the
/// curated list.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub id: String,
    pub title: String,
    pub description: String,
    pub artist_name: String,
    pub venue_name: Option<String>,
    pub venue_location: Option<String>,
    pub banner_image: Option<String>,
    pub card_image: Option<String>,
    pub start_date: Option<DateInput>,
    pub end_date: Option<DateInput>,
    pub status: Option<EventStatus>,
    pub source: EventSource,
    pub reward_points_goal: Option<i64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Build the stored document for a draft.
///
/// Fails on an unparsable start or end. The output carries no write
/// timestamp and no reward code, so rebuilding from the same draft at the
/// same instant yields the same document.
pub fn build_event_document(
    draft: EventDraft,
    now: DateTime<Utc>,
) -> Result<EventRecord, DateParseError> {
    let start = draft.start_date.as_ref().map(DateInput::resolve).transpose()?;
    let end = draft.end_date.as_ref().map(DateInput::resolve).transpose()?;

    let venue_name = non_blank(draft.venue_name);
    let banner_image = non_blank(draft.banner_image);
    let card_image = non_blank(draft.card_image)
        .or_else(|| banner_image.clone())
        .unwrap_or_else(|| DEFAULT_CARD_IMAGE.to_string());

    Ok(EventRecord {
        jambase_id: match draft.source {
            EventSource::Jambase => Some(draft.id.clone()),
            EventSource::Curated => None,
        },
        id: draft.id,
        title: draft.title,
        description: draft.description,
        artist_name: draft.artist_name,
        date: format_display_date(start, venue_name.as_deref()),
        venue: Venue {
            name: venue_name.unwrap_or_else(|| DEFAULT_VENUE_NAME.to_string()),
            location: non_blank(draft.venue_location)
                .unwrap_or_else(|| DEFAULT_VENUE_LOCATION.to_string()),
        },
        banner_image: banner_image.unwrap_or_else(|| DEFAULT_BANNER_IMAGE.to_string()),
        card_image,
        start_date: start,
        end_date: end,
        status: draft
            .status
            .unwrap_or_else(|| resolve_status(start, end, now)),
        reward_points_goal: draft
            .reward_points_goal
            .unwrap_or(DEFAULT_REWARD_POINTS_GOAL),
        reward_code: None,
        source: draft.source,
    })
}
