// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! JamBase events API client and listing-to-draft mapping.

use crate::models::event::DEFAULT_VENUE_NAME;
use crate::models::{EventDraft, EventSource};
use crate::time_utils::DateInput;
use serde::Deserialize;
use serde_json::Value;

/// Start time assumed when a listing only has a local date.
const DEFAULT_LOCAL_TIME: &str = "18:00:00";
/// Card images must be at least this wide.
const MIN_CARD_IMAGE_WIDTH: f64 = 640.0;
const FALLBACK_ARTIST: &str = "Various Artists";

/// Why a listing could not become an event.
#[derive(Debug, thiserror::Error)]
pub enum EventMappingError {
    #[error("event at index {index} has no id")]
    MissingId { index: usize },

    #[error("event {id} has no name")]
    MissingName { id: String },

    #[error("event at index {index} is malformed: {reason}")]
    Malformed { index: usize, reason: String },

    #[error("event {id} has an invalid date: {source}")]
    InvalidDate {
        id: String,
        #[source]
        source: crate::time_utils::DateParseError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum JamBaseError {
    #[error("JAMBASE_KEY secret is not set or available.")]
    MissingApiKey,

    #[error("JamBase request failed: {0}")]
    Request(String),

    #[error("JamBase returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response from Jambase API")]
    InvalidResponse,
}

// ─── Listing Payload ─────────────────────────────────────────

/// Ids arrive as strings or numbers depending on the listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JamBaseId {
    Text(String),
    Number(i64),
}

impl JamBaseId {
    fn into_string(self) -> String {
        match self {
            JamBaseId::Text(s) => s,
            JamBaseId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct JamBaseEvent {
    pub id: Option<JamBaseId>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub performer: Vec<Named>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<Embedded>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub dates: Option<Dates>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Named {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Embedded {
    #[serde(default)]
    pub venues: Vec<JamBaseVenue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JamBaseVenue {
    pub name: Option<String>,
    pub city: Option<Named>,
    pub state: Option<Named>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Image {
    pub url: Option<String>,
    pub width: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Dates {
    pub start: Option<DateSpec>,
    pub end: Option<DateSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSpec {
    pub date_time: Option<String>,
    pub local_date: Option<String>,
    pub local_time: Option<String>,
}

#[derive(Deserialize)]
struct ListingResponse {
    events: Option<Vec<Value>>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ─── Mapping ─────────────────────────────────────────────────

/// Map one raw listing entry into a draft.
pub fn map_listing(index: usize, raw: Value) -> Result<EventDraft, EventMappingError> {
    let event: JamBaseEvent =
        serde_json::from_value(raw).map_err(|e| EventMappingError::Malformed {
            index,
            reason: e.to_string(),
        })?;
    map_jambase_event(index, event)
}

pub fn map_jambase_event(index: usize, event: JamBaseEvent) -> Result<EventDraft, EventMappingError> {
    let id = event
        .id
        .map(JamBaseId::into_string)
        .filter(|id| !id.trim().is_empty())
        .ok_or(EventMappingError::MissingId { index })?;
    let name = present(&event.name)
        .map(str::to_string)
        .ok_or_else(|| EventMappingError::MissingName { id: id.clone() })?;

    let artist = event
        .performer
        .first()
        .and_then(|p| present(&p.name))
        .unwrap_or(FALLBACK_ARTIST)
        .to_string();

    let venue = event.embedded.as_ref().and_then(|e| e.venues.first());
    let venue_name = venue.and_then(|v| present(&v.name)).map(str::to_string);
    let venue_location = venue.and_then(|v| {
        let city = v.city.as_ref().and_then(|c| present(&c.name))?;
        Some(match v.state.as_ref().and_then(|s| present(&s.name)) {
            Some(state) => format!("{}, {}", city, state),
            None => city.to_string(),
        })
    });

    let banner_image = event
        .images
        .iter()
        .find_map(|img| present(&img.url))
        .map(str::to_string);
    let card_image = event
        .images
        .iter()
        .filter(|img| img.width.is_some_and(|w| w >= MIN_CARD_IMAGE_WIDTH))
        .find_map(|img| present(&img.url))
        .map(str::to_string);

    let start = event.dates.as_ref().and_then(|d| d.start.as_ref());
    let start_date = start.and_then(|s| {
        present(&s.date_time).map(DateInput::from).or_else(|| {
            let day = present(&s.local_date)?;
            let time = present(&s.local_time).unwrap_or(DEFAULT_LOCAL_TIME);
            Some(DateInput::Text(format!("{}T{}", day, time)))
        })
    });
    let end_date = event
        .dates
        .as_ref()
        .and_then(|d| d.end.as_ref())
        .and_then(|e| present(&e.date_time))
        .map(DateInput::from);

    let description = present(&event.description)
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!(
                "See {} live at {}!",
                artist,
                venue_name.as_deref().unwrap_or(DEFAULT_VENUE_NAME)
            )
        });

    Ok(EventDraft {
        id,
        title: name,
        description,
        artist_name: artist,
        venue_name,
        venue_location,
        banner_image,
        card_image,
        start_date,
        end_date,
        status: None,
        source: EventSource::Jambase,
        reward_points_goal: None,
    })
}

// ─── Client ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct JamBaseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl JamBaseClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Fetch the raw listing entries.
    ///
    /// Entries stay untyped here so one bad entry is reported by index
    /// during mapping rather than failing the whole decode.
    pub async fn fetch_events(&self) -> Result<Vec<Value>, JamBaseError> {
        let api_key = self.api_key.as_deref().ok_or(JamBaseError::MissingApiKey)?;
        let url = format!(
            "{}/events?apikey={}&o=json",
            self.base_url,
            urlencoding::encode(api_key)
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| JamBaseError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JamBaseError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let listing: ListingResponse = response
            .json()
            .await
            .map_err(|_| JamBaseError::InvalidResponse)?;

        let events = listing.events.ok_or(JamBaseError::InvalidResponse)?;
        tracing::info!(count = events.len(), "Fetched events from JamBase");
        Ok(events)
    }
}
