// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Event ingestion: JamBase listings plus the curated set, merge-upserted
//! in fixed-size chunks.

use crate::db::firestore::BATCH_SIZE;
use crate::db::EventStore;
use crate::error::AppError;
use crate::models::event::{build_event_document, EventDraft, EventRecord, EventSource};
use crate::services::jambase::{map_listing, EventMappingError, JamBaseClient, JamBaseError};
use crate::time_utils::DateInput;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error(transparent)]
    Fetch(#[from] JamBaseError),

    #[error(transparent)]
    Mapping(#[from] EventMappingError),

    #[error("Failed to write events: {0}")]
    Write(#[source] AppError),
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionReport {
    pub fetched: usize,
    pub curated: usize,
    pub written: usize,
    pub chunks: usize,
}

enum Pending {
    Listing(usize, Value),
    Curated(EventDraft),
}

impl Pending {
    fn into_record(self, now: DateTime<Utc>) -> Result<EventRecord, EventMappingError> {
        let draft = match self {
            Pending::Listing(index, raw) => map_listing(index, raw)?,
            Pending::Curated(draft) => draft,
        };
        let id = draft.id.clone();
        build_event_document(draft, now)
            .map_err(|source| EventMappingError::InvalidDate { id, source })
    }
}

/// Events QuestPass features regardless of the listing feed.
pub fn curated_events() -> Vec<EventDraft> {
    let curated = |id: &str,
                   title: &str,
                   artist: &str,
                   venue: &str,
                   location: &str,
                   start: &str,
                   end: &str,
                   goal: i64| EventDraft {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("A QuestPass exclusive: {} at {}.", artist, venue),
        artist_name: artist.to_string(),
        venue_name: Some(venue.to_string()),
        venue_location: Some(location.to_string()),
        banner_image: None,
        card_image: None,
        start_date: Some(DateInput::from(start)),
        end_date: Some(DateInput::from(end)),
        status: None,
        source: EventSource::Curated,
        reward_points_goal: Some(goal),
    };

    vec![
        curated(
            "questpass-launch-night",
            "QuestPass Launch Night",
            "Various Artists",
            "The Fillmore",
            "San Francisco, CA",
            "2026-02-14T03:00:00Z",
            "2026-02-14T07:00:00Z",
            1000,
        ),
        curated(
            "questpass-listening-lounge",
            "Listening Lounge Sessions",
            "QuestPass Residents",
            "The Independent",
            "San Francisco, CA",
            "2026-03-07T02:30:00Z",
            "2026-03-07T05:30:00Z",
            750,
        ),
        curated(
            "questpass-summer-fest",
            "QuestPass Summer Fest",
            "Various Artists",
            "Golden Gate Park",
            "San Francisco, CA",
            "2026-07-18T18:00:00Z",
            "2026-07-19T04:00:00Z",
            1500,
        ),
    ]
}

#[derive(Clone)]
pub struct IngestionService {
    jambase: JamBaseClient,
    events: Arc<dyn EventStore>,
}

impl IngestionService {
    pub fn new(jambase: JamBaseClient, events: Arc<dyn EventStore>) -> Self {
        Self { jambase, events }
    }

    /// Fetch, map and write every event.
    ///
    /// A fetch failure aborts before any write. A mapping or write failure
    /// aborts its chunk and the rest of the run; earlier chunks stay.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<IngestionReport, IngestionError> {
        tracing::info!("Starting event ingestion");

        let listings = self.jambase.fetch_events().await?;
        let curated = curated_events();

        let fetched = listings.len();
        let curated_count = curated.len();

        let pending: Vec<Pending> = listings
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Pending::Listing(index, raw))
            .chain(curated.into_iter().map(Pending::Curated))
            .collect();

        let report = write_in_chunks(self.events.as_ref(), pending, now).await?;
        let report = IngestionReport {
            fetched,
            curated: curated_count,
            ..report
        };

        tracing::info!(
            fetched = report.fetched,
            curated = report.curated,
            written = report.written,
            chunks = report.chunks,
            "Event ingestion complete"
        );
        Ok(report)
    }
}

async fn write_in_chunks(
    store: &dyn EventStore,
    pending: Vec<Pending>,
    now: DateTime<Utc>,
) -> Result<IngestionReport, IngestionError> {
    let mut written = 0;
    let mut chunks = 0;
    let mut remaining = pending.into_iter().peekable();

    while remaining.peek().is_some() {
        let records = remaining
            .by_ref()
            .take(BATCH_SIZE)
            .map(|p| p.into_record(now))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| {
                tracing::error!(chunk = chunks, error = %e, "Mapping failed; aborting chunk")
            })?;

        store
            .upsert_event_chunk(&records)
            .await
            .map_err(IngestionError::Write)?;

        written += records.len();
        chunks += 1;
        tracing::debug!(chunk = chunks, count = records.len(), "Committed event chunk");
    }

    Ok(IngestionReport {
        fetched: 0,
        curated: 0,
        written,
        chunks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curated_events_build() {
        let now = chrono::Utc::now();
        for draft in curated_events() {
            let record = build_event_document(draft, now).unwrap();
            assert_eq!(record.source, EventSource::Curated);
            assert!(record.jambase_id.is_none());
            assert!(record.start_date.is_some());
        }
    }

    #[test]
    fn test_error_messages() {
        let err = IngestionError::from(JamBaseError::MissingApiKey);
        assert_eq!(err.to_string(), "JAMBASE_KEY secret is not set or available.");
        let err = IngestionError::from(JamBaseError::InvalidResponse);
        assert_eq!(err.to_string(), "Invalid response from Jambase API");
    }
}
