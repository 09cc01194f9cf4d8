// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Recomputes a user's event summary from their per-event progress.

use crate::db::ProgressStore;
use crate::error::AppError;
use crate::models::event_progress::summarize_progress;
use crate::models::EventStatsSummary;
use std::sync::Arc;

#[derive(Clone)]
pub struct StatsAggregator {
    progress: Arc<dyn ProgressStore>,
}

impl StatsAggregator {
    pub fn new(progress: Arc<dyn ProgressStore>) -> Self {
        Self { progress }
    }

    /// Rescan every progress record for `uid` and write the summary.
    ///
    /// Safe to repeat: unchanged records produce an identical summary.
    pub async fn recompute(&self, uid: &str) -> Result<EventStatsSummary, AppError> {
        let records = self.progress.list_progress_for_user(uid).await?;
        let summary = summarize_progress(&records);

        self.progress.write_event_stats(uid, &summary).await?;

        tracing::info!(
            uid,
            records = records.len(),
            total_points = summary.total_points,
            unlocked = summary.unlocked_count,
            "Event stats recomputed"
        );
        Ok(summary)
    }
}
