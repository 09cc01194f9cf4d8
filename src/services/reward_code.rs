// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Reward codes: artist-derived prefix plus a random five-digit suffix.
//!
//! Codes are for display only, so collisions are not checked.

use crate::db::EventStore;
use crate::error::AppError;
use crate::models::EventRecord;
use rand::Rng;
use unicode_normalization::UnicodeNormalization;

pub const FALLBACK_PREFIX: &str = "QUESTPASS";
const MAX_PREFIX_LEN: usize = 18;

/// Uppercase ASCII alphanumerics of `name` after stripping accents.
pub fn build_artist_prefix(name: &str) -> String {
    let prefix: String = name
        .nfkd()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(MAX_PREFIX_LEN)
        .collect();

    if prefix.is_empty() {
        FALLBACK_PREFIX.to_string()
    } else {
        prefix
    }
}

pub fn generate_reward_code_with<R: Rng + ?Sized>(event: &EventRecord, rng: &mut R) -> String {
    let source = if event.artist_name.trim().is_empty() {
        &event.title
    } else {
        &event.artist_name
    };
    let suffix: u32 = rng.gen_range(10_000..=99_999);
    format!("{}-{}", build_artist_prefix(source), suffix)
}

pub fn generate_reward_code(event: &EventRecord) -> String {
    generate_reward_code_with(event, &mut rand::thread_rng())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardCodeOutcome {
    Assigned(String),
    /// The event already had a code; it is never replaced.
    Existing(String),
    EventMissing,
}

impl RewardCodeOutcome {
    pub fn code(&self) -> Option<&str> {
        match self {
            RewardCodeOutcome::Assigned(code) | RewardCodeOutcome::Existing(code) => Some(code),
            RewardCodeOutcome::EventMissing => None,
        }
    }
}

/// Give the event a reward code unless it already has one.
pub async fn ensure_reward_code(
    store: &dyn EventStore,
    event_id: &str,
) -> Result<RewardCodeOutcome, AppError> {
    let Some(event) = store.get_event(event_id).await? else {
        tracing::warn!(event_id, "Reward code requested for missing event");
        return Ok(RewardCodeOutcome::EventMissing);
    };

    if let Some(code) = event.reward_code.as_ref().filter(|c| !c.is_empty()) {
        tracing::debug!(event_id, "Event already has a reward code");
        return Ok(RewardCodeOutcome::Existing(code.clone()));
    }

    let code = generate_reward_code(&event);
    store.set_reward_code(event_id, &code).await?;
    tracing::info!(event_id, code = %code, "Assigned reward code");

    Ok(RewardCodeOutcome::Assigned(code))
}
