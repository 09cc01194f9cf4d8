// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! User profile orchestration: lazy creation, reconciliation of derived
//! fields, point awards and mini-game results.

use crate::db::{FieldPath, ProfileStore, PROGRESS_FIELDS};
use crate::error::AppError;
use crate::models::progress::{coerce_points, PointsAward};
use crate::models::user::ensure_mini_game_structure;
use crate::models::{Identity, MiniGameSession, MiniGameSessionInput, UserProfile};
use chrono::Utc;
use std::sync::Arc;

/// Which write persisted an award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPath {
    /// Server-side atomic increment.
    Increment,
    /// Full merge of the points fields after the increment failed.
    MergeFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardOutcome {
    /// Non-finite or sub-one-point input; nothing changed.
    Ignored,
    Committed { award: PointsAward, path: CommitPath },
}

fn points_field_paths() -> Vec<FieldPath> {
    std::iter::once("totalPoints")
        .chain(PROGRESS_FIELDS.iter().copied())
        .chain(std::iter::once("lastPointsUpdate"))
        .map(FieldPath::field)
        .collect()
}

fn progress_field_paths() -> Vec<FieldPath> {
    PROGRESS_FIELDS.iter().copied().map(FieldPath::field).collect()
}

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Load the caller's profile, creating it on first sign-in.
    ///
    /// Existing profiles are repaired in place: onboarding flag, missing
    /// mini-games and drifted progress fields. Repair writes are best-effort.
    pub async fn fetch_or_create(&self, identity: &Identity) -> Result<UserProfile, AppError> {
        let uid = identity.uid.as_str();

        let Some(mut profile) = self.store.get_profile(uid).await? else {
            let profile = UserProfile::new_default(identity, Utc::now());
            self.store.create_profile(&profile).await?;
            tracing::info!(uid, "Created user profile");
            return Ok(profile);
        };

        if profile.uid.is_empty() {
            profile.uid = uid.to_string();
        }
        if profile.id.is_empty() {
            profile.id = uid.to_string();
        }

        // Accounts predating onboarding have already used the app.
        if profile.has_seen_instructions.is_none() {
            profile.has_seen_instructions = Some(true);
            if let Err(e) = self
                .store
                .merge_profile_fields(&profile, &[FieldPath::field("hasSeenInstructions")])
                .await
            {
                tracing::error!(uid, error = %e, "Failed to backfill instructions flag");
            }
        }

        let added = ensure_mini_game_structure(&mut profile.mini_games);
        if !added.is_empty() {
            let paths: Vec<FieldPath> = added
                .iter()
                .map(|key| FieldPath::new(["miniGames", key.as_str()]))
                .collect();
            if let Err(e) = self.store.merge_profile_fields(&profile, &paths).await {
                tracing::error!(uid, error = %e, "Failed to sync mini-game defaults");
            }
        }

        if profile.progress_drifted() {
            profile.apply_progress(profile.progress());
            if let Err(e) = self
                .store
                .merge_profile_fields(&profile, &progress_field_paths())
                .await
            {
                tracing::error!(uid, error = %e, "Failed to sync progress fields");
            } else {
                tracing::debug!(uid, level = profile.level, "Reconciled progress fields");
            }
        }

        Ok(profile)
    }

    /// Award untrusted point input to `view`.
    ///
    /// The view is updated before anything is written. If neither the
    /// increment nor the merge fallback lands, the view is restored and the
    /// last error returned.
    pub async fn award_points(
        &self,
        view: &mut UserProfile,
        raw: f64,
    ) -> Result<AwardOutcome, AppError> {
        let delta = coerce_points(raw);
        if delta < 1 {
            return Ok(AwardOutcome::Ignored);
        }
        self.award(view, delta).await
    }

    pub async fn award(&self, view: &mut UserProfile, delta: i64) -> Result<AwardOutcome, AppError> {
        if delta < 1 {
            return Ok(AwardOutcome::Ignored);
        }
        let uid = view.uid.clone();
        let previous_update = view.last_points_update;

        let award = PointsAward::apply(view, delta);
        view.last_points_update = Some(Utc::now());

        match self.store.increment_points(view, delta).await {
            Ok(()) => {
                tracing::info!(uid, delta, total = award.new_total, "Points awarded");
                return Ok(AwardOutcome::Committed {
                    award,
                    path: CommitPath::Increment,
                });
            }
            Err(e) => {
                tracing::warn!(uid, error = %e, "Increment failed, falling back to merge write");
            }
        }

        match self
            .store
            .merge_profile_fields(view, &points_field_paths())
            .await
        {
            Ok(()) => {
                tracing::info!(uid, delta, total = award.new_total, "Points awarded via merge");
                Ok(AwardOutcome::Committed {
                    award,
                    path: CommitPath::MergeFallback,
                })
            }
            Err(e) => {
                tracing::error!(uid, delta, error = %e, "Failed to persist points");
                award.revert(view);
                view.last_points_update = previous_update;
                Err(e)
            }
        }
    }

    /// Fold a finished mini-game into `view` and log the session.
    ///
    /// Returns `None` for a blank key. Write failures are logged only; the
    /// session log is what later recomputation trusts.
    pub async fn record_mini_game_result(
        &self,
        view: &mut UserProfile,
        game_key: &str,
        input: MiniGameSessionInput,
    ) -> Result<Option<MiniGameSession>, AppError> {
        let key = game_key.trim();
        if key.is_empty() {
            return Ok(None);
        }
        let uid = view.uid.clone();

        let session = input.into_session(&uid, key, Utc::now());
        let updated = view
            .mini_games
            .get(key)
            .cloned()
            .unwrap_or_default()
            .record(&session);
        view.mini_games.insert(key.to_string(), updated);
        ensure_mini_game_structure(&mut view.mini_games);

        if let Err(e) = self
            .store
            .merge_profile_fields(view, &[FieldPath::new(["miniGames", key])])
            .await
        {
            tracing::error!(uid, game = key, error = %e, "Failed to update mini-game stats");
        }

        match self.store.append_mini_game_session(&session).await {
            Ok(session_id) => {
                tracing::debug!(uid, game = key, session_id = %session_id, "Logged mini-game session")
            }
            Err(e) => {
                tracing::error!(uid, game = key, error = %e, "Failed to log mini-game session")
            }
        }

        Ok(Some(session))
    }

    pub async fn mark_instructions_seen(&self, view: &mut UserProfile) -> Result<(), AppError> {
        let previous = view.has_seen_instructions;
        view.has_seen_instructions = Some(true);

        if let Err(e) = self
            .store
            .merge_profile_fields(view, &[FieldPath::field("hasSeenInstructions")])
            .await
        {
            view.has_seen_instructions = previous;
            return Err(e);
        }
        Ok(())
    }
}
