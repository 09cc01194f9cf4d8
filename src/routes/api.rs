// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! API routes for signed-in users: profile, points, quests and cart.

use crate::db::FieldPath;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::progress::coerce_points;
use crate::models::{
    CartQuote, CartQuoteRequest, EventProgress, MiniGameSession, MiniGameSessionInput,
    QuestActivity, UserProfile,
};
use crate::services::email::RewardEmail;
use crate::services::profile::AwardOutcome;
use crate::services::reward_code::{ensure_reward_code, RewardCodeOutcome};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/me/points", post(award_points))
        .route("/api/me/mini-games/{key}", post(record_mini_game))
        .route("/api/me/instructions-seen", post(instructions_seen))
        .route("/api/events/{id}/progress", post(record_progress))
        .route("/api/events/{id}/claim", post(claim_reward))
        .route("/api/cart/quote", post(quote_cart))
}

// ─── User Profile ────────────────────────────────────────────

/// Get (or create on first sign-in) the caller's profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let profile = state.profile_service.fetch_or_create(&user.identity()).await?;
    Ok(Json(profile))
}

async fn instructions_seen(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let mut profile = state.profile_service.fetch_or_create(&user.identity()).await?;
    state.profile_service.mark_instructions_seen(&mut profile).await?;
    Ok(Json(profile))
}

// ─── Points ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AwardPointsRequest {
    pub points: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AwardPointsResponse {
    /// Points actually added; 0 when the request was ignored.
    pub awarded: i64,
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    pub profile: UserProfile,
}

fn awarded(outcome: AwardOutcome) -> i64 {
    match outcome {
        AwardOutcome::Ignored => 0,
        AwardOutcome::Committed { award, .. } => award.delta,
    }
}

async fn award_points(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<AwardPointsRequest>,
) -> Result<Json<AwardPointsResponse>> {
    let mut profile = state.profile_service.fetch_or_create(&user.identity()).await?;
    let outcome = state
        .profile_service
        .award_points(&mut profile, body.points)
        .await?;

    Ok(Json(AwardPointsResponse {
        awarded: awarded(outcome),
        profile,
    }))
}

// ─── Mini-games ──────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniGameResponse {
    pub session: Option<MiniGameSession>,
    pub profile: UserProfile,
}

async fn record_mini_game(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(key): Path<String>,
    Json(input): Json<MiniGameSessionInput>,
) -> Result<Json<MiniGameResponse>> {
    let mut profile = state.profile_service.fetch_or_create(&user.identity()).await?;
    let session = state
        .profile_service
        .record_mini_game_result(&mut profile, &key, input)
        .await?;

    Ok(Json(MiniGameResponse { session, profile }))
}

// ─── Event quests ────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct ProgressRequest {
    pub activity: QuestActivity,
    #[validate(range(min = 0.0, max = 100000.0, message = "Points must be between 0 and 100000"))]
    pub points: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub progress: EventProgress,
    pub awarded: i64,
    pub profile: UserProfile,
}

/// Record a quest score; only improvements earn points.
async fn record_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(event_id): Path<String>,
    Json(body): Json<ProgressRequest>,
) -> Result<Json<ProgressResponse>> {
    body.validate()?;

    let event = state
        .events
        .get_event(&event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;

    let now = Utc::now();
    let mut progress = state
        .progress
        .get_progress(&user.uid, &event_id)
        .await?
        .unwrap_or_else(|| EventProgress::new(&user.uid, &event_id, &event.title, now));

    let previous = progress.clone();
    let improvement = progress.record_score(body.activity, coerce_points(body.points), now);

    let mut profile = state.profile_service.fetch_or_create(&user.identity()).await?;
    let mut awarded_points = 0;

    if improvement > 0 {
        state.progress.put_progress(&progress).await?;
        let outcome = match state.profile_service.award(&mut profile, improvement).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // The best score must not move without its points.
                if let Err(restore) = state.progress.put_progress(&previous).await {
                    tracing::error!(
                        uid = %user.uid,
                        event_id = %event_id,
                        error = %restore,
                        "Failed to restore quest progress"
                    );
                }
                return Err(e);
            }
        };
        awarded_points = awarded(outcome);
        profile.event_stats = Some(state.stats.recompute(&user.uid).await?);

        tracing::info!(
            uid = %user.uid,
            event_id = %event_id,
            activity = ?body.activity,
            improvement,
            "Quest progress recorded"
        );
    }

    Ok(Json(ProgressResponse {
        progress,
        awarded: awarded_points,
        profile,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ClaimResponse {
    pub event_id: String,
    pub reward_code: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub claimed_at: DateTime<Utc>,
}

/// Claim an event reward once its points goal is met.
///
/// Claiming again returns the original claim.
async fn claim_reward(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(event_id): Path<String>,
) -> Result<Json<ClaimResponse>> {
    let event = state
        .events
        .get_event(&event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;

    let mut progress = state
        .progress
        .get_progress(&user.uid, &event_id)
        .await?
        .unwrap_or_else(|| EventProgress::new(&user.uid, &event_id, &event.title, Utc::now()));

    if !progress.claimed && progress.total_points() < event.reward_points_goal {
        return Err(AppError::BadRequest(format!(
            "Reward requires {} points, you have {}",
            event.reward_points_goal,
            progress.total_points()
        )));
    }

    let reward_code = match ensure_reward_code(state.events.as_ref(), &event_id).await? {
        RewardCodeOutcome::Assigned(code) | RewardCodeOutcome::Existing(code) => code,
        RewardCodeOutcome::EventMissing => {
            return Err(AppError::NotFound(format!("Event {} not found", event_id)))
        }
    };

    if progress.claimed {
        let claimed_at = match progress.claimed_at {
            Some(claimed_at) => claimed_at,
            None => {
                let now = Utc::now();
                progress.claimed_at = Some(now);
                progress.updated_at = now;
                state.progress.put_progress(&progress).await?;
                now
            }
        };
        return Ok(Json(ClaimResponse {
            event_id,
            reward_code,
            claimed_at,
        }));
    }

    let now = Utc::now();
    progress.claimed = true;
    progress.claimed_at = Some(now);
    progress.updated_at = now;
    state.progress.put_progress(&progress).await?;
    state.stats.recompute(&user.uid).await?;

    tracing::info!(uid = %user.uid, event_id = %event_id, "Reward claimed");

    let mut profile = state.profile_service.fetch_or_create(&user.identity()).await?;
    profile.completed_quests = profile.completed_quests.saturating_add(1);
    if let Err(e) = state
        .profiles
        .merge_profile_fields(&profile, &[FieldPath::field("completedQuests")])
        .await
    {
        tracing::error!(uid = %user.uid, error = %e, "Failed to update completed quests");
    }

    let email = RewardEmail {
        to_email: user.email.clone().or(profile.email.clone()),
        to_name: profile.name.clone(),
        points_earned: progress.total_points(),
        event_name: event.title.clone(),
        reward_code: reward_code.clone(),
    };
    let mailer = state.mailer.clone();
    tokio::spawn(async move {
        mailer.send_reward_unlock(&email).await;
    });

    Ok(Json(ClaimResponse {
        event_id,
        reward_code,
        claimed_at: now,
    }))
}

// ─── Cart ────────────────────────────────────────────────────

async fn quote_cart(Json(body): Json<CartQuoteRequest>) -> Result<Json<CartQuote>> {
    body.validate()?;
    Ok(Json(crate::models::cart::quote_cart(&body.items)))
}
