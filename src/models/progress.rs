// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Level and tier progression derived from a cumulative point total.
//!
//! Every field produced here is a cache of `total_points`. Nothing in this
//! module is stored as independent state.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::UserProfile;

/// Points needed to advance one level.
pub const POINTS_PER_LEVEL: i64 = 500;

/// First level of the Silver tier.
const SILVER_LEVEL: i64 = 11;
/// First level of the Gold tier.
const GOLD_LEVEL: i64 = 21;

/// Coarse reward-status label derived from the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Tier {
    #[default]
    Bronze,
    Silver,
    Gold,
}

impl Tier {
    /// Step function from level to tier.
    pub fn for_level(level: i64) -> Self {
        if level >= GOLD_LEVEL {
            Tier::Gold
        } else if level >= SILVER_LEVEL {
            Tier::Silver
        } else {
            Tier::Bronze
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a user's position within the level ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Progress {
    pub level: i64,
    pub current_tier: Tier,
    /// Whole percent (0-99) of the current level completed.
    pub level_progress: i64,
    pub points_into_level: i64,
    pub points_per_level: i64,
    pub points_to_next_level: i64,
}

impl Default for Progress {
    fn default() -> Self {
        calculate_progress(0)
    }
}

/// Derive progress from a point total. Negative totals count as zero.
pub fn calculate_progress(total_points: i64) -> Progress {
    let points = total_points.max(0);
    let level = points / POINTS_PER_LEVEL + 1;
    let points_into_level = points % POINTS_PER_LEVEL;

    Progress {
        level,
        current_tier: Tier::for_level(level),
        level_progress: points_into_level * 100 / POINTS_PER_LEVEL,
        points_into_level,
        points_per_level: POINTS_PER_LEVEL,
        points_to_next_level: POINTS_PER_LEVEL - points_into_level,
    }
}

/// Coerce an untrusted numeric input into a point count.
///
/// Non-finite and negative values become 0; fractions are floored.
pub fn coerce_points(raw: f64) -> i64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    if raw >= i64::MAX as f64 {
        return i64::MAX;
    }
    raw.floor() as i64
}

/// A locally applied, not yet committed, point award.
///
/// `apply` mutates the caller's view immediately; if persisting fails the
/// caller runs `revert` to restore the previous total and derived fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsAward {
    pub delta: i64,
    pub previous_total: i64,
    pub new_total: i64,
}

impl PointsAward {
    pub fn apply(profile: &mut UserProfile, delta: i64) -> Self {
        let previous_total = profile.total_points;
        let new_total = previous_total.saturating_add(delta);
        profile.set_total_points(new_total);

        Self {
            delta,
            previous_total,
            new_total,
        }
    }

    /// The derived fields that go with the new total.
    pub fn progress(&self) -> Progress {
        calculate_progress(self.new_total)
    }

    /// Compensating action for a failed commit.
    pub fn revert(&self, profile: &mut UserProfile) {
        profile.set_total_points(self.previous_total);
    }
}
