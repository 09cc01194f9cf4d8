// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Services module - business logic layer.

pub mod email;
pub mod gemini;
pub mod ingestion;
pub mod jambase;
pub mod profile;
pub mod quiz_client;
pub mod reward_code;
pub mod stats;

pub use email::{EmailOutcome, RewardEmail, RewardMailer};
pub use gemini::GeminiClient;
pub use ingestion::{IngestionError, IngestionReport, IngestionService};
pub use jambase::JamBaseClient;
pub use profile::{AwardOutcome, CommitPath, ProfileService};
pub use quiz_client::{QuizClient, QuizClientError};
pub use reward_code::{ensure_reward_code, RewardCodeOutcome};
pub use stats::StatsAggregator;
