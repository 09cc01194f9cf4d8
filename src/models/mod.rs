// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Data models for the application.

pub mod cart;
pub mod event;
pub mod event_progress;
pub mod progress;
pub mod quiz;
pub mod user;

pub use cart::{CartLine, CartQuote, CartQuoteRequest};
pub use event::{EventDraft, EventRecord, EventSource, EventStatus, Venue};
pub use event_progress::{EventProgress, EventStatsSummary, QuestActivity, UnlockedEvent};
pub use progress::{calculate_progress, Progress, Tier};
pub use quiz::{QuizFailure, QuizQuestion};
pub use user::{Identity, MiniGameSession, MiniGameSessionInput, MiniGameStats, UserProfile};
