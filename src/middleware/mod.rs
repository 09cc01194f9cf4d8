// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Middleware modules (session JWT, trigger token).

pub mod auth;
pub mod trigger_auth;

pub use auth::require_auth;
pub use trigger_auth::require_trigger_token;
