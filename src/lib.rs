// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! QuestPass: live-music events, reward quests and tiered progress.
//!
//! This crate provides the backend API: event ingestion and catalogue,
//! the trivia quiz proxy, user profiles with points and levels, quest
//! progress with reward claims, and the database-trigger handlers.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{EventStore, ProfileStore, ProgressStore};
use services::{
    GeminiClient, IngestionService, JamBaseClient, ProfileService, RewardMailer, StatsAggregator,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub profiles: Arc<dyn ProfileStore>,
    pub events: Arc<dyn EventStore>,
    pub progress: Arc<dyn ProgressStore>,
    pub profile_service: ProfileService,
    pub ingestion: IngestionService,
    pub gemini: GeminiClient,
    pub stats: StatsAggregator,
    pub mailer: RewardMailer,
}

impl AppState {
    /// Wire every service over one store and one HTTP client.
    pub fn new<S>(config: Config, store: Arc<S>, http: reqwest::Client) -> Self
    where
        S: ProfileStore + EventStore + ProgressStore + 'static,
    {
        let profiles: Arc<dyn ProfileStore> = store.clone();
        let events: Arc<dyn EventStore> = store.clone();
        let progress: Arc<dyn ProgressStore> = store;

        let jambase = JamBaseClient::new(
            http.clone(),
            &config.jambase_api_url,
            config.jambase_key.clone(),
        );
        let gemini = GeminiClient::new(
            http.clone(),
            &config.gemini_api_url,
            &config.gemini_model,
            config.gemini_api_key.clone(),
        );
        let mailer = RewardMailer::new(http, config.emailjs.clone());

        Self {
            profile_service: ProfileService::new(profiles.clone()),
            ingestion: IngestionService::new(jambase, events.clone()),
            stats: StatsAggregator::new(progress.clone()),
            gemini,
            mailer,
            profiles,
            events,
            progress,
            config,
        }
    }
}
