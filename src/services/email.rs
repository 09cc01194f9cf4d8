// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Reward unlock notifications through the EmailJS REST API.
//!
//! Sending is best-effort: failures are logged and reported in the outcome,
//! never returned as errors.

use crate::config::EmailJsConfig;
use serde::Serialize;

pub const APP_NAME: &str = "Quest Pass";

/// What the email says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardEmail {
    pub to_email: Option<String>,
    pub to_name: String,
    pub points_earned: i64,
    pub event_name: String,
    pub reward_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailOutcome {
    Sent,
    Skipped(&'static str),
    Failed(String),
}

#[derive(Serialize)]
struct TemplateParams<'a> {
    to_email: &'a str,
    to_name: &'a str,
    points_earned: i64,
    event_name: &'a str,
    reward_code: &'a str,
    app_name: &'a str,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Clone)]
pub struct RewardMailer {
    http: reqwest::Client,
    config: Option<EmailJsConfig>,
}

impl RewardMailer {
    pub fn new(http: reqwest::Client, config: Option<EmailJsConfig>) -> Self {
        Self { http, config }
    }

    pub async fn send_reward_unlock(&self, email: &RewardEmail) -> EmailOutcome {
        let Some(config) = self.config.as_ref() else {
            tracing::warn!("EmailJS is not configured; skipping reward email");
            return EmailOutcome::Skipped("not configured");
        };
        let Some(to_email) = email.to_email.as_deref().filter(|e| !e.trim().is_empty()) else {
            tracing::warn!("Reward email requested without a recipient");
            return EmailOutcome::Skipped("no recipient");
        };

        let payload = SendRequest {
            service_id: &config.service_id,
            template_id: &config.template_id,
            user_id: &config.public_key,
            template_params: TemplateParams {
                to_email,
                to_name: &email.to_name,
                points_earned: email.points_earned,
                event_name: &email.event_name,
                reward_code: &email.reward_code,
                app_name: APP_NAME,
            },
        };

        let result = self.http.post(&config.api_url).json(&payload).send().await;
        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!(event = %email.event_name, "Reward email sent");
                EmailOutcome::Sent
            }
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                let reason = format!("EmailJS request failed: {} {}", status, body);
                tracing::error!(error = %reason, "Failed to send reward unlock email");
                EmailOutcome::Failed(reason)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to send reward unlock email");
                EmailOutcome::Failed(e.to_string())
            }
        }
    }
}
