// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Application configuration loaded from environment variables.
//!
//! Secrets are injected as environment variables by the deployment and read
//! once at startup.

use std::env;

pub const DEFAULT_JAMBASE_API_URL: &str = "https://www.jambase.com/jb-api/v1";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_EMAILJS_API_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Header carrying the shared secret on `/triggers/*` requests.
pub const TRIGGER_TOKEN_HEADER: &str = "x-questpass-trigger-token";

/// EmailJS credentials; all three are required to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    pub api_url: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS on authenticated routes
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub jambase_api_url: String,
    pub gemini_api_url: String,
    pub gemini_model: String,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Events API key; ingestion fails without it
    pub jambase_key: Option<String>,
    /// Model API key; the quiz route fails without it
    pub gemini_api_key: Option<String>,
    /// Shared secret for the trigger bridge; empty rejects every call
    pub trigger_token: String,
    /// Reward email settings; unset skips sending
    pub emailjs: Option<EmailJsConfig>,
}

/// Read a trimmed, non-empty environment variable.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let emailjs = match (
            optional_var("EMAILJS_SERVICE_ID"),
            optional_var("EMAILJS_TEMPLATE_ID"),
            optional_var("EMAILJS_PUBLIC_KEY"),
        ) {
            (Some(service_id), Some(template_id), Some(public_key)) => Some(EmailJsConfig {
                service_id,
                template_id,
                public_key,
                api_url: optional_var("EMAILJS_API_URL")
                    .unwrap_or_else(|| DEFAULT_EMAILJS_API_URL.to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jambase_api_url: optional_var("JAMBASE_API_URL")
                .unwrap_or_else(|| DEFAULT_JAMBASE_API_URL.to_string()),
            gemini_api_url: optional_var("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            gemini_model: optional_var("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            jambase_key: optional_var("JAMBASE_KEY"),
            gemini_api_key: optional_var("GEMINI_API_KEY")
                .or_else(|| optional_var("VITE_GEMINI_API_KEY")),
            trigger_token: optional_var("TRIGGER_TOKEN").unwrap_or_default(),
            emailjs,
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            jambase_api_url: DEFAULT_JAMBASE_API_URL.to_string(),
            gemini_api_url: DEFAULT_GEMINI_API_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            jambase_key: None,
            gemini_api_key: None,
            trigger_token: "test_trigger_token".to_string(),
            emailjs: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
