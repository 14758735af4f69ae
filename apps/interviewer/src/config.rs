use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_ORACLE_MODEL: &str = "llama3.1:8b";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Full URL of the Oracle generate endpoint, e.g. `http://localhost:11434/api/generate`.
    pub oracle_url: String,
    pub oracle_model: String,
    /// Base URL of the résumé parse/score service.
    pub resume_service_url: String,
    /// Absent means sessions live in memory only.
    pub database_url: Option<String>,
    pub collaborator_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            oracle_url: require_env("ORACLE_URL")?,
            oracle_model: optional_env("ORACLE_MODEL")
                .unwrap_or_else(|| DEFAULT_ORACLE_MODEL.to_string()),
            resume_service_url: require_env("RESUME_SERVICE_URL")?,
            database_url: optional_env("DATABASE_URL"),
            collaborator_timeout: Duration::from_secs(
                optional_env("COLLABORATOR_TIMEOUT_SECS")
                    .map(|v| v.parse::<u64>())
                    .transpose()
                    .context("COLLABORATOR_TIMEOUT_SECS must be a whole number of seconds")?
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
