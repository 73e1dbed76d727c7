use std::time::Duration;

use anyhow::Context;

/// Application configuration, read once at startup from the environment
/// (`.env` is honored via dotenv).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub bind_addr: String,
    pub poll_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<AppConfig> {
        let api_key = dotenv::var("FIREBASE_API_KEY").context("FIREBASE_API_KEY not set")?;
        let project_id =
            dotenv::var("FIREBASE_PROJECT_ID").context("FIREBASE_PROJECT_ID not set")?;
        let storage_bucket = dotenv::var("FIREBASE_STORAGE_BUCKET")
            .unwrap_or_else(|_| format!("{project_id}.firebasestorage.app"));
        let bind_addr = dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());
        let poll_ms = match dotenv::var("FEED_POLL_MS") {
            Ok(raw) => raw.parse().context("FEED_POLL_MS is not a number")?,
            Err(_) => 1000,
        };

        Ok(AppConfig {
            api_key,
            project_id,
            storage_bucket,
            bind_addr,
            poll_interval: Duration::from_millis(poll_ms),
        })
    }
}
