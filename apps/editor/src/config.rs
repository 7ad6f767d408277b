use anyhow::{Context, Result};

/// Runtime configuration loaded from environment variables. A `.env` file
/// is honored in development.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend API, e.g. `https://example.com/api`.
    pub api_base_url: String,
    /// Session token sent as the `session_token` cookie on every request.
    pub session_token: String,
    pub autosave_debounce_ms: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base_url: require_env("CV_API_BASE_URL")?,
            session_token: require_env("CV_SESSION_TOKEN")?,
            autosave_debounce_ms: std::env::var("AUTOSAVE_DEBOUNCE_MS")
                .unwrap_or_else(|_| "1500".to_string())
                .parse::<u64>()
                .context("AUTOSAVE_DEBOUNCE_MS must be a number of milliseconds")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
