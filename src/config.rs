//! Runtime configuration
//!
//! Read once at startup from `.env` (via `dotenv`) and the process
//! environment. Missing API keys are not fatal here; the clients refuse to
//! make requests without them.

use crate::error::TrackerError;
use crate::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

const DEFAULT_UP_BASE_URL: &str = "https://api.up.com.au/api/v1";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_CACHE_DIR: &str = ".tracker-cache";
const DEFAULT_CLASSIFY_DELAY_MS: u64 = 3_000;
/// Free-tier Gemini quota.
const DEFAULT_CLASSIFY_CALLS_PER_MINUTE: u32 = 15;
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub up_api_key: String,
    pub up_base_url: String,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub cache_dir: PathBuf,
    pub classify_delay: Duration,
    pub classify_calls_per_minute: u32,
    pub port: u16,
}

impl Config {
    /// Loads `.env` if present, then reads the environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let up_api_key = get("UP_API_KEY").unwrap_or_default();
        if up_api_key.is_empty() {
            warn!("UP_API_KEY not set; fetching transactions will fail");
        }

        let gemini_api_key = get("GEMINI_API_KEY").unwrap_or_default();
        if gemini_api_key.is_empty() {
            warn!("GEMINI_API_KEY not set; classification and questions will fail");
        }

        let classify_delay_ms = parse_or(
            get("CLASSIFY_DELAY_MS"),
            "CLASSIFY_DELAY_MS",
            DEFAULT_CLASSIFY_DELAY_MS,
        )?;
        let classify_calls_per_minute = parse_or(
            get("CLASSIFY_CALLS_PER_MINUTE"),
            "CLASSIFY_CALLS_PER_MINUTE",
            DEFAULT_CLASSIFY_CALLS_PER_MINUTE,
        )?;
        if classify_calls_per_minute == 0 {
            return Err(TrackerError::ConfigError(
                "CLASSIFY_CALLS_PER_MINUTE must be at least 1".to_string(),
            ));
        }

        let port = parse_or(get("PORT").or_else(|| get("API_PORT")), "PORT", DEFAULT_PORT)?;

        Ok(Self {
            up_api_key,
            up_base_url: get("UP_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_UP_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            gemini_api_key,
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            cache_dir: get("TRACKER_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            classify_delay: Duration::from_millis(classify_delay_ms),
            classify_calls_per_minute,
            port,
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| {
            TrackerError::ConfigError(format!("{} has an invalid value '{}'", key, raw))
        }),
        None => Ok(default),
    }
}
