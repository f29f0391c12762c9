use core::time::Duration;
use std::path::PathBuf;

use anyhow::Context;

/// API location used when `WEBPREDICTOR_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// How long a posted message stays visible, in seconds.
pub const DEFAULT_MESSAGE_CLEAR_SECS: u64 = 20;

/// Mirrors the server's default limit of 10 requests per 60 seconds.
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 10;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the WebPredictor API, without a trailing slash
    pub api_base_url: String,

    /// Delay after which the message slot clears itself
    pub message_clear_after: Duration,

    /// Client-side request throttle; `None` disables it
    pub rate_limit_per_minute: Option<u32>,

    /// Per-request timeout; `None` leaves it to the transport
    pub request_timeout: Option<Duration>,

    /// Optional file that receives a copy of the log output
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_owned(),
            message_clear_after: Duration::from_secs(DEFAULT_MESSAGE_CLEAR_SECS),
            rate_limit_per_minute: Some(DEFAULT_RATE_LIMIT_PER_MINUTE),
            request_timeout: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `WEBPREDICTOR_API_URL`: API base URL (default: `http://localhost:8000`)
    /// - `WEBPREDICTOR_MESSAGE_CLEAR_SECS`: message auto-clear delay (default: 20)
    /// - `WEBPREDICTOR_RATE_LIMIT_PER_MINUTE`: request throttle, 0 disables (default: 10)
    /// - `WEBPREDICTOR_TIMEOUT_SECS`: per-request timeout (default: none)
    /// - `WEBPREDICTOR_LOG_FILE`: extra log file (default: none)
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_base_url = get("WEBPREDICTOR_API_URL").map_or(defaults.api_base_url, |url| {
            url.trim().trim_end_matches('/').to_owned()
        });

        let message_clear_after = match get("WEBPREDICTOR_MESSAGE_CLEAR_SECS") {
            Some(raw) => Duration::from_secs(parse_number(&raw, "WEBPREDICTOR_MESSAGE_CLEAR_SECS")?),
            None => defaults.message_clear_after,
        };

        let rate_limit_per_minute = match get("WEBPREDICTOR_RATE_LIMIT_PER_MINUTE") {
            Some(raw) => {
                Some(parse_number::<u32>(&raw, "WEBPREDICTOR_RATE_LIMIT_PER_MINUTE")?).filter(|n| *n > 0)
            }
            None => defaults.rate_limit_per_minute,
        };

        let request_timeout = get("WEBPREDICTOR_TIMEOUT_SECS")
            .map(|raw| parse_number(&raw, "WEBPREDICTOR_TIMEOUT_SECS").map(Duration::from_secs))
            .transpose()?;

        let log_file = get("WEBPREDICTOR_LOG_FILE").map(PathBuf::from);

        Ok(Self {
            api_base_url,
            message_clear_after,
            rate_limit_per_minute,
            request_timeout,
            log_file,
        })
    }
}

fn parse_number<T>(raw: &str, key: &str) -> anyhow::Result<T>
where
    T: core::str::FromStr,
    T::Err: core::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{key} must be a non-negative integer, got {raw:?}"))
}
