use std::time::Duration;

use vlmcap_client::DEFAULT_POLL_INTERVAL;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the caption service.
    pub api_url: String,
    /// Delay between status checks of a directory job.
    pub poll_interval: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive whole number of seconds, got {value:?}")]
    InvalidSeconds { var: &'static str, value: String },
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                 |
    /// |----------------------|-------------------------|
    /// | `CAPTION_API_URL`    | `http://127.0.0.1:8000` |
    /// | `POLL_INTERVAL_SECS` | `10`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("CAPTION_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());

        let poll_interval = match lookup("POLL_INTERVAL_SECS") {
            Some(value) => parse_seconds("POLL_INTERVAL_SECS", &value)?,
            None => DEFAULT_POLL_INTERVAL,
        };

        Ok(Self {
            api_url,
            poll_interval,
        })
    }
}

/// Parse a strictly positive number of seconds.
pub fn parse_seconds(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidSeconds {
            var,
            value: value.to_string(),
        }),
    }
}
