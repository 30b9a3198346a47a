use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_FEED_URL: &str = "https://news.google.com/rss?hl=ko&gl=KR&ceid=KR:ko";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

const FEED_URL_VAR: &str = "NEWS_FEED_URL";
const TIMEOUT_VAR: &str = "NEWS_FETCH_TIMEOUT_SECS";
const BIND_ADDR_VAR: &str = "NEWS_BIND_ADDR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedConfig {
    pub feed_url: String,
    pub timeout_secs: u64,
    pub bind_addr: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl FeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("feed url must start with http:// or https://, got {0:?}")]
    FeedUrl(String),
    #[error("fetch timeout must be a positive number of seconds, got {0:?}")]
    Timeout(String),
    #[error("bind address is empty")]
    BindAddr,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigService;

impl ConfigService {
    pub fn name(&self) -> &'static str {
        "config"
    }

    pub fn status(&self) -> &'static str {
        "ready"
    }
}

pub fn load_config() -> Result<FeedConfig, ConfigError> {
    config_from_lookup(|key| std::env::var(key).ok())
}

pub fn config_from_lookup<F>(lookup: F) -> Result<FeedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    let defaults = FeedConfig::default();

    let timeout_secs = match read(TIMEOUT_VAR) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::Timeout(raw.clone()))?,
        None => defaults.timeout_secs,
    };
    let config = FeedConfig {
        feed_url: read(FEED_URL_VAR)
            .map(|value| value.trim().to_string())
            .unwrap_or(defaults.feed_url),
        timeout_secs,
        bind_addr: read(BIND_ADDR_VAR)
            .map(|value| value.trim().to_string())
            .unwrap_or(defaults.bind_addr),
    };
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &FeedConfig) -> Result<(), ConfigError> {
    let url = config.feed_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::FeedUrl(config.feed_url.clone()));
    }
    if config.timeout_secs == 0 {
        return Err(ConfigError::Timeout(config.timeout_secs.to_string()));
    }
    if config.bind_addr.trim().is_empty() {
        return Err(ConfigError::BindAddr);
    }
    Ok(())
}
