use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::error::{MomentsError, Result};

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.trim().parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Longest look-back window accepted from the environment, in days.
const MAX_DAY_RANGE: i64 = 36_500;

fn day_range_from_env(default: i64) -> i64 {
    let days = parse_env_or("NOTION_DAY_RANGE", default);
    if (0..=MAX_DAY_RANGE).contains(&days) {
        days
    } else {
        tracing::warn!(
            "Invalid value '{}' for NOTION_DAY_RANGE: expected 0..={}. Using default.",
            days,
            MAX_DAY_RANGE
        );
        default
    }
}

fn env_string_or(var: &str, default: &str) -> String {
    match env::var(var) {
        Ok(val) if !val.trim().is_empty() => val,
        _ => default.to_string(),
    }
}

fn env_nonempty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|val| !val.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub notion: NotionConfig,
    pub request: RequestConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How long a fetched moment list is served before it is rebuilt.
    pub revalidate_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotionConfig {
    pub token: Option<String>,
    pub database_id: Option<String>,
    pub base_url: String,
    pub api_version: String,
}

/// Per-call resilience settings applied to every remote request.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    pub max_attempts: u32,
    pub timeout_ms: u64,
    pub backoff_step_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub day_range: i64,
    pub published_status: String,
    pub properties: PropertyNames,
    pub batch_retries: u32,
    pub batch_retry_delay_ms: u64,
    pub throttle_every: usize,
    pub throttle_ms: u64,
    pub max_block_depth: usize,
}

/// Names of the database columns a moment is read from.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyNames {
    pub date: String,
    pub status: String,
    pub username: String,
    pub title: String,
    pub mood: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            status: "Status".to_string(),
            username: "Name".to_string(),
            title: "Title".to_string(),
            mood: "Mood".to_string(),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_ms: 15_000,
            backoff_step_ms: 300,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            day_range: 90,
            published_status: "Published".to_string(),
            properties: PropertyNames::default(),
            batch_retries: 10,
            batch_retry_delay_ms: 2_000,
            throttle_every: 5,
            throttle_ms: 500,
            max_block_depth: 32,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let request_defaults = RequestConfig::default();
        let feed_defaults = FeedConfig::default();
        let prop_defaults = PropertyNames::default();

        Self {
            server: ServerConfig {
                host: env_string_or("MOMENTS_HOST", "0.0.0.0"),
                port: parse_env_or("MOMENTS_PORT", 3000),
                revalidate_secs: parse_env_or("REVALIDATE_SECS", 60),
            },
            notion: NotionConfig {
                token: env_nonempty("NOTION_TOKEN"),
                database_id: env_nonempty("NOTION_DATABASE_ID"),
                base_url: env_string_or("NOTION_BASE_URL", "https://api.notion.com/v1"),
                api_version: env_string_or("NOTION_VERSION", "2022-06-28"),
            },
            request: RequestConfig {
                max_attempts: parse_env_or("REQUEST_MAX_RETRIES", request_defaults.max_attempts)
                    .max(1),
                timeout_ms: parse_env_or("REQUEST_TIMEOUT_MS", request_defaults.timeout_ms),
                backoff_step_ms: parse_env_or(
                    "REQUEST_BACKOFF_MS",
                    request_defaults.backoff_step_ms,
                ),
            },
            feed: FeedConfig {
                day_range: day_range_from_env(feed_defaults.day_range),
                published_status: env_string_or(
                    "NOTION_PUBLISHED_STATUS",
                    &feed_defaults.published_status,
                ),
                properties: PropertyNames {
                    date: env_string_or("NOTION_PROP_DATE", &prop_defaults.date),
                    status: env_string_or("NOTION_PROP_STATUS", &prop_defaults.status),
                    username: env_string_or("NOTION_PROP_NAME", &prop_defaults.username),
                    title: env_string_or("NOTION_PROP_TITLE", &prop_defaults.title),
                    mood: env_string_or("NOTION_PROP_MOOD", &prop_defaults.mood),
                },
                batch_retries: parse_env_or("FEED_BATCH_RETRIES", feed_defaults.batch_retries),
                batch_retry_delay_ms: parse_env_or(
                    "FEED_BATCH_RETRY_DELAY_MS",
                    feed_defaults.batch_retry_delay_ms,
                ),
                throttle_every: parse_env_or("FEED_THROTTLE_EVERY", feed_defaults.throttle_every),
                throttle_ms: parse_env_or("FEED_THROTTLE_MS", feed_defaults.throttle_ms),
                max_block_depth: parse_env_or(
                    "FEED_MAX_BLOCK_DEPTH",
                    feed_defaults.max_block_depth,
                ),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

impl NotionConfig {
    /// Token and database id, or a config error naming the first missing one.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| MomentsError::Config("NOTION_TOKEN is not set".to_string()))?;
        let database_id = self
            .database_id
            .as_deref()
            .ok_or_else(|| MomentsError::Config("NOTION_DATABASE_ID is not set".to_string()))?;
        Ok((token, database_id))
    }
}

impl RequestConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }
}
