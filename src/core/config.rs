//! Process configuration from environment variables
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{Context as _, Result};
use std::str::FromStr;
use std::time::Duration;

use crate::features::rate_limiting::RateLimitConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// When set, `/cmd@other_bot` messages are ignored
    pub bot_username: Option<String>,
    pub rate_limits: RateLimitConfig,
    pub limiter_sweep_interval: Duration,
    pub limiter_idle_after: Duration,
    pub command_timeout: Duration,
    pub shutdown_grace: Duration,
    pub seed_config_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            bot_username: None,
            rate_limits: RateLimitConfig::default(),
            limiter_sweep_interval: Duration::from_secs(300),
            limiter_idle_after: Duration::from_secs(600),
            command_timeout: Duration::from_secs(60),
            shutdown_grace: Duration::from_secs(30),
            seed_config_path: "seed.yaml".to_string(),
        }
    }
}

impl Config {
    /// Build from the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let limits = defaults.rate_limits.clone();

        let rate_limits = RateLimitConfig {
            user_capacity: parse_or(&lookup, "RATE_USER_CAPACITY", limits.user_capacity)?,
            user_refill_per_sec: parse_or(
                &lookup,
                "RATE_USER_REFILL_PER_SEC",
                limits.user_refill_per_sec,
            )?,
            command_limit: parse_or(&lookup, "RATE_COMMAND_LIMIT", limits.command_limit)?,
            command_window: secs_or(&lookup, "RATE_COMMAND_WINDOW_SECS", limits.command_window)?,
        };

        Ok(Self {
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            bot_username: lookup("BOT_USERNAME")
                .map(|name| name.trim().trim_start_matches('@').to_string())
                .filter(|name| !name.is_empty()),
            rate_limits,
            limiter_sweep_interval: secs_or(
                &lookup,
                "LIMITER_SWEEP_INTERVAL_SECS",
                defaults.limiter_sweep_interval,
            )?,
            limiter_idle_after: secs_or(&lookup, "LIMITER_IDLE_SECS", defaults.limiter_idle_after)?,
            command_timeout: secs_or(&lookup, "COMMAND_TIMEOUT_SECS", defaults.command_timeout)?,
            shutdown_grace: secs_or(&lookup, "SHUTDOWN_GRACE_SECS", defaults.shutdown_grace)?,
            seed_config_path: lookup("SEED_CONFIG_PATH").unwrap_or(defaults.seed_config_path),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

fn secs_or<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, key, default.as_secs()).map(Duration::from_secs)
}
