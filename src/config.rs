//! Runtime configuration loaded from the environment
//!
//! Binaries call `dotenvy::dotenv()` before [`RouterConfig::from_env`], so a
//! local `.env` file works the same way as exported variables.

use chrono::{FixedOffset, Offset, Utc};
use std::time::Duration;

use crate::error::ConfigError;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub connection_timeout: Duration,
    pub idle_timeout: Option<Duration>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "postgresql://localhost:5432/icarus".to_string(),
            max_connections: 10,
            connection_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
        }
    }
}

impl DatabaseConfig {
    /// Load from `DATABASE_URL` and `DATABASE_POOL_SIZE`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL") {
            let url = url.trim().to_string();
            if url.is_empty() {
                return Err(ConfigError::Missing {
                    name: "DATABASE_URL",
                });
            }
            config.database_url = url;
        }

        if let Some(raw) = lookup("DATABASE_POOL_SIZE") {
            let size = parse_u64("DATABASE_POOL_SIZE", &raw, "a pool size between 1 and 1000")?;
            config.max_connections = u32::try_from(size)
                .ok()
                .filter(|n| (1..=1000).contains(n))
                .ok_or(ConfigError::InvalidValue {
                    name: "DATABASE_POOL_SIZE",
                    value: raw,
                    expected: "a pool size between 1 and 1000",
                })?;
        }

        Ok(config)
    }
}

/// Router and pipeline configuration
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Keyword that opens an action-pipeline session ("icarus ...")
    pub activation_keyword: String,
    /// Idle time after which a session is treated as absent
    pub session_ttl: Duration,
    /// Upper bound for every data-store call
    pub query_timeout: Duration,
    /// Upper bound for one action-pipeline exchange
    pub action_timeout: Duration,
    /// Offset of the business timezone, used for "today" and month ranges
    pub utc_offset: FixedOffset,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            activation_keyword: "icarus".to_string(),
            session_ttl: Duration::from_secs(10 * 60),
            query_timeout: Duration::from_millis(5000),
            action_timeout: Duration::from_secs(30),
            utc_offset: FixedOffset::west_opt(3 * 3600).unwrap_or_else(|| Utc.fix()),
        }
    }
}

impl RouterConfig {
    /// Load from `ICARUS_*` variables, falling back to defaults for unset ones
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(keyword) = lookup("ICARUS_ACTIVATION_KEYWORD") {
            let keyword = keyword.trim().to_lowercase();
            if keyword.is_empty() {
                return Err(ConfigError::InvalidValue {
                    name: "ICARUS_ACTIVATION_KEYWORD",
                    value: keyword,
                    expected: "a non-empty word",
                });
            }
            config.activation_keyword = keyword;
        }

        if let Some(raw) = lookup("ICARUS_SESSION_TTL_SECS") {
            let secs = parse_u64("ICARUS_SESSION_TTL_SECS", &raw, "seconds")?;
            config.session_ttl = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("ICARUS_QUERY_TIMEOUT_MS") {
            let ms = parse_u64("ICARUS_QUERY_TIMEOUT_MS", &raw, "milliseconds")?;
            if ms == 0 {
                return Err(ConfigError::InvalidValue {
                    name: "ICARUS_QUERY_TIMEOUT_MS",
                    value: raw,
                    expected: "a positive number of milliseconds",
                });
            }
            config.query_timeout = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup("ICARUS_ACTION_TIMEOUT_MS") {
            let ms = parse_u64("ICARUS_ACTION_TIMEOUT_MS", &raw, "milliseconds")?;
            if ms == 0 {
                return Err(ConfigError::InvalidValue {
                    name: "ICARUS_ACTION_TIMEOUT_MS",
                    value: raw,
                    expected: "a positive number of milliseconds",
                });
            }
            config.action_timeout = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup("ICARUS_UTC_OFFSET_HOURS") {
            let hours: i32 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "ICARUS_UTC_OFFSET_HOURS",
                value: raw.clone(),
                expected: "whole hours between -12 and 14",
            })?;
            config.utc_offset = Some(hours)
                .filter(|h| (-12..=14).contains(h))
                .and_then(|h| FixedOffset::east_opt(h * 3600))
                .ok_or(ConfigError::InvalidValue {
                    name: "ICARUS_UTC_OFFSET_HOURS",
                    value: raw,
                    expected: "whole hours between -12 and 14",
                })?;
        }

        Ok(config)
    }
}

fn parse_u64(name: &'static str, raw: &str, expected: &'static str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: raw.to_string(),
        expected,
    })
}
