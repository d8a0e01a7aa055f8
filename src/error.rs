//! Error types for the query pipeline
//!
//! Errors never reach the chat surface directly: the dispatcher and router
//! turn them into a single user-safe message and log the details.

use thiserror::Error;

/// Data-access failures raised by a [`crate::query::QueryStore`]
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Query '{query}' timed out after {timeout_ms}ms")]
    Timeout { query: &'static str, timeout_ms: u64 },

    #[cfg(feature = "database")]
    #[error("Database error in '{query}': {source}")]
    Database {
        query: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    /// Name of the query that failed, if known
    pub fn query(&self) -> Option<&'static str> {
        match self {
            StoreError::Timeout { query, .. } => Some(query),
            #[cfg(feature = "database")]
            StoreError::Database { query, .. } => Some(query),
            StoreError::Unavailable { .. } => None,
        }
    }
}

/// Failures raised by the external action pipeline
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Action pipeline is not configured")]
    NotConfigured,

    #[error("Action pipeline failed: {message}")]
    Failed { message: String },

    #[error("Action pipeline timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Invalid configuration values
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {name} has invalid value '{value}': expected {expected}")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Environment variable {name} is set but empty")]
    Missing { name: &'static str },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_reports_query_name() {
        let err = StoreError::Timeout {
            query: "search_items",
            timeout_ms: 5000,
        };
        assert_eq!(err.query(), Some("search_items"));
        assert_eq!(
            err.to_string(),
            "Query 'search_items' timed out after 5000ms"
        );

        let err = StoreError::Unavailable {
            message: "pool closed".to_string(),
        };
        assert_eq!(err.query(), None);
    }

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::InvalidValue {
            name: "ICARUS_QUERY_TIMEOUT_MS",
            value: "abc".to_string(),
            expected: "milliseconds",
        };
        assert!(err.to_string().contains("ICARUS_QUERY_TIMEOUT_MS"));
    }
}
