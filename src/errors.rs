//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the problem search engine, covering the
//! ingestion pipeline, corpus persistence, index construction and the API.
//!
//! ## Error Categories
//! - *Fatal*: snapshot unreadable for reasons other than "missing" or
//!   "malformed JSON" (e.g. permissions), configuration errors
//! - *Recoverable*: single detail-fetch or row-parse failures; adapters absorb
//!   these and drop the item, they never surface as a `SearchError`
//!
//! ## Usage
//! ```rust
//! use problem_search::errors::{Result, SearchError};
//!
//! fn load_config() -> Result<()> {
//!     Err(SearchError::Config {
//!         message: "missing [server] section".to_string(),
//!     })
//! }
//! ```

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, SearchError>;

/// Error types for the problem search engine
#[derive(Debug, Error)]
pub enum SearchError {
    /// Generic I/O errors (snapshot reads/writes outside the repairable cases)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network-related errors
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A source listing or detail response could not be interpreted
    #[error("Failed to parse data from {name}: {details}")]
    DataParsing { name: String, details: String },

    /// A data source is unreachable or returned a non-success status
    #[error("Data source '{name}' is unavailable: {details}")]
    SourceUnavailable { name: String, details: String },

    /// Browser-automation failures during a scrape
    #[error("Scrape failed at {location}: {details}")]
    Scrape { location: String, details: String },

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SearchError {
    /// Error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            SearchError::Config { .. } | SearchError::Toml(_) => "configuration",
            SearchError::Http(_)
            | SearchError::DataParsing { .. }
            | SearchError::SourceUnavailable { .. }
            | SearchError::Scrape { .. } => "ingestion",
            SearchError::Io(_) | SearchError::Json(_) => "storage",
            SearchError::Internal { .. } => "generic",
        }
    }

    /// Whether retrying the operation could plausibly succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SearchError::Http(_) | SearchError::SourceUnavailable { .. } | SearchError::Scrape { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err = SearchError::Config {
            message: "bad".into(),
        };
        assert_eq!(err.category(), "configuration");

        let err = SearchError::SourceUnavailable {
            name: "LeetCode".into(),
            details: "HTTP 503".into(),
        };
        assert_eq!(err.category(), "ingestion");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_display_carries_context() {
        let err = SearchError::DataParsing {
            name: "LeetCode listing".into(),
            details: "missing field".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse data from LeetCode listing: missing field"
        );

        let err = SearchError::SourceUnavailable {
            name: "Codeforces".into(),
            details: "HTTP 502".into(),
        };
        assert_eq!(
            err.to_string(),
            "Data source 'Codeforces' is unavailable: HTTP 502"
        );
    }
}
