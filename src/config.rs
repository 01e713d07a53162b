//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the problem search engine: server binding,
//! per-source ingestion settings, search behavior and logging, loaded from a
//! TOML file with sensible defaults for every field.
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Command line arguments (highest priority)
//! 2. Configuration file
//! 3. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use problem_search::config::Config;
//!
//! # fn main() -> problem_search::Result<()> {
//! let config = Config::from_file("config.toml")?;
//! println!("Server port: {}", config.server.port);
//! # Ok(())
//! # }
//! ```

use crate::errors::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server and API configuration
    pub server: ServerConfig,
    /// Data ingestion settings
    pub ingestion: IngestionConfig,
    /// Corpus snapshot settings
    pub corpus: CorpusConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server and API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable permissive CORS for an externally-hosted front-end
    pub enable_cors: bool,
}

/// Data ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Per-run item limit applied to every source
    pub limit_per_source: usize,
    /// Detail requests issued concurrently within one batch
    pub concurrency_limit: usize,
    /// Outbound request timeout in seconds
    pub request_timeout_seconds: u64,
    /// Scrape in headless rendering mode first
    pub headless: bool,
    /// LeetCode adapter settings
    pub leetcode: LeetCodeConfig,
    /// Codeforces adapter settings
    pub codeforces: CodeforcesConfig,
}

/// LeetCode (REST + GraphQL) source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeetCodeConfig {
    /// Bulk problem listing endpoint
    pub list_url: String,
    /// GraphQL endpoint for detail enrichment
    pub graphql_url: String,
    /// Base for canonical problem links
    pub problem_base_url: String,
}

/// Codeforces (scraped problemset table) source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeforcesConfig {
    /// Paginated problemset listing base URL
    pub problemset_url: String,
    /// Base for canonical problem links
    pub problem_base_url: String,
    /// Bounded wait for the problems table, in milliseconds
    pub table_wait_ms: u64,
}

/// Corpus snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Snapshot path shared by the ingestion run and the serving process
    pub snapshot_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter directive (overridable via RUST_LOG)
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            enable_cors: true,
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            limit_per_source: 500,
            concurrency_limit: 10,
            request_timeout_seconds: 30,
            headless: true,
            leetcode: LeetCodeConfig::default(),
            codeforces: CodeforcesConfig::default(),
        }
    }
}

impl Default for LeetCodeConfig {
    fn default() -> Self {
        Self {
            list_url: "https://leetcode.com/api/problems/all/".to_string(),
            graphql_url: "https://leetcode.com/graphql".to_string(),
            problem_base_url: "https://leetcode.com/problems".to_string(),
        }
    }
}

impl Default for CodeforcesConfig {
    fn default() -> Self {
        Self {
            problemset_url: "https://codeforces.com/problemset".to_string(),
            problem_base_url: "https://codeforces.com/problemset/problem".to_string(),
            table_wait_ms: 5000,
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("problems.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.ingestion.concurrency_limit == 0 {
            return Err(SearchError::Config {
                message: "ingestion.concurrency_limit must be at least 1".to_string(),
            });
        }
        if self.ingestion.limit_per_source == 0 {
            return Err(SearchError::Config {
                message: "ingestion.limit_per_source must be at least 1".to_string(),
            });
        }
        if self.corpus.snapshot_path.as_os_str().is_empty() {
            return Err(SearchError::Config {
                message: "corpus.snapshot_path must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.ingestion.limit_per_source, 500);
        assert_eq!(config.ingestion.concurrency_limit, 10);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let raw = r#"
            [server]
            port = 8080

            [ingestion]
            limit_per_source = 50
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.ingestion.limit_per_source, 50);
        assert_eq!(config.ingestion.concurrency_limit, 10);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = Config::default();
        config.ingestion.concurrency_limit = 0;
        assert!(config.validate().is_err());
    }
}
