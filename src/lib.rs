//! # Competitive-Programming Problem Search Engine
//!
//! ## Overview
//! This library builds a deduplicated corpus of competitive-programming problems
//! harvested from multiple heterogeneous sources, normalizes each problem onto a
//! unified Elo-like difficulty scale, and serves ranked, difficulty-filtered
//! free-text search over the corpus.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `ingestion`: multi-source adapters and the offline ingestion runner
//! - `difficulty`: Elo normalization of source-specific difficulty signals
//! - `corpus`: snapshot persistence with corruption recovery and idempotent merge
//! - `index`: TF-IDF model built once at startup from the corpus snapshot
//! - `search`: query scoring, difficulty filtering and result ordering
//! - `api`: HTTP endpoints for the search front-end
//! - `config`: configuration management and settings
//! - `errors`: centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: platform listing/detail responses (JSON, HTML), search queries
//! - **Output**: one persisted JSON corpus snapshot; ranked search results
//! - **Lifecycle**: an ingestion run writes the snapshot; a separate serving
//!   process loads it once and answers queries against an immutable index
//!
//! ## Usage
//! ```rust,no_run
//! use problem_search::{corpus::CorpusStore, index::TfIdfIndex, search::SearchEngine};
//!
//! # fn main() -> problem_search::Result<()> {
//! let store = CorpusStore::new("problems.json");
//! let corpus = store.load()?;
//! let index = TfIdfIndex::build(&corpus);
//! let engine = SearchEngine::new(corpus, index);
//! let results = engine.search("two pointers", &[], &mut rand::thread_rng());
//! println!("Found {} results", results.len());
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod api;
pub mod config;
pub mod corpus;
pub mod difficulty;
pub mod errors;
pub mod index;
pub mod ingestion;
pub mod search;

// Re-exports for convenience
pub use config::Config;
pub use errors::{Result, SearchError};
pub use search::{RankedProblem, SearchEngine};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Platforms a problem can originate from. Identifies the owning adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    LeetCode,
    Codeforces,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::LeetCode => write!(f, "LeetCode"),
            Source::Codeforces => write!(f, "Codeforces"),
        }
    }
}

/// A single normalized problem, the corpus's unit entity.
///
/// Field names mirror the persisted snapshot format, so snapshots written by
/// earlier tooling load unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    /// Owning platform
    pub source: Source,
    /// Source-native identifier, unique only within a source
    pub id: String,
    /// Display title
    pub title: String,
    /// Canonical detail link; the global deduplication key
    pub url: String,
    /// Plain-text statement (HTML stripped), "N/A" when unavailable
    #[serde(default = "default_description")]
    pub description: String,
    /// Tag strings; insertion order is irrelevant
    #[serde(default)]
    pub topics: Vec<String>,
    /// Raw acceptance percentage for acceptance-based sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_rate: Option<f64>,
    /// Raw solve count for popularity-based sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solved_count: Option<u64>,
    /// Unified difficulty in [800, 3500], derived from the raw signal
    #[serde(default = "default_elo")]
    pub elo: u32,
}

fn default_description() -> String {
    "N/A".to_string()
}

fn default_elo() -> u32 {
    difficulty::DEFAULT_ELO
}

impl Problem {
    /// Coarse 1-10 difficulty tier. Computed on demand, never persisted, so
    /// ingestion display and query filtering always agree.
    pub fn difficulty_bucket(&self) -> u8 {
        difficulty::elo_to_bucket(self.elo)
    }
}

/// Application state shared across API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub engine: Arc<search::SearchEngine>,
}
