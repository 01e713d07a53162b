//! # Data Sources Module
//!
//! ## Purpose
//! Defines the common interface for problem sources and provides the
//! platform-specific implementations: a REST+GraphQL adapter (LeetCode) and a
//! browser-automation table-scraping adapter (Codeforces).
//!
//! ## Architecture
//! - `ProblemSource` trait: the capability every adapter exposes to the
//!   ingestion runner
//! - `leetcode.rs`: bulk listing plus batched GraphQL detail enrichment
//! - `codeforces.rs`: paginated table scrape behind an abstract browser session
//!
//! Every adapter tags its output with the owning [`Source`] and invokes the
//! difficulty normalizer exactly once per emitted problem. Per-item failures
//! are logged and dropped inside the adapter; `fetch_problems` only fails when
//! the source as a whole is unusable.

pub mod codeforces;
pub mod leetcode;

use crate::errors::Result;
use crate::{Problem, Source};
use async_trait::async_trait;

/// A platform adapter translating native listing/detail mechanisms into
/// normalized [`Problem`] records.
#[async_trait]
pub trait ProblemSource: Send + Sync {
    /// The platform this adapter owns.
    fn source(&self) -> Source;

    /// Human-readable adapter name for logs.
    fn name(&self) -> &str;

    /// Fetch up to `limit` fully enriched problems from the platform.
    async fn fetch_problems(&self, limit: usize) -> Result<Vec<Problem>>;
}
