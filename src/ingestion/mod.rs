//! # Ingestion Pipeline Module
//!
//! ## Purpose
//! Drives a full ingestion run: loads the current corpus snapshot, fetches
//! from every registered source that is not yet represented, merges new
//! problems by url and persists the updated snapshot.
//!
//! ## Input/Output Specification
//! - **Input**: the corpus snapshot, registered [`ProblemSource`] adapters
//! - **Output**: an updated snapshot plus per-run statistics
//! - **Idempotence**: a source already present in the corpus is skipped
//!   entirely; re-running against a complete snapshot is a no-op
//!
//! A source returning zero problems (or failing) does not mark it ingested:
//! the next run will try it again. Sources are processed sequentially, in
//! registration order.

pub mod sources;

use crate::corpus::CorpusStore;
use crate::errors::Result;
use chrono::{DateTime, Utc};
use sources::ProblemSource;

/// Outcome of one source within a run.
#[derive(Debug)]
pub struct SourceStats {
    /// Adapter name as reported by [`ProblemSource::name`]
    pub name: String,
    /// Problems the adapter returned (before merge deduplication)
    pub fetched: usize,
    /// Problems actually added to the corpus
    pub added: usize,
    /// Skipped because the source was already in the snapshot
    pub skipped: bool,
}

/// Statistics for a whole ingestion run.
#[derive(Debug)]
pub struct IngestStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Corpus size before the run
    pub initial_count: usize,
    /// Corpus size after the run
    pub final_count: usize,
    pub per_source: Vec<SourceStats>,
}

impl IngestStats {
    /// Total problems added across all sources.
    pub fn total_added(&self) -> usize {
        self.per_source.iter().map(|s| s.added).sum()
    }
}

/// Orchestrates one ingestion run over the registered sources.
pub struct IngestRunner {
    store: CorpusStore,
    sources: Vec<Box<dyn ProblemSource>>,
    limit_per_source: usize,
}

impl IngestRunner {
    pub fn new(store: CorpusStore, limit_per_source: usize) -> Self {
        Self {
            store,
            sources: Vec::new(),
            limit_per_source,
        }
    }

    /// Register a source adapter. Sources run in registration order.
    pub fn register(&mut self, source: Box<dyn ProblemSource>) {
        self.sources.push(source);
    }

    /// Execute the run: fetch every missing source, merge, persist.
    ///
    /// The full snapshot is rewritten at the end of every run, even when
    /// nothing was added.
    pub async fn run(&self) -> Result<IngestStats> {
        let started_at = Utc::now();
        let mut corpus = self.store.load()?;
        let initial_count = corpus.len();
        let mut per_source = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            if !CorpusStore::needs_source(&corpus, source.source()) {
                tracing::info!(
                    "{} already present in the corpus, skipping",
                    source.name()
                );
                per_source.push(SourceStats {
                    name: source.name().to_string(),
                    fetched: 0,
                    added: 0,
                    skipped: true,
                });
                continue;
            }

            tracing::info!(
                "Fetching up to {} problems from {}",
                self.limit_per_source,
                source.name()
            );
            let incoming = match source.fetch_problems(self.limit_per_source).await {
                Ok(problems) => problems,
                Err(e) => {
                    tracing::error!(
                        "{} ingestion failed ({} error, recoverable: {}): {}",
                        source.name(),
                        e.category(),
                        e.is_recoverable(),
                        e
                    );
                    per_source.push(SourceStats {
                        name: source.name().to_string(),
                        fetched: 0,
                        added: 0,
                        skipped: false,
                    });
                    continue;
                }
            };

            let fetched = incoming.len();
            let before = corpus.len();
            corpus = CorpusStore::merge(corpus, incoming);
            let added = corpus.len() - before;
            tracing::info!(
                "{}: fetched {}, added {} after merge",
                source.name(),
                fetched,
                added
            );
            per_source.push(SourceStats {
                name: source.name().to_string(),
                fetched,
                added,
                skipped: false,
            });
        }

        // Every run ends with one full snapshot, changed or not
        let final_count = corpus.len();
        self.store.save(&corpus)?;

        Ok(IngestStats {
            started_at,
            finished_at: Utc::now(),
            initial_count,
            final_count,
            per_source,
        })
    }
}
