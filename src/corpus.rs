//! # Corpus Store Module
//!
//! ## Purpose
//! Persistence for the problem corpus: loads the JSON snapshot with corruption
//! recovery, merges newly fetched problems by the global `url` key, and writes
//! full snapshots atomically.
//!
//! ## Input/Output Specification
//! - **Input**: snapshot path, freshly fetched problems
//! - **Output**: the loaded corpus, one rewritten snapshot per ingestion run
//! - **Recovery**: a malformed snapshot is renamed to `<path>.bak` (best
//!   effort) and the run starts from an empty corpus
//!
//! No locking: two concurrent ingestion runs against the same snapshot can
//! race on `save`.

use crate::errors::Result;
use crate::{Problem, Source};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Loads, merges and persists the corpus snapshot.
pub struct CorpusStore {
    snapshot_path: PathBuf,
}

impl CorpusStore {
    /// Create a store for the snapshot at the given path.
    pub fn new<P: AsRef<Path>>(snapshot_path: P) -> Self {
        Self {
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
        }
    }

    /// Path of the persisted snapshot.
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Read the persisted snapshot.
    ///
    /// A missing file yields an empty corpus without error. An empty file
    /// yields an empty corpus with a warning. Malformed JSON moves the bad
    /// file aside to `<path>.bak` and yields an empty corpus. Any other I/O
    /// failure (permissions, hardware) propagates as fatal.
    pub fn load(&self) -> Result<Vec<Problem>> {
        let raw = match std::fs::read_to_string(&self.snapshot_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    "Snapshot {:?} does not exist yet, starting with an empty corpus",
                    self.snapshot_path
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            tracing::warn!("Snapshot {:?} is empty, starting fresh", self.snapshot_path);
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<Problem>>(&raw) {
            Ok(problems) => {
                tracing::info!(
                    "Loaded {} problems from {:?}",
                    problems.len(),
                    self.snapshot_path
                );
                Ok(problems)
            }
            Err(e) => {
                tracing::warn!(
                    "Snapshot {:?} is corrupted ({}), backing it up and starting fresh",
                    self.snapshot_path,
                    e
                );
                let backup_path = self.backup_path();
                if let Err(rename_err) = std::fs::rename(&self.snapshot_path, &backup_path) {
                    // Best effort: a failed backup is logged, not fatal
                    tracing::warn!(
                        "Failed to back up corrupted snapshot to {:?}: {}",
                        backup_path,
                        rename_err
                    );
                } else {
                    tracing::info!("Backed up corrupted snapshot to {:?}", backup_path);
                }
                Ok(Vec::new())
            }
        }
    }

    /// Whether an ingestion run still needs to fetch the given source.
    ///
    /// Any presence of the source counts as fully ingested; refreshing a stale
    /// source requires wiping the snapshot externally.
    pub fn needs_source(corpus: &[Problem], source: Source) -> bool {
        !corpus.iter().any(|p| p.source == source)
    }

    /// Append incoming problems whose `url` is non-empty and not yet present,
    /// preserving incoming order. Idempotent: merging the same incoming set
    /// twice yields the same corpus as merging it once.
    pub fn merge(existing: Vec<Problem>, incoming: Vec<Problem>) -> Vec<Problem> {
        let mut seen: HashSet<String> = existing.iter().map(|p| p.url.clone()).collect();
        let mut merged = existing;

        for problem in incoming {
            if problem.url.is_empty() {
                continue;
            }
            if seen.insert(problem.url.clone()) {
                merged.push(problem);
            }
        }

        merged
    }

    /// Serialize the full corpus and replace the snapshot atomically from the
    /// caller's perspective: the JSON is written to a sibling temp file and
    /// renamed over the snapshot, so a concurrent reader never observes a
    /// partial file.
    pub fn save(&self, corpus: &[Problem]) -> Result<()> {
        if let Some(parent) = self.snapshot_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(corpus)?;
        let tmp_path = self.snapshot_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.snapshot_path)?;

        tracing::info!(
            "Saved {} problems to {:?}",
            corpus.len(),
            self.snapshot_path
        );
        Ok(())
    }

    fn backup_path(&self) -> PathBuf {
        let mut os = self.snapshot_path.clone().into_os_string();
        os.push(".bak");
        PathBuf::from(os)
    }
}
