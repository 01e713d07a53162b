//! # Search Ranker Module
//!
//! ## Purpose
//! Executes free-text queries against the TF-IDF index, applies difficulty
//! bucket filtering, orders results by relevance and applies the final
//! randomization step before returning them.
//!
//! ## Input/Output Specification
//! - **Input**: query text, selected difficulty buckets, a random source
//! - **Output**: matching problems with strictly positive relevance attached
//! - **Ordering**: results are shuffled after the relevance sort, so the only
//!   guaranteed properties are set membership and each `relevance` value
//!
//! The shuffle deliberately reproduces the upstream behavior; see DESIGN.md.
//! The random source is an explicit parameter so tests can supply a seeded
//! generator, and so concurrent requests never share RNG state.

use crate::index::{tokenize, TfIdfIndex};
use crate::Problem;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// A problem matched by a query, augmented with its relevance measure.
#[derive(Debug, Clone, Serialize)]
pub struct RankedProblem {
    #[serde(flatten)]
    pub problem: Problem,
    pub relevance: f64,
}

/// Read-only query engine over an immutable corpus snapshot and its index.
///
/// The corpus vector and the index were built in lock-step: document id `i`
/// in the index is `corpus[i]`. Serving is safe for arbitrarily many
/// concurrent requests since nothing here is mutated after construction.
pub struct SearchEngine {
    corpus: Vec<Problem>,
    index: TfIdfIndex,
}

impl SearchEngine {
    /// Wrap a loaded corpus and the index built from it.
    pub fn new(corpus: Vec<Problem>, index: TfIdfIndex) -> Self {
        debug_assert_eq!(corpus.len(), index.len());
        Self { corpus, index }
    }

    /// Number of indexed problems.
    pub fn corpus_len(&self) -> usize {
        self.corpus.len()
    }

    /// Execute a query.
    ///
    /// An empty or whitespace query returns an empty result set, not an
    /// error. `selected_buckets` holds the 1-10 tiers to keep; an empty
    /// selection means no filtering. Entries outside [1, 10] (including the
    /// sentinel the API uses for unparseable values) still make the selection
    /// non-empty but match nothing.
    pub fn search<R: Rng + ?Sized>(
        &self,
        query: &str,
        selected_buckets: &[i32],
        rng: &mut R,
    ) -> Vec<RankedProblem> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let query_tokens = tokenize(query);

        let mut results: Vec<RankedProblem> = self
            .index
            .score_all(&query_tokens)
            .into_iter()
            .filter(|(_, relevance)| *relevance > 0.0)
            .map(|(doc_id, relevance)| RankedProblem {
                problem: self.corpus[doc_id].clone(),
                relevance,
            })
            .collect();

        if !selected_buckets.is_empty() {
            results.retain(|r| {
                let bucket = r.problem.difficulty_bucket() as i32;
                selected_buckets.contains(&bucket)
            });
        }

        results.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // Final randomization: destroys the relevance ordering on purpose
        results.shuffle(rng);

        results
    }
}
