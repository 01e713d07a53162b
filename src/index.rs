//! # Search Index Module
//!
//! ## Purpose
//! In-memory TF-IDF model over the corpus, built once at process start and
//! read-only afterwards. Documents are keyed by their position in the corpus
//! vector; callers must keep the corpus and the index in lock-step and never
//! reorder one without the other.
//!
//! ## Input/Output Specification
//! - **Input**: the loaded corpus snapshot
//! - **Output**: per-document relevance measures for a query token bag
//! - **Scoring**: for each query token (with multiplicity),
//!   `tf(token, doc) * idf(token)` summed over the query, with
//!   `idf(t) = 1 + ln(N / (1 + df(t)))`

use crate::Problem;
use std::collections::HashMap;

/// Fixed stopword set removed from both indexed documents and queries.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each",
    "few", "for", "from", "further", "given", "had", "has", "have", "having", "he", "her",
    "here", "hers", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself",
    "just", "may", "me", "more", "most", "must", "my", "no", "nor", "not", "now", "of", "off",
    "on", "once", "only", "or", "other", "our", "ours", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "would", "you", "your", "yours",
];

/// Lowercase, split on whitespace and drop stopwords.
///
/// Backs both document registration and query tokenization, so the two can
/// never disagree on what counts as a term.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|token| !STOPWORDS.contains(token))
        .map(|token| token.to_string())
        .collect()
}

/// TF-IDF index over the corpus, immutable after construction.
pub struct TfIdfIndex {
    /// Term frequencies per document, indexed by corpus offset
    term_freqs: Vec<HashMap<String, usize>>,
    /// Number of documents containing each term
    doc_freqs: HashMap<String, usize>,
}

impl TfIdfIndex {
    /// Build the index from a loaded corpus snapshot.
    ///
    /// Each problem contributes one document: the lowercased concatenation of
    /// title, description and space-joined topics, minus stopwords.
    pub fn build(corpus: &[Problem]) -> Self {
        let mut term_freqs = Vec::with_capacity(corpus.len());
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();

        for problem in corpus {
            let text = format!(
                "{} {} {}",
                problem.title,
                problem.description,
                problem.topics.join(" ")
            );

            let mut freqs: HashMap<String, usize> = HashMap::new();
            for token in tokenize(&text) {
                *freqs.entry(token).or_insert(0) += 1;
            }

            for term in freqs.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            term_freqs.push(freqs);
        }

        tracing::debug!(
            "Built TF-IDF index: {} documents, {} distinct terms",
            term_freqs.len(),
            doc_freqs.len()
        );

        Self {
            term_freqs,
            doc_freqs,
        }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.term_freqs.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.term_freqs.is_empty()
    }

    /// Inverse document frequency of a term over the indexed corpus.
    fn idf(&self, term: &str) -> f64 {
        let df = self.doc_freqs.get(term).copied().unwrap_or(0);
        ((self.term_freqs.len() as f64) / (1.0 + df as f64)).ln() + 1.0
    }

    /// Relevance of the document at `doc_id` for the given query token bag.
    ///
    /// Each query token occurrence contributes `tf(token, doc) * idf(token)`;
    /// a repeated query term counts as many times as it appears in the query.
    pub fn score(&self, query_tokens: &[String], doc_id: usize) -> f64 {
        let Some(freqs) = self.term_freqs.get(doc_id) else {
            return 0.0;
        };

        query_tokens
            .iter()
            .map(|token| {
                let tf = freqs.get(token).copied().unwrap_or(0);
                if tf == 0 {
                    0.0
                } else {
                    tf as f64 * self.idf(token)
                }
            })
            .sum()
    }

    /// Score every indexed document against the query token bag, in document
    /// order.
    pub fn score_all(&self, query_tokens: &[String]) -> Vec<(usize, f64)> {
        (0..self.term_freqs.len())
            .map(|doc_id| (doc_id, self.score(query_tokens, doc_id)))
            .collect()
    }

    /// Distinct terms of one document; used by tests to sanity-check
    /// registration.
    #[cfg(test)]
    fn doc_terms(&self, doc_id: usize) -> std::collections::HashSet<&str> {
        self.term_freqs[doc_id]
            .keys()
            .map(|s| s.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Source;

    fn problem(title: &str, description: &str, topics: &[&str]) -> Problem {
        Problem {
            source: Source::LeetCode,
            id: "1".to_string(),
            title: title.to_string(),
            url: format!("https://example.com/{}", title.replace(' ', "-")),
            description: description.to_string(),
            topics: topics.iter().map(|s| s.to_string()).collect(),
            acceptance_rate: None,
            solved_count: None,
            elo: 1500,
        }
    }

    #[test]
    fn test_tokenize_lowercases_and_strips_stopwords() {
        let tokens = tokenize("The Sum of an Array");
        assert_eq!(tokens, vec!["sum", "array"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   the a of   ").is_empty());
    }

    #[test]
    fn test_build_registers_all_fields() {
        let corpus = vec![problem("Two Sum", "hashmap lookup", &["Array", "Hash Table"])];
        let index = TfIdfIndex::build(&corpus);
        assert_eq!(index.len(), 1);
        let terms = index.doc_terms(0);
        assert!(terms.contains("two"));
        assert!(terms.contains("hashmap"));
        assert!(terms.contains("array"));
        assert!(terms.contains("table"));
    }

    #[test]
    fn test_matching_term_scores_positive() {
        let corpus = vec![
            problem("Two Sum", "array hashmap lookup", &["Array"]),
            problem("Graph Coloring", "graph theory", &["Graph"]),
        ];
        let index = TfIdfIndex::build(&corpus);
        let query = tokenize("array");

        assert!(index.score(&query, 0) > 0.0);
        assert_eq!(index.score(&query, 1), 0.0);
    }

    #[test]
    fn test_rarer_term_outweighs_common_term() {
        let corpus = vec![
            problem("alpha beta", "", &[]),
            problem("alpha gamma", "", &[]),
            problem("alpha delta", "", &[]),
        ];
        let index = TfIdfIndex::build(&corpus);

        let common = index.score(&tokenize("alpha"), 0);
        let rare = index.score(&tokenize("beta"), 0);
        assert!(rare > common, "rare={} common={}", rare, common);
    }

    #[test]
    fn test_repeated_query_term_counts_twice() {
        let corpus = vec![problem("sum sum sum", "", &[])];
        let index = TfIdfIndex::build(&corpus);

        let single = index.score(&tokenize("sum"), 0);
        let double = index.score(&tokenize("sum sum"), 0);
        assert!((double - 2.0 * single).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_doc_scores_zero() {
        let corpus = vec![problem("Two Sum", "", &[])];
        let index = TfIdfIndex::build(&corpus);
        assert_eq!(index.score(&tokenize("sum"), 5), 0.0);
    }
}
