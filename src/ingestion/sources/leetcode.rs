//! # LeetCode Data Source
//!
//! ## Purpose
//! Fetches the bulk problem listing over REST, then enriches each problem
//! through the GraphQL detail endpoint: statement content, topic tags and
//! acceptance statistics.
//!
//! ## Input/Output Specification
//! - **Input**: listing/GraphQL endpoints, per-run limit, concurrency limit
//! - **Output**: normalized problems with acceptance-derived Elo
//! - **Concurrency**: detail requests run in fixed-size batches; requests
//!   within a batch are concurrent, batches are sequential, so simultaneous
//!   outbound connections stay bounded
//!
//! Per-item detail failures are logged and the item dropped; they never abort
//! the batch or the run.

use super::ProblemSource;
use crate::config::{IngestionConfig, LeetCodeConfig};
use crate::difficulty;
use crate::errors::{Result, SearchError};
use crate::{Problem, Source};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const GET_PROBLEM_QUERY: &str = r#"
query getProblem($titleSlug: String!) {
  question(titleSlug: $titleSlug) {
    content
    stats
    topicTags { name }
  }
}
"#;

/// LeetCode adapter: REST listing + GraphQL detail enrichment.
pub struct LeetCodeSource {
    config: LeetCodeConfig,
    concurrency_limit: usize,
    client: Client,
    tag_re: Regex,
}

/// Listing entry before detail enrichment.
#[derive(Debug, Clone)]
pub struct ProblemStub {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub url: String,
}

/// Bulk listing response shape (`/api/problems/all/`).
#[derive(Debug, Deserialize)]
struct ListingResponse {
    stat_status_pairs: Vec<StatPair>,
}

#[derive(Debug, Deserialize)]
struct StatPair {
    stat: ListingStat,
}

#[derive(Debug, Deserialize)]
struct ListingStat {
    question_id: u64,
    #[serde(rename = "question__title")]
    title: String,
    #[serde(rename = "question__title_slug")]
    slug: String,
}

/// GraphQL detail response shape.
#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<GraphQlData>,
}

#[derive(Debug, Deserialize)]
struct GraphQlData {
    question: Option<QuestionDetail>,
}

#[derive(Debug, Deserialize)]
struct QuestionDetail {
    content: Option<String>,
    /// JSON-encoded string, parsed separately via [`QuestionStats`]
    stats: Option<String>,
    #[serde(rename = "topicTags", default)]
    topic_tags: Vec<TopicTag>,
}

#[derive(Debug, Deserialize)]
struct TopicTag {
    name: String,
}

/// Known shapes of the `stats` payload, in resolution order. The endpoint has
/// historically served either a precomputed rate or separate counters.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuestionStats {
    /// `{"acRate": "52.3%", ...}`
    Precomputed {
        #[serde(rename = "acRate")]
        ac_rate: String,
    },
    /// `{"totalAccepted": 100, "totalSubmission": 200, ...}`
    Counters {
        #[serde(rename = "totalAccepted", alias = "total_ac", default)]
        total_accepted: Option<u64>,
        #[serde(rename = "totalSubmission", alias = "totalSubmitted", default)]
        total_submission: Option<u64>,
    },
}

/// Best-effort acceptance rate from a raw `stats` payload, `None` when
/// neither known shape is parseable.
fn parse_acceptance(raw: &str) -> Option<f64> {
    match serde_json::from_str::<QuestionStats>(raw) {
        Ok(QuestionStats::Precomputed { ac_rate }) => {
            ac_rate.trim().trim_end_matches('%').parse().ok()
        }
        Ok(QuestionStats::Counters {
            total_accepted,
            total_submission,
        }) => {
            let accepted = total_accepted?;
            let submitted = total_submission?;
            if submitted > 0 {
                Some(accepted as f64 / submitted as f64 * 100.0)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

impl LeetCodeSource {
    /// Create the adapter from the ingestion configuration.
    pub fn new(ingestion: &IngestionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(ingestion.request_timeout_seconds))
            .user_agent("problem-search/0.1")
            .build()?;

        Ok(Self {
            config: ingestion.leetcode.clone(),
            concurrency_limit: ingestion.concurrency_limit.max(1),
            client,
            tag_re: Regex::new(r"<[^>]+>").map_err(|e| SearchError::Internal {
                message: format!("invalid HTML tag pattern: {}", e),
            })?,
        })
    }

    /// Fetch the bulk listing and map it into stubs.
    pub async fn list_problems(&self) -> Result<Vec<ProblemStub>> {
        tracing::info!("Fetching LeetCode problem listing");

        let response = self.client.get(&self.config.list_url).send().await?;
        if !response.status().is_success() {
            return Err(SearchError::SourceUnavailable {
                name: "LeetCode".to_string(),
                details: format!("listing returned HTTP {}", response.status()),
            });
        }

        let listing: ListingResponse =
            response
                .json()
                .await
                .map_err(|e| SearchError::DataParsing {
                    name: "LeetCode listing".to_string(),
                    details: e.to_string(),
                })?;

        let stubs = listing
            .stat_status_pairs
            .into_iter()
            .map(|pair| ProblemStub {
                id: pair.stat.question_id.to_string(),
                title: pair.stat.title,
                url: format!("{}/{}/", self.config.problem_base_url, pair.stat.slug),
                slug: pair.stat.slug,
            })
            .collect();

        Ok(stubs)
    }

    /// Enrich one stub through the GraphQL detail endpoint.
    pub async fn fetch_detail(&self, stub: &ProblemStub) -> Result<Problem> {
        let body = serde_json::json!({
            "query": GET_PROBLEM_QUERY,
            "variables": { "titleSlug": stub.slug },
        });

        let response = self
            .client
            .post(&self.config.graphql_url)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::SourceUnavailable {
                name: "LeetCode".to_string(),
                details: format!("GraphQL returned HTTP {} for {}", response.status(), stub.slug),
            });
        }

        let gql: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| SearchError::DataParsing {
                name: "LeetCode GraphQL".to_string(),
                details: e.to_string(),
            })?;

        let question = gql.data.and_then(|d| d.question);

        let description = question
            .as_ref()
            .and_then(|q| q.content.as_deref())
            .map(|html| self.strip_html(html))
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| "N/A".to_string());

        let topics = question
            .as_ref()
            .map(|q| q.topic_tags.iter().map(|t| t.name.clone()).collect())
            .unwrap_or_default();

        let acceptance_rate = question
            .as_ref()
            .and_then(|q| q.stats.as_deref())
            .and_then(parse_acceptance);

        Ok(Problem {
            source: Source::LeetCode,
            id: stub.id.clone(),
            title: stub.title.clone(),
            url: stub.url.clone(),
            description,
            topics,
            acceptance_rate,
            solved_count: None,
            elo: difficulty::acceptance_to_elo(acceptance_rate),
        })
    }

    /// Strip HTML tags and collapse whitespace.
    fn strip_html(&self, html: &str) -> String {
        let stripped = self.tag_re.replace_all(html, " ");
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[async_trait]
impl ProblemSource for LeetCodeSource {
    fn source(&self) -> Source {
        Source::LeetCode
    }

    fn name(&self) -> &str {
        "LeetCode"
    }

    async fn fetch_problems(&self, limit: usize) -> Result<Vec<Problem>> {
        let mut stubs = self.list_problems().await?;
        stubs.truncate(limit);

        let mut problems = Vec::with_capacity(stubs.len());
        for (batch_index, batch) in stubs.chunks(self.concurrency_limit).enumerate() {
            let offset = batch_index * self.concurrency_limit;
            tracing::info!(
                "LeetCode: fetching details {}..{}",
                offset + 1,
                offset + batch.len()
            );

            let results =
                futures::future::join_all(batch.iter().map(|stub| self.fetch_detail(stub))).await;

            for (stub, result) in batch.iter().zip(results) {
                match result {
                    Ok(problem) => problems.push(problem),
                    Err(e) => {
                        tracing::warn!(
                            "LeetCode detail fetch failed for {}: {} (dropping item)",
                            stub.slug,
                            e
                        );
                    }
                }
            }
        }

        tracing::info!("Collected {} LeetCode problems (detailed)", problems.len());
        Ok(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source_for(server_uri: &str) -> LeetCodeSource {
        let mut ingestion = IngestionConfig::default();
        ingestion.concurrency_limit = 2;
        ingestion.leetcode.list_url = format!("{}/api/problems/all/", server_uri);
        ingestion.leetcode.graphql_url = format!("{}/graphql", server_uri);
        ingestion.leetcode.problem_base_url = format!("{}/problems", server_uri);
        LeetCodeSource::new(&ingestion).unwrap()
    }

    fn listing_body() -> serde_json::Value {
        serde_json::json!({
            "stat_status_pairs": [
                {
                    "stat": {
                        "question_id": 1,
                        "question__title": "Two Sum",
                        "question__title_slug": "two-sum"
                    },
                    "difficulty": { "level": 1 }
                },
                {
                    "stat": {
                        "question_id": 2,
                        "question__title": "Add Two Numbers",
                        "question__title_slug": "add-two-numbers"
                    },
                    "difficulty": { "level": 2 }
                }
            ]
        })
    }

    fn question_body(stats: &str) -> serde_json::Value {
        serde_json::json!({
            "data": {
                "question": {
                    "content": "<p>Given an <b>array</b> of integers...</p>",
                    "stats": stats,
                    "topicTags": [ { "name": "Array" }, { "name": "Hash Table" } ]
                }
            }
        })
    }

    #[test]
    fn test_parse_acceptance_precomputed_rate() {
        assert_eq!(parse_acceptance(r#"{"acRate": "53.1%"}"#), Some(53.1));
        assert_eq!(parse_acceptance(r#"{"acRate": " 40% "}"#), Some(40.0));
    }

    #[test]
    fn test_parse_acceptance_counter_variants() {
        let rate = parse_acceptance(r#"{"totalAccepted": 50, "totalSubmission": 200}"#).unwrap();
        assert!((rate - 25.0).abs() < 1e-9);

        // Historical alias for the submissions counter
        let rate = parse_acceptance(r#"{"totalAccepted": 30, "totalSubmitted": 60}"#).unwrap();
        assert!((rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_acceptance_unparseable_is_none() {
        assert_eq!(parse_acceptance("not json"), None);
        assert_eq!(parse_acceptance(r#"{"unrelated": true}"#), None);
        assert_eq!(
            parse_acceptance(r#"{"totalAccepted": 10, "totalSubmission": 0}"#),
            None
        );
    }

    #[tokio::test]
    async fn test_fetch_problems_enriches_details() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/problems/all/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(question_body(r#"{"acRate": "50.0%"}"#)),
            )
            .mount(&server)
            .await;

        let source = source_for(&server.uri());
        let problems = source.fetch_problems(10).await.unwrap();

        assert_eq!(problems.len(), 2);
        let first = &problems[0];
        assert_eq!(first.source, Source::LeetCode);
        assert_eq!(first.title, "Two Sum");
        assert!(first.url.ends_with("/problems/two-sum/"));
        assert_eq!(first.description, "Given an array of integers...");
        assert_eq!(first.topics, vec!["Array", "Hash Table"]);
        assert_eq!(first.acceptance_rate, Some(50.0));
        // 50% acceptance maps to the middle of the Elo scale
        assert_eq!(first.elo, 2150);
    }

    #[tokio::test]
    async fn test_detail_failure_drops_item_not_run() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/problems/all/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("add-two-numbers"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("two-sum"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(question_body(r#"{"acRate": "31.5%"}"#)),
            )
            .mount(&server)
            .await;

        let source = source_for(&server.uri());
        let problems = source.fetch_problems(10).await.unwrap();

        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].title, "Two Sum");
    }

    #[tokio::test]
    async fn test_listing_respects_limit() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/problems/all/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(question_body(r#"{"acRate": "50.0%"}"#)),
            )
            .mount(&server)
            .await;

        let source = source_for(&server.uri());
        let problems = source.fetch_problems(1).await.unwrap();
        assert_eq!(problems.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_question_falls_back_to_defaults() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/problems/all/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": {} })),
            )
            .mount(&server)
            .await;

        let source = source_for(&server.uri());
        let problems = source.fetch_problems(1).await.unwrap();

        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].description, "N/A");
        assert!(problems[0].topics.is_empty());
        assert_eq!(problems[0].acceptance_rate, None);
        // Unknown acceptance defaults to "likely hard"
        assert_eq!(problems[0].elo, difficulty::UNKNOWN_ACCEPTANCE_ELO);
    }
}
