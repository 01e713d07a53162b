//! # Codeforces Data Source
//!
//! ## Purpose
//! Scrapes the paginated problemset table through an automated browser
//! session, extracting id, title, tags and solve counts from each row.
//!
//! ## Input/Output Specification
//! - **Input**: problemset URL, per-run limit, table-wait timeout, render mode
//! - **Output**: normalized problems with popularity-derived Elo
//! - **Pagination**: strictly sequential, one page at a time; stops at the
//!   limit, at a page with zero valid rows, or when the table never appears
//!
//! A run that collects zero problems is retried exactly once in the alternate
//! rendering mode before giving up with an empty result. Rows missing an id
//! or title are silently dropped, not counted as errors.

use super::ProblemSource;
use crate::config::{CodeforcesConfig, IngestionConfig};
use crate::difficulty;
use crate::errors::{Result, SearchError};
use crate::{Problem, Source};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

const ROW_SELECTOR: &str = "table.problems tr";
const TABLE_SELECTOR: &str = "table.problems";
const ID_SELECTOR: &str = "td.id a";
const TITLE_SELECTOR: &str = "td:nth-child(2) div:first-child a";
const TAGS_SELECTOR: &str = "td:nth-child(2) div:last-child a";
const SOLVED_SELECTOR: &str = "td:last-child a";

/// How much page HTML to keep in the diagnostic snapshot log.
const SNAPSHOT_CHARS: usize = 500;

/// Rendering mode of the automated browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Headless,
    Visible,
}

impl RenderMode {
    /// The mode to retry in after a zero-result run.
    pub fn alternate(self) -> Self {
        match self {
            RenderMode::Headless => RenderMode::Visible,
            RenderMode::Visible => RenderMode::Headless,
        }
    }
}

/// One page-holding browser session. Page state lives in the session, so
/// pagination through it is strictly sequential.
#[async_trait]
pub trait BrowserSession: Send {
    /// Load the given URL; page load itself is unbounded by contract.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Wait up to `timeout` for the selector to appear on the current page.
    /// `Ok(false)` means the wait expired without the element showing up.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool>;

    /// HTML of the current page.
    fn content(&self) -> String;
}

/// Launches one [`BrowserSession`] per scrape attempt.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self, mode: RenderMode) -> Result<Self::Session>;
}

/// Production engine backed by plain HTTP fetches. There is no real renderer;
/// the mode only affects logging and the retry contract, and `wait_for`
/// re-fetches the page while polling for the selector.
pub struct HttpBrowserEngine {
    client: Client,
}

impl HttpBrowserEngine {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            )
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BrowserEngine for HttpBrowserEngine {
    type Session = HttpBrowserSession;

    async fn launch(&self, mode: RenderMode) -> Result<HttpBrowserSession> {
        tracing::debug!("Launching HTTP browser session (mode={:?})", mode);
        Ok(HttpBrowserSession {
            client: self.client.clone(),
            current_url: String::new(),
            html: String::new(),
        })
    }
}

/// HTTP-backed session: `navigate` fetches the page body, `wait_for` polls by
/// re-fetching until the selector matches or the timeout expires.
pub struct HttpBrowserSession {
    client: Client,
    current_url: String,
    html: String,
}

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[async_trait]
impl BrowserSession for HttpBrowserSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SearchError::Scrape {
                location: url.to_string(),
                details: format!("HTTP {}", response.status()),
            });
        }
        self.html = response.text().await?;
        self.current_url = url.to_string();
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if selector_present(&self.html, selector)? {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
            if !self.current_url.is_empty() {
                let url = self.current_url.clone();
                self.navigate(&url).await?;
            }
        }
    }

    fn content(&self) -> String {
        self.html.clone()
    }
}

/// Check a selector against an HTML string. Parsed documents never cross an
/// await point, keeping session futures `Send`.
fn selector_present(html: &str, selector: &str) -> Result<bool> {
    let sel = parse_selector(selector)?;
    Ok(Html::parse_document(html).select(&sel).next().is_some())
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| SearchError::Scrape {
        location: selector.to_string(),
        details: format!("invalid selector: {:?}", e),
    })
}

/// Codeforces adapter: sequential pagination over the problemset table.
pub struct CodeforcesSource<E: BrowserEngine> {
    config: CodeforcesConfig,
    engine: E,
    initial_mode: RenderMode,
    solved_re: Regex,
    id_re: Regex,
}

impl CodeforcesSource<HttpBrowserEngine> {
    /// Production constructor with the HTTP-backed engine.
    pub fn new(ingestion: &IngestionConfig) -> Result<Self> {
        let engine =
            HttpBrowserEngine::new(Duration::from_secs(ingestion.request_timeout_seconds))?;
        let mode = if ingestion.headless {
            RenderMode::Headless
        } else {
            RenderMode::Visible
        };
        Self::with_engine(ingestion.codeforces.clone(), engine, mode)
    }
}

impl<E: BrowserEngine> CodeforcesSource<E> {
    /// Construct with an arbitrary engine; tests inject a fake one.
    pub fn with_engine(config: CodeforcesConfig, engine: E, initial_mode: RenderMode) -> Result<Self> {
        Ok(Self {
            config,
            engine,
            initial_mode,
            solved_re: Regex::new(r"(?i)x\s*([\d,]+)").map_err(|e| SearchError::Internal {
                message: format!("invalid solved-count pattern: {}", e),
            })?,
            id_re: Regex::new(r"(?i)^(\d+)([A-Z]\d*)$").map_err(|e| SearchError::Internal {
                message: format!("invalid problem-id pattern: {}", e),
            })?,
        })
    }

    /// One full scrape attempt in the given mode.
    async fn scrape(&self, mode: RenderMode, limit: usize) -> Result<Vec<Problem>> {
        tracing::info!("Scraping Codeforces (mode={:?})", mode);
        let mut session = self.engine.launch(mode).await?;
        let wait = Duration::from_millis(self.config.table_wait_ms);

        let mut problems: Vec<Problem> = Vec::new();
        let mut page_num: u32 = 1;

        while problems.len() < limit {
            let url = format!("{}/page/{}", self.config.problemset_url, page_num);
            tracing::info!("Visiting Codeforces page {}", page_num);
            // A mid-pagination failure ends the scrape but keeps everything
            // collected so far
            if let Err(e) = session.navigate(&url).await {
                tracing::warn!("Failed to load page {}: {}", page_num, e);
                break;
            }

            match session.wait_for(TABLE_SELECTOR, wait).await {
                Ok(true) => {}
                Ok(false) => {
                    let snapshot: String =
                        session.content().chars().take(SNAPSHOT_CHARS).collect();
                    tracing::warn!(
                        "{} not found on page {}; treating as end of data. Snapshot: {}",
                        TABLE_SELECTOR,
                        page_num,
                        snapshot
                    );
                    break;
                }
                Err(e) => {
                    tracing::warn!("Wait for table failed on page {}: {}", page_num, e);
                    break;
                }
            }

            let rows = match self.parse_rows(&session.content()) {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::warn!("Failed to parse page {}: {}", page_num, e);
                    break;
                }
            };
            if rows.is_empty() {
                tracing::info!("No valid problem rows on page {}; stopping", page_num);
                break;
            }

            problems.extend(rows);
            page_num += 1;
        }

        problems.truncate(limit);
        tracing::info!(
            "Collected {} problems from Codeforces (mode={:?})",
            problems.len(),
            mode
        );
        Ok(problems)
    }

    /// Extract problems from the table rows of one page. Rows without both an
    /// id and a title are dropped without comment.
    fn parse_rows(&self, html: &str) -> Result<Vec<Problem>> {
        let row_sel = parse_selector(ROW_SELECTOR)?;
        let id_sel = parse_selector(ID_SELECTOR)?;
        let title_sel = parse_selector(TITLE_SELECTOR)?;
        let tags_sel = parse_selector(TAGS_SELECTOR)?;
        let solved_sel = parse_selector(SOLVED_SELECTOR)?;

        let document = Html::parse_document(html);
        let mut problems = Vec::new();

        // First row is the table header
        for row in document.select(&row_sel).skip(1) {
            let id: String = match row.select(&id_sel).next() {
                Some(node) => node.text().collect::<String>().trim().to_string(),
                None => continue,
            };
            let title: String = match row.select(&title_sel).next() {
                Some(node) => node.text().collect::<String>().trim().to_string(),
                None => continue,
            };
            if id.is_empty() || title.is_empty() {
                continue;
            }

            let topics: Vec<String> = row
                .select(&tags_sel)
                .map(|node| node.text().collect::<String>().trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect();

            let solved_count = row
                .select(&solved_sel)
                .next()
                .map(|node| node.text().collect::<String>())
                .and_then(|text| self.parse_solved_count(&text));

            let url = self
                .id_re
                .captures(&id)
                .map(|caps| format!("{}/{}/{}", self.config.problem_base_url, &caps[1], &caps[2]))
                .unwrap_or_else(|| self.config.problemset_url.clone());

            problems.push(Problem {
                source: Source::Codeforces,
                id,
                title,
                url,
                description: "N/A".to_string(),
                topics,
                acceptance_rate: None,
                solved_count,
                elo: difficulty::solved_count_to_elo(solved_count),
            });
        }

        Ok(problems)
    }

    /// Parse a solved-count cell like `x24500` or `x 1,234`.
    fn parse_solved_count(&self, text: &str) -> Option<u64> {
        self.solved_re
            .captures(text.trim())
            .and_then(|caps| caps[1].replace(',', "").parse().ok())
    }
}

#[async_trait]
impl<E: BrowserEngine> ProblemSource for CodeforcesSource<E> {
    fn source(&self) -> Source {
        Source::Codeforces
    }

    fn name(&self) -> &str {
        "Codeforces"
    }

    async fn fetch_problems(&self, limit: usize) -> Result<Vec<Problem>> {
        let primary = match self.scrape(self.initial_mode, limit).await {
            Ok(problems) => problems,
            Err(e) => {
                tracing::warn!("Codeforces scrape failed (mode={:?}): {}", self.initial_mode, e);
                Vec::new()
            }
        };
        if !primary.is_empty() {
            return Ok(primary);
        }

        // One retry in the alternate rendering mode, then give up
        let fallback_mode = self.initial_mode.alternate();
        tracing::info!(
            "Primary scrape returned 0 problems; retrying in mode {:?}",
            fallback_mode
        );
        match self.scrape(fallback_mode, limit).await {
            Ok(problems) => Ok(problems),
            Err(e) => {
                tracing::warn!("Codeforces retry failed (mode={:?}): {}", fallback_mode, e);
                Ok(Vec::new())
            }
        }
    }
}
