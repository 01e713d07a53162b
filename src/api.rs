//! # API Server Module
//!
//! ## Purpose
//! REST API server exposing the search endpoint for the problem search
//! front-end, with a health check and a landing page.
//!
//! ## Input/Output Specification
//! - **Input**: `GET /search?query=<text>&difficulties=<csv>` requests
//! - **Output**: JSON array of matched problems with relevance attached
//! - **Endpoints**: search, health, index page
//!
//! ## Key Features
//! - Query parameters only; both are optional and default to empty
//! - Difficulty CSV parsing that never rejects a request: unparseable
//!   entries degrade to an impossible tier instead of an error
//! - Permissive CORS for an externally-hosted front-end
//! - Structured error responses

use crate::errors::{Result, SearchError};
use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::Deserialize;

/// Tier value assigned to difficulty entries that fail to parse. Outside the
/// 1-10 range, so it keeps the selection non-empty while matching no problem.
const INVALID_TIER: i32 = -1;

/// Application state holder for the API server
pub struct ApiServer {
    app_state: crate::AppState,
}

/// Search request query parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    /// Comma-separated difficulty tiers, e.g. `"1,2,3"`
    #[serde(default)]
    pub difficulties: String,
}

impl ApiServer {
    /// Create new API server
    pub fn new(app_state: crate::AppState) -> Self {
        Self { app_state }
    }

    /// Run the API server until the process is stopped
    pub async fn run(self) -> Result<()> {
        let bind_addr = format!(
            "{}:{}",
            self.app_state.config.server.host, self.app_state.config.server.port
        );
        let enable_cors = self.app_state.config.server.enable_cors;

        tracing::info!(
            "Starting API server on {} ({} indexed problems)",
            bind_addr,
            self.app_state.engine.corpus_len()
        );

        // The builder holds non-Send service factories; take the Server
        // handle before awaiting so the returned future stays Send
        let server = HttpServer::new(move || {
            let cors = if enable_cors {
                Cors::permissive()
            } else {
                Cors::default()
            };
            App::new()
                .wrap(cors)
                .app_data(web::Data::new(self.app_state.clone()))
                .route("/search", web::get().to(search_handler))
                .route("/health", web::get().to(health_handler))
                .route("/", web::get().to(index_handler))
        })
        .bind(&bind_addr)
        .map_err(|e| SearchError::Internal {
            message: format!("Failed to bind server to {}: {}", bind_addr, e),
        })?
        .run();

        server.await.map_err(|e| SearchError::Internal {
            message: format!("Server error: {}", e),
        })?;

        Ok(())
    }
}

/// Parse the difficulties CSV into selected tiers.
///
/// An empty or whitespace string means no filter. Entries are trimmed;
/// anything that is not an integer becomes [`INVALID_TIER`], so a selection
/// like `"abc"` filters everything out rather than failing the request.
pub fn parse_difficulties(raw: &str) -> Vec<i32> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',')
        .map(|entry| entry.trim().parse::<i32>().unwrap_or(INVALID_TIER))
        .collect()
}

/// Search endpoint handler
async fn search_handler(
    app_state: web::Data<crate::AppState>,
    params: web::Query<SearchParams>,
) -> ActixResult<HttpResponse> {
    let start_time = std::time::Instant::now();
    let selected = parse_difficulties(&params.difficulties);

    let results =
        app_state
            .engine
            .search(&params.query, &selected, &mut rand::thread_rng());

    tracing::debug!(
        "Query {:?} (difficulties {:?}) matched {} problems in {}ms",
        params.query,
        params.difficulties,
        results.len(),
        start_time.elapsed().as_millis()
    );

    Ok(HttpResponse::Ok().json(results))
}

/// Health check endpoint handler
async fn health_handler(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "indexed_problems": app_state.engine.corpus_len(),
    })))
}

/// Index page handler
async fn index_handler() -> ActixResult<HttpResponse> {
    let html = r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>Problem Search Engine</title>
        <style>
            body { font-family: Arial, sans-serif; margin: 40px; }
            .header { color: #2c3e50; }
            .endpoint { margin: 20px 0; padding: 15px; background: #f8f9fa; border-radius: 5px; }
            .method { font-weight: bold; color: #27ae60; }
        </style>
    </head>
    <body>
        <h1 class="header">Problem Search Engine API</h1>
        <p>Free-text search over competitive-programming problems, with a unified Elo difficulty filter.</p>

        <h2>Available Endpoints</h2>

        <div class="endpoint">
            <span class="method">GET</span> /search?query=&lt;text&gt;&amp;difficulties=&lt;csv&gt;
            <p>Search the corpus. <code>difficulties</code> is a comma-separated list of tiers 1-10; leave it empty for no filter.</p>
        </div>

        <div class="endpoint">
            <span class="method">GET</span> /health
            <p>Check the service status and the number of indexed problems.</p>
        </div>

        <h2>Example</h2>
        <pre>GET /search?query=two+pointers&amp;difficulties=1,2,3</pre>
    </body>
    </html>
    "#;

    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::TfIdfIndex;
    use crate::search::SearchEngine;
    use crate::{Problem, Source};
    use actix_web::App;
    use std::sync::Arc;

    fn problem(title: &str, elo: u32) -> Problem {
        Problem {
            source: Source::LeetCode,
            id: title.to_string(),
            title: title.to_string(),
            url: format!("https://example.com/{}", title.replace(' ', "-")),
            description: "array manipulation".to_string(),
            topics: vec!["Array".to_string()],
            acceptance_rate: None,
            solved_count: None,
            elo,
        }
    }

    fn app_state() -> crate::AppState {
        let corpus = vec![problem("Two Sum", 1200), problem("Array Partition", 3000)];
        let index = TfIdfIndex::build(&corpus);
        crate::AppState {
            config: Arc::new(crate::Config::default()),
            engine: Arc::new(SearchEngine::new(corpus, index)),
        }
    }

    #[test]
    fn test_parse_difficulties() {
        assert!(parse_difficulties("").is_empty());
        assert!(parse_difficulties("   ").is_empty());
        assert_eq!(parse_difficulties("1,2,3"), vec![1, 2, 3]);
        assert_eq!(parse_difficulties(" 4 , 5 "), vec![4, 5]);
        assert_eq!(parse_difficulties("1,abc,3"), vec![1, INVALID_TIER, 3]);
        assert_eq!(parse_difficulties("abc"), vec![INVALID_TIER]);
    }

    #[actix_web::test]
    async fn test_search_endpoint_returns_matches() {
        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .route("/search", web::get().to(search_handler)),
        )
        .await;

        let req = actix_web::test::TestRequest::get()
            .uri("/search?query=array")
            .to_request();
        let body: Vec<serde_json::Value> = actix_web::test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 2);
        for item in &body {
            assert!(item["relevance"].as_f64().unwrap() > 0.0);
            assert!(item["url"].is_string());
        }
    }

    #[actix_web::test]
    async fn test_search_endpoint_empty_query() {
        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .route("/search", web::get().to(search_handler)),
        )
        .await;

        let req = actix_web::test::TestRequest::get().uri("/search").to_request();
        let body: Vec<serde_json::Value> = actix_web::test::call_and_read_body_json(&app, req).await;
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn test_search_endpoint_applies_difficulty_filter() {
        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .route("/search", web::get().to(search_handler)),
        )
        .await;

        // "Two Sum" at elo 1200 is tier 1; "Array Partition" at 3000 is tier 8
        let req = actix_web::test::TestRequest::get()
            .uri("/search?query=array&difficulties=1")
            .to_request();
        let body: Vec<serde_json::Value> = actix_web::test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["title"], "Two Sum");
    }

    #[actix_web::test]
    async fn test_search_endpoint_unparseable_difficulties_match_nothing() {
        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .route("/search", web::get().to(search_handler)),
        )
        .await;

        let req = actix_web::test::TestRequest::get()
            .uri("/search?query=array&difficulties=abc")
            .to_request();
        let body: Vec<serde_json::Value> = actix_web::test::call_and_read_body_json(&app, req).await;
        assert!(body.is_empty());
    }

    #[test]
    fn test_run_future_is_spawnable() {
        // tokio::spawn in main requires the server future to be Send
        fn assert_send<T: Send>(_: &T) {}
        let server = ApiServer::new(app_state());
        let fut = server.run();
        assert_send(&fut);
        drop(fut);
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .route("/health", web::get().to(health_handler)),
        )
        .await;

        let req = actix_web::test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = actix_web::test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["indexed_problems"], 2);
    }
}
