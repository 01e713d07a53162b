//! # Problem Search Server Main Driver
//!
//! ## Purpose
//! Main entry point for the problem search server. Loads the corpus snapshot,
//! builds the in-memory search index and serves the search API.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file, command line arguments
//! - **Output**: Running web server with search API endpoints
//! - **Initialization**: Load snapshot, build TF-IDF index, start server
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Load the corpus snapshot (empty corpus is served, with a warning)
//! 4. Build the TF-IDF index and the search engine
//! 5. Start the web API server
//! 6. Handle shutdown signals gracefully

use clap::{Arg, Command};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use problem_search::{
    api::ApiServer,
    config::Config,
    corpus::CorpusStore,
    errors::{Result, SearchError},
    index::TfIdfIndex,
    search::SearchEngine,
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("problem-search-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Difficulty-aware search over a multi-source competitive-programming corpus")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Server port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("snapshot")
                .long("snapshot")
                .value_name("FILE")
                .help("Corpus snapshot path"),
        )
        .get_matches();

    // Load configuration
    let config_path = matches.get_one::<String>("config").ok_or_else(|| {
        SearchError::Internal {
            message: "config argument has a default and must be present".to_string(),
        }
    })?;
    let mut config = Config::from_file(config_path)?;

    // Command line overrides
    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }
    if let Some(snapshot) = matches.get_one::<String>("snapshot") {
        config.corpus.snapshot_path = snapshot.into();
    }

    let config = Arc::new(config);

    // Initialize logging
    init_logging(&config)?;

    info!("Starting problem search server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", config_path);

    // Load the corpus and build the index
    let app_state = initialize_components(config.clone())?;

    // Start the API server
    let server = ApiServer::new(app_state);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("Server error: {}", e);
        }
    });

    info!(
        "Problem search server started on {}:{}",
        config.server.host, config.server.port
    );

    // Wait for shutdown signal
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = server_handle => {
            warn!("Server stopped unexpectedly");
        }
    }

    info!("Problem search server shut down");
    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let log_level = config
        .logging
        .level
        .parse()
        .map_err(|_| SearchError::Config {
            message: format!("Invalid log level: {}", config.logging.level),
        })?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(tracing_subscriber::filter::LevelFilter::from_level(
                    log_level,
                )),
        )
        .init();

    info!("Logging initialized with level: {}", config.logging.level);
    Ok(())
}

/// Load the corpus, build the index and assemble shared state
fn initialize_components(config: Arc<Config>) -> Result<AppState> {
    info!("Loading corpus snapshot...");
    let store = CorpusStore::new(&config.corpus.snapshot_path);
    let corpus = store.load()?;

    if corpus.is_empty() {
        warn!(
            "Corpus is empty; run problem-search-ingest to populate {:?}",
            config.corpus.snapshot_path
        );
    }

    info!("Building TF-IDF index over {} problems...", corpus.len());
    let index = TfIdfIndex::build(&corpus);
    let engine = Arc::new(SearchEngine::new(corpus, index));

    info!("All components initialized successfully");
    Ok(AppState { config, engine })
}
