//! # Ingestion Driver
//!
//! ## Purpose
//! Offline entry point that populates the corpus snapshot: registers the
//! platform adapters, runs the ingestion pipeline once and prints a summary.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file, command line arguments
//! - **Output**: An updated corpus snapshot on disk, run statistics in logs
//! - **Idempotence**: sources already present in the snapshot are skipped;
//!   delete the snapshot to force a full re-ingestion

use clap::{Arg, ArgAction, Command};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use problem_search::{
    config::Config,
    corpus::CorpusStore,
    errors::{Result, SearchError},
    ingestion::sources::{codeforces::CodeforcesSource, leetcode::LeetCodeSource},
    ingestion::IngestRunner,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("problem-search-ingest")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fetches problems from all registered sources into the corpus snapshot")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("limit")
                .short('l')
                .long("limit")
                .value_name("N")
                .help("Per-source problem limit (overrides the config file)")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("no-headless")
                .long("no-headless")
                .help("Start scraping in visible rendering mode")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").ok_or_else(|| {
        SearchError::Internal {
            message: "config argument has a default and must be present".to_string(),
        }
    })?;
    let mut config = Config::from_file(config_path)?;

    if let Some(limit) = matches.get_one::<usize>("limit") {
        config.ingestion.limit_per_source = *limit;
    }
    if matches.get_flag("no-headless") {
        config.ingestion.headless = false;
    }
    config.validate()?;

    init_logging(&config)?;

    info!("Starting ingestion run (config: {})", config_path);

    let store = CorpusStore::new(&config.corpus.snapshot_path);
    let mut runner = IngestRunner::new(store, config.ingestion.limit_per_source);
    runner.register(Box::new(LeetCodeSource::new(&config.ingestion)?));
    runner.register(Box::new(CodeforcesSource::new(&config.ingestion)?));

    let stats = runner.run().await?;

    for source in &stats.per_source {
        if source.skipped {
            info!("{}: already ingested, skipped", source.name);
        } else {
            info!(
                "{}: fetched {}, added {}",
                source.name, source.fetched, source.added
            );
        }
    }
    info!(
        "Ingestion finished in {}s: corpus {} -> {} problems ({} added)",
        (stats.finished_at - stats.started_at).num_seconds(),
        stats.initial_count,
        stats.final_count,
        stats.total_added()
    );

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

    Ok(())
}
