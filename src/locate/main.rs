//! Command line location search.
//!
//! Loads a GeoNames dump (and optional boundary shapes) into memory and prints the
//! search response for each query as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use locator::config::Config;
use locator::search::{LocationService, SearchResponse};
use locator::store::{load_geonames, load_shapes, MemoryPlaceStore};
use locator::timing::TracingTimer;

#[derive(Parser, Debug)]
#[command(name = "locate")]
#[command(about = "Resolve location queries against a GeoNames dump")]
struct Args {
    /// Queries: a geoname id, a coordinate, `CODE|CODE: <coordinate>` or free text
    #[arg(required = true)]
    queries: Vec<String>,

    /// GeoNames tab-separated file (.txt or .txt.gz)
    #[arg(long)]
    places: PathBuf,

    /// Boundary shapes, one `geoname_id<TAB>EWKT` per line
    #[arg(long)]
    shapes: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum results for list searches
    #[arg(short, long)]
    limit: Option<usize>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: Level,
}

/// One line of output when several queries are given.
#[derive(Serialize)]
#[serde(untagged)]
enum Outcome {
    Found(SearchResponse),
    Failed { query: String, error: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays valid JSON
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let places = load_geonames(&args.places)?;
    let shapes = match &args.shapes {
        Some(path) => load_shapes(path)?,
        None => Vec::new(),
    };
    let store = MemoryPlaceStore::new(places, shapes, config.levels.clone());
    info!("Store ready with {} places", store.len());

    let service = LocationService::new(store, config).with_timer(Arc::new(TracingTimer));

    if let [query] = args.queries.as_slice() {
        let response = service.search_with_limit(query, args.limit)?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let outcomes: Vec<Outcome> = args
        .queries
        .iter()
        .zip(service.search_many_with_limit(&args.queries, args.limit))
        .map(|(query, result)| outcome(query, result))
        .collect();
    println!("{}", serde_json::to_string_pretty(&outcomes)?);

    Ok(())
}

fn outcome(query: &str, result: Result<SearchResponse, locator::SearchError>) -> Outcome {
    match result {
        Ok(response) => Outcome::Found(response),
        Err(e) => Outcome::Failed {
            query: query.to_string(),
            error: e.to_string(),
        },
    }
}
