#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for one penalty-map ingestion run.
//!
//! Missing required flags abort here, before any network activity.

use std::path::PathBuf;

use clap::Parser;
use penalty_map_ingest::{
    DEFAULT_CONCURRENT_FETCHES, DEFAULT_CONCURRENT_GROUPS, RunContext, RunOutcome,
};

#[derive(Parser)]
#[command(name = "penalty_map", about = "NSW penalty notices scraper and geocoder")]
struct Cli {
    /// Path to write the collated dataset to
    #[arg(short, long)]
    output: PathBuf,

    /// Google Maps Geocoding API key
    #[arg(short = 'k', long)]
    api_key: String,

    /// Directory holding the caches, watermark, and datalogs
    #[arg(long, default_value = ".")]
    state_dir: PathBuf,

    /// Maximum number of register entries to process (for testing)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Clear the crawl page cache before fetching
    #[arg(short = 'c', long)]
    flush_crawl_cache: bool,

    /// Maximum number of groups crawled concurrently
    #[arg(long, default_value_t = DEFAULT_CONCURRENT_GROUPS)]
    concurrent_groups: usize,

    /// Maximum detail fetches in flight per group
    #[arg(long, default_value_t = DEFAULT_CONCURRENT_FETCHES)]
    concurrent_fetches: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let ctx = RunContext {
        output_path: cli.output,
        api_key: cli.api_key,
        state_dir: cli.state_dir,
        limit: cli.limit,
        flush_crawl_cache: cli.flush_crawl_cache,
        concurrent_groups: cli.concurrent_groups,
        concurrent_fetches: cli.concurrent_fetches,
    };

    log::info!("Output file: {}", ctx.output_path.display());
    log::info!("State dir: {}", ctx.state_dir.display());

    match penalty_map_ingest::run(&ctx).await? {
        RunOutcome::Unchanged => {
            log::info!("No changes. Exiting.");
        }
        RunOutcome::Completed { groups, notices } => {
            log::info!(
                "Done: {groups} business(es), {notices} notice(s) written to {}",
                ctx.output_path.display()
            );
        }
    }

    Ok(())
}
