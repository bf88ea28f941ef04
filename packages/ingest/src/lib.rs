#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The penalty-notices ingestion pipeline.
//!
//! One [`run`] performs one full ingestion: fetch the register listing,
//! gate on the persisted watermark, group rows into crawl units, expand
//! every unit into notice records concurrently, geocode one address per
//! unit through the persistent cache, collate, and atomically persist the
//! dataset before advancing the watermark.
//!
//! Stages are pure functions or thin async drivers; everything a run needs
//! arrives through an explicit [`RunContext`] — there is no module-scope
//! state anywhere in the pipeline.

pub mod collate;
pub mod crawl;
pub mod datalogs;
pub mod geocode;
pub mod group;
pub mod watermark;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use penalty_map_cache::{FileStore, KeyValueStore as _};
use penalty_map_geocoder::google::GoogleMaps;
use penalty_map_models::Dataset;
use penalty_map_scraper::list;

use crate::datalogs::Datalogs;

/// Default cap on groups crawled simultaneously.
pub const DEFAULT_CONCURRENT_GROUPS: usize = 4;

/// Default cap on detail fetches in flight per group.
pub const DEFAULT_CONCURRENT_FETCHES: usize = 4;

/// Per-request timeout for every HTTP call the pipeline issues.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Fetching or parsing a register page failed.
    #[error("Scrape error: {0}")]
    Scrape(#[from] penalty_map_scraper::ScrapeError),

    /// A cache store operation failed.
    #[error("Cache error: {0}")]
    Cache(#[from] penalty_map_cache::CacheError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Building the HTTP client failed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Crawl and geocode results no longer line up — an internal invariant
    /// violation, never silently tolerated.
    #[error("Collation error: {message}")]
    Collation {
        /// Description of the misalignment.
        message: String,
    },
}

/// Everything one pipeline run needs, constructed once by the binary and
/// threaded explicitly into each stage.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Path the collated dataset is written to.
    pub output_path: PathBuf,
    /// Google Maps Geocoding API key.
    pub api_key: String,
    /// Directory holding the caches, the watermark file, and the datalogs.
    pub state_dir: PathBuf,
    /// Cap on the number of register entries processed (testing aid).
    pub limit: Option<usize>,
    /// Clear the crawl page cache before fetching.
    pub flush_crawl_cache: bool,
    /// Maximum groups crawled simultaneously.
    pub concurrent_groups: usize,
    /// Maximum detail fetches in flight per group.
    pub concurrent_fetches: usize,
}

impl RunContext {
    /// Directory of the crawl page cache.
    #[must_use]
    pub fn crawl_cache_dir(&self) -> PathBuf {
        self.state_dir.join(".crawlercache")
    }

    /// Directory of the geocoder address cache.
    #[must_use]
    pub fn geocoder_cache_dir(&self) -> PathBuf {
        self.state_dir.join(".geocodercache")
    }

    /// Path of the persisted watermark file.
    #[must_use]
    pub fn watermark_path(&self) -> PathBuf {
        self.state_dir.join(".lastupdated")
    }

    /// Base directory for per-run diagnostic snapshots.
    #[must_use]
    pub fn datalogs_dir(&self) -> PathBuf {
        self.state_dir.join(".datalogs")
    }
}

/// What a pipeline run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The register's marker matched the stored watermark; nothing was
    /// fetched beyond the listing, and no file was touched.
    Unchanged,
    /// A full crawl ran and the dataset was written.
    Completed {
        /// Number of collated business records.
        groups: usize,
        /// Total notices across all records.
        notices: usize,
    },
}

/// Runs the full ingestion pipeline once.
///
/// # Errors
///
/// Returns [`IngestError`] on any fatal condition: list fetch failure,
/// cache setup failure, collation misalignment, or persistence failure.
/// The watermark only advances after the dataset write succeeds, so a
/// failed run is always safe to retry.
pub async fn run(ctx: &RunContext) -> Result<RunOutcome, IngestError> {
    let start = Instant::now();

    let client = reqwest::Client::builder()
        .user_agent("penalty-map/0.1")
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    log::info!("Fetching penalty notices register...");
    let page = list::fetch_list(&client).await?;

    let stored = watermark::load(&ctx.watermark_path())?;
    if !watermark::has_changed(&page.last_updated, &stored) {
        log::info!("Register unchanged since \"{stored}\". Exiting.");
        return Ok(RunOutcome::Unchanged);
    }

    let mut entries = page.entries;
    if let Some(limit) = ctx.limit
        && entries.len() > limit
    {
        log::info!("Limiting to {limit} of {} entries", entries.len());
        entries.truncate(limit);
    }
    log::info!("Register changed, processing {} entries", entries.len());

    let crawl_cache = FileStore::open(ctx.crawl_cache_dir())?;
    if ctx.flush_crawl_cache {
        log::info!("Flushing crawl cache...");
        crawl_cache.clear().await?;
    }
    let geocoder_cache = FileStore::open(ctx.geocoder_cache_dir())?;

    let datalogs = Datalogs::create(&ctx.datalogs_dir())?;
    datalogs.record("stores_list", &entries);

    log::info!("Grouping {} entries...", entries.len());
    let groups = group::group_entries(&entries);
    log::info!("Grouped into {} crawl unit(s)", groups.len());
    datalogs.record("grouping", &groups);

    log::info!("Crawling {} group(s)...", groups.len());
    let crawled = crawl::crawl_groups(ctx, &client, &crawl_cache, groups).await;
    datalogs.record("crawled_groups", &crawled);

    log::info!("Geocoding {} group(s)...", crawled.len());
    let address_keys: Vec<&str> = crawled
        .iter()
        .map(|g| geocode::group_address(g).unwrap_or_default())
        .collect();
    datalogs.record("address_keys", &address_keys);

    let backend = GoogleMaps::new(client.clone(), ctx.api_key.clone());
    let geocoded = geocode::geocode_groups(&backend, &geocoder_cache, &crawled).await;
    datalogs.record("geocoding_results", &geocoded);

    let records = collate::collate(crawled, geocoded)?;
    datalogs.record("data", &records);

    let notices: usize = records.iter().map(|r| r.notices.len()).sum();
    let dataset = Dataset {
        last_updated: page.last_updated,
        data: records,
    };

    collate::persist_and_advance(&ctx.output_path, &ctx.watermark_path(), &dataset)?;

    let elapsed = start.elapsed();
    log::info!(
        "Saved {} business(es) ({notices} notices) to {} in {:.1}s",
        dataset.data.len(),
        ctx.output_path.display(),
        elapsed.as_secs_f64()
    );

    Ok(RunOutcome::Completed {
        groups: dataset.data.len(),
        notices,
    })
}
