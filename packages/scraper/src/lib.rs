#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scrapers for the NSW Food Authority penalty-notices register.
//!
//! Two page shapes are understood: the register listing ([`list`]) and the
//! per-notice detail page ([`detail`]). Detail pages are fetched through the
//! crawl cache ([`page`]) so re-runs skip pages already seen; the register
//! listing is always fetched fresh because its "Last updated on" marker
//! drives change detection.
//!
//! All HTTP goes through [`retry`], which adds bounded retry with
//! exponential backoff for transient failures.

pub mod detail;
pub mod list;
pub mod page;
pub mod retry;

use scraper::Selector;

/// Errors that can occur while scraping register pages.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP status {status} from {url}")]
    Status {
        /// The response status code.
        status: reqwest::StatusCode,
        /// The requested URL.
        url: String,
    },

    /// Parsing the response body failed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The crawl cache failed.
    #[error("Cache error: {0}")]
    Cache(#[from] penalty_map_cache::CacheError),
}

/// Parses a CSS selector string, returning a [`ScrapeError`] on failure.
fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector)
        .map_err(|e| ScrapeError::Parse(format!("invalid CSS selector '{selector}': {e}")))
}

/// Joins an element's text nodes and trims surrounding whitespace.
fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join("").trim().to_owned()
}
