//! Register listing scraper.
//!
//! The register renders as a free-text header block plus one table of
//! penalised businesses. The header's second paragraph carries the
//! `"Last updated on <date>"` marker the change gate compares against; the
//! table rows carry name, suburb, and (usually) a link to the notice detail
//! page.

use regex::Regex;
use scraper::Html;

use penalty_map_models::ListEntry;

use crate::{ScrapeError, element_text, parse_selector, retry};

/// The penalty-notices register listing.
pub const LIST_URL: &str =
    "https://www.foodauthority.nsw.gov.au/penalty-notices/default.aspx?template=results";

/// Origin used to resolve root-relative detail links.
const BASE_URL: &str = "https://www.foodauthority.nsw.gov.au";

/// Pattern extracting the freshness marker from the header block.
const UPDATED_PATTERN: &str = "Last updated on (.+)";

/// A scraped register listing: the freshness marker plus every row.
#[derive(Debug, Clone)]
pub struct ListPage {
    /// The register's self-reported "last updated" marker, verbatim.
    pub last_updated: String,
    /// Table rows in register order.
    pub entries: Vec<ListEntry>,
}

/// Fetches and parses the register listing.
///
/// Always a fresh fetch — the marker must reflect the live register for
/// change detection to mean anything.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the fetch fails or the page does not contain
/// the marker and table the register is known to render.
pub async fn fetch_list(client: &reqwest::Client) -> Result<ListPage, ScrapeError> {
    let body = retry::send_text(|| client.get(LIST_URL)).await?;
    parse_list(&body)
}

/// Parses the register listing page.
///
/// # Errors
///
/// Returns [`ScrapeError::Parse`] if the "Last updated on" marker cannot be
/// found. Rows missing cells still produce entries with empty fields — no
/// row is dropped.
pub fn parse_list(html: &str) -> Result<ListPage, ScrapeError> {
    let document = Html::parse_document(html);

    let info_selector = parse_selector(".contentInfo p")?;
    let updated_re = Regex::new(UPDATED_PATTERN)
        .map_err(|e| ScrapeError::Parse(format!("invalid marker pattern: {e}")))?;

    let last_updated = document
        .select(&info_selector)
        .filter_map(|p| {
            let text = element_text(&p);
            updated_re
                .captures(&text)
                .map(|caps| caps[1].trim().to_owned())
        })
        .next()
        .ok_or_else(|| {
            ScrapeError::Parse("register page has no 'Last updated on' marker".to_owned())
        })?;

    let row_selector = parse_selector("#myTable tbody tr")?;
    let cell_selector = parse_selector("td")?;
    let link_selector = parse_selector("a")?;

    let mut entries = Vec::new();

    for row in document.select(&row_selector) {
        let cells: Vec<_> = row.select(&cell_selector).collect();
        if cells.is_empty() {
            continue;
        }

        let name = cells.first().map(element_text).unwrap_or_default();
        let locality = cells.get(1).map(element_text).unwrap_or_default();

        // The notice link sits in the fourth column; some rows carry none.
        let link = cells
            .get(3)
            .and_then(|cell| cell.select(&link_selector).next())
            .and_then(|a| a.value().attr("href"))
            .map(resolve_link)
            .unwrap_or_default();

        entries.push(ListEntry {
            name,
            locality,
            link,
        });
    }

    Ok(ListPage {
        last_updated,
        entries,
    })
}

/// Resolves a detail-link href against the register origin.
fn resolve_link(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_owned()
    } else if href.starts_with('/') {
        format!("{BASE_URL}{href}")
    } else {
        href.to_owned()
    }
}
