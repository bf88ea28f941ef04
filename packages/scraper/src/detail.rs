//! Notice detail-page scraper.
//!
//! Each detail page renders one fixed-position attribute table
//! (`.table-data-pd`): label in the first cell, value in the second. Rows 2
//! and 9 are heading/spacer rows, which is why the field positions below
//! skip them.

use scraper::Html;

use penalty_map_cache::KeyValueStore;
use penalty_map_models::DetailRecord;

use crate::{ScrapeError, element_text, page, parse_selector};

/// 1-based row positions of the notice fields within the attribute table.
const ROW_NOTICE_NUMBER: usize = 1;
const ROW_ADDRESS: usize = 3;
const ROW_COUNCIL: usize = 4;
const ROW_DATE_ALLEGED: usize = 5;
const ROW_OFFENCE_CODE: usize = 6;
const ROW_NATURE_CIRCUMSTANCES: usize = 7;
const ROW_AMOUNT_PENALTY: usize = 8;
const ROW_DATE_SERVED: usize = 10;

/// Fetches one notice detail page (through the crawl cache) and parses it.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the fetch fails or the page carries no
/// attribute table.
pub async fn fetch_notice(
    client: &reqwest::Client,
    cache: &dyn KeyValueStore,
    link: &str,
) -> Result<DetailRecord, ScrapeError> {
    let body = page::fetch_cached(client, cache, link).await?;
    parse_detail(&body)
}

/// Parses a notice detail page into a [`DetailRecord`].
///
/// Fields are taken raw — whatever text the register rendered, untouched.
/// A missing row yields an empty field rather than an error; only a page
/// with no attribute table at all fails.
///
/// # Errors
///
/// Returns [`ScrapeError::Parse`] if no `.table-data-pd` table is present.
pub fn parse_detail(html: &str) -> Result<DetailRecord, ScrapeError> {
    let document = Html::parse_document(html);

    let table_selector = parse_selector(".table-data-pd")?;
    let row_selector = parse_selector("tr")?;
    let cell_selector = parse_selector("td")?;

    let table = document.select(&table_selector).next().ok_or_else(|| {
        ScrapeError::Parse("no element matching '.table-data-pd' found in response".to_owned())
    })?;

    // Second-cell text per row; heading rows have a single cell and yield
    // an empty string.
    let values: Vec<String> = table
        .select(&row_selector)
        .map(|row| {
            row.select(&cell_selector)
                .nth(1)
                .map(|cell| element_text(&cell))
                .unwrap_or_default()
        })
        .collect();

    let field = |row: usize| values.get(row - 1).cloned().unwrap_or_default();

    Ok(DetailRecord {
        notice_number: field(ROW_NOTICE_NUMBER),
        address: field(ROW_ADDRESS),
        council: field(ROW_COUNCIL),
        date_alleged: field(ROW_DATE_ALLEGED),
        offence_code: field(ROW_OFFENCE_CODE),
        nature_circumstances: field(ROW_NATURE_CIRCUMSTANCES),
        amount_penalty: field(ROW_AMOUNT_PENALTY),
        date_served: field(ROW_DATE_SERVED),
    })
}
