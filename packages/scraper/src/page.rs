//! Cache-aside page fetching for notice detail pages.
//!
//! Raw response bodies are cached keyed by URL, so a changed register only
//! costs fetches for the detail pages not already seen. The cache is an
//! optimization, never a source of truth — read or write failures degrade
//! to a plain fetch with a warning.

use penalty_map_cache::KeyValueStore;

use crate::{ScrapeError, retry};

/// Fetches `url` through the crawl cache.
///
/// Returns the cached body when present; otherwise performs the HTTP fetch
/// (with retry) and stores the body before returning it.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the network fetch fails.
pub async fn fetch_cached(
    client: &reqwest::Client,
    cache: &dyn KeyValueStore,
    url: &str,
) -> Result<String, ScrapeError> {
    match cache.get(url).await {
        Ok(Some(body)) => {
            log::debug!("Crawl cache hit: {url}");
            return Ok(body);
        }
        Ok(None) => {}
        Err(e) => log::warn!("Crawl cache read failed for {url}: {e}"),
    }

    let body = retry::send_text(|| client.get(url)).await?;

    if let Err(e) = cache.put(url, &body).await {
        log::warn!("Crawl cache write failed for {url}: {e}");
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use penalty_map_cache::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn cached_body_is_returned_without_a_fetch() {
        let cache = MemoryStore::new();
        cache
            .put("https://example.com/notice/1", "<html>cached</html>")
            .await
            .unwrap();

        // An unusable client proves the cache path never touches the network.
        let client = reqwest::Client::new();
        let body = fetch_cached(&client, &cache, "https://example.com/notice/1")
            .await
            .unwrap();
        assert_eq!(body, "<html>cached</html>");
    }

    #[tokio::test]
    async fn miss_on_unfetchable_url_surfaces_the_error() {
        let cache = MemoryStore::new();
        let client = reqwest::Client::new();

        let result = fetch_cached(&client, &cache, "not a url").await;
        assert!(result.is_err());
        // Nothing was cached for the failed fetch.
        assert!(cache.get("not a url").await.unwrap().is_none());
    }
}
