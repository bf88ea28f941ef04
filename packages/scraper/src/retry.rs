//! HTTP retry helpers for transient errors.
//!
//! Every register fetch goes through [`send_text`] instead of calling
//! `reqwest::RequestBuilder::send()` directly, so each request gets
//! automatic retry with exponential backoff on timeouts, connection resets,
//! rate limiting, and server errors. Client errors other than 429 are
//! permanent and surface immediately.

use std::time::Duration;

use crate::ScrapeError;

/// Maximum number of retry attempts for transient HTTP errors.
///
/// With exponential backoff (2s, 4s, 8s) the total wait before giving up
/// is 14 seconds on top of the per-request timeout.
const MAX_RETRIES: u32 = 3;

/// Sends an HTTP request and returns the response body as a `String`.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`], since builders are consumed by
/// `.send()`.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the request still fails after all retries, or
/// the server returns a non-retryable status code.
pub async fn send_text<F>(build_request: F) -> Result<String, ScrapeError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    for attempt in 0..=MAX_RETRIES {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt); // 2s, 4s, 8s
            log::warn!("  retry {attempt}/{MAX_RETRIES} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        let response = match build_request().send().await {
            Ok(response) => response,
            Err(e) => {
                if is_transient(&e) && attempt < MAX_RETRIES {
                    log::warn!("  transient error: {e}");
                    continue;
                }
                return Err(ScrapeError::Http(e));
            }
        };

        let status = response.status();
        let url = response.url().to_string();

        if should_retry_status(status) {
            if attempt < MAX_RETRIES {
                log::warn!("  HTTP {status} from {url}");
                continue;
            }
            return Err(ScrapeError::Status { status, url });
        }

        if !status.is_success() {
            return Err(ScrapeError::Status { status, url });
        }

        return Ok(response.text().await?);
    }

    // Unreachable — the loop always returns via Ok or Err.
    unreachable!("send_text retry loop exited without returning")
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    !e.is_builder() && (e.is_timeout() || e.is_connect() || e.is_body() || e.is_request())
}

/// Returns `true` for statuses worth retrying: 429 and 5xx.
fn should_retry_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
