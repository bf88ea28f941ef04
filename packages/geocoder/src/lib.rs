#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cache-aside geocoding for business addresses.
//!
//! [`resolve`] checks the persistent address cache first and only calls the
//! external service ([`google`]) on a miss. Successful resolutions are
//! written back keyed by the raw scraped address string; the three
//! placeholder outcomes (`<NoAddress>` / `<BadAddress>` / `<AddressError>`)
//! are returned as data and **never** cached, so a transient failure is
//! naturally retried on the next run.
//!
//! Failure never propagates out of this crate as an error — every path
//! yields a [`GeocodeResult`].

pub mod google;

use penalty_map_cache::KeyValueStore;
use penalty_map_models::{Coordinates, GeocodeResult, GeocodeSentinel, ResolvedAddress};

/// Errors from a geocoding backend lookup.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),

    /// The response did not have the expected shape.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

impl GeocodeError {
    /// The terminal placeholder this failure maps to: call/status failures
    /// become `<AddressError>`, shape failures become `<BadAddress>`.
    #[must_use]
    pub const fn sentinel(&self) -> GeocodeSentinel {
        match self {
            Self::Http(_) | Self::Status(_) => GeocodeSentinel::AddressError,
            Self::Parse { .. } => GeocodeSentinel::BadAddress,
        }
    }
}

/// External geocoding service: one raw address in, one coordinate pair out.
#[async_trait::async_trait]
pub trait GeocodeBackend: Send + Sync {
    /// Resolves one raw address string to coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the call fails or the response cannot be
    /// interpreted.
    async fn lookup(&self, address: &str) -> Result<Coordinates, GeocodeError>;
}

/// Resolves one address, cache first.
///
/// 1. Empty address → `<NoAddress>`, neither cache nor service touched.
/// 2. Cache hit → stored result returned, no external call. A stored entry
///    that no longer parses is discarded and re-resolved — the cache is an
///    optimization, never a source of truth.
/// 3. Cache miss → backend lookup; success is cached then returned, failure
///    maps to its sentinel and is not cached.
pub async fn resolve(
    backend: &dyn GeocodeBackend,
    cache: &dyn KeyValueStore,
    address: &str,
) -> GeocodeResult {
    if address.is_empty() {
        return GeocodeSentinel::NoAddress.into();
    }

    match cache.get(address).await {
        Ok(Some(stored)) => match serde_json::from_str::<ResolvedAddress>(&stored) {
            Ok(resolved) => {
                log::debug!("Fetch address from cache: {address}");
                return GeocodeResult::Resolved(resolved);
            }
            Err(e) => {
                log::warn!("Discarding unreadable cache entry for '{address}': {e}");
            }
        },
        Ok(None) => {}
        Err(e) => log::warn!("Address cache read failed for '{address}': {e}"),
    }

    match backend.lookup(address).await {
        Ok(latlng) => {
            let resolved = ResolvedAddress {
                raw: address.to_owned(),
                latlng,
            };
            store_resolved(cache, address, &resolved).await;
            GeocodeResult::Resolved(resolved)
        }
        Err(e) => {
            log::warn!("Geocoding failed for '{address}': {e}");
            e.sentinel().into()
        }
    }
}

/// Writes a resolved address back to the cache, best-effort.
async fn store_resolved(cache: &dyn KeyValueStore, address: &str, resolved: &ResolvedAddress) {
    match serde_json::to_string(resolved) {
        Ok(encoded) => {
            if let Err(e) = cache.put(address, &encoded).await {
                log::warn!("Address cache write failed for '{address}': {e}");
            } else {
                log::debug!("Save address to cache: {address}");
            }
        }
        Err(e) => log::warn!("Failed to encode cache entry for '{address}': {e}"),
    }
}
