//! Sequential geocoding stage.
//!
//! One address is resolved per group — the first successfully scraped
//! notice's address, since a group's notices share one premises. Groups
//! are resolved one after another, deliberately: the external API is paid
//! and rate limited, and sequential resolution means the address cache
//! never sees two writers racing on the same key.

use serde::Serialize;

use penalty_map_cache::KeyValueStore;
use penalty_map_geocoder::GeocodeBackend;
use penalty_map_models::{GeocodeResult, GroupKey};

use crate::crawl::CrawledGroup;

/// One group's geocoding outcome, carrying its identity for collation.
#[derive(Debug, Clone, Serialize)]
pub struct GeocodedGroup {
    /// Identity of the unit.
    pub key: GroupKey,
    /// Resolution outcome for the group's address.
    pub result: GeocodeResult,
}

/// The address a group is geocoded by: the first successful notice's
/// address field. `None` when the group has no successful notice.
#[must_use]
pub fn group_address(group: &CrawledGroup) -> Option<&str> {
    group
        .notices
        .iter()
        .find_map(|notice| notice.record())
        .map(|record| record.address.as_str())
}

/// Resolves every group's address, sequentially, in group order.
pub async fn geocode_groups(
    backend: &dyn GeocodeBackend,
    cache: &dyn KeyValueStore,
    groups: &[CrawledGroup],
) -> Vec<GeocodedGroup> {
    let mut results = Vec::with_capacity(groups.len());

    for group in groups {
        let address = group_address(group).unwrap_or_default();
        let result = penalty_map_geocoder::resolve(backend, cache, address).await;
        results.push(GeocodedGroup {
            key: group.key.clone(),
            result,
        });
    }

    results
}
