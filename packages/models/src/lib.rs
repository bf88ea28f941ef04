#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared data types for the penalty-map pipeline.
//!
//! Everything that flows between pipeline stages lives here: register rows
//! ([`ListEntry`]), crawl unit identities ([`GroupKey`]), scraped notices
//! ([`DetailRecord`] / [`NoticeResult`]), geocoding outcomes
//! ([`GeocodeResult`]), and the collated output document ([`Dataset`]).
//!
//! All scraped fields are carried as raw strings exactly as they appear on
//! the register; no type coercion happens anywhere in the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One row of the penalty-notices register table.
///
/// Ephemeral — exists only for the run that scraped it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    /// Trading name of the penalised business.
    pub name: String,
    /// Suburb shown in the register.
    pub locality: String,
    /// Absolute URL of the notice detail page. Empty when the row carries
    /// no link.
    pub link: String,
}

/// Identity of one crawl unit: every notice belonging to the same named
/// business at the same locality.
///
/// The key travels inside every downstream record so that crawl results and
/// geocoding results can be re-paired without relying on two independent
/// orderings staying in lockstep.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    /// Business name component.
    pub name: String,
    /// Locality component.
    pub locality: String,
}

impl GroupKey {
    /// Separator between the name and locality components in the canonical
    /// id form.
    pub const SEPARATOR: &'static str = "::";

    /// Derives the key for a register row.
    #[must_use]
    pub fn for_entry(entry: &ListEntry) -> Self {
        Self {
            name: entry.name.clone(),
            locality: entry.locality.clone(),
        }
    }

    /// Canonical `name::locality` id form.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}{}{}", self.name, Self::SEPARATOR, self.locality)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, Self::SEPARATOR, self.locality)
    }
}

/// One scraped penalty notice, fields raw as rendered on the detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    /// Penalty notice number.
    #[serde(rename = "number")]
    pub notice_number: String,
    /// Street address of the premises.
    pub address: String,
    /// Issuing council.
    pub council: String,
    /// Date of the alleged offence.
    pub date_alleged: String,
    /// Offence code.
    pub offence_code: String,
    /// Nature and circumstances of the offence.
    pub nature_circumstances: String,
    /// Penalty amount.
    pub amount_penalty: String,
    /// Date the notice was served.
    pub date_served: String,
}

/// A detail link whose fetch or parse failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    /// The detail link that failed.
    pub link: String,
    /// Human-readable failure description.
    pub error: String,
}

/// Outcome of fetching one notice detail page.
///
/// A failed link is carried inline as data so a single bad page never voids
/// the rest of its group. The failed variant keeps its position in the
/// group's notice sequence — position always corresponds to link position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoticeResult {
    /// Successfully scraped notice.
    Notice(DetailRecord),
    /// Placeholder for a link that could not be expanded.
    Failed(FetchFailure),
}

impl NoticeResult {
    /// Returns the scraped record, or `None` for a failure placeholder.
    #[must_use]
    pub const fn record(&self) -> Option<&DetailRecord> {
        match self {
            Self::Notice(record) => Some(record),
            Self::Failed(_) => None,
        }
    }
}

/// Geographic coordinates (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// A successfully resolved address, in the exact shape stored in the
/// geocoder cache and emitted in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    /// The raw scraped address string the lookup was keyed by.
    pub raw: String,
    /// Resolved coordinates.
    pub latlng: Coordinates,
}

/// Terminal placeholder outcomes for a group whose address could not be
/// resolved this run.
///
/// Serialized as the exact placeholder strings that appear in the published
/// dataset, so operators can grep the output for them. Sentinels are never
/// written to the geocoder cache — a transient failure is retried on the
/// next run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeocodeSentinel {
    /// The group had no address to resolve.
    #[serde(rename = "<NoAddress>")]
    NoAddress,
    /// The geocoding service answered, but not in the expected shape.
    #[serde(rename = "<BadAddress>")]
    BadAddress,
    /// The geocoding call failed or returned a non-success status.
    #[serde(rename = "<AddressError>")]
    AddressError,
}

/// Outcome of resolving one group's address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeocodeResult {
    /// Coordinates were resolved (possibly from cache).
    Resolved(ResolvedAddress),
    /// A terminal placeholder outcome.
    Sentinel(GeocodeSentinel),
}

impl GeocodeResult {
    /// Returns `true` for any of the three placeholder outcomes.
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        matches!(self, Self::Sentinel(_))
    }
}

impl From<GeocodeSentinel> for GeocodeResult {
    fn from(sentinel: GeocodeSentinel) -> Self {
        Self::Sentinel(sentinel)
    }
}

/// One business in the collated dataset: its resolved address and every
/// notice issued against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollatedRecord {
    /// Business name (the name component of the group key).
    pub name: String,
    /// Geocoding outcome for the business address.
    pub address: GeocodeResult,
    /// Notices in link order.
    pub notices: Vec<NoticeResult>,
}

/// The output document written to the operator-specified path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// The register's self-reported freshness marker for this crawl.
    pub last_updated: String,
    /// One record per group, in first-seen group order.
    pub data: Vec<CollatedRecord>,
}
