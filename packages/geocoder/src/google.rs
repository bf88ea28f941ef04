//! Google Maps Geocoding API client.
//!
//! One GET per address against the JSON endpoint, expecting the
//! `results[0].geometry.location` shape. The register only lists NSW
//! businesses, so every query carries a fixed country qualifier.
//!
//! See <https://developers.google.com/maps/documentation/geocoding/requests-geocoding>

use penalty_map_models::Coordinates;

use crate::{GeocodeBackend, GeocodeError};

/// Geocoding endpoint.
const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Country qualifier appended to every lookup.
const COUNTRY_QUALIFIER: &str = ", Australia";

/// Google Maps geocoding backend.
///
/// The caller is responsible for pacing — the pipeline resolves one
/// address at a time, which keeps a paid, rate-limited API happy.
#[derive(Debug, Clone)]
pub struct GoogleMaps {
    client: reqwest::Client,
    api_key: String,
}

impl GoogleMaps {
    /// Creates a backend using the given client and API key.
    #[must_use]
    pub const fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

#[async_trait::async_trait]
impl GeocodeBackend for GoogleMaps {
    async fn lookup(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let query = format!("{address}{COUNTRY_QUALIFIER}");
        let response = self
            .client
            .get(GEOCODE_URL)
            .query(&[("address", query.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status));
        }

        // Read as text first so a non-JSON body is a shape failure, not a
        // transport failure.
        let text = response.text().await?;
        let body: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| GeocodeError::Parse {
                message: format!("response body is not JSON: {e}"),
            })?;

        parse_response(&body)
    }
}

/// Parses a geocoding response body into coordinates.
fn parse_response(body: &serde_json::Value) -> Result<Coordinates, GeocodeError> {
    let location = body
        .pointer("/results/0/geometry/location")
        .ok_or_else(|| GeocodeError::Parse {
            message: "response missing results[0].geometry.location".to_owned(),
        })?;

    let lat = location["lat"].as_f64().ok_or_else(|| GeocodeError::Parse {
        message: "lat is not a number".to_owned(),
    })?;
    let lng = location["lng"].as_f64().ok_or_else(|| GeocodeError::Parse {
        message: "lng is not a number".to_owned(),
    })?;

    Ok(Coordinates { lat, lng })
}
