//! Device position sources.
//!
//! A terminal has no GPS, so the "device location" is either pinned in
//! configuration or resolved once per request from a street address through
//! a Nominatim-compatible geocoder.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{Coordinate, DomainError};

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Location is unavailable: set a latitude/longitude or an address")]
    Unavailable,
    #[error("Location lookup failed: {0}")]
    Lookup(#[source] reqwest::Error),
    #[error("Address not found: {0}")]
    AddressNotFound(String),
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Single-shot query for the current position.
pub trait LocationProvider: Send {
    fn current_position(&self) -> Result<Coordinate, LocationError>;
}

pub struct FixedLocation {
    position: Coordinate,
}

impl FixedLocation {
    pub fn new(position: Coordinate) -> Self {
        Self { position }
    }
}

impl LocationProvider for FixedLocation {
    fn current_position(&self) -> Result<Coordinate, LocationError> {
        Ok(self.position)
    }
}

/// Stands in for a denied location permission.
pub struct UnavailableLocation;

impl LocationProvider for UnavailableLocation {
    fn current_position(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::Unavailable)
    }
}

pub struct GeocodedLocation {
    client: Client,
    endpoint: Url,
    address: String,
}

impl GeocodedLocation {
    pub fn new(endpoint: Url, address: impl Into<String>, timeout: Duration) -> Result<Self, LocationError> {
        let mut headers = HeaderMap::new();
        // Nominatim's usage policy requires an identifying agent.
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("orphanages/", env!("CARGO_PKG_VERSION"))),
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(LocationError::Lookup)?;

        Ok(Self {
            client,
            endpoint,
            address: address.into(),
        })
    }

    fn request_api(&self) -> Result<Value, LocationError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", &self.address)
            .append_pair("format", "geojson")
            .append_pair("limit", "1");

        tracing::debug!(address = %self.address, "geocoding device address");
        self.client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json::<Value>())
            .map_err(LocationError::Lookup)
    }
}

impl LocationProvider for GeocodedLocation {
    fn current_position(&self) -> Result<Coordinate, LocationError> {
        let response = self.request_api()?;
        let (latitude, longitude) =
            json_to_coords(&response).ok_or_else(|| LocationError::AddressNotFound(self.address.clone()))?;
        Ok(Coordinate::new(latitude, longitude)?)
    }
}

/// Reads `(lat, lon)` from the first GeoJSON feature; GeoJSON stores `[lon, lat]`.
fn json_to_coords(json_response: &Value) -> Option<(f64, f64)> {
    let coords = &json_response["features"][0]["geometry"]["coordinates"];
    let lat = coords[1].as_f64()?;
    let lon = coords[0].as_f64()?;
    Some((lat, lon))
}
