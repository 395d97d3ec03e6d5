//! Command-line and environment configuration.
//!
//! Values come from flags first, then environment variables (a `.env` file
//! is loaded by `main` before parsing), then the defaults below.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Url;
use thiserror::Error;

use crate::domain::{Coordinate, DomainError};
use super::location::DEFAULT_GEOCODER_URL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Both --latitude and --longitude must be given")]
    PartialCoordinate,
    #[error("Invalid device location: {0}")]
    InvalidLocation(#[from] DomainError),
    #[error("Invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Browse and register orphanages from the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "orphanages", version, about)]
pub struct Config {
    /// Base url of the orphanage API
    #[arg(long, env = "ORPHANAGES_API_URL", default_value = "http://localhost:3333")]
    pub api_url: String,
    /// Latitude reported as the device position
    #[arg(long, env = "ORPHANAGES_LATITUDE", allow_negative_numbers = true)]
    pub latitude: Option<f64>,
    /// Longitude reported as the device position
    #[arg(long, env = "ORPHANAGES_LONGITUDE", allow_negative_numbers = true)]
    pub longitude: Option<f64>,
    /// Street address geocoded into the device position
    #[arg(long, env = "ORPHANAGES_ADDRESS")]
    pub address: Option<String>,
    /// Nominatim-compatible search endpoint
    #[arg(long, env = "ORPHANAGES_GEOCODER_URL", default_value = DEFAULT_GEOCODER_URL)]
    pub geocoder_url: String,
    /// Directory used as the photo library
    #[arg(long, env = "ORPHANAGES_PHOTO_DIR")]
    pub photo_dir: Option<PathBuf>,
    /// File receiving log output
    #[arg(long, env = "ORPHANAGES_LOG_FILE", default_value = "orphanages.log")]
    pub log_file: PathBuf,
    /// Timeout for each network request, in seconds
    #[arg(long, env = "ORPHANAGES_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

/// Where the device position comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    Fixed(Coordinate),
    Address { geocoder: Url, address: String },
    Unavailable,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Fixed coordinates take precedence over an address.
    pub fn location_source(&self) -> Result<LocationSource, ConfigError> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => {
                return Ok(LocationSource::Fixed(Coordinate::new(latitude, longitude)?));
            }
            (Some(_), None) | (None, Some(_)) => return Err(ConfigError::PartialCoordinate),
            (None, None) => {}
        }

        match self.address.as_deref().map(str::trim) {
            Some(address) if !address.is_empty() => {
                let geocoder = Url::parse(&self.geocoder_url).map_err(|e| ConfigError::InvalidUrl {
                    url: self.geocoder_url.clone(),
                    reason: e.to_string(),
                })?;
                Ok(LocationSource::Address {
                    geocoder,
                    address: address.to_string(),
                })
            }
            _ => Ok(LocationSource::Unavailable),
        }
    }
}
