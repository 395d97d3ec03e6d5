use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::errors::{DomainError, DomainResult};

/// A geographic position in decimal degrees.
///
/// Every value of this type is finite and inside the WGS84 ranges, so
/// `(0.0, 0.0)` is an ordinary position on the map and never means "unset".
/// Absence of a position is expressed with `Option<Coordinate>`.
///
/// # Examples
///
/// ```
/// use orphanages::domain::Coordinate;
///
/// let here = Coordinate::new(-23.5, -46.6).unwrap();
/// assert_eq!(here.latitude(), -23.5);
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> DomainResult<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if valid {
            Ok(Self { latitude, longitude })
        } else {
            Err(DomainError::InvalidCoordinate { latitude, longitude })
        }
    }

    /// Builds a coordinate, clamping latitude and wrapping longitude into range.
    ///
    /// Used by the map viewport, where panning past the edges is allowed.
    pub fn normalized(latitude: f64, longitude: f64) -> Self {
        let latitude = latitude.clamp(-90.0, 90.0);
        let longitude = (longitude + 180.0).rem_euclid(360.0) - 180.0;
        Self { latitude, longitude }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            latitude: f64,
            longitude: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinate::new(raw.latitude, raw.longitude).map_err(serde::de::Error::custom)
    }
}

/// Server-side identifier of an orphanage.
///
/// The API has returned both numeric and string ids over time; either form
/// is accepted and carried as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrphanageId(String);

impl OrphanageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrphanageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for OrphanageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => OrphanageId(text),
            RawId::Signed(number) => OrphanageId(number.to_string()),
            RawId::Unsigned(number) => OrphanageId(number.to_string()),
        })
    }
}

/// Marker projection returned by `GET /orphanages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrphanageSummary {
    pub id: OrphanageId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl OrphanageSummary {
    pub fn position(&self) -> DomainResult<Coordinate> {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: OrphanageId,
    pub url: String,
}

/// Full record returned by `GET /orphanages/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrphanageDetails {
    pub id: OrphanageId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub about: String,
    pub instructions: String,
    pub opening_hours: String,
    pub open_on_weekends: bool,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
}

/// Whether an orphanage receives visitors on Saturdays and Sundays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekendAvailability {
    Open,
    Closed,
}

impl WeekendAvailability {
    pub fn label(&self) -> &'static str {
        match self {
            WeekendAvailability::Open => "Open on weekends",
            WeekendAvailability::Closed => "Closed on weekends",
        }
    }
}

impl OrphanageDetails {
    pub fn weekend_availability(&self) -> WeekendAvailability {
        if self.open_on_weekends {
            WeekendAvailability::Open
        } else {
            WeekendAvailability::Closed
        }
    }

    pub fn weekday_schedule(&self) -> String {
        format!("Monday to Friday {}", self.opening_hours)
    }

    /// Google Maps route link ending at this orphanage.
    pub fn directions_url(&self) -> String {
        format!(
            "https://www.google.com/maps/dir/?api=1&destination={},{}",
            self.latitude, self.longitude
        )
    }

    pub fn position(&self) -> DomainResult<Coordinate> {
        Coordinate::new(self.latitude, self.longitude)
    }
}
