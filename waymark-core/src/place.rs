//! Visited places and the visits recorded against them.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude` whenever a
//! [`Coord`] is produced. The serialised form keeps the explicit `lat`/`lng`
//! field names used by the places file.

use chrono::{DateTime, Utc};
use geo::Coord;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Lowest accepted visit rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted visit rating.
pub const MAX_RATING: u8 = 10;
/// Rating applied when a visit is recorded without one.
pub const DEFAULT_RATING: u8 = 5;

/// Rejection reasons for a submitted latitude/longitude pair.
///
/// Ray casting over `NaN` or infinite inputs yields undefined answers, so
/// points are validated before any geometry runs.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidPoint {
    /// Latitude or longitude is `NaN` or infinite.
    #[error("coordinates must be finite (lat {lat}, lng {lng})")]
    NonFinite {
        /// Submitted latitude.
        lat: f64,
        /// Submitted longitude.
        lng: f64,
    },
    /// Latitude lies outside `[-90, 90]`.
    #[error("latitude {lat} is outside [-90, 90]")]
    LatitudeOutOfRange {
        /// Submitted latitude.
        lat: f64,
    },
    /// Longitude lies outside `[-180, 180]`.
    #[error("longitude {lng} is outside [-180, 180]")]
    LongitudeOutOfRange {
        /// Submitted longitude.
        lng: f64,
    },
}

/// Validate a latitude/longitude pair and return it as a `lng/lat` [`Coord`].
///
/// # Examples
/// ```
/// use waymark_core::{InvalidPoint, validate_point};
///
/// let kyiv = validate_point(50.4501, 30.5234)?;
/// assert_eq!(kyiv.x, 30.5234);
/// assert!(validate_point(f64::NAN, 0.0).is_err());
/// # Ok::<(), InvalidPoint>(())
/// ```
pub fn validate_point(lat: f64, lng: f64) -> Result<Coord<f64>, InvalidPoint> {
    if !lat.is_finite() || !lng.is_finite() {
        return Err(InvalidPoint::NonFinite { lat, lng });
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(InvalidPoint::LatitudeOutOfRange { lat });
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(InvalidPoint::LongitudeOutOfRange { lng });
    }
    Ok(Coord { x: lng, y: lat })
}

/// A single recorded visit to a [`Place`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    /// Visit identifier.
    pub id: String,
    /// When the visit happened.
    pub at: DateTime<Utc>,
    /// Rating in `MIN_RATING..=MAX_RATING`; stored values outside the range
    /// are clamped on load.
    #[serde(default = "default_rating", deserialize_with = "clamped_rating")]
    pub rating: u8,
    /// Free-form note.
    #[serde(default)]
    pub note: String,
}

const fn default_rating() -> u8 {
    DEFAULT_RATING
}

fn clamped_rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    let clamped = raw.clamp(i64::from(MIN_RATING), i64::from(MAX_RATING));
    u8::try_from(clamped).map_err(D::Error::custom)
}

impl Visit {
    /// Build a visit, clamping `rating` into the accepted range.
    ///
    /// A missing rating falls back to [`DEFAULT_RATING`].
    pub fn new(
        id: impl Into<String>,
        at: DateTime<Utc>,
        rating: Option<u8>,
        note: impl Into<String>,
    ) -> Self {
        let rating = rating
            .unwrap_or(DEFAULT_RATING)
            .clamp(MIN_RATING, MAX_RATING);
        Self {
            id: id.into(),
            at,
            rating,
            note: note.into(),
        }
    }
}

/// A geographic point the user has marked as visited.
///
/// The location is fixed at construction; title, notes, tags and visits are
/// mutable metadata.
///
/// # Examples
/// ```
/// use waymark_core::Place;
///
/// # fn main() -> Result<(), waymark_core::InvalidPoint> {
/// let place = Place::new("p1", "Andriivskyi Descent", 50.4589, 30.5175)?
///     .with_region("Kyiv")
///     .with_tags(["street", "old-town"]);
/// assert_eq!(place.location().y, 50.4589);
/// assert_eq!(place.region.as_deref(), Some("Kyiv"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Place identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Postal address as returned by the geocoder, comma separated.
    #[serde(default)]
    pub address: String,
    /// Administrative region, if known.
    #[serde(default)]
    pub region: Option<String>,
    /// City, if known.
    #[serde(default)]
    pub city: Option<String>,
    /// User tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Number of recorded visits.
    #[serde(default)]
    pub visits_count: u32,
    /// Recorded visits.
    #[serde(default)]
    pub visits: Vec<Visit>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Place {
    /// Validate the coordinates and construct a place without metadata.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        lat: f64,
        lng: f64,
    ) -> Result<Self, InvalidPoint> {
        validate_point(lat, lng)?;
        Ok(Self {
            id: id.into(),
            title: title.into(),
            lat,
            lng,
            address: String::new(),
            region: None,
            city: None,
            tags: Vec::new(),
            visits_count: 0,
            visits: Vec::new(),
            created_at: None,
        })
    }

    /// Set the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the city.
    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Set the address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Replace the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Override the visit counter without recording individual visits.
    #[must_use]
    pub fn with_visits_count(mut self, visits_count: u32) -> Self {
        self.visits_count = visits_count;
        self
    }

    /// Location as a `lng/lat` coordinate.
    pub fn location(&self) -> Coord<f64> {
        Coord {
            x: self.lng,
            y: self.lat,
        }
    }

    /// Re-run coordinate validation, e.g. after deserialising untrusted input.
    pub fn validate(&self) -> Result<Coord<f64>, InvalidPoint> {
        validate_point(self.lat, self.lng)
    }

    /// Append a visit and keep the counter in step with the visit list.
    pub fn record_visit(&mut self, visit: Visit) {
        self.visits.push(visit);
        self.visits_count = u32::try_from(self.visits.len()).unwrap_or(u32::MAX);
    }

    /// Numeric weight used by aggregations: the visit count.
    pub fn weight(&self) -> f64 {
        f64::from(self.visits_count)
    }
}
