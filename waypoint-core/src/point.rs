use std::fmt;

use geo::Coord;

use crate::RoutingError;

/// A WGS84 coordinate addressed by latitude and longitude.
///
/// Two points with identical coordinates are interchangeable for routing:
/// travel between them costs nothing and never reaches the backend.
///
/// A missing coordinate is represented by a non-finite value. When the
/// `serde` feature is enabled, JSON `null` deserializes to `NaN` so that
/// incomplete input is caught by [`validate_points`] rather than by the
/// decoder.
///
/// # Examples
/// ```
/// use waypoint_core::Point;
///
/// let stop = Point::new(35.057, -85.269);
/// assert!(stop.is_valid());
/// assert_eq!(stop.to_osrm(), "-85.269,35.057");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Latitude in degrees.
    #[cfg_attr(
        feature = "serde",
        serde(default = "nullable::missing", deserialize_with = "nullable::deserialize")
    )]
    pub lat: f64,
    /// Longitude in degrees.
    #[cfg_attr(
        feature = "serde",
        serde(default = "nullable::missing", deserialize_with = "nullable::deserialize")
    )]
    pub lon: f64,
}

impl Point {
    /// Construct a point from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both coordinates are present and finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Encode the point as an OSRM `lon,lat` path segment.
    #[must_use]
    pub fn to_osrm(&self) -> String {
        format!("{},{}", self.lon, self.lat)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

impl From<Coord<f64>> for Point {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord.y, coord.x)
    }
}

impl From<Point> for Coord<f64> {
    fn from(point: Point) -> Self {
        Self {
            x: point.lon,
            y: point.lat,
        }
    }
}

impl From<geo::Point<f64>> for Point {
    fn from(point: geo::Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

impl From<Point> for geo::Point<f64> {
    fn from(point: Point) -> Self {
        Self::new(point.lon, point.lat)
    }
}

/// Check every point before any request is issued.
///
/// # Errors
///
/// Returns [`RoutingError::EmptyInput`] for an empty slice and
/// [`RoutingError::InvalidCoordinate`] for the first point with a missing
/// or non-finite coordinate.
pub fn validate_points(points: &[Point]) -> Result<(), RoutingError> {
    if points.is_empty() {
        return Err(RoutingError::EmptyInput);
    }
    points
        .iter()
        .enumerate()
        .find(|(_, point)| !point.is_valid())
        .map_or(Ok(()), |(index, point)| {
            Err(RoutingError::invalid_coordinate(index, *point))
        })
}

/// Encode points as the semicolon-separated coordinate list used in OSRM
/// request paths.
#[must_use]
pub fn encode_path(points: &[Point]) -> String {
    points
        .iter()
        .map(Point::to_osrm)
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(feature = "serde")]
mod nullable {
    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }

    pub(super) const fn missing() -> f64 {
        f64::NAN
    }
}
