//! OSRM API response types for the Table, Route and Nearest services.
//!
//! Every response carries a `code` field. `"Ok"` signals success; any other
//! value is a routing failure, even when the rest of the body looks usable.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/>

use serde::Deserialize;
use waypoint_core::{CostKind, Point, RoutingError};

/// Status code OSRM reports for a successful request.
pub const OK_CODE: &str = "Ok";

/// OSRM Table API response.
///
/// Only the annotations requested are present: `durations` by default,
/// `distances` when `annotations=distance` is passed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"InvalidQuery"` - Invalid query parameters
    /// - `"InvalidOptions"` - Invalid option combination
    /// - `"NoTable"` - Table computation failed
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Matrix of durations in seconds.
    ///
    /// `durations[i][j]` is the travel time from the i-th source to the
    /// j-th destination. Values are `None` when no route exists.
    pub durations: Option<Vec<Vec<Option<f64>>>>,

    /// Matrix of distances in meters, laid out like `durations`.
    pub distances: Option<Vec<Vec<Option<f64>>>>,
}

impl TableResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == OK_CODE
    }

    /// Take the raw matrix holding `kind`.
    ///
    /// A missing field is reported before the status code is inspected, so
    /// a typical error body (code set, matrix absent) surfaces as
    /// [`RoutingError::MissingField`] carrying that code. A present matrix
    /// under a non-`"Ok"` code is still rejected as a service error.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::MissingField`] or
    /// [`RoutingError::ServiceError`] as described above.
    pub fn into_matrix(self, kind: CostKind) -> Result<Vec<Vec<Option<f64>>>, RoutingError> {
        let field = match kind {
            CostKind::Duration => self.durations,
            CostKind::Distance => self.distances,
        };
        let Some(matrix) = field else {
            return Err(RoutingError::MissingField {
                field: kind.field(),
                code: self.code,
            });
        };
        if self.code != OK_CODE {
            return Err(service_error(self.code, self.message));
        }
        Ok(matrix)
    }
}

/// OSRM Route API response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    pub code: String,
    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,
    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

impl RouteResponse {
    /// Reject non-`"Ok"` responses and return the candidate routes.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::ServiceError`] for a failure code and
    /// [`RoutingError::NoRoute`] when the list of routes is empty.
    pub fn into_routes(self) -> Result<Vec<OsrmRoute>, RoutingError> {
        if self.code != OK_CODE {
            return Err(service_error(self.code, self.message));
        }
        if self.routes.is_empty() {
            return Err(RoutingError::NoRoute);
        }
        Ok(self.routes)
    }
}

/// One candidate route.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OsrmRoute {
    /// Estimated travel time in seconds.
    pub duration: f64,
    /// Route length in meters.
    pub distance: f64,
    /// Route geometry, present unless `overview=false`.
    pub geometry: Option<OsrmGeometry>,
}

/// Geometry of a route in whichever encoding was requested.
///
/// OSRM encodes geometries as a polyline string unless
/// `geometries=geojson` is passed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OsrmGeometry {
    /// GeoJSON `LineString` with `[lon, lat]` coordinate pairs.
    GeoJson {
        /// Vertices as `[lon, lat]`.
        coordinates: Vec<[f64; 2]>,
    },
    /// Encoded polyline; not decoded by this crate.
    Polyline(String),
}

impl OsrmGeometry {
    /// Vertices of a GeoJSON geometry, or `None` for a polyline.
    #[must_use]
    pub fn points(&self) -> Option<Vec<Point>> {
        match self {
            Self::GeoJson { coordinates } => Some(
                coordinates
                    .iter()
                    .map(|&[lon, lat]| Point::new(lat, lon))
                    .collect(),
            ),
            Self::Polyline(_) => None,
        }
    }
}

/// OSRM Nearest API response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NearestResponse {
    /// Status code from OSRM.
    pub code: String,
    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,
    /// Snapped waypoints, nearest first.
    #[serde(default)]
    pub waypoints: Vec<NearestWaypoint>,
}

impl NearestResponse {
    /// Name of the nearest street.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::ServiceError`] for a failure code and
    /// [`RoutingError::MissingField`] when no waypoint was returned.
    pub fn into_nearest_name(self) -> Result<String, RoutingError> {
        if self.code != OK_CODE {
            return Err(service_error(self.code, self.message));
        }
        self.waypoints
            .into_iter()
            .next()
            .map(|waypoint| waypoint.name)
            .ok_or(RoutingError::MissingField {
                field: "waypoints",
                code: self.code,
            })
    }
}

/// A point snapped to the road network.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NearestWaypoint {
    /// Street name; empty for unnamed roads.
    #[serde(default)]
    pub name: String,
    /// Snapped distance from the input coordinate in meters.
    pub distance: Option<f64>,
}

fn service_error(code: String, message: Option<String>) -> RoutingError {
    RoutingError::ServiceError {
        code,
        message: message.unwrap_or_default(),
    }
}
