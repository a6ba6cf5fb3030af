//! Route geometries reported by the routing backend.
//!
//! A [`RouteGeometry`] is the backend's chosen path between two points, not
//! a straight line. [`RouteDetails`] is its display form, which also covers
//! the degraded "assume instantaneous arrival" result.

use crate::Point;

/// The path, length and duration of one route between two points.
///
/// # Examples
/// ```
/// use waypoint_core::{Point, RouteGeometry};
///
/// let route = RouteGeometry::new(
///     vec![Point::new(0.0, 0.0), Point::new(0.0, 1.0)],
///     1200.0,
///     95.5,
/// );
///
/// assert_eq!(route.points.len(), 2);
/// assert_eq!(route.duration, 95.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteGeometry {
    /// Ordered vertices of the route polyline.
    pub points: Vec<Point>,
    /// Route length in meters.
    pub distance: f64,
    /// Route duration in seconds.
    pub duration: f64,
}

impl RouteGeometry {
    /// Construct a geometry from its polyline, distance and duration.
    #[must_use]
    pub const fn new(points: Vec<Point>, distance: f64, duration: f64) -> Self {
        Self {
            points,
            distance,
            duration,
        }
    }
}

/// Route geometry as returned to display callers.
///
/// When the backend cannot be reached the line holds only the target point
/// and both totals are zero. Use [`RouteDetails::is_degraded`] to tell this
/// apart from a genuine zero-length route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteDetails {
    /// Route polyline, or the target alone when degraded.
    pub line: Vec<Point>,
    /// Route length in meters.
    pub distance: f64,
    /// Route duration in seconds.
    pub duration: f64,
}

impl RouteDetails {
    /// The degraded result: the target point with zero distance and duration.
    ///
    /// # Examples
    /// ```
    /// use waypoint_core::{Point, RouteDetails};
    ///
    /// let target = Point::new(35.0, -85.0);
    /// let details = RouteDetails::arrived(target);
    /// assert_eq!(details.line, vec![target]);
    /// assert_eq!(details.duration, 0.0);
    /// ```
    #[must_use]
    pub fn arrived(target: Point) -> Self {
        Self {
            line: vec![target],
            distance: 0.0,
            duration: 0.0,
        }
    }

    /// Whether these details stand in for a failed lookup.
    ///
    /// A zero-distance, zero-duration result only counts as genuine when
    /// `source` and `target` coincide.
    #[must_use]
    pub fn is_degraded(&self, source: Point, target: Point) -> bool {
        self.distance == 0.0 && self.duration == 0.0 && source != target
    }
}

impl From<RouteGeometry> for RouteDetails {
    fn from(route: RouteGeometry) -> Self {
        Self {
            line: route.points,
            distance: route.distance,
            duration: route.duration,
        }
    }
}
