//! Live position estimates for vehicles between two stops.

use std::sync::Arc;

use waypoint_core::trajectory::{Progress, interpolate_along, progress};
use waypoint_core::{Operation, Point, RouteGeometry, RoutingError};

use super::client::OsrmRoutingClient;

/// Estimates where a vehicle is along its current leg.
///
/// The leg's route is fetched from the backend on every call (or from the
/// client's cache) and the vehicle is placed on it by arc length, in
/// proportion to the travel time already elapsed.
#[derive(Debug, Clone)]
pub struct TrajectoryInterpolator {
    client: Arc<OsrmRoutingClient>,
}

impl TrajectoryInterpolator {
    /// Create an interpolator backed by `client`.
    #[must_use]
    pub const fn new(client: Arc<OsrmRoutingClient>) -> Self {
        Self { client }
    }

    /// Position of a vehicle travelling from `source` to `target` with
    /// `time_remaining` seconds left.
    ///
    /// Returns `source` when the remaining time covers the whole route and
    /// `target` when no usable route could be fetched. A negative remaining
    /// time places the vehicle at the end of the route.
    pub async fn interpolate(&self, source: Point, target: Point, time_remaining: f64) -> Point {
        let result = self
            .client
            .fetch_route(source, target)
            .await
            .and_then(require_line);
        let fallback = &self.client.config().fallback;
        let Some(route) = fallback.best_effort(Operation::Interpolate, result.map(Some), || None)
        else {
            return target;
        };

        match progress(time_remaining, route.duration) {
            Progress::NotStarted => source,
            Progress::Underway(fraction) => {
                interpolate_along(&route.points, fraction).unwrap_or(target)
            }
        }
    }
}

fn require_line(route: RouteGeometry) -> Result<RouteGeometry, RoutingError> {
    if route.points.len() < 2 {
        return Err(RoutingError::NoRoute);
    }
    Ok(route)
}
