//! Per-operation failure policy.
//!
//! Routing operations do not share one error policy. Matrices feed the
//! optimizer's cost model and must be exact, so every failure propagates.
//! Single-pair lookups favour availability and replace backend failures
//! with a fixed constant. Display lookups never fail at all.
//!
//! [`OperationClass::propagates`] encodes that table and
//! [`FallbackPolicy`] applies it at each call site.

use log::warn;

use crate::{ErrorClass, RoutingError};

/// Fallback travel time in seconds used when a single-pair lookup fails.
pub const DEFAULT_FALLBACK_SECS: u64 = 90_000;

/// Address returned when a reverse geocode lookup fails.
pub const NO_ADDRESS_FOUND: &str = "no address found";

/// Every routing operation the client exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Full or one-to-many travel time matrix.
    TravelTimeMatrix,
    /// Full travel distance matrix.
    TravelDistanceMatrix,
    /// Travel time between two points.
    TravelTime,
    /// Travel distance between two points.
    TravelDistance,
    /// Nearest named road for a point.
    ReverseGeocode,
    /// Route geometry between two points.
    RouteDetails,
    /// Current position along a route.
    Interpolate,
}

/// How an operation reacts to failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationClass {
    /// Every error reaches the caller.
    Matrix,
    /// Backend failures become a fallback constant; bad input still errors.
    PointToPoint,
    /// Every failure becomes a degraded result.
    BestEffort,
}

impl Operation {
    /// Return the failure class of this operation.
    #[must_use]
    pub const fn class(self) -> OperationClass {
        match self {
            Self::TravelTimeMatrix | Self::TravelDistanceMatrix => OperationClass::Matrix,
            Self::TravelTime | Self::TravelDistance => OperationClass::PointToPoint,
            Self::ReverseGeocode | Self::RouteDetails | Self::Interpolate => {
                OperationClass::BestEffort
            }
        }
    }

    /// Short name used in logs and cache keys.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TravelTimeMatrix => "travel_time_matrix",
            Self::TravelDistanceMatrix => "travel_distance_matrix",
            Self::TravelTime => "travel_time",
            Self::TravelDistance => "travel_distance",
            Self::ReverseGeocode => "reverse_geocode",
            Self::RouteDetails => "route_details",
            Self::Interpolate => "interpolate",
        }
    }
}

impl OperationClass {
    /// Whether an error of `class` reaches the caller of this operation.
    #[must_use]
    pub const fn propagates(self, class: ErrorClass) -> bool {
        match self {
            Self::Matrix => true,
            Self::PointToPoint => matches!(class, ErrorClass::InputValidation),
            Self::BestEffort => false,
        }
    }
}

/// Fallback constants and the rules for applying them.
///
/// # Examples
/// ```
/// use waypoint_core::{FallbackPolicy, Operation, RoutingError};
///
/// let policy = FallbackPolicy::new(3600);
/// let failed = Err(RoutingError::ServiceError {
///     code: "NoRoute".into(),
///     message: String::new(),
/// });
///
/// assert_eq!(policy.point_to_point(Operation::TravelTime, failed), Ok(3600));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPolicy {
    /// Seconds substituted for a failed travel time lookup.
    pub travel_time_secs: u64,
    /// Meters substituted for a failed travel distance lookup.
    pub travel_distance_m: u64,
    /// Address substituted for a failed reverse geocode.
    pub no_address: String,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_SECS)
    }
}

impl FallbackPolicy {
    /// Create a policy using `travel_time_secs` for both time and distance
    /// fallbacks.
    #[must_use]
    pub fn new(travel_time_secs: u64) -> Self {
        Self {
            travel_time_secs,
            travel_distance_m: travel_time_secs,
            no_address: NO_ADDRESS_FOUND.to_owned(),
        }
    }

    /// Set the distance fallback in meters.
    #[must_use]
    pub const fn with_travel_distance(mut self, meters: u64) -> Self {
        self.travel_distance_m = meters;
        self
    }

    /// Set the address returned by failed reverse geocodes.
    #[must_use]
    pub fn with_no_address(mut self, no_address: impl Into<String>) -> Self {
        self.no_address = no_address.into();
        self
    }

    /// Constant substituted for a failed single-pair `operation`.
    #[must_use]
    pub const fn fallback_cost(&self, operation: Operation) -> u64 {
        match operation {
            Operation::TravelDistance => self.travel_distance_m,
            _ => self.travel_time_secs,
        }
    }

    /// Apply the single-pair policy to the outcome of `operation`.
    ///
    /// # Errors
    ///
    /// Returns the original error when its class propagates for
    /// `operation`, which for single-pair lookups means invalid input.
    pub fn point_to_point(
        &self,
        operation: Operation,
        result: Result<u64, RoutingError>,
    ) -> Result<u64, RoutingError> {
        match result {
            Ok(cost) => Ok(cost),
            Err(err) if operation.class().propagates(err.class()) => Err(err),
            Err(err) => {
                let fallback = self.fallback_cost(operation);
                warn!(
                    "{} failed, substituting fallback {fallback}: {err}",
                    operation.name()
                );
                Ok(fallback)
            }
        }
    }

    /// Apply the best-effort policy, replacing any failure with `degraded`.
    pub fn best_effort<T>(
        &self,
        operation: Operation,
        result: Result<T, RoutingError>,
        degraded: impl FnOnce() -> T,
    ) -> T {
        match result {
            Ok(value) => value,
            Err(err) => {
                warn!("{} failed, returning degraded result: {err}", operation.name());
                degraded()
            }
        }
    }
}
