//! Core domain types for the Waypoint routing engine.
//!
//! This crate holds everything about routing that does not touch the
//! network: coordinates, cost matrices, route geometries, the error
//! taxonomy, the per-operation fallback policy, the cache capability and
//! the arc-length interpolation used to place a vehicle along its route.
//! The HTTP client lives in `waypoint-data`.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod cache;
mod fallback;
mod point;
mod route;
pub mod trajectory;
pub mod travel_cost;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use cache::{CacheKey, CachedValue, MemoryCache, NoCache, RoutingCache};
pub use fallback::{
    DEFAULT_FALLBACK_SECS, FallbackPolicy, NO_ADDRESS_FOUND, Operation, OperationClass,
};
pub use point::{Point, encode_path, validate_points};
pub use route::{RouteDetails, RouteGeometry};
pub use travel_cost::{
    CostKind, CostMatrix, ErrorClass, RoutingError, TravelCostProvider, round_up_cost,
    truncate_cost,
};
