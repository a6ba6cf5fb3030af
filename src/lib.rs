//! Facade crate for the Waypoint routing engine.
//!
//! This crate re-exports the core routing types and, behind the `osrm`
//! feature, the OSRM-backed client, matrix builder and trajectory
//! interpolator.

#![forbid(unsafe_code)]

pub use waypoint_core::{
    CacheKey, CachedValue, CostKind, CostMatrix, ErrorClass, FallbackPolicy, MemoryCache,
    NoCache, Operation, OperationClass, Point, RouteDetails, RouteGeometry, RoutingCache,
    RoutingError, TravelCostProvider,
};

#[cfg(feature = "osrm")]
pub use waypoint_data::{
    ClientBuildError, MatrixBuilder, MatrixBuilderConfig, OsrmRoutingClient, RoutingClientConfig,
    TrajectoryInterpolator,
};
