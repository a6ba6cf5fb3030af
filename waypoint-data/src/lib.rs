//! Routing backend adapters for the Waypoint engine.
//!
//! Responsibilities:
//! - Talk to the OSRM HTTP API and decode its responses.
//! - Assemble large matrices from batched requests.
//! - Apply the per-operation fallback policy at the client boundary.
//!
//! Boundaries:
//! - Do not encode domain rules (live in `waypoint-core`).
//! - Keep blocking I/O off async executors; the only blocking entry point
//!   is the synchronous `TravelCostProvider` bridge.
//!
//! Invariants:
//! - Thread-safe by default: clients are `Send + Sync`.
//! - No global mutable state; caches are injected.

pub mod routing;

pub use routing::{
    ClientBuildError, MatrixBuilder, MatrixBuilderConfig, OsrmRoutingClient, RoutingClientConfig,
    TrajectoryInterpolator,
};
