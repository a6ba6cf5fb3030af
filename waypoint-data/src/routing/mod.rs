//! OSRM routing client, batched matrix builder and trajectory interpolator.
//!
//! # Architecture
//!
//! [`OsrmRoutingClient`] owns the request and response logic for the
//! Table, Route and Nearest services and applies the per-operation
//! [`FallbackPolicy`](waypoint_core::FallbackPolicy). Bytes move through a
//! [`RoutingTransport`]: [`HttpTransport`] in production, a
//! [`StubTransport`](test_support::StubTransport) in tests.
//!
//! [`MatrixBuilder`] and [`TrajectoryInterpolator`] sit on top of the
//! client. The builder also implements the synchronous
//! [`TravelCostProvider`](waypoint_core::TravelCostProvider) trait, keeping
//! optimizers embeddable in synchronous contexts.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use waypoint_core::{CostKind, Point, TravelCostProvider};
//! use waypoint_data::routing::{
//!     MatrixBuilder, MatrixBuilderConfig, OsrmRoutingClient, RoutingClientConfig,
//!     TrajectoryInterpolator,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RoutingClientConfig::from_host_port("localhost", 5000)
//!     .with_timeout(Duration::from_secs(60))
//!     .with_user_agent("dispatch/1.0");
//! let client = Arc::new(OsrmRoutingClient::new(config)?);
//!
//! let depot = Point::new(35.045, -85.309);
//! let stop = Point::new(35.052, -85.294);
//!
//! let matrix = client.travel_time_matrix(&[depot, stop], None).await?;
//! let address = client.reverse_geocode(stop).await;
//!
//! let interpolator = TrajectoryInterpolator::new(Arc::clone(&client));
//! let vehicle = interpolator.interpolate(depot, stop, 120.0).await;
//!
//! let builder = MatrixBuilder::new(client, MatrixBuilderConfig::default().with_batch_size(50));
//! let full = builder.build(&[depot, stop], CostKind::Distance).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod matrix;
pub mod osrm;
mod table;
mod trajectory;
mod transport;

#[doc(hidden)]
pub mod test_support;

pub use client::OsrmRoutingClient;
pub use config::{
    ClientBuildError, DEFAULT_PROFILE, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    RoutingClientConfig,
};
pub use matrix::{DEFAULT_WORKERS, MatrixBuilder, MatrixBuilderConfig, batch_ranges};
pub use osrm::TableResponse;
pub use table::{FALLBACK_SPEED_KPH, TableRequest};
pub use trajectory::TrajectoryInterpolator;
pub use transport::{HttpTransport, RoutingTransport, TransportResponse};
