//! Compute travel costs between points.
//!
//! The `TravelCostProvider` trait abstracts the retrieval of pairwise travel
//! times or distances between [`Point`](crate::Point) values. Callers supply
//! a slice of points and receive an integer [`CostMatrix`].
//!
//! [`RoutingError`] is shared by every routing operation; its
//! [`ErrorClass`] decides whether a failure may be replaced by a fallback.

mod error;
mod provider;

pub use error::{ErrorClass, RoutingError};
pub use provider::{CostKind, CostMatrix, TravelCostProvider, round_up_cost, truncate_cost};
