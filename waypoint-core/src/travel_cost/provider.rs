//! Travel-cost provider trait, matrix alias and rounding rules.

use crate::Point;

use super::error::RoutingError;

/// Matrix of integer travel costs.
///
/// `matrix[i][j]` is the cost from the i-th source to the j-th destination,
/// in seconds or meters depending on the [`CostKind`] requested.
pub type CostMatrix = Vec<Vec<u64>>;

/// Which annotation of the routing backend a matrix holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostKind {
    /// Travel time in seconds.
    Duration,
    /// Travel distance in meters.
    Distance,
}

impl CostKind {
    /// Name of the response field carrying this annotation.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Duration => "durations",
            Self::Distance => "distances",
        }
    }
}

/// Round a raw backend cost up to the next whole unit.
///
/// Returns `None` for negative or non-finite input.
///
/// # Examples
/// ```
/// use waypoint_core::round_up_cost;
///
/// assert_eq!(round_up_cost(120.2), Some(121));
/// assert_eq!(round_up_cost(0.0), Some(0));
/// assert_eq!(round_up_cost(f64::NAN), None);
/// ```
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the value is finite and non-negative; `as` saturates above u64::MAX"
)]
pub fn round_up_cost(value: f64) -> Option<u64> {
    usable(value).map(|v| v.ceil() as u64)
}

/// Drop the fractional part of a raw backend cost.
///
/// Returns `None` for negative or non-finite input.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the value is finite and non-negative; `as` saturates above u64::MAX"
)]
pub fn truncate_cost(value: f64) -> Option<u64> {
    usable(value).map(|v| v.trunc() as u64)
}

fn usable(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Fetch pairwise travel costs for a list of points.
///
/// Implementers must return a square `n×n` matrix where `n == points.len()`,
/// ordered like the input. A degraded matrix is never returned: every
/// failure is reported as an error.
///
/// # Examples
///
/// ```rust
/// use waypoint_core::{CostKind, CostMatrix, Point, RoutingError, TravelCostProvider};
///
/// struct UnitProvider;
///
/// impl TravelCostProvider for UnitProvider {
///     fn get_cost_matrix(
///         &self,
///         points: &[Point],
///         _kind: CostKind,
///     ) -> Result<CostMatrix, RoutingError> {
///         waypoint_core::validate_points(points)?;
///         let n = points.len();
///         Ok((0..n)
///             .map(|i| (0..n).map(|j| u64::from(i != j)).collect())
///             .collect())
///     }
/// }
///
/// let matrix = UnitProvider.get_cost_matrix(&[Point::new(0.0, 0.0)], CostKind::Duration)?;
/// assert_eq!(matrix, vec![vec![0]]);
/// # Ok::<(), RoutingError>(())
/// ```
pub trait TravelCostProvider {
    /// Return the cost matrix of `kind` for `points`.
    ///
    /// Implementations must return `Err(RoutingError::EmptyInput)` when
    /// `points` is empty and must validate every coordinate before any
    /// network request.
    fn get_cost_matrix(&self, points: &[Point], kind: CostKind)
    -> Result<CostMatrix, RoutingError>;
}
