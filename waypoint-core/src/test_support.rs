//! Deterministic fixtures shared by unit and behaviour tests.

use crate::{CostKind, CostMatrix, Point, RoutingError, TravelCostProvider, validate_points};

/// `TravelCostProvider` charging one unit for every distinct pair.
///
/// The diagonal is zero. Input is validated the same way a networked
/// provider validates it, so error paths can be exercised without a
/// backend.
#[derive(Default, Debug, Copy, Clone)]
pub struct UnitTravelCostProvider;

impl TravelCostProvider for UnitTravelCostProvider {
    fn get_cost_matrix(
        &self,
        points: &[Point],
        _kind: CostKind,
    ) -> Result<CostMatrix, RoutingError> {
        validate_points(points)?;
        let n = points.len();
        let mut matrix = vec![vec![1; n]; n];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] = 0;
        }
        Ok(matrix)
    }
}

/// Three stops around downtown Chattanooga, in visiting order.
#[must_use]
pub fn chattanooga_stops() -> Vec<Point> {
    vec![
        Point::new(35.045_6, -85.309_7),
        Point::new(35.052_3, -85.294_1),
        Point::new(35.038_9, -85.281_4),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn rejects_invalid_coordinates() {
        let mut stops = chattanooga_stops();
        stops[1].lat = f64::NAN;
        let err = UnitTravelCostProvider
            .get_cost_matrix(&stops, CostKind::Duration)
            .expect_err("NaN latitude must be rejected");
        assert!(matches!(err, RoutingError::InvalidCoordinate { index: 1, .. }));
    }
}
