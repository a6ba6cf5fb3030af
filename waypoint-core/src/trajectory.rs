//! Position estimates along a route polyline.
//!
//! Progress is derived from remaining travel time, then mapped onto the
//! route by arc length. Speed along a real route is not constant, so the
//! estimate is an approximation; it does follow the road geometry rather
//! than the straight line between the endpoints.

use geo::{Coord, Euclidean, InterpolateLine, LineString};

use crate::Point;

/// How far a vehicle has travelled along a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// The remaining time covers the whole route; the vehicle is at the
    /// origin.
    NotStarted,
    /// Fraction of the route completed, normally in `(0, 1]`.
    Underway(f64),
}

/// Derive progress from the remaining and total travel time in seconds.
///
/// A vehicle reporting at least the full route duration is pinned at the
/// origin. A zero-duration route counts as fully completed.
///
/// # Examples
/// ```
/// use waypoint_core::trajectory::{progress, Progress};
///
/// assert_eq!(progress(600.0, 600.0), Progress::NotStarted);
/// assert_eq!(progress(150.0, 600.0), Progress::Underway(0.75));
/// ```
#[must_use]
pub fn progress(time_remaining: f64, total_duration: f64) -> Progress {
    if time_remaining >= total_duration {
        Progress::NotStarted
    } else if total_duration == 0.0 {
        Progress::Underway(1.0)
    } else {
        Progress::Underway(1.0 - time_remaining / total_duration)
    }
}

/// Locate the point at `fraction` of the polyline's total length.
///
/// Lengths are measured in the plane of the raw coordinates, so the result
/// always lies on the line. `fraction` is clamped to `[0, 1]`. A line of
/// zero length yields its first vertex.
///
/// Returns `None` for an empty line or a NaN fraction.
///
/// # Examples
/// ```
/// use waypoint_core::{Point, trajectory::interpolate_along};
///
/// // An L-shaped route: 3 units north, then 1 unit east.
/// let line = [Point::new(0.0, 0.0), Point::new(3.0, 0.0), Point::new(3.0, 1.0)];
///
/// assert_eq!(interpolate_along(&line, 0.5), Some(Point::new(2.0, 0.0)));
/// assert_eq!(interpolate_along(&line, 1.0), Some(Point::new(3.0, 1.0)));
/// ```
#[must_use]
pub fn interpolate_along(line: &[Point], fraction: f64) -> Option<Point> {
    if fraction.is_nan() {
        return None;
    }
    let path: LineString<f64> = line.iter().copied().map(Coord::from).collect();
    Euclidean
        .point_at_ratio_from_start(&path, fraction.clamp(0.0, 1.0))
        .map(Point::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    const EPSILON: f64 = 1.0e-9;

    fn assert_close(actual: Point, expected: Point) {
        let delta = (actual.lat - expected.lat)
            .abs()
            .max((actual.lon - expected.lon).abs());
        assert!(
            delta <= EPSILON,
            "expected {expected}, got {actual} (|Δ| = {delta})"
        );
    }

    fn l_shaped() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 1.0),
        ]
    }

    #[rstest]
    #[case(600.0, 600.0, Progress::NotStarted)]
    #[case(900.0, 600.0, Progress::NotStarted)]
    #[case(0.0, 600.0, Progress::Underway(1.0))]
    #[case(300.0, 600.0, Progress::Underway(0.5))]
    fn derives_progress(#[case] remaining: f64, #[case] total: f64, #[case] expected: Progress) {
        assert_eq!(progress(remaining, total), expected);
    }

    #[rstest]
    fn zero_duration_route_is_complete() {
        assert_eq!(progress(-1.0, 0.0), Progress::Underway(1.0));
    }

    #[rstest]
    #[case(0.0, Point::new(0.0, 0.0))]
    #[case(0.25, Point::new(1.0, 0.0))]
    #[case(0.875, Point::new(3.0, 0.5))]
    #[case(1.0, Point::new(3.0, 1.0))]
    fn follows_the_polyline(#[case] fraction: f64, #[case] expected: Point) {
        let point = interpolate_along(&l_shaped(), fraction).expect("non-empty line");
        assert_close(point, expected);
    }

    #[rstest]
    fn does_not_cut_corners() {
        // Straight-line interpolation would give (1.5, 0.5).
        let point = interpolate_along(&l_shaped(), 0.5).expect("non-empty line");
        assert_close(point, Point::new(2.0, 0.0));
    }

    #[rstest]
    fn skips_repeated_vertices() {
        let line = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 2.0),
        ];
        let point = interpolate_along(&line, 0.5).expect("non-empty line");
        assert_close(point, Point::new(0.0, 1.0));
    }

    #[rstest]
    #[case(-0.5, Point::new(0.0, 0.0))]
    #[case(1.5, Point::new(3.0, 1.0))]
    fn clamps_fraction(#[case] fraction: f64, #[case] expected: Point) {
        let point = interpolate_along(&l_shaped(), fraction).expect("non-empty line");
        assert_close(point, expected);
    }

    #[rstest]
    fn zero_length_line_yields_first_vertex() {
        let line = [Point::new(1.5, 2.5), Point::new(1.5, 2.5), Point::new(1.5, 2.5)];
        let point = interpolate_along(&line, 0.7).expect("non-empty line");
        assert_eq!(point, Point::new(1.5, 2.5));
        assert!(point.is_valid());
    }

    #[rstest]
    fn degenerate_lines() {
        assert_eq!(interpolate_along(&[], 0.5), None);
        let single = [Point::new(4.0, 5.0)];
        assert_eq!(interpolate_along(&single, 0.5), Some(single[0]));
        assert_eq!(interpolate_along(&l_shaped(), f64::NAN), None);
    }

    proptest! {
        #[test]
        fn stays_within_the_line_bounds(
            fraction in 0.0_f64..=1.0,
            vertices in proptest::collection::vec((-90.0_f64..90.0, -180.0_f64..180.0), 2..12),
        ) {
            let line: Vec<Point> = vertices.into_iter().map(|(lat, lon)| Point::new(lat, lon)).collect();
            let point = interpolate_along(&line, fraction).expect("non-empty line");
            let (min_lat, max_lat) = line.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.lat), hi.max(p.lat)));
            let (min_lon, max_lon) = line.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.lon), hi.max(p.lon)));
            prop_assert!(point.lat >= min_lat - EPSILON && point.lat <= max_lat + EPSILON);
            prop_assert!(point.lon >= min_lon - EPSILON && point.lon <= max_lon + EPSILON);
        }
    }
}
