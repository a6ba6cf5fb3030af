//! Table service requests and matrix conversion.

use waypoint_core::{
    CostKind, CostMatrix, Point, RoutingError, encode_path, round_up_cost, validate_points,
};

/// Speed in km/h OSRM assumes for pairs it cannot route on the network.
pub const FALLBACK_SPEED_KPH: u32 = 5;

/// A Table service query.
///
/// Without explicit `sources` or `destinations` every point is used on that
/// axis, giving a square matrix.
///
/// # Examples
/// ```
/// use waypoint_core::{CostKind, Point};
/// use waypoint_data::routing::TableRequest;
///
/// let points = [Point::new(35.0, -85.3), Point::new(35.1, -85.2)];
/// let request = TableRequest::new(&points, CostKind::Distance).with_sources([1]);
///
/// assert_eq!(
///     request.url("http://osrm:5000/table/v1/driving"),
///     "http://osrm:5000/table/v1/driving/-85.3,35;-85.2,35.1\
///      ?sources=1&fallback_speed=5&annotations=distance"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TableRequest<'a> {
    points: &'a [Point],
    kind: CostKind,
    sources: Option<Vec<usize>>,
    destinations: Option<Vec<usize>>,
}

impl<'a> TableRequest<'a> {
    /// Query `kind` between every pair of `points`.
    #[must_use]
    pub const fn new(points: &'a [Point], kind: CostKind) -> Self {
        Self {
            points,
            kind,
            sources: None,
            destinations: None,
        }
    }

    /// Restrict rows to the points at `indices`.
    ///
    /// An empty iterator leaves every point as a source.
    #[must_use]
    pub fn with_sources(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.sources = non_empty(indices);
        self
    }

    /// Restrict columns to the points at `indices`.
    ///
    /// An empty iterator leaves every point as a destination.
    #[must_use]
    pub fn with_destinations(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.destinations = non_empty(indices);
        self
    }

    /// Points in the request path.
    #[must_use]
    pub const fn points(&self) -> &'a [Point] {
        self.points
    }

    /// Annotation requested.
    #[must_use]
    pub const fn kind(&self) -> CostKind {
        self.kind
    }

    /// Number of rows the response must contain.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.sources.as_ref().map_or(self.points.len(), Vec::len)
    }

    /// Number of columns each row must contain.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.destinations
            .as_ref()
            .map_or(self.points.len(), Vec::len)
    }

    /// Check coordinates and indices before any request is issued.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::EmptyInput`],
    /// [`RoutingError::InvalidCoordinate`] or
    /// [`RoutingError::IndexOutOfRange`].
    pub fn validate(&self) -> Result<(), RoutingError> {
        validate_points(self.points)?;
        let len = self.points.len();
        let indices = self.sources.iter().chain(&self.destinations).flatten();
        match indices.copied().find(|&index| index >= len) {
            Some(index) => Err(RoutingError::IndexOutOfRange { index, len }),
            None => Ok(()),
        }
    }

    /// Full request URL below the table `endpoint`.
    #[must_use]
    pub fn url(&self, endpoint: &str) -> String {
        let mut params = Vec::with_capacity(4);
        if let Some(sources) = &self.sources {
            params.push(format!("sources={}", join_indices(sources)));
        }
        if let Some(destinations) = &self.destinations {
            params.push(format!("destinations={}", join_indices(destinations)));
        }
        params.push(format!("fallback_speed={FALLBACK_SPEED_KPH}"));
        if self.kind == CostKind::Distance {
            params.push("annotations=distance".to_owned());
        }
        format!(
            "{endpoint}/{}?{}",
            encode_path(self.points),
            params.join("&")
        )
    }

    /// Round a raw backend matrix up to whole units, checking its shape.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidValue`] for a null, negative or
    /// non-finite cell and [`RoutingError::ParseError`] when the matrix does
    /// not have [`rows`](Self::rows) × [`columns`](Self::columns) cells.
    pub fn convert(&self, raw: Vec<Vec<Option<f64>>>) -> Result<CostMatrix, RoutingError> {
        let (rows, columns) = (self.rows(), self.columns());
        if raw.len() != rows || raw.iter().any(|row| row.len() != columns) {
            return Err(RoutingError::ParseError {
                message: format!(
                    "expected a {rows}x{columns} {} matrix",
                    self.kind.field()
                ),
            });
        }
        raw.into_iter()
            .enumerate()
            .map(|(row, cells)| {
                cells
                    .into_iter()
                    .enumerate()
                    .map(|(column, cell)| {
                        cell.and_then(round_up_cost)
                            .ok_or(RoutingError::InvalidValue { row, column })
                    })
                    .collect::<Result<Vec<u64>, _>>()
            })
            .collect()
    }
}

fn non_empty(indices: impl IntoIterator<Item = usize>) -> Option<Vec<usize>> {
    let indices: Vec<usize> = indices.into_iter().collect();
    (!indices.is_empty()).then_some(indices)
}

fn join_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(";")
}
