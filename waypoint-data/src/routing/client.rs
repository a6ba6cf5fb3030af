//! Asynchronous OSRM client.
//!
//! # Failure policy
//!
//! Operations fall into three classes (see [`waypoint_core::Operation`]):
//!
//! | Operations | On backend failure |
//! |---|---|
//! | `travel_time_matrix`, `travel_distance_matrix`, `table`, `fetch_table`, `fetch_route` | error returned |
//! | `travel_time`, `travel_distance`, `cumulative_travel_time_row` | fallback constant returned |
//! | `reverse_geocode`, `route_details` | degraded value returned |
//!
//! Invalid coordinates are rejected before any request in every class that
//! can report an error. Fallback values are not cached.

use std::sync::Arc;

use log::debug;
use serde::de::DeserializeOwned;
use waypoint_core::{
    CacheKey, CachedValue, CostKind, CostMatrix, NoCache, Operation, Point, RouteDetails,
    RouteGeometry, RoutingCache, RoutingError, round_up_cost, truncate_cost, validate_points,
};

use super::config::{ClientBuildError, RoutingClientConfig};
use super::osrm::{NearestResponse, OsrmGeometry, OsrmRoute, RouteResponse, TableResponse};
use super::table::TableRequest;
use super::transport::{HttpTransport, RoutingTransport};

/// Client for the OSRM Table, Route and Nearest services.
///
/// The client is `Send + Sync` and is meant to be shared behind an [`Arc`].
///
/// # Example
///
/// ```no_run
/// use waypoint_core::Point;
/// use waypoint_data::routing::{OsrmRoutingClient, RoutingClientConfig};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OsrmRoutingClient::new(RoutingClientConfig::from_host_port("localhost", 5000))?;
/// let depot = Point::new(35.045, -85.309);
/// let stop = Point::new(35.052, -85.294);
///
/// let seconds = client.travel_time(depot, stop).await?;
/// let matrix = client.travel_time_matrix(&[depot, stop], None).await?;
/// # Ok(())
/// # }
/// ```
pub struct OsrmRoutingClient {
    transport: Arc<dyn RoutingTransport>,
    cache: Arc<dyn RoutingCache>,
    config: RoutingClientConfig,
}

impl std::fmt::Debug for OsrmRoutingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsrmRoutingClient")
            .field("config", &self.config)
            .field("transport", &"<dyn RoutingTransport>")
            .field("cache", &"<dyn RoutingCache>")
            .finish()
    }
}

impl OsrmRoutingClient {
    /// Create a client talking HTTP to the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(config: RoutingClientConfig) -> Result<Self, ClientBuildError> {
        let transport = HttpTransport::new(config.timeout, &config.user_agent)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over an explicit transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_transport(
        config: RoutingClientConfig,
        transport: Arc<dyn RoutingTransport>,
    ) -> Result<Self, ClientBuildError> {
        config.validate()?;
        Ok(Self {
            transport,
            cache: Arc::new(NoCache),
            config,
        })
    }

    /// Memoize successful lookups in `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn RoutingCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Configuration the client was built with.
    #[must_use]
    pub const fn config(&self) -> &RoutingClientConfig {
        &self.config
    }

    /// Travel time matrix in whole seconds, rounded up.
    ///
    /// With `source_index` set, the result has a single row for that point.
    ///
    /// # Errors
    ///
    /// Every failure is returned; see [`table`](Self::table).
    pub async fn travel_time_matrix(
        &self,
        points: &[Point],
        source_index: Option<usize>,
    ) -> Result<CostMatrix, RoutingError> {
        let request = TableRequest::new(points, CostKind::Duration).with_sources(source_index);
        self.table(&request).await
    }

    /// Travel distance matrix in whole meters, rounded up.
    ///
    /// # Errors
    ///
    /// Every failure is returned; see [`table`](Self::table).
    pub async fn travel_distance_matrix(
        &self,
        points: &[Point],
    ) -> Result<CostMatrix, RoutingError> {
        self.table(&TableRequest::new(points, CostKind::Distance))
            .await
    }

    /// Run a table query and convert it into an integer matrix.
    ///
    /// # Errors
    ///
    /// Returns input errors before any request, transport errors, and
    /// [`RoutingError::MissingField`], [`RoutingError::ServiceError`],
    /// [`RoutingError::InvalidValue`] or [`RoutingError::ParseError`] for
    /// unusable responses.
    pub async fn table(&self, request: &TableRequest<'_>) -> Result<CostMatrix, RoutingError> {
        request.validate()?;
        let url = request.url(&self.config.endpoint("table"));
        let key = CacheKey::new(matrix_operation(request.kind()), url.as_str());
        if let Some(CachedValue::Matrix(matrix)) = self.lookup(&key) {
            return Ok(matrix);
        }

        let response: TableResponse = self.get_json(&url).await?;
        let matrix = request.convert(response.into_matrix(request.kind())?)?;
        self.cache.put(key, CachedValue::Matrix(matrix.clone()));
        Ok(matrix)
    }

    /// Run a table query and return the backend's typed response.
    ///
    /// The status code is not inspected.
    ///
    /// # Errors
    ///
    /// Returns input errors before any request and transport or decoding
    /// errors after it.
    pub async fn fetch_table(
        &self,
        request: &TableRequest<'_>,
    ) -> Result<TableResponse, RoutingError> {
        request.validate()?;
        let url = request.url(&self.config.endpoint("table"));
        self.get_json(&url).await
    }

    /// Travel time between two points in whole seconds, rounded up.
    ///
    /// Identical points cost zero without a request. When several routes
    /// are offered the fastest one wins. Backend failures yield the
    /// configured fallback time.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidCoordinate`] for an invalid point.
    pub async fn travel_time(&self, source: Point, target: Point) -> Result<u64, RoutingError> {
        self.point_to_point(Operation::TravelTime, source, target)
            .await
    }

    /// Travel distance between two points in whole meters, truncated.
    ///
    /// Follows the same rules as [`travel_time`](Self::travel_time), falling
    /// back to the configured fallback distance.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidCoordinate`] for an invalid point.
    pub async fn travel_distance(
        &self,
        source: Point,
        target: Point,
    ) -> Result<u64, RoutingError> {
        self.point_to_point(Operation::TravelDistance, source, target)
            .await
    }

    /// Running total of travel times along `points`.
    ///
    /// Element `i` is the time from the first point to the i-th through
    /// every intermediate point. Segments that fell back contribute the
    /// fallback constant like any other value. An empty slice yields an
    /// empty row.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidCoordinate`] before any request if any
    /// point is invalid.
    pub async fn cumulative_travel_time_row(
        &self,
        points: &[Point],
    ) -> Result<Vec<u64>, RoutingError> {
        if points.is_empty() {
            return Ok(Vec::new());
        }
        validate_points(points)?;

        let mut row = Vec::with_capacity(points.len());
        let mut total = 0_u64;
        row.push(total);
        for pair in points.windows(2) {
            if let [from, to] = pair {
                total = total.saturating_add(self.travel_time(*from, *to).await?);
                row.push(total);
            }
        }
        Ok(row)
    }

    /// Name of the street nearest to `point`.
    ///
    /// The configured address suffix is appended. Any failure yields the
    /// configured "no address" sentinel.
    pub async fn reverse_geocode(&self, point: Point) -> String {
        let result = self.nearest_address(point).await;
        let fallback = &self.config.fallback;
        fallback.best_effort(Operation::ReverseGeocode, result, || {
            fallback.no_address.clone()
        })
    }

    /// Route polyline, distance and duration between two points.
    ///
    /// Any failure yields [`RouteDetails::arrived`] at `target`.
    pub async fn route_details(&self, source: Point, target: Point) -> RouteDetails {
        let result = self.fetch_route(source, target).await.map(RouteDetails::from);
        self.config
            .fallback
            .best_effort(Operation::RouteDetails, result, || {
                RouteDetails::arrived(target)
            })
    }

    /// Full-resolution route geometry between two points.
    ///
    /// # Errors
    ///
    /// Returns input, transport and response errors, including
    /// [`RoutingError::NoRoute`] when the backend offers no route and
    /// [`RoutingError::MissingField`] when the route has no GeoJSON
    /// geometry.
    pub async fn fetch_route(
        &self,
        source: Point,
        target: Point,
    ) -> Result<RouteGeometry, RoutingError> {
        validate_points(&[source, target])?;
        let url = format!(
            "{}?geometries=geojson&overview=full",
            self.route_url(source, target)
        );
        let key = CacheKey::new(Operation::RouteDetails, url.as_str());
        if let Some(CachedValue::Route(route)) = self.lookup(&key) {
            return Ok(route);
        }

        let response: RouteResponse = self.get_json(&url).await?;
        let code = response.code.clone();
        let best = response
            .into_routes()?
            .into_iter()
            .next()
            .ok_or(RoutingError::NoRoute)?;
        let points = best
            .geometry
            .as_ref()
            .and_then(OsrmGeometry::points)
            .ok_or(RoutingError::MissingField {
                field: "geometry",
                code,
            })?;
        let route = RouteGeometry::new(points, best.distance, best.duration);
        self.cache.put(key, CachedValue::Route(route.clone()));
        Ok(route)
    }

    async fn point_to_point(
        &self,
        operation: Operation,
        source: Point,
        target: Point,
    ) -> Result<u64, RoutingError> {
        if source == target {
            return Ok(0);
        }
        let result = self.best_route_cost(operation, source, target).await;
        self.config.fallback.point_to_point(operation, result)
    }

    async fn best_route_cost(
        &self,
        operation: Operation,
        source: Point,
        target: Point,
    ) -> Result<u64, RoutingError> {
        validate_points(&[source, target])?;
        let url = self.route_url(source, target);
        let key = CacheKey::new(operation, url.as_str());
        if let Some(CachedValue::Cost(cost)) = self.lookup(&key) {
            return Ok(cost);
        }

        let response: RouteResponse = self.get_json(&url).await?;
        let routes = response.into_routes()?;
        let cost = match operation {
            Operation::TravelDistance => min_cost(&routes, |route| truncate_cost(route.distance)),
            _ => min_cost(&routes, |route| round_up_cost(route.duration)),
        }?;
        self.cache.put(key, CachedValue::Cost(cost));
        Ok(cost)
    }

    async fn nearest_address(&self, point: Point) -> Result<String, RoutingError> {
        validate_points(&[point])?;
        let url = format!(
            "{}/{}?number=1",
            self.config.endpoint("nearest"),
            point.to_osrm()
        );
        let key = CacheKey::new(Operation::ReverseGeocode, url.as_str());
        if let Some(CachedValue::Address(address)) = self.lookup(&key) {
            return Ok(address);
        }

        let response: NearestResponse = self.get_json(&url).await?;
        let name = response.into_nearest_name()?;
        let address = match &self.config.address_suffix {
            Some(suffix) => format!("{name}{suffix}"),
            None => name,
        };
        self.cache.put(key, CachedValue::Address(address.clone()));
        Ok(address)
    }

    fn route_url(&self, source: Point, target: Point) -> String {
        format!(
            "{}/{};{}",
            self.config.endpoint("route"),
            source.to_osrm(),
            target.to_osrm()
        )
    }

    fn lookup(&self, key: &CacheKey) -> Option<CachedValue> {
        let hit = self.cache.get(key);
        if hit.is_some() {
            debug!("cache hit for {} {}", key.operation.name(), key.request);
        }
        hit
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RoutingError> {
        debug!("GET {url}");
        self.transport.get(url).await?.decode(url)
    }
}

const fn matrix_operation(kind: CostKind) -> Operation {
    match kind {
        CostKind::Duration => Operation::TravelTimeMatrix,
        CostKind::Distance => Operation::TravelDistanceMatrix,
    }
}

/// Smallest converted cost across candidate routes.
fn min_cost(
    routes: &[OsrmRoute],
    convert: impl Fn(&OsrmRoute) -> Option<u64>,
) -> Result<u64, RoutingError> {
    let mut best: Option<u64> = None;
    for (column, route) in routes.iter().enumerate() {
        let cost = convert(route).ok_or(RoutingError::InvalidValue { row: 0, column })?;
        best = Some(best.map_or(cost, |current| current.min(cost)));
    }
    best.ok_or(RoutingError::NoRoute)
}
