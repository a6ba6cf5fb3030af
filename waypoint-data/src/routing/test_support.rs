//! Test utilities for the routing client.
//!
//! [`StubTransport`] is a deterministic [`RoutingTransport`] that answers
//! from a closure instead of the network and records every URL it was
//! asked for, so tests can assert on request shape and request count.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Value, json};
use waypoint_core::{Point, RoutingError};

use super::transport::{RoutingTransport, TransportResponse};

type Handler = dyn Fn(&str) -> Result<TransportResponse, RoutingError> + Send + Sync;

/// Stub `RoutingTransport` for testing.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use waypoint_core::Point;
/// use waypoint_data::routing::test_support::{StubTransport, block_on_for_tests};
/// use waypoint_data::routing::{OsrmRoutingClient, RoutingClientConfig};
///
/// let stub = Arc::new(StubTransport::unreachable());
/// let client = OsrmRoutingClient::with_transport(RoutingClientConfig::default(), stub.clone())
///     .expect("client should build");
///
/// let seconds = block_on_for_tests(client.travel_time(Point::new(0.0, 0.0), Point::new(0.0, 1.0)));
/// assert_eq!(seconds, Ok(90_000));
/// assert_eq!(stub.call_count(), 1);
/// ```
#[derive(Clone)]
pub struct StubTransport {
    handler: Arc<Handler>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl std::fmt::Debug for StubTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubTransport")
            .field("requests", &self.requests())
            .finish_non_exhaustive()
    }
}

impl StubTransport {
    /// Answer every request with `handler(url)`.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str) -> Result<TransportResponse, RoutingError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer every request with `status` and `body`.
    #[must_use]
    pub fn with_response(status: u16, body: &str) -> Self {
        let response = TransportResponse {
            status,
            body: body.to_owned(),
        };
        Self::new(move |_| Ok(response.clone()))
    }

    /// Answer every request with `200 OK` and `body`.
    #[must_use]
    pub fn with_json(body: &str) -> Self {
        Self::with_response(200, body)
    }

    /// Fail every request with `error`.
    #[must_use]
    pub fn with_error(error: RoutingError) -> Self {
        Self::new(move |_| Err(error.clone()))
    }

    /// Fail every request as if the backend refused the connection.
    #[must_use]
    pub fn unreachable() -> Self {
        Self::new(|url| {
            Err(RoutingError::NetworkError {
                url: url.to_owned(),
                message: "connection refused".to_owned(),
            })
        })
    }

    /// Emulate a backend on a flat plane.
    ///
    /// Costs are proportional to the straight-line distance in degrees:
    /// 1000 seconds and 100 km per degree. Table requests honour `sources`,
    /// `destinations` and `annotations=distance`; route requests return a
    /// single straight route; nearest requests return `"Stub Street"`.
    #[must_use]
    pub fn planar() -> Self {
        Self::new(|url| planar_response(url).map(|body| TransportResponse::ok(body.to_string())))
    }

    /// URLs requested so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests issued so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl RoutingTransport for StubTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, RoutingError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_owned());
        (self.handler)(url)
    }
}

/// Times a request yields to the scheduler before it is answered.
const IN_FLIGHT_YIELDS: usize = 3;

/// Wraps a [`StubTransport`] and tracks how many requests are outstanding.
///
/// Each request yields to the scheduler a few times before answering, so
/// requests issued together overlap and [`InFlightTransport::peak`]
/// reports the most that were ever outstanding at once.
#[derive(Debug)]
pub struct InFlightTransport {
    inner: StubTransport,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightTransport {
    /// Track requests answered by `inner`.
    #[must_use]
    pub const fn new(inner: StubTransport) -> Self {
        Self {
            inner,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Highest number of requests outstanding at the same time.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Number of requests issued so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inner.call_count()
    }
}

#[async_trait]
impl RoutingTransport for InFlightTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, RoutingError> {
        let outstanding = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(outstanding, Ordering::SeqCst);
        for _ in 0..IN_FLIGHT_YIELDS {
            tokio::task::yield_now().await;
        }
        let response = self.inner.get(url).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

/// Seconds per degree of straight-line distance in [`StubTransport::planar`].
pub const PLANAR_SECS_PER_DEGREE: f64 = 1_000.0;

/// Meters per degree of straight-line distance in [`StubTransport::planar`].
pub const PLANAR_METERS_PER_DEGREE: f64 = 100_000.0;

/// Straight-line distance between two points in degrees.
#[must_use]
pub fn planar_degrees(from: Point, to: Point) -> f64 {
    (from.lat - to.lat).hypot(from.lon - to.lon)
}

/// Run `future` to completion on a fresh current-thread runtime.
///
/// # Panics
///
/// Panics if the runtime cannot be built.
pub fn block_on_for_tests<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime should build")
        .block_on(future)
}

fn planar_response(url: &str) -> Result<Value, RoutingError> {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let points = parse_points(url, path.rsplit('/').next().unwrap_or_default())?;

    if path.contains("/table/v1/") {
        let sources = parse_indices(query, "sources", points.len());
        let destinations = parse_indices(query, "destinations", points.len());
        let scale = if query.contains("annotations=distance") {
            PLANAR_METERS_PER_DEGREE
        } else {
            PLANAR_SECS_PER_DEGREE
        };
        let matrix: Vec<Vec<f64>> = sources
            .iter()
            .map(|&i| {
                destinations
                    .iter()
                    .map(|&j| planar_degrees(points[i], points[j]) * scale)
                    .collect()
            })
            .collect();
        let field = if scale == PLANAR_METERS_PER_DEGREE {
            "distances"
        } else {
            "durations"
        };
        let mut body = json!({ "code": "Ok" });
        body[field] = json!(matrix);
        return Ok(body);
    }

    if path.contains("/route/v1/") {
        let [from, to] = points.as_slice() else {
            return Err(stub_error(url, "route needs exactly two points"));
        };
        let degrees = planar_degrees(*from, *to);
        let geometry = if query.contains("geometries=geojson") {
            json!({ "type": "LineString", "coordinates": [[from.lon, from.lat], [to.lon, to.lat]] })
        } else {
            json!("stub-polyline")
        };
        return Ok(json!({
            "code": "Ok",
            "routes": [{
                "duration": degrees * PLANAR_SECS_PER_DEGREE,
                "distance": degrees * PLANAR_METERS_PER_DEGREE,
                "geometry": geometry,
            }],
        }));
    }

    if path.contains("/nearest/v1/") {
        return Ok(json!({
            "code": "Ok",
            "waypoints": [{ "name": "Stub Street", "distance": 0.0 }],
        }));
    }

    Err(stub_error(url, "unknown service"))
}

fn parse_points(url: &str, encoded: &str) -> Result<Vec<Point>, RoutingError> {
    encoded
        .split(';')
        .map(|pair| {
            let (lon, lat) = pair
                .split_once(',')
                .ok_or_else(|| stub_error(url, "coordinate without comma"))?;
            match (lat.parse::<f64>(), lon.parse::<f64>()) {
                (Ok(lat), Ok(lon)) => Ok(Point::new(lat, lon)),
                _ => Err(stub_error(url, "unparseable coordinate")),
            }
        })
        .collect()
}

fn parse_indices(query: &str, name: &str, len: usize) -> Vec<usize> {
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
        .map_or_else(
            || (0..len).collect(),
            |list| list.split(';').filter_map(|i| i.parse().ok()).collect(),
        )
}

fn stub_error(url: &str, message: &str) -> RoutingError {
    RoutingError::ParseError {
        message: format!("stub cannot answer {url}: {message}"),
    }
}
