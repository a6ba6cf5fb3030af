use thiserror::Error;

use crate::Point;

/// Errors raised while computing travel costs against a routing backend.
///
/// Every variant belongs to one [`ErrorClass`]. Whether an error reaches the
/// caller depends on the class of the failing operation; see
/// [`crate::FallbackPolicy`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    /// No points were provided.
    #[error("at least one point is required")]
    EmptyInput,

    /// A point has a null or non-finite coordinate.
    #[error("point {index} has a null or non-finite coordinate (lat={lat}, lon={lon})")]
    InvalidCoordinate {
        /// Position of the offending point in the input list.
        index: usize,
        /// Latitude as supplied.
        lat: f64,
        /// Longitude as supplied.
        lon: f64,
    },

    /// A source or destination index does not address an input point.
    #[error("index {index} is out of range for {len} points")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of input points.
        len: usize,
    },

    /// The backend answered with a status other than `"Ok"`.
    #[error("routing service returned {code}: {message}")]
    ServiceError {
        /// Backend status code, e.g. `"NoRoute"`.
        code: String,
        /// Backend-supplied message, possibly empty.
        message: String,
    },

    /// A well-formed response lacked the field the operation reads.
    #[error("response is missing `{field}` (code {code})")]
    MissingField {
        /// Name of the absent field.
        field: &'static str,
        /// Status code carried by the response.
        code: String,
    },

    /// A matrix cell was null, negative or non-finite.
    #[error("response holds an unusable value at row {row}, column {column}")]
    InvalidValue {
        /// Row of the cell.
        row: usize,
        /// Column of the cell.
        column: usize,
    },

    /// The response reported success but contained no route.
    #[error("response contains no route")]
    NoRoute,

    /// The request did not reach the backend.
    #[error("network error contacting {url}: {message}")]
    NetworkError {
        /// Fully qualified request URL.
        url: String,
        /// Transport error description.
        message: String,
    },

    /// The request exceeded the transport timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Fully qualified request URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },

    /// The backend returned an HTTP error status.
    #[error("request to {url} failed with status {status}: {message}")]
    HttpError {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },

    /// The response body was not valid JSON of the expected shape.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Decoder error description.
        message: String,
    },

    /// The async runtime needed to issue requests could not start.
    #[error("failed to start async runtime: {message}")]
    Runtime {
        /// I/O error description.
        message: String,
    },
}

/// Coarse grouping of [`RoutingError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The caller supplied unusable input; detected before any request.
    InputValidation,
    /// The backend answered, but not with a usable result.
    UpstreamResponse,
    /// The exchange with the backend failed.
    Network,
}

impl RoutingError {
    /// Build an [`RoutingError::InvalidCoordinate`] for `point` at `index`.
    #[must_use]
    pub const fn invalid_coordinate(index: usize, point: Point) -> Self {
        Self::InvalidCoordinate {
            index,
            lat: point.lat,
            lon: point.lon,
        }
    }

    /// Return the class this error belongs to.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::EmptyInput | Self::InvalidCoordinate { .. } | Self::IndexOutOfRange { .. } => {
                ErrorClass::InputValidation
            }
            Self::ServiceError { .. }
            | Self::MissingField { .. }
            | Self::InvalidValue { .. }
            | Self::NoRoute => ErrorClass::UpstreamResponse,
            Self::NetworkError { .. }
            | Self::Timeout { .. }
            | Self::HttpError { .. }
            | Self::ParseError { .. }
            | Self::Runtime { .. } => ErrorClass::Network,
        }
    }
}
