//! HTTP transport seam between the routing client and the backend.
//!
//! The client builds request URLs and interprets bodies; a
//! [`RoutingTransport`] only moves bytes. Tests substitute
//! [`StubTransport`](super::test_support::StubTransport) to script
//! responses and count requests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use waypoint_core::RoutingError;

use super::config::ClientBuildError;

/// Status and body of one backend response.
///
/// Error statuses are not failures at this layer: OSRM answers bad requests
/// with a JSON body whose `code` names the problem, and the client needs to
/// see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl TransportResponse {
    /// A `200 OK` response carrying `body`.
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// A body that is not valid JSON for `T` yields
    /// [`RoutingError::HttpError`] when the status was an error, otherwise
    /// [`RoutingError::ParseError`].
    pub fn decode<T: DeserializeOwned>(&self, url: &str) -> Result<T, RoutingError> {
        serde_json::from_str(&self.body).map_err(|err| {
            if self.is_success() {
                RoutingError::ParseError {
                    message: format!("invalid response from {url}: {err}"),
                }
            } else {
                RoutingError::HttpError {
                    url: url.to_owned(),
                    status: self.status,
                    message: err.to_string(),
                }
            }
        })
    }
}

/// Issues GET requests against the routing backend.
#[async_trait]
pub trait RoutingTransport: Send + Sync {
    /// Fetch `url` and return its status and body.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Timeout`] or [`RoutingError::NetworkError`]
    /// when no response was received.
    async fn get(&self, url: &str) -> Result<TransportResponse, RoutingError>;
}

/// [`RoutingTransport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport with the given timeout and user agent.
    ///
    /// The timeout bounds both connecting and the whole request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError::HttpClient`] if the HTTP client fails to
    /// build.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        Ok(Self { client, timeout })
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> RoutingError {
        if error.is_timeout() {
            return RoutingError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return RoutingError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        RoutingError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl RoutingTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, RoutingError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        Ok(TransportResponse { status, body })
    }
}
