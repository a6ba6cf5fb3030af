//! Construction-time configuration for the routing client.

use std::fmt;
use std::time::Duration;

use url::Url;
use waypoint_core::FallbackPolicy;

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "waypoint-routing/0.1";

/// Default OSRM routing profile.
pub const DEFAULT_PROFILE: &str = "driving";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error type for routing client construction failures.
#[derive(Debug)]
pub enum ClientBuildError {
    /// The configured base URL does not parse.
    InvalidBaseUrl {
        /// URL as configured.
        url: String,
        /// Parser failure.
        source: url::ParseError,
    },
    /// The base URL uses a scheme other than `http` or `https`.
    UnsupportedScheme(String),
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
}

impl fmt::Display for ClientBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl { url, source } => {
                write!(f, "invalid routing service URL {url:?}: {source}")
            }
            Self::UnsupportedScheme(scheme) => {
                write!(f, "unsupported routing service scheme {scheme:?}")
            }
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
        }
    }
}

impl std::error::Error for ClientBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidBaseUrl { source, .. } => Some(source),
            Self::UnsupportedScheme(_) => None,
            Self::HttpClient(err) => Some(err),
        }
    }
}

/// Configuration for [`OsrmRoutingClient`](super::OsrmRoutingClient).
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use waypoint_core::FallbackPolicy;
/// use waypoint_data::routing::RoutingClientConfig;
///
/// let config = RoutingClientConfig::from_host_port("osrm.internal", 5000)
///     .with_timeout(Duration::from_secs(10))
///     .with_fallback(FallbackPolicy::new(3_600))
///     .with_address_suffix(", Chattanooga, TN");
///
/// assert_eq!(config.base_url, "http://osrm.internal:5000");
/// assert_eq!(
///     config.endpoint("table"),
///     "http://osrm.internal:5000/table/v1/driving"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct RoutingClientConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Routing profile path segment.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Fallback constants applied on failure paths.
    pub fallback: FallbackPolicy,
    /// Text appended to every reverse-geocoded street name.
    pub address_suffix: Option<String>,
}

impl Default for RoutingClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            profile: DEFAULT_PROFILE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            fallback: FallbackPolicy::default(),
            address_suffix: None,
        }
    }
}

impl RoutingClientConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Create a configuration for a plain-HTTP backend at `host:port`.
    #[must_use]
    pub fn from_host_port(host: &str, port: u16) -> Self {
        Self::new(format!("http://{host}:{port}"))
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the fallback policy.
    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Set the suffix appended to reverse-geocoded names.
    #[must_use]
    pub fn with_address_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.address_suffix = Some(suffix.into());
        self
    }

    /// Service root for `service`, e.g. `{base}/route/v1/{profile}`.
    #[must_use]
    pub fn endpoint(&self, service: &str) -> String {
        format!(
            "{}/{service}/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.profile
        )
    }

    /// Check that the base URL is an absolute `http` or `https` URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError::InvalidBaseUrl`] or
    /// [`ClientBuildError::UnsupportedScheme`].
    pub fn validate(&self) -> Result<(), ClientBuildError> {
        let url = Url::parse(&self.base_url).map_err(|source| ClientBuildError::InvalidBaseUrl {
            url: self.base_url.clone(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ClientBuildError::UnsupportedScheme(other.to_owned())),
        }
    }
}
