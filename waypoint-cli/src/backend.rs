//! Backend options shared by every subcommand.

use std::time::Duration;

use waypoint_core::FallbackPolicy;
use waypoint_data::RoutingClientConfig;

/// Port assumed when only `--osrm-host` is given.
pub(crate) const DEFAULT_OSRM_PORT: u16 = 5000;

/// Merged backend options before they become a client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BackendOptions {
    pub(crate) osrm_base_url: Option<String>,
    pub(crate) osrm_host: Option<String>,
    pub(crate) osrm_port: Option<u16>,
    pub(crate) fallback_time: Option<u64>,
    pub(crate) timeout_secs: Option<u64>,
}

impl BackendOptions {
    /// Resolve into a client configuration.
    ///
    /// An explicit base URL wins over host and port. A port without a host
    /// targets `localhost`.
    pub(crate) fn into_client_config(self) -> RoutingClientConfig {
        let mut config = match (self.osrm_base_url, self.osrm_host, self.osrm_port) {
            (Some(base_url), _, _) => RoutingClientConfig::new(base_url),
            (None, Some(host), port) => {
                RoutingClientConfig::from_host_port(&host, port.unwrap_or(DEFAULT_OSRM_PORT))
            }
            (None, None, Some(port)) => RoutingClientConfig::from_host_port("localhost", port),
            (None, None, None) => RoutingClientConfig::default(),
        };
        if let Some(seconds) = self.fallback_time {
            config = config.with_fallback(FallbackPolicy::new(seconds));
        }
        if let Some(seconds) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(seconds));
        }
        config
    }
}

/// Collect the backend fields every subcommand's argument struct carries.
macro_rules! backend_options {
    ($args:expr) => {
        $crate::backend::BackendOptions {
            osrm_base_url: $args.osrm_base_url,
            osrm_host: $args.osrm_host,
            osrm_port: $args.osrm_port,
            fallback_time: $args.fallback_time,
            timeout_secs: $args.timeout_secs,
        }
    };
}

pub(crate) use backend_options;
