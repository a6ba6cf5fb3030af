//! Commands that take points as flags: `travel-time`, `geocode`, `route`
//! and `locate`.

use std::sync::Arc;

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use waypoint_core::Point;
use waypoint_data::{RoutingClientConfig, TrajectoryInterpolator};

use crate::backend::backend_options;
use crate::input::require_point;
use crate::{
    ARG_AT, ARG_FALLBACK_TIME, ARG_FROM, ARG_OSRM_BASE_URL, ARG_OSRM_HOST, ARG_OSRM_PORT,
    ARG_REMAINING, ARG_TIMEOUT_SECS, ARG_TO, CliError, ClientFactory, Output, block_on,
};

pub(crate) const CMD_TRAVEL_TIME: &str = "travel-time";
pub(crate) const CMD_GEOCODE: &str = "geocode";
pub(crate) const CMD_ROUTE: &str = "route";
pub(crate) const CMD_LOCATE: &str = "locate";

/// CLI arguments for the `travel-time` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "travel-time",
    long_about = "Travel time in seconds, or distance in meters, between two \
                 points. When the backend cannot answer, the fallback value \
                 is printed instead of an error.",
    about = "Travel cost between two points"
)]
#[ortho_config(prefix = "WAYPOINT")]
pub(crate) struct TravelTimeArgs {
    /// Departure point as `lat,lon`.
    #[arg(long = ARG_FROM, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) from: Option<String>,
    /// Arrival point as `lat,lon`.
    #[arg(long = ARG_TO, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) to: Option<String>,
    /// Report the distance in meters instead of the time in seconds.
    #[arg(long)]
    #[serde(default)]
    pub(crate) distance: bool,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// OSRM host, used when no base URL is given.
    #[arg(long = ARG_OSRM_HOST, value_name = "host")]
    #[serde(default)]
    pub(crate) osrm_host: Option<String>,
    /// OSRM port, used when no base URL is given.
    #[arg(long = ARG_OSRM_PORT, value_name = "port")]
    #[serde(default)]
    pub(crate) osrm_port: Option<u16>,
    /// Seconds reported when the backend cannot answer.
    #[arg(long = ARG_FALLBACK_TIME, value_name = "secs")]
    #[serde(default)]
    pub(crate) fallback_time: Option<u64>,
    /// Per-request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl TravelTimeArgs {
    pub(crate) fn into_config(self) -> Result<TravelTimeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        TravelTimeConfig::try_from(merged)
    }
}

/// Resolved `travel-time` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct TravelTimeConfig {
    pub(crate) from: Point,
    pub(crate) to: Point,
    pub(crate) distance: bool,
    pub(crate) backend: RoutingClientConfig,
}

impl TryFrom<TravelTimeArgs> for TravelTimeConfig {
    type Error = CliError;

    fn try_from(args: TravelTimeArgs) -> Result<Self, Self::Error> {
        let from = require_point(args.from, CMD_TRAVEL_TIME, ARG_FROM)?;
        let to = require_point(args.to, CMD_TRAVEL_TIME, ARG_TO)?;
        Ok(Self {
            from,
            to,
            distance: args.distance,
            backend: backend_options!(args).into_client_config(),
        })
    }
}

impl TravelTimeConfig {
    pub(crate) fn run(self, factory: &dyn ClientFactory) -> Result<Output, CliError> {
        let client = factory.build(self.backend)?;
        let cost = if self.distance {
            block_on(client.travel_distance(self.from, self.to))??
        } else {
            block_on(client.travel_time(self.from, self.to))??
        };
        Ok(Output::Cost(cost))
    }
}

/// CLI arguments for the `geocode` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "geocode", about = "Name of the street nearest to a point")]
#[ortho_config(prefix = "WAYPOINT")]
pub(crate) struct GeocodeArgs {
    /// Point to look up as `lat,lon`.
    #[arg(long = ARG_AT, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) at: Option<String>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// OSRM host, used when no base URL is given.
    #[arg(long = ARG_OSRM_HOST, value_name = "host")]
    #[serde(default)]
    pub(crate) osrm_host: Option<String>,
    /// OSRM port, used when no base URL is given.
    #[arg(long = ARG_OSRM_PORT, value_name = "port")]
    #[serde(default)]
    pub(crate) osrm_port: Option<u16>,
    /// Unused by this command; accepted for a uniform command line.
    #[arg(long = ARG_FALLBACK_TIME, value_name = "secs")]
    #[serde(default)]
    pub(crate) fallback_time: Option<u64>,
    /// Per-request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl GeocodeArgs {
    pub(crate) fn into_config(self) -> Result<GeocodeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        GeocodeConfig::try_from(merged)
    }
}

/// Resolved `geocode` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct GeocodeConfig {
    pub(crate) at: Point,
    pub(crate) backend: RoutingClientConfig,
}

impl TryFrom<GeocodeArgs> for GeocodeConfig {
    type Error = CliError;

    fn try_from(args: GeocodeArgs) -> Result<Self, Self::Error> {
        let at = require_point(args.at, CMD_GEOCODE, ARG_AT)?;
        Ok(Self {
            at,
            backend: backend_options!(args).into_client_config(),
        })
    }
}

impl GeocodeConfig {
    pub(crate) fn run(self, factory: &dyn ClientFactory) -> Result<Output, CliError> {
        let client = factory.build(self.backend)?;
        let address = block_on(client.reverse_geocode(self.at))?;
        Ok(Output::Address(address))
    }
}

/// CLI arguments for the `route` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "route",
    about = "Route polyline, distance and duration between two points"
)]
#[ortho_config(prefix = "WAYPOINT")]
pub(crate) struct RouteArgs {
    /// Departure point as `lat,lon`.
    #[arg(long = ARG_FROM, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) from: Option<String>,
    /// Arrival point as `lat,lon`.
    #[arg(long = ARG_TO, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) to: Option<String>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// OSRM host, used when no base URL is given.
    #[arg(long = ARG_OSRM_HOST, value_name = "host")]
    #[serde(default)]
    pub(crate) osrm_host: Option<String>,
    /// OSRM port, used when no base URL is given.
    #[arg(long = ARG_OSRM_PORT, value_name = "port")]
    #[serde(default)]
    pub(crate) osrm_port: Option<u16>,
    /// Unused by this command; accepted for a uniform command line.
    #[arg(long = ARG_FALLBACK_TIME, value_name = "secs")]
    #[serde(default)]
    pub(crate) fallback_time: Option<u64>,
    /// Per-request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl RouteArgs {
    pub(crate) fn into_config(self) -> Result<RouteConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RouteConfig::try_from(merged)
    }
}

/// Resolved `route` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct RouteConfig {
    pub(crate) from: Point,
    pub(crate) to: Point,
    pub(crate) backend: RoutingClientConfig,
}

impl TryFrom<RouteArgs> for RouteConfig {
    type Error = CliError;

    fn try_from(args: RouteArgs) -> Result<Self, Self::Error> {
        let from = require_point(args.from, CMD_ROUTE, ARG_FROM)?;
        let to = require_point(args.to, CMD_ROUTE, ARG_TO)?;
        Ok(Self {
            from,
            to,
            backend: backend_options!(args).into_client_config(),
        })
    }
}

impl RouteConfig {
    pub(crate) fn run(self, factory: &dyn ClientFactory) -> Result<Output, CliError> {
        let client = factory.build(self.backend)?;
        let details = block_on(client.route_details(self.from, self.to))?;
        Ok(Output::Route(details))
    }
}

/// CLI arguments for the `locate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "locate",
    long_about = "Estimate where a vehicle is along the road between two \
                 points, given the travel time it has left.",
    about = "Estimate a vehicle's position along its leg"
)]
#[ortho_config(prefix = "WAYPOINT")]
pub(crate) struct LocateArgs {
    /// Start of the leg as `lat,lon`.
    #[arg(long = ARG_FROM, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) from: Option<String>,
    /// End of the leg as `lat,lon`.
    #[arg(long = ARG_TO, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) to: Option<String>,
    /// Seconds of travel left before arrival.
    #[arg(long = ARG_REMAINING, value_name = "secs", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) remaining: Option<f64>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// OSRM host, used when no base URL is given.
    #[arg(long = ARG_OSRM_HOST, value_name = "host")]
    #[serde(default)]
    pub(crate) osrm_host: Option<String>,
    /// OSRM port, used when no base URL is given.
    #[arg(long = ARG_OSRM_PORT, value_name = "port")]
    #[serde(default)]
    pub(crate) osrm_port: Option<u16>,
    /// Unused by this command; accepted for a uniform command line.
    #[arg(long = ARG_FALLBACK_TIME, value_name = "secs")]
    #[serde(default)]
    pub(crate) fallback_time: Option<u64>,
    /// Per-request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl LocateArgs {
    pub(crate) fn into_config(self) -> Result<LocateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LocateConfig::try_from(merged)
    }
}

/// Resolved `locate` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct LocateConfig {
    pub(crate) from: Point,
    pub(crate) to: Point,
    pub(crate) remaining: f64,
    pub(crate) backend: RoutingClientConfig,
}

impl TryFrom<LocateArgs> for LocateConfig {
    type Error = CliError;

    fn try_from(args: LocateArgs) -> Result<Self, Self::Error> {
        let from = require_point(args.from, CMD_LOCATE, ARG_FROM)?;
        let to = require_point(args.to, CMD_LOCATE, ARG_TO)?;
        let remaining = args.remaining.ok_or(CliError::MissingArgument {
            command: CMD_LOCATE,
            field: ARG_REMAINING,
        })?;
        Ok(Self {
            from,
            to,
            remaining,
            backend: backend_options!(args).into_client_config(),
        })
    }
}

impl LocateConfig {
    pub(crate) fn run(self, factory: &dyn ClientFactory) -> Result<Output, CliError> {
        let client = Arc::new(factory.build(self.backend)?);
        let interpolator = TrajectoryInterpolator::new(client);
        let position = block_on(interpolator.interpolate(self.from, self.to, self.remaining))?;
        Ok(Output::Position(position))
    }
}
