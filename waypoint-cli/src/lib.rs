//! Command-line interface for querying an OSRM routing backend.
//!
//! Every subcommand prints a single JSON value to stdout. Backend options
//! can come from CLI flags, configuration files, or `WAYPOINT_CMDS_*`
//! environment variables.
#![forbid(unsafe_code)]

use std::future::Future;
use std::io::Write;

use clap::{Parser, Subcommand};
use serde::Serialize;
use waypoint_core::{CostMatrix, Point, RouteDetails};
use waypoint_data::{OsrmRoutingClient, RoutingClientConfig};

mod backend;
mod error;
mod input;
mod matrix;
mod pairwise;

pub use error::CliError;

use matrix::{CumulativeArgs, MatrixArgs};
use pairwise::{GeocodeArgs, LocateArgs, RouteArgs, TravelTimeArgs};

const ARG_POINTS: &str = "points";
const ARG_FROM: &str = "from";
const ARG_TO: &str = "to";
const ARG_AT: &str = "at";
const ARG_REMAINING: &str = "remaining";
const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
const ARG_OSRM_HOST: &str = "osrm-host";
const ARG_OSRM_PORT: &str = "osrm-port";
const ARG_FALLBACK_TIME: &str = "fallback-time";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";

/// Run the Waypoint CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_with(cli, &HttpClientFactory, &mut stdout)
}

fn run_with(
    cli: Cli,
    factory: &dyn ClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let output = match cli.command {
        Command::Matrix(args) => args.into_config()?.run(factory)?,
        Command::TravelTime(args) => args.into_config()?.run(factory)?,
        Command::Cumulative(args) => args.into_config()?.run(factory)?,
        Command::Geocode(args) => args.into_config()?.run(factory)?,
        Command::Route(args) => args.into_config()?.run(factory)?,
        Command::Locate(args) => args.into_config()?.run(factory)?,
    };
    write_output(writer, &output)
}

#[derive(Debug, Parser)]
#[command(
    name = "waypoint",
    about = "Travel costs, routes and vehicle positions from an OSRM server",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a travel time or distance matrix for a list of points.
    Matrix(MatrixArgs),
    /// Travel time or distance between two points.
    TravelTime(TravelTimeArgs),
    /// Running travel time along a sequence of stops.
    Cumulative(CumulativeArgs),
    /// Name of the street nearest to a point.
    Geocode(GeocodeArgs),
    /// Route polyline, distance and duration between two points.
    Route(RouteArgs),
    /// Estimate a vehicle's position along its current leg.
    Locate(LocateArgs),
}

/// Builds the routing client a command talks to.
trait ClientFactory {
    fn build(&self, config: RoutingClientConfig) -> Result<OsrmRoutingClient, CliError>;
}

struct HttpClientFactory;

impl ClientFactory for HttpClientFactory {
    fn build(&self, config: RoutingClientConfig) -> Result<OsrmRoutingClient, CliError> {
        Ok(OsrmRoutingClient::new(config)?)
    }
}

/// The JSON value a command prints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
enum Output {
    Matrix(CostMatrix),
    Cost(u64),
    Row(Vec<u64>),
    Address(String),
    Route(RouteDetails),
    Position(Point),
}

/// Drive `future` to completion on a current-thread runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    Ok(runtime.block_on(future))
}

fn write_output(writer: &mut dyn Write, output: &Output) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(output).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
