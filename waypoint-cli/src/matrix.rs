//! Commands that read a list of points from disk: `matrix` and `cumulative`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use waypoint_core::{CostKind, TravelCostProvider};
use waypoint_data::{MatrixBuilder, MatrixBuilderConfig, RoutingClientConfig};
use waypoint_data::routing::TableRequest;

use crate::backend::backend_options;
use crate::input::load_points;
use crate::{
    ARG_FALLBACK_TIME, ARG_OSRM_BASE_URL, ARG_OSRM_HOST, ARG_OSRM_PORT, ARG_POINTS,
    ARG_TIMEOUT_SECS, CliError, ClientFactory, Output, block_on,
};

pub(crate) const CMD_MATRIX: &str = "matrix";
pub(crate) const CMD_CUMULATIVE: &str = "cumulative";

/// CLI arguments for the `matrix` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "matrix",
    long_about = "Build a travel time or distance matrix for every pair of \
                 points in a JSON file. Large inputs can be split into \
                 batches that are requested concurrently and merged.",
    about = "Build a travel cost matrix"
)]
#[ortho_config(prefix = "WAYPOINT")]
pub(crate) struct MatrixArgs {
    /// Path to a JSON array of `{"lat": .., "lon": ..}` objects.
    #[arg(long = ARG_POINTS, value_name = "path")]
    #[serde(default)]
    pub(crate) points: Option<Utf8PathBuf>,
    /// Report distances in meters instead of durations in seconds.
    #[arg(long)]
    #[serde(default)]
    pub(crate) distance: bool,
    /// Only compute the row for the point at this index.
    #[arg(long, value_name = "index")]
    #[serde(default)]
    pub(crate) source: Option<usize>,
    /// Points per batch; omit to send a single request.
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) batch_size: Option<usize>,
    /// Maximum concurrent block requests.
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) workers: Option<usize>,
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
    /// Seconds reported for a point-to-point query the backend cannot answer.
    #[arg(long = ARG_FALLBACK_TIME, value_name = "secs")]
    #[serde(default)]
    pub(crate) fallback_time: Option<u64>,
    /// Per-request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl MatrixArgs {
    pub(crate) fn into_config(self) -> Result<MatrixConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MatrixConfig::try_from(merged)
    }
}

/// Resolved `matrix` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct MatrixConfig {
    pub(crate) points: Utf8PathBuf,
    pub(crate) kind: CostKind,
    pub(crate) source: Option<usize>,
    pub(crate) builder: MatrixBuilderConfig,
    pub(crate) backend: RoutingClientConfig,
}

impl TryFrom<MatrixArgs> for MatrixConfig {
    type Error = CliError;

    fn try_from(args: MatrixArgs) -> Result<Self, Self::Error> {
        let points = args.points.ok_or(CliError::MissingArgument {
            command: CMD_MATRIX,
            field: ARG_POINTS,
        })?;
        let kind = if args.distance {
            CostKind::Distance
        } else {
            CostKind::Duration
        };
        let mut builder = MatrixBuilderConfig::default();
        if let Some(batch_size) = args.batch_size {
            builder = builder.with_batch_size(batch_size);
        }
        if let Some(workers) = args.workers {
            builder = builder.with_workers(workers);
        }
        Ok(Self {
            points,
            kind,
            source: args.source,
            builder,
            backend: backend_options!(args).into_client_config(),
        })
    }
}

impl MatrixConfig {
    pub(crate) fn run(self, factory: &dyn ClientFactory) -> Result<Output, CliError> {
        let points = load_points(&self.points)?;
        let client = Arc::new(factory.build(self.backend)?);
        let matrix = match self.source {
            Some(source) => {
                let request = TableRequest::new(&points, self.kind).with_sources([source]);
                block_on(client.table(&request))??
            }
            None => MatrixBuilder::new(client, self.builder).get_cost_matrix(&points, self.kind)?,
        };
        Ok(Output::Matrix(matrix))
    }
}

/// CLI arguments for the `cumulative` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "cumulative",
    about = "Running travel time along a sequence of stops"
)]
#[ortho_config(prefix = "WAYPOINT")]
pub(crate) struct CumulativeArgs {
    /// Path to a JSON array of `{"lat": .., "lon": ..}` objects, in visit order.
    #[arg(long = ARG_POINTS, value_name = "path")]
    #[serde(default)]
    pub(crate) points: Option<Utf8PathBuf>,
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
    /// Seconds reported for a leg the backend cannot answer.
    #[arg(long = ARG_FALLBACK_TIME, value_name = "secs")]
    #[serde(default)]
    pub(crate) fallback_time: Option<u64>,
    /// Per-request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl CumulativeArgs {
    pub(crate) fn into_config(self) -> Result<CumulativeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CumulativeConfig::try_from(merged)
    }
}

/// Resolved `cumulative` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct CumulativeConfig {
    pub(crate) points: Utf8PathBuf,
    pub(crate) backend: RoutingClientConfig,
}

impl TryFrom<CumulativeArgs> for CumulativeConfig {
    type Error = CliError;

    fn try_from(args: CumulativeArgs) -> Result<Self, Self::Error> {
        let points = args.points.ok_or(CliError::MissingArgument {
            command: CMD_CUMULATIVE,
            field: ARG_POINTS,
        })?;
        Ok(Self {
            points,
            backend: backend_options!(args).into_client_config(),
        })
    }
}

impl CumulativeConfig {
    pub(crate) fn run(self, factory: &dyn ClientFactory) -> Result<Output, CliError> {
        let points = load_points(&self.points)?;
        let client = factory.build(self.backend)?;
        let row = block_on(client.cumulative_travel_time_row(&points))??;
        Ok(Output::Row(row))
    }
}
