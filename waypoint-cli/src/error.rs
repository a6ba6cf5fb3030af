//! Error types emitted by the Waypoint CLI.
//!
//! Keep this error type reasonably small, as every command returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use waypoint_core::RoutingError;
use waypoint_data::ClientBuildError;

/// Errors emitted by the Waypoint CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {})", env_var(.command, .field))]
    MissingArgument {
        command: &'static str,
        field: &'static str,
    },
    /// A point option is not a `lat,lon` pair.
    #[error("{field} must be a `lat,lon` pair, got {value:?}")]
    InvalidPoint { field: &'static str, value: String },
    /// Opening the points file failed.
    #[error("failed to open points file at {path:?}: {source}")]
    OpenPoints {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The points file is not a JSON array of `{lat, lon}` objects.
    #[error("failed to parse points JSON at {path:?}: {source}")]
    ParsePoints {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The routing client could not be constructed.
    #[error("failed to build routing client: {0}")]
    BuildClient(#[from] ClientBuildError),
    /// The async runtime driving the request could not be started.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The routing query failed.
    #[error("routing query failed: {0}")]
    Routing(#[from] RoutingError),
    /// Serializing the command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing the command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

/// Environment variable that supplies `field` for `command`.
pub(crate) fn env_var(command: &str, field: &str) -> String {
    format!(
        "WAYPOINT_CMDS_{}_{}",
        command.replace('-', "_").to_uppercase(),
        field.replace('-', "_").to_uppercase()
    )
}
