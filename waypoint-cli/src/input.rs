//! Parsing of point options and point-list files.

use std::io::BufReader;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use waypoint_core::Point;

use crate::CliError;

/// Parse a `lat,lon` pair.
///
/// Surrounding whitespace is ignored on either side of the comma.
pub(crate) fn parse_point(field: &'static str, value: &str) -> Result<Point, CliError> {
    let invalid = || CliError::InvalidPoint {
        field,
        value: value.to_owned(),
    };
    let (lat, lon) = value.split_once(',').ok_or_else(invalid)?;
    let lat = lat.trim().parse::<f64>().map_err(|_| invalid())?;
    let lon = lon.trim().parse::<f64>().map_err(|_| invalid())?;
    Ok(Point::new(lat, lon))
}

/// Require a merged point option and parse it.
pub(crate) fn require_point(
    value: Option<String>,
    command: &'static str,
    field: &'static str,
) -> Result<Point, CliError> {
    let value = value.ok_or(CliError::MissingArgument { command, field })?;
    parse_point(field, &value)
}

/// Load a JSON array of `{lat, lon}` objects.
///
/// `null` coordinates load as `NaN` and are rejected later by the client.
pub(crate) fn load_points(path: &Utf8Path) -> Result<Vec<Point>, CliError> {
    let file = fs_utf8::File::open_ambient(path, ambient_authority()).map_err(|source| {
        CliError::OpenPoints {
            path: path.to_path_buf(),
            source,
        }
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParsePoints {
        path: path.to_path_buf(),
        source,
    })
}
