//! Focused unit tests covering argument resolution and input parsing.

use super::helpers::{StubClientFactory, Workspace, write_utf8};
use super::*;
use crate::backend::BackendOptions;
use crate::input::{load_points, parse_point};
use crate::matrix::{CumulativeConfig, MatrixConfig};
use crate::pairwise::{LocateConfig, RouteConfig, TravelTimeConfig};
use rstest::rstest;
use std::time::Duration;
use waypoint_core::{CostKind, DEFAULT_FALLBACK_SECS};
use waypoint_data::routing::test_support::StubTransport;

#[rstest]
#[case("35.05,-85.31", Point::new(35.05, -85.31))]
#[case(" 35.05 , -85.31 ", Point::new(35.05, -85.31))]
#[case("0,0", Point::new(0.0, 0.0))]
fn parses_lat_lon_pairs(#[case] value: &str, #[case] expected: Point) {
    assert_eq!(parse_point("from", value).expect("valid pair"), expected);
}

#[rstest]
#[case("35.05")]
#[case("north,west")]
#[case("")]
fn rejects_malformed_pairs(#[case] value: &str) {
    match parse_point("from", value).expect_err("malformed pair") {
        CliError::InvalidPoint { field, value: got } => {
            assert_eq!(field, "from");
            assert_eq!(got, value);
        }
        other => panic!("expected InvalidPoint, found {other:?}"),
    }
}

#[rstest]
fn loads_points_with_null_coordinates_as_nan() {
    let workspace = Workspace::new();
    let path = workspace.path("points.json");
    write_utf8(
        &path,
        br#"[{"lat": 35.0, "lon": -85.3}, {"lat": null, "lon": -85.2}]"#,
    );
    let points = load_points(&path).expect("points should load");
    assert_eq!(points.len(), 2);
    assert_eq!(points[0], Point::new(35.0, -85.3));
    assert!(points[1].lat.is_nan());
}

#[rstest]
fn missing_points_file_is_reported() {
    let workspace = Workspace::new();
    let err = load_points(&workspace.path("absent.json")).expect_err("file is absent");
    assert!(matches!(err, CliError::OpenPoints { .. }));
}

#[rstest]
fn base_url_wins_over_host_and_port() {
    let options = BackendOptions {
        osrm_base_url: Some("http://osrm.internal:9000".into()),
        osrm_host: Some("ignored".into()),
        osrm_port: Some(1),
        ..BackendOptions::default()
    };
    assert_eq!(
        options.into_client_config().base_url,
        "http://osrm.internal:9000"
    );
}

#[rstest]
#[case(Some("osrm"), Some(5001), "http://osrm:5001")]
#[case(Some("osrm"), None, "http://osrm:5000")]
#[case(None, Some(5001), "http://localhost:5001")]
#[case(None, None, "http://localhost:5000")]
fn host_and_port_build_base_url(
    #[case] host: Option<&str>,
    #[case] port: Option<u16>,
    #[case] expected: &str,
) {
    let options = BackendOptions {
        osrm_host: host.map(str::to_owned),
        osrm_port: port,
        ..BackendOptions::default()
    };
    assert_eq!(options.into_client_config().base_url, expected);
}

#[rstest]
fn fallback_and_timeout_overrides_apply() {
    let config = BackendOptions {
        fallback_time: Some(600),
        timeout_secs: Some(5),
        ..BackendOptions::default()
    }
    .into_client_config();
    assert_eq!(config.fallback.travel_time_secs, 600);
    assert_eq!(config.timeout, Duration::from_secs(5));

    let defaults = BackendOptions::default().into_client_config();
    assert_eq!(defaults.fallback.travel_time_secs, DEFAULT_FALLBACK_SECS);
}

#[rstest]
fn matrix_without_points_names_the_env_var() {
    let err = MatrixConfig::try_from(MatrixArgs::default()).expect_err("points are required");
    match &err {
        CliError::MissingArgument { command, field } => {
            assert_eq!((*command, *field), ("matrix", "points"));
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "missing points (set --points or WAYPOINT_CMDS_MATRIX_POINTS)"
    );
}

#[rstest]
fn cumulative_without_points_errors() {
    let err = CumulativeConfig::try_from(CumulativeArgs::default()).expect_err("required");
    assert!(matches!(
        err,
        CliError::MissingArgument {
            command: "cumulative",
            field: "points"
        }
    ));
}

#[rstest]
fn matrix_flags_resolve_into_builder_settings() {
    let args = MatrixArgs {
        points: Some("points.json".into()),
        distance: true,
        batch_size: Some(50),
        workers: Some(2),
        ..MatrixArgs::default()
    };
    let config = MatrixConfig::try_from(args).expect("config should build");
    assert_eq!(config.kind, CostKind::Distance);
    assert_eq!(config.builder.batch_size, Some(50));
    assert_eq!(config.builder.workers, 2);
    assert_eq!(config.source, None);
}

#[rstest]
#[case(None, Some("1,1"), "from")]
#[case(Some("0,0"), None, "to")]
fn travel_time_requires_both_points(
    #[case] from: Option<&str>,
    #[case] to: Option<&str>,
    #[case] missing: &str,
) {
    let args = TravelTimeArgs {
        from: from.map(str::to_owned),
        to: to.map(str::to_owned),
        ..TravelTimeArgs::default()
    };
    match TravelTimeConfig::try_from(args).expect_err("both points are required") {
        CliError::MissingArgument { command, field } => {
            assert_eq!(command, "travel-time");
            assert_eq!(field, missing);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn locate_requires_remaining_time() {
    let args = LocateArgs {
        from: Some("0,0".into()),
        to: Some("1,0".into()),
        ..LocateArgs::default()
    };
    let err = LocateConfig::try_from(args).expect_err("remaining is required");
    assert!(matches!(
        err,
        CliError::MissingArgument {
            field: "remaining",
            ..
        }
    ));
}

#[rstest]
fn route_degrades_to_target_when_unreachable() {
    let args = RouteArgs {
        from: Some("0,0".into()),
        to: Some("1,0".into()),
        ..RouteArgs::default()
    };
    let factory = StubClientFactory::new(StubTransport::unreachable());
    let output = RouteConfig::try_from(args)
        .expect("config should build")
        .run(&factory)
        .expect("route never fails on backend errors");
    assert_eq!(
        output,
        Output::Route(RouteDetails::arrived(Point::new(1.0, 0.0)))
    );
}

#[rstest]
fn output_is_pretty_json_with_trailing_newline() {
    let mut buffer = Vec::new();
    write_output(&mut buffer, &Output::Row(vec![0, 60])).expect("write should succeed");
    assert_eq!(
        String::from_utf8(buffer).expect("utf-8"),
        "[\n  0,\n  60\n]\n"
    );
}
