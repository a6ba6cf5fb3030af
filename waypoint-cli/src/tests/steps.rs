//! Behaviour-driven step definitions driving the CLI scenarios.

use super::helpers::{StubClientFactory, Workspace, write_utf8};
use super::*;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use waypoint_data::routing::test_support::StubTransport;

#[derive(Debug)]
struct CliWorld {
    workspace: Workspace,
    factory: RefCell<Option<StubClientFactory>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl CliWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            factory: RefCell::new(None),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn points_path(&self) -> String {
        self.workspace.path("points.json").into_string()
    }

    fn invoke(&self, args: &[&str]) {
        let argv = std::iter::once("waypoint").chain(args.iter().copied());
        let factory = self
            .factory
            .borrow()
            .clone()
            .expect("a routing backend should be configured");
        let mut buffer = self.stdout.borrow_mut();
        let outcome = Cli::try_parse_from(argv)
            .map_err(CliError::from)
            .and_then(|cli| run_with(cli, &factory, &mut *buffer));
        self.result.replace(Some(outcome));
    }

    fn printed<T: serde::de::DeserializeOwned>(&self) -> T {
        let borrowed = self.result.borrow();
        borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect("expected success");
        let stdout = String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8");
        serde_json::from_str(&stdout).expect("output should be JSON")
    }

    fn error<R>(&self, check: impl FnOnce(&CliError) -> R) -> R {
        let borrowed = self.result.borrow();
        let error = borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error");
        check(error)
    }
}

#[fixture]
fn world() -> CliWorld {
    CliWorld::new()
}

#[given("a routing backend on a flat plane")]
fn planar_backend(#[from(world)] world: &CliWorld) {
    world
        .factory
        .replace(Some(StubClientFactory::new(StubTransport::planar())));
}

#[given("an unreachable routing backend")]
fn unreachable_backend(#[from(world)] world: &CliWorld) {
    world
        .factory
        .replace(Some(StubClientFactory::new(StubTransport::unreachable())));
}

#[given("a points file with three stops")]
fn three_stops(#[from(world)] world: &CliWorld) {
    write_utf8(
        &world.workspace.path("points.json"),
        br#"[{"lat": 0.0, "lon": 0.0}, {"lat": 1.0, "lon": 0.0}, {"lat": 3.0, "lon": 0.0}]"#,
    );
}

#[given("a points file containing invalid JSON")]
fn invalid_points(#[from(world)] world: &CliWorld) {
    write_utf8(&world.workspace.path("points.json"), b"[{ not valid json");
}

#[when("I run the matrix command over the points file")]
fn run_matrix(#[from(world)] world: &CliWorld) {
    let path = world.points_path();
    world.invoke(&["matrix", "--points", &path]);
}

#[when("I run the matrix command over the points file in batches of two")]
fn run_batched_matrix(#[from(world)] world: &CliWorld) {
    let path = world.points_path();
    world.invoke(&["matrix", "--points", &path, "--batch-size", "2"]);
}

#[when("I run the cumulative command over the points file")]
fn run_cumulative(#[from(world)] world: &CliWorld) {
    let path = world.points_path();
    world.invoke(&["cumulative", "--points", &path]);
}

#[when("I run the matrix command without a points file")]
fn run_matrix_without_points(#[from(world)] world: &CliWorld) {
    world.invoke(&["matrix"]);
}

#[when("I ask for the travel time with a fallback of 1234 seconds")]
fn run_travel_time(#[from(world)] world: &CliWorld) {
    world.invoke(&[
        "travel-time",
        "--from",
        "35.05,-85.31",
        "--to",
        "35.1,-85.2",
        "--fallback-time",
        "1234",
    ]);
}

#[when("I locate a vehicle with a quarter of its leg remaining")]
fn run_locate(#[from(world)] world: &CliWorld) {
    world.invoke(&["locate", "--from", "0,0", "--to", "4,0", "--remaining", "1000"]);
}

#[then("the command prints the planar travel time matrix")]
fn prints_planar_matrix(#[from(world)] world: &CliWorld) {
    let matrix: Vec<Vec<u64>> = world.printed();
    assert_eq!(
        matrix,
        vec![
            vec![0, 1_000, 3_000],
            vec![1_000, 0, 2_000],
            vec![3_000, 2_000, 0],
        ]
    );
}

#[then("the command prints the running total of each leg")]
fn prints_running_total(#[from(world)] world: &CliWorld) {
    let row: Vec<u64> = world.printed();
    assert_eq!(row, vec![0, 1_000, 3_000]);
}

#[then("the command prints 1234")]
fn prints_fallback(#[from(world)] world: &CliWorld) {
    let seconds: u64 = world.printed();
    assert_eq!(seconds, 1234);
}

#[then("the command prints a position three quarters along the leg")]
fn prints_position(#[from(world)] world: &CliWorld) {
    let position: Point = world.printed();
    assert!((position.lat - 3.0).abs() < 1e-9, "lat was {}", position.lat);
    assert!(position.lon.abs() < 1e-9, "lon was {}", position.lon);
}

#[then("the command fails because the points option is missing")]
fn fails_missing_points(#[from(world)] world: &CliWorld) {
    world.error(|error| match error {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_POINTS),
        other => panic!("expected MissingArgument, found {other:?}"),
    });
}

#[then("the command fails because the points JSON is invalid")]
fn fails_invalid_json(#[from(world)] world: &CliWorld) {
    world.error(|error| match error {
        CliError::ParsePoints { .. } => {}
        other => panic!("expected ParsePoints, found {other:?}"),
    });
}

macro_rules! register_cli_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/cli_commands.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: CliWorld) {
            let _ = world;
        }
    };
}

register_cli_scenario!(matrix_command, "printing a travel time matrix");
register_cli_scenario!(batched_matrix_command, "printing a batched travel time matrix");
register_cli_scenario!(cumulative_command, "printing a cumulative travel time row");
register_cli_scenario!(travel_time_fallback, "falling back to a configured travel time");
register_cli_scenario!(locate_command, "locating a vehicle partway along its leg");
register_cli_scenario!(missing_points_option, "rejecting a missing points file option");
register_cli_scenario!(invalid_points_json, "rejecting malformed points JSON");
