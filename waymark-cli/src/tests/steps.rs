//! Behaviour-driven step definitions driving the Waymark CLI end to end.

use super::helpers::{Workspace, bundled_boundary};
use super::*;
use crate::boundary::DefaultLoaderFactory;
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use std::cell::RefCell;

/// Scenario state: the flags a `Given` contributes and what the run produced.
struct CliWorld {
    workspace: Workspace,
    source_flags: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl CliWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            source_flags: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn use_flag(&self, flag: &str, value: Utf8PathBuf) {
        self.source_flags
            .borrow_mut()
            .extend([format!("--{flag}"), value.into_string()]);
    }

    fn output(&self) -> Value {
        serde_json::from_slice(&self.stdout.borrow()).expect("command printed JSON")
    }

    fn field(&self, name: &str) -> Value {
        self.output()
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("output should contain {name}"))
    }

    fn entries(&self, name: &str) -> Vec<Value> {
        match self.field(name) {
            Value::Array(entries) => entries,
            other => panic!("{name} should be an array, found {other}"),
        }
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("command ran")
                .as_ref()
                .expect_err("command should fail")
        })
    }
}

#[fixture]
fn world() -> CliWorld {
    CliWorld::new()
}

#[given("the bundled boundary file")]
fn bundled_boundary_file(#[from(world)] world: &CliWorld) {
    world.use_flag(ARG_BOUNDARY_FILE, bundled_boundary());
}

#[given("a places file with three visited places")]
fn sample_places_file(#[from(world)] world: &CliWorld) {
    let path = world.workspace.sample_places_file();
    world.use_flag(ARG_PLACES, path);
}

#[given("a missing places file")]
fn missing_places_file(#[from(world)] world: &CliWorld) {
    let path = world.workspace.path("missing.json");
    world.use_flag(ARG_PLACES, path);
}

impl CliWorld {
    fn run(&self, args: &[&str]) {
        let mut argv = vec!["waymark".to_owned()];
        argv.extend(args.iter().map(|arg| (*arg).to_owned()));
        argv.extend(self.source_flags.borrow().iter().cloned());
        let mut stdout = Vec::new();
        let outcome = Cli::try_parse_from(argv)
            .map_err(CliError::ArgumentParsing)
            .and_then(|cli| run_with(cli, &DefaultLoaderFactory, &mut stdout));
        self.stdout.replace(stdout);
        self.result.replace(Some(outcome));
    }
}

#[when("I check Kyiv")]
fn check_kyiv(#[from(world)] world: &CliWorld) {
    world.run(&["check", "--lat", "50.4501", "--lng", "30.5234"]);
}

#[when("I check Warsaw")]
fn check_warsaw(#[from(world)] world: &CliWorld) {
    world.run(&["check", "--lat", "52.2297", "--lng", "21.0122"]);
}

#[when("I check a point without a latitude")]
fn check_without_lat(#[from(world)] world: &CliWorld) {
    world.run(&["check", "--lng", "30.5234"]);
}

#[when("I request visit statistics")]
fn request_stats(#[from(world)] world: &CliWorld) {
    world.run(&["stats"]);
}

#[when("I request the viewport at zoom 4")]
fn request_country_viewport(#[from(world)] world: &CliWorld) {
    world.run(&["viewport", "--zoom", "4"]);
}

#[when("I request the Kyiv viewport at zoom 8")]
fn request_detail_viewport(#[from(world)] world: &CliWorld) {
    world.run(&["viewport", "--bbox", "30,50,31,51", "--zoom", "8"]);
}

#[when("I request contours at resolution 60")]
fn request_contours(#[from(world)] world: &CliWorld) {
    world.run(&["contours", "--resolution", "60"]);
}

#[then("the command succeeds")]
fn command_succeeds(#[from(world)] world: &CliWorld) {
    let result = world.result.borrow();
    if let Some(Err(err)) = result.as_ref() {
        panic!("command failed: {err}");
    }
    assert!(result.is_some(), "command should have run");
}

#[then("the point is reported inside")]
fn reported_inside(#[from(world)] world: &CliWorld) {
    assert_eq!(world.field("inside"), Value::Bool(true));
}

#[then("the point is reported outside")]
fn reported_outside(#[from(world)] world: &CliWorld) {
    assert_eq!(world.field("inside"), Value::Bool(false));
}

#[then("the statistics count 4 visits across 3 regions")]
fn stats_counts(#[from(world)] world: &CliWorld) {
    assert_eq!(world.field("totalVisits"), Value::from(4));
    assert_eq!(world.entries("regions").len(), 3);
}

#[then("the viewport is in country mode with 3 regions")]
fn country_viewport(#[from(world)] world: &CliWorld) {
    assert_eq!(world.field("mode"), Value::from("country"));
    assert_eq!(world.entries("regions").len(), 3);
    assert_eq!(world.entries("places").len(), 3);
}

#[then("the viewport is in detail mode with only maidan")]
fn detail_viewport(#[from(world)] world: &CliWorld) {
    assert_eq!(world.field("mode"), Value::from("detail"));
    let places = world.entries("places");
    let ids: Vec<_> = places.iter().filter_map(|place| place.get("id")).collect();
    assert_eq!(ids, [&Value::from("maidan")]);
    assert!(world.output().get("regions").is_none());
}

#[then("contour segments are printed")]
fn contours_printed(#[from(world)] world: &CliWorld) {
    assert!(!world.entries("segments").is_empty());
    assert!(world.field("bounds").is_object());
}

#[then("the command reports that the \"lat\" flag is missing")]
fn reports_missing_lat(#[from(world)] world: &CliWorld) {
    let error = world.error();
    assert!(
        matches!(&*error, CliError::MissingArgument { field, .. } if *field == ARG_LAT),
        "unexpected error: {error:?}",
    );
}

#[then("the command reports that the places file is missing")]
fn reports_missing_places(#[from(world)] world: &CliWorld) {
    let error = world.error();
    assert!(
        matches!(&*error, CliError::MissingSourceFile { field, .. } if *field == ARG_PLACES),
        "unexpected error: {error:?}",
    );
}

macro_rules! register_cli_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/cli.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: CliWorld) {
            let _ = world;
        }
    };
}

register_cli_scenario!(check_inside, "checking a point inside the bundled boundary");
register_cli_scenario!(check_outside, "checking a point outside the bundled boundary");
register_cli_scenario!(check_missing_lat, "checking without a latitude");
register_cli_scenario!(stats_summary, "summarising visit statistics");
register_cli_scenario!(viewport_country, "zoomed-out viewports summarise regions");
register_cli_scenario!(viewport_detail, "zoomed-in viewports filter by bounding box");
register_cli_scenario!(contours_output, "extracting metaball contours");
register_cli_scenario!(stats_missing_file, "summarising a missing places file");
