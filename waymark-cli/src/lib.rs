//! Command-line interface for Waymark's geofence and aggregation tooling.
#![forbid(unsafe_code)]

mod boundary;
mod error;
mod places;

use clap::{Parser, Subcommand};
use std::io::Write;

use boundary::{BoundsArgs, CheckArgs, DefaultLoaderFactory, LoaderFactory};
pub use error::CliError;
use places::{ContoursArgs, StatsArgs, ViewportArgs};

pub(crate) const ARG_LAT: &str = "lat";
pub(crate) const ARG_LNG: &str = "lng";
pub(crate) const ARG_BOUNDARY_FILE: &str = "boundary-file";
pub(crate) const ARG_REMOTE_URL: &str = "remote-url";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ARG_PLACES: &str = "places";
pub(crate) const ARG_BBOX: &str = "bbox";
pub(crate) const ARG_ZOOM: &str = "zoom";
pub(crate) const ARG_RESOLUTION: &str = "resolution";
pub(crate) const ENV_CHECK_LAT: &str = "WAYMARK_CMDS_CHECK_LAT";
pub(crate) const ENV_CHECK_LNG: &str = "WAYMARK_CMDS_CHECK_LNG";
pub(crate) const ENV_STATS_PLACES: &str = "WAYMARK_CMDS_STATS_PLACES";
pub(crate) const ENV_VIEWPORT_PLACES: &str = "WAYMARK_CMDS_VIEWPORT_PLACES";
pub(crate) const ENV_CONTOURS_PLACES: &str = "WAYMARK_CMDS_CONTOURS_PLACES";

/// Run the Waymark CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_with(cli, &DefaultLoaderFactory, &mut stdout)
}

fn run_with(
    cli: Cli,
    factory: &dyn LoaderFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    match cli.command {
        Command::Check(args) => boundary::run_check_with(args, factory, writer),
        Command::Bounds(args) => boundary::run_bounds_with(args, factory, writer),
        Command::Stats(args) => places::run_stats_with(args, writer),
        Command::Viewport(args) => places::run_viewport_with(args, writer),
        Command::Contours(args) => places::run_contours_with(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "waymark",
    about = "Geofence, statistics and contour tooling for visited places",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check whether a point lies inside the country boundary.
    Check(CheckArgs),
    /// Print the bounding box of the country boundary.
    Bounds(BoundsArgs),
    /// Summarise visits by region, city, tag and month.
    Stats(StatsArgs),
    /// Filter places by viewport and pick the rendering mode.
    Viewport(ViewportArgs),
    /// Extract metaball contour segments for places.
    Contours(ContoursArgs),
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: serde::Serialize>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
