//! `check` and `bounds` commands backed by the country boundary loader.

use std::io::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use waymark_core::BoundingBox;
use waymark_data::PolygonSource;
use waymark_data::boundary::{DEFAULT_LOCAL_PATHS, PolygonSourceConfig};

use crate::{
    ARG_BOUNDARY_FILE, ARG_LAT, ARG_LNG, ARG_REMOTE_URL, ARG_TIMEOUT_SECS, CliError,
    ENV_CHECK_LAT, ENV_CHECK_LNG, write_json,
};

/// Builds the boundary loader for a command invocation.
pub(crate) trait LoaderFactory {
    fn build(&self, config: &PolygonSourceConfig) -> Result<PolygonSource, CliError>;
}

pub(crate) struct DefaultLoaderFactory;

impl LoaderFactory for DefaultLoaderFactory {
    fn build(&self, config: &PolygonSourceConfig) -> Result<PolygonSource, CliError> {
        Ok(PolygonSource::from_config(config)?)
    }
}

/// CLI arguments for the `check` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load the country boundary (remote GeoJSON first, then the \
                 bundled file) and test whether the point lies inside it.",
    about = "Check whether a point lies inside the country boundary"
)]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct CheckArgs {
    /// Latitude in degrees.
    #[arg(long = ARG_LAT, value_name = "deg", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude in degrees.
    #[arg(long = ARG_LNG, value_name = "deg", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lng: Option<f64>,
    /// Local GeoJSON boundary file; disables remote sources unless
    /// --remote-url is also given.
    #[arg(long = ARG_BOUNDARY_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) boundary_file: Option<Utf8PathBuf>,
    /// Comma-separated remote GeoJSON URLs, tried in order.
    #[arg(long = ARG_REMOTE_URL, value_name = "urls")]
    #[serde(default)]
    pub(crate) remote_url: Option<String>,
    /// Per-source timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl CheckArgs {
    pub(crate) fn into_config(self) -> Result<CheckConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CheckConfig::try_from(merged)
    }
}

/// CLI arguments for the `bounds` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print the bounding box of the country boundary")]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct BoundsArgs {
    /// Local GeoJSON boundary file; disables remote sources unless
    /// --remote-url is also given.
    #[arg(long = ARG_BOUNDARY_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) boundary_file: Option<Utf8PathBuf>,
    /// Comma-separated remote GeoJSON URLs, tried in order.
    #[arg(long = ARG_REMOTE_URL, value_name = "urls")]
    #[serde(default)]
    pub(crate) remote_url: Option<String>,
    /// Per-source timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl BoundsArgs {
    pub(crate) fn into_config(self) -> Result<PolygonSourceConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(source_config(
            merged.boundary_file.as_deref(),
            merged.remote_url.as_deref(),
            merged.timeout_secs,
        ))
    }
}

/// Resolved `check` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CheckConfig {
    pub(crate) lat: f64,
    pub(crate) lng: f64,
    pub(crate) sources: PolygonSourceConfig,
}

impl TryFrom<CheckArgs> for CheckConfig {
    type Error = CliError;

    fn try_from(args: CheckArgs) -> Result<Self, Self::Error> {
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_CHECK_LAT,
        })?;
        let lng = args.lng.ok_or(CliError::MissingArgument {
            field: ARG_LNG,
            env: ENV_CHECK_LNG,
        })?;
        let sources = source_config(
            args.boundary_file.as_deref(),
            args.remote_url.as_deref(),
            args.timeout_secs,
        );
        Ok(Self { lat, lng, sources })
    }
}

/// Translate the shared boundary options into loader configuration.
///
/// Without options the production sources are used. An explicit boundary
/// file replaces the bundled paths; explicit remote URLs replace the
/// default remotes. A boundary file alone means no remote sources.
pub(crate) fn source_config(
    boundary_file: Option<&Utf8Path>,
    remote_url: Option<&str>,
    timeout_secs: Option<u64>,
) -> PolygonSourceConfig {
    let remotes: Vec<&str> = remote_url
        .into_iter()
        .flat_map(|raw| raw.split(','))
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .collect();

    let mut config = if remotes.is_empty() && boundary_file.is_none() {
        PolygonSourceConfig::default()
    } else {
        let with_remotes = remotes
            .into_iter()
            .fold(PolygonSourceConfig::new(), PolygonSourceConfig::with_remote_url);
        match boundary_file {
            Some(path) => with_remotes.with_local_path(path),
            None => DEFAULT_LOCAL_PATHS
                .into_iter()
                .fold(with_remotes, PolygonSourceConfig::with_local_path),
        }
    };
    if let Some(secs) = timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    config
}

fn runtime() -> Result<Runtime, CliError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CheckOutput {
    pub(crate) lat: f64,
    pub(crate) lng: f64,
    pub(crate) inside: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct BoundsOutput {
    pub(crate) name: String,
    pub(crate) bounds: BoundingBox,
}

pub(crate) fn run_check_with(
    args: CheckArgs,
    factory: &dyn LoaderFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let output = execute_check(&config, factory)?;
    write_json(writer, &output)
}

pub(crate) fn execute_check(
    config: &CheckConfig,
    factory: &dyn LoaderFactory,
) -> Result<CheckOutput, CliError> {
    let loader = factory.build(&config.sources)?;
    let inside = runtime()?.block_on(loader.contains(config.lat, config.lng))?;
    log::debug!("({}, {}) inside: {inside}", config.lat, config.lng);
    Ok(CheckOutput {
        lat: config.lat,
        lng: config.lng,
        inside,
    })
}

pub(crate) fn run_bounds_with(
    args: BoundsArgs,
    factory: &dyn LoaderFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let output = execute_bounds(&config, factory)?;
    write_json(writer, &output)
}

pub(crate) fn execute_bounds(
    config: &PolygonSourceConfig,
    factory: &dyn LoaderFactory,
) -> Result<BoundsOutput, CliError> {
    let loader = factory.build(config)?;
    let boundary = runtime()?.block_on(loader.load())?;
    Ok(BoundsOutput {
        name: boundary.name().to_owned(),
        bounds: boundary.bounds(),
    })
}
