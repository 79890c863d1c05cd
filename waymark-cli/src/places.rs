//! `stats`, `viewport` and `contours` commands over a places JSON file.

use std::io::{BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use waymark_core::{
    BoundingBox, ContourSegment, METABALL_RESOLUTION, MetaballSettings, Place, ViewportQuery,
    VisitStats, bounds_of, parse_bbox, render_metaballs,
};
use waymark_fs::open_utf8_file;

use crate::{
    ARG_BBOX, ARG_PLACES, ARG_RESOLUTION, ARG_ZOOM, CliError, ENV_CONTOURS_PLACES,
    ENV_STATS_PLACES, ENV_VIEWPORT_PLACES, write_json,
};

/// Zoom used when none is given; the first zoom level of detail mode.
pub(crate) const DEFAULT_ZOOM: f64 = 6.0;

/// CLI arguments for the `stats` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Summarise visits by region, city, tag and month")]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct StatsArgs {
    /// Path to a JSON array of places.
    #[arg(long = ARG_PLACES, value_name = "path")]
    #[serde(default)]
    pub(crate) places: Option<Utf8PathBuf>,
}

/// CLI arguments for the `viewport` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Filter places to the visible extent. A missing or malformed \
                 bbox matches every place. Zoom levels below 6 add a \
                 per-region summary.",
    about = "Filter places by viewport and pick the rendering mode"
)]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct ViewportArgs {
    /// Path to a JSON array of places.
    #[arg(long = ARG_PLACES, value_name = "path")]
    #[serde(default)]
    pub(crate) places: Option<Utf8PathBuf>,
    /// Visible extent as `minLng,minLat,maxLng,maxLat`.
    #[arg(long = ARG_BBOX, value_name = "bbox", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) bbox: Option<String>,
    /// Map zoom level.
    #[arg(long = ARG_ZOOM, value_name = "zoom")]
    #[serde(default)]
    pub(crate) zoom: Option<f64>,
}

/// CLI arguments for the `contours` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Accumulate the metaball field for every place over the \
                 bbox (or the places' own extent) and print the iso-line \
                 segments at 30% of the field maximum.",
    about = "Extract metaball contour segments for places"
)]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct ContoursArgs {
    /// Path to a JSON array of places.
    #[arg(long = ARG_PLACES, value_name = "path")]
    #[serde(default)]
    pub(crate) places: Option<Utf8PathBuf>,
    /// Field extent as `minLng,minLat,maxLng,maxLat`.
    #[arg(long = ARG_BBOX, value_name = "bbox", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) bbox: Option<String>,
    /// Map zoom level.
    #[arg(long = ARG_ZOOM, value_name = "zoom")]
    #[serde(default)]
    pub(crate) zoom: Option<f64>,
    /// Grid columns; rows follow the extent's aspect ratio.
    #[arg(long = ARG_RESOLUTION, value_name = "cols")]
    #[serde(default)]
    pub(crate) resolution: Option<usize>,
}

/// Resolved `stats` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StatsConfig {
    pub(crate) places: Utf8PathBuf,
}

/// Resolved `viewport` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ViewportConfig {
    pub(crate) places: Utf8PathBuf,
    pub(crate) query: ViewportQuery,
}

/// Resolved `contours` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ContoursConfig {
    pub(crate) places: Utf8PathBuf,
    pub(crate) bbox: Option<BoundingBox>,
    pub(crate) settings: MetaballSettings,
}

impl TryFrom<StatsArgs> for StatsConfig {
    type Error = CliError;

    fn try_from(args: StatsArgs) -> Result<Self, Self::Error> {
        let places = require_places(args.places, ENV_STATS_PLACES)?;
        Ok(Self { places })
    }
}

impl TryFrom<ViewportArgs> for ViewportConfig {
    type Error = CliError;

    fn try_from(args: ViewportArgs) -> Result<Self, Self::Error> {
        let places = require_places(args.places, ENV_VIEWPORT_PLACES)?;
        let zoom = args.zoom.unwrap_or(DEFAULT_ZOOM);
        let query = ViewportQuery::from_raw(args.bbox.as_deref(), zoom);
        Ok(Self { places, query })
    }
}

impl TryFrom<ContoursArgs> for ContoursConfig {
    type Error = CliError;

    fn try_from(args: ContoursArgs) -> Result<Self, Self::Error> {
        let places = require_places(args.places, ENV_CONTOURS_PLACES)?;
        let settings = MetaballSettings::at_zoom(args.zoom.unwrap_or(DEFAULT_ZOOM))
            .with_resolution(args.resolution.unwrap_or(METABALL_RESOLUTION));
        Ok(Self {
            places,
            bbox: parse_bbox(args.bbox.as_deref()),
            settings,
        })
    }
}

fn require_places(places: Option<Utf8PathBuf>, env: &'static str) -> Result<Utf8PathBuf, CliError> {
    let path = places.ok_or(CliError::MissingArgument {
        field: ARG_PLACES,
        env,
    })?;
    require_existing(&path, ARG_PLACES)?;
    Ok(path)
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match waymark_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if waymark_fs::is_not_found(&source) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads a JSON array of [`Place`]s and validates every coordinate.
pub(crate) fn load_places(path: &Utf8Path) -> Result<Vec<Place>, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenPlaces {
        path: path.to_path_buf(),
        source,
    })?;
    let places: Vec<Place> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParsePlaces {
            path: path.to_path_buf(),
            source,
        })?;
    for place in &places {
        place.validate().map_err(|source| CliError::InvalidPlace {
            path: path.to_path_buf(),
            id: place.id.clone(),
            source,
        })?;
    }
    log::debug!("loaded {} places from {path}", places.len());
    Ok(places)
}

pub(crate) fn run_stats_with(args: StatsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = StatsConfig::try_from(merged)?;
    let places = load_places(&config.places)?;
    write_json(writer, &VisitStats::from_places(&places))
}

pub(crate) fn run_viewport_with(
    args: ViewportArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = ViewportConfig::try_from(merged)?;
    let places = load_places(&config.places)?;
    write_json(writer, &config.query.run(&places))
}

/// Output of the `contours` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ContoursOutput {
    /// Extent the field covered; absent when there was nothing to cover.
    pub(crate) bounds: Option<BoundingBox>,
    pub(crate) threshold: f64,
    pub(crate) segments: Vec<ContourSegment>,
}

pub(crate) fn run_contours_with(
    args: ContoursArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = ContoursConfig::try_from(merged)?;
    let places = load_places(&config.places)?;
    write_json(writer, &execute_contours(&config, &places)?)
}

pub(crate) fn execute_contours(
    config: &ContoursConfig,
    places: &[Place],
) -> Result<ContoursOutput, CliError> {
    let Some(bounds) = config
        .bbox
        .or_else(|| bounds_of(places.iter().map(Place::location)))
    else {
        return Ok(ContoursOutput {
            bounds: None,
            threshold: 0.0,
            segments: Vec::new(),
        });
    };
    let layer = render_metaballs(places, bounds, config.settings)?;
    Ok(ContoursOutput {
        bounds: Some(bounds),
        threshold: layer.threshold,
        segments: layer.segments,
    })
}
