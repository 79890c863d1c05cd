//! Error types emitted by the Waymark CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use waymark_core::{FieldError, InvalidPoint};
use waymark_data::{BoundaryUnavailable, GeofenceError, SourceError};

/// Errors emitted by the Waymark CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the places file failed.
    #[error("failed to open places file at {path:?}: {source}")]
    OpenPlaces {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The places file is not a JSON array of places.
    #[error("failed to parse places JSON at {path:?}: {source}")]
    ParsePlaces {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A place carries coordinates that cannot be used.
    #[error("place {id:?} in {path:?} is invalid: {source}")]
    InvalidPlace {
        path: Utf8PathBuf,
        id: String,
        #[source]
        source: InvalidPoint,
    },
    /// Building the boundary loader failed.
    #[error("failed to configure boundary sources: {0}")]
    BuildLoader(#[from] SourceError),
    /// Building the async runtime failed.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The geofence query failed.
    #[error(transparent)]
    Geofence(#[from] GeofenceError),
    /// No boundary source succeeded.
    #[error(transparent)]
    BoundaryUnavailable(#[from] BoundaryUnavailable),
    /// Building the metaball field failed.
    #[error("failed to build contour field: {0}")]
    Field(#[from] FieldError),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
