//! Error types for boundary loading.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use waymark_core::InvalidPoint;

/// Why a single boundary source failed.
///
/// Every variant is recoverable by the loader: it logs the failure and moves
/// on to the next configured source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {message}")]
    Client {
        /// Underlying error description.
        message: String,
    },
    /// The configured URL is not a valid absolute URL.
    #[error("invalid boundary URL {url:?}: {message}")]
    InvalidUrl {
        /// Offending URL text.
        url: String,
        /// Parser error description.
        message: String,
    },
    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Http {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },
    /// The attempt did not finish within its time budget.
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout {
        /// Requested URL or path.
        url: String,
        /// Configured timeout.
        timeout: Duration,
    },
    /// Connection or transfer failure.
    #[error("network error fetching {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Underlying error description.
        message: String,
    },
    /// The local file does not exist.
    #[error("boundary file {path} not found")]
    Missing {
        /// Path that was tried.
        path: String,
    },
    /// The local file exists but could not be read.
    #[error("failed to read boundary file {path}")]
    Io {
        /// Path that was tried.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The document is not GeoJSON this loader understands.
    #[error("failed to parse boundary document from {origin}: {message}")]
    Parse {
        /// URL or path the document came from.
        origin: String,
        /// Parser error description.
        message: String,
    },
    /// No feature matched the country aliases.
    #[error("no feature in {origin} matches the configured country")]
    NoMatchingFeature {
        /// URL or path the document came from.
        origin: String,
    },
    /// The selected feature has no usable polygon geometry.
    #[error("feature from {origin} has unusable geometry: {message}")]
    InvalidGeometry {
        /// URL or path the document came from.
        origin: String,
        /// What was wrong with the geometry.
        message: String,
    },
}

/// A failed attempt recorded by the loader.
#[derive(Debug)]
pub struct SourceFailure {
    /// Source description, e.g. a URL or path.
    pub origin: String,
    /// Why the source failed.
    pub error: SourceError,
}

/// Every configured boundary source failed.
///
/// Cheap to clone so concurrent callers sharing one load all receive it.
#[derive(Debug, Clone, Error)]
#[error("country boundary unavailable: {}", describe(.attempts))]
pub struct BoundaryUnavailable {
    attempts: Arc<[SourceFailure]>,
}

impl BoundaryUnavailable {
    /// Wrap the failures in the order the sources were tried.
    pub fn new(attempts: Vec<SourceFailure>) -> Self {
        Self {
            attempts: attempts.into(),
        }
    }

    /// Failures in the order the sources were tried.
    pub fn attempts(&self) -> &[SourceFailure] {
        &self.attempts
    }
}

fn describe(attempts: &[SourceFailure]) -> String {
    if attempts.is_empty() {
        return "no sources configured".to_owned();
    }
    attempts
        .iter()
        .map(|failure| format!("{}: {}", failure.origin, failure.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from geofence queries.
#[derive(Debug, Clone, Error)]
pub enum GeofenceError {
    /// The boundary could not be loaded.
    #[error(transparent)]
    Unavailable(#[from] BoundaryUnavailable),
    /// The queried coordinates were rejected before testing.
    #[error(transparent)]
    InvalidPoint(#[from] InvalidPoint),
}
