//! Country boundary loading.
//!
//! [`PolygonSource`] owns an ordered list of [`BoundarySource`]s (remote
//! GeoJSON first, then bundled files) and caches the first boundary that
//! loads for the rest of the process.

mod config;
mod error;
mod geojson;
mod loader;
mod source;
#[doc(hidden)]
pub mod test_support;

pub use config::{
    DEFAULT_LOCAL_PATHS, DEFAULT_REMOTE_URLS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    PolygonSourceConfig,
};
pub use error::{BoundaryUnavailable, GeofenceError, SourceError, SourceFailure};
pub use geojson::{CountryMatcher, DEFAULT_ALIASES, NAME_PROPERTIES, Selection, parse_boundary};
pub use loader::PolygonSource;
pub use source::{BoundarySource, FileBoundarySource, HttpBoundarySource, build_client};
