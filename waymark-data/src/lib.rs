//! Data access for the Waymark travel tracker.
//!
//! Responsibilities:
//! - Load the country boundary from remote GeoJSON or bundled files.
//! - Cache the boundary once per process and answer geofence queries.
//!
//! Boundaries:
//! - Do not encode geometry rules (live in `waymark-core`).
//! - Keep blocking I/O off async executors.
//!
//! Invariants:
//! - At most one boundary load is in flight at a time.
//! - No global mutable state; the loader is an explicit value.

#![forbid(unsafe_code)]

pub mod boundary;

pub use boundary::{
    BoundarySource, BoundaryUnavailable, GeofenceError, PolygonSource, PolygonSourceConfig,
    SourceError,
};
