//! Facade crate for the Waymark travel tracker.
//!
//! This crate re-exports the geometry and aggregation core and exposes the
//! country boundary loader behind the `boundary-loader` feature.
//!
//! ```
//! use waymark::{Place, ViewMode, ViewportQuery};
//!
//! # fn main() -> Result<(), waymark::InvalidPoint> {
//! let places = vec![Place::new("maidan", "Maidan", 50.4501, 30.5234)?.with_region("Kyiv")];
//! let viewport = ViewportQuery::from_raw(Some("30,50,31,51"), 4.0).run(&places);
//! assert_eq!(viewport.mode, ViewMode::Country);
//! assert_eq!(viewport.places.len(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub use waymark_core::{
    Boundary, BoundingBox, ContourSegment, GridShape, InvalidPoint, MetaballLayer,
    MetaballSettings, Place, RegionSummary, Ring, ScalarField, SmoothFalloff, ViewMode, Viewport,
    ViewportQuery, Visit, VisitStats, WeightedPoint, accumulate, bounds_of, extract_contours,
    matches_filter, parse_bbox, render_metaballs, summarize, summarize_by_region,
};

#[cfg(feature = "boundary-loader")]
pub use waymark_data::{
    BoundaryUnavailable, GeofenceError, PolygonSource, PolygonSourceConfig, SourceError,
};
