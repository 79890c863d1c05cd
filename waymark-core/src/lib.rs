//! Geometry and aggregation core for the Waymark travel tracker.
//!
//! Responsibilities:
//! - Validate visited places and their coordinates.
//! - Answer point-in-polygon queries against a country boundary.
//! - Derive bounding boxes and filter points by viewport.
//! - Accumulate weighted scalar fields and extract marching-squares contours.
//! - Group places into region, city and tag summaries.
//!
//! Boundaries:
//! - No I/O. Loading boundaries lives in `waymark-data`.
//!
//! Invariants:
//! - Coordinates are `lng/lat` throughout: [`geo::Coord`] `x` is longitude
//!   and `y` is latitude.
//! - Every function is deterministic for identical input.

#![forbid(unsafe_code)]

mod bbox;
mod bounds;
mod contour;
mod field;
mod place;
mod polygon;
mod stats;
mod style;
mod summary;
mod viewport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use bbox::{BBoxError, BoundingBox, matches_filter, parse_bbox};
pub use bounds::{NestedCoordinates, bounds_of, bounds_of_nested};
pub use contour::{ContourSegment, extract_contours};
pub use field::{
    FieldError, GridShape, Kernel, MAX_GRID_NODES, MIN_GRID_NODES, ScalarField, SmoothFalloff,
    WeightedPoint, accumulate,
};
pub use place::{
    DEFAULT_RATING, InvalidPoint, MAX_RATING, MIN_RATING, Place, Visit, validate_point,
};
pub use polygon::{
    Boundary, BoundaryPolygon, MIN_RING_VERTICES, Ring, RingError, ring_contains,
};
pub use stats::{MonthlyVisits, RegionShare, TOP_CITIES, TOP_TAGS, VisitStats, city_of};
pub use style::{
    HEATMAP_INTENSITY_RANGE, HEATMAP_MAX_VISITS, HEATMAP_RADIUS_RANGE, HEATMAP_ZOOM_RANGE,
    HeatmapPoint, METABALL_MIN_RADIUS_PX, METABALL_RESOLUTION, METABALL_THRESHOLD_FRACTION,
    MetaballLayer, MetaballSettings, heatmap_intensity, heatmap_points, heatmap_radius,
    heatmap_weight, metaball_points, metaball_radius_px, metaball_weight, render_metaballs,
};
pub use summary::{
    RegionSummarizer, RegionSummary, UNKNOWN_LABEL, percent_of_total, region_key, sort_by_weight,
    summarize, summarize_by_region, total_weight,
};
pub use viewport::{COUNTRY_ZOOM_THRESHOLD, ViewMode, Viewport, ViewportQuery};
