//! Heatmap and metaball styling derived from visit counts and zoom.
//!
//! Heatmap parameters are piecewise-linear ramps clamped at both ends.
//! Metaballs feed a [`ScalarField`] whose per-point radius grows with zoom
//! and visit weight, then contour it at a fraction of the field maximum.

use serde::Serialize;

use crate::{
    BoundingBox, ContourSegment, FieldError, GridShape, Place, ScalarField, SmoothFalloff,
    WeightedPoint, accumulate, extract_contours,
};

/// Visit count at which the heatmap weight saturates.
pub const HEATMAP_MAX_VISITS: f64 = 12.0;
/// Zoom range over which heatmap radius and intensity ramp.
pub const HEATMAP_ZOOM_RANGE: (f64, f64) = (4.0, 9.0);
/// Heatmap radius in pixels at either end of the zoom range.
pub const HEATMAP_RADIUS_RANGE: (f64, f64) = (18.0, 42.0);
/// Heatmap intensity at either end of the zoom range.
pub const HEATMAP_INTENSITY_RANGE: (f64, f64) = (0.6, 1.2);

/// Smallest metaball radius in pixels.
pub const METABALL_MIN_RADIUS_PX: f64 = 40.0;
/// Fraction of the field maximum used as the iso-level.
pub const METABALL_THRESHOLD_FRACTION: f64 = 0.3;
/// Default grid columns for metaball fields.
pub const METABALL_RESOLUTION: usize = 120;
/// Padding in degrees applied to zero-area bounds.
const DEGENERATE_PADDING: f64 = 0.5;

/// Linear map of `value` from `input` onto `output`, clamped to `output`.
fn ramp(value: f64, input: (f64, f64), output: (f64, f64)) -> f64 {
    let (in_lo, in_hi) = input;
    let (out_lo, out_hi) = output;
    let t = ((value - in_lo) / (in_hi - in_lo)).clamp(0.0, 1.0);
    if t.is_nan() {
        return out_lo;
    }
    out_lo + t * (out_hi - out_lo)
}

/// Heatmap weight in `0..=1` for a visit count.
pub fn heatmap_weight(visits: u32) -> f64 {
    ramp(f64::from(visits), (0.0, HEATMAP_MAX_VISITS), (0.0, 1.0))
}

/// Heatmap radius in pixels for a zoom level.
pub fn heatmap_radius(zoom: f64) -> f64 {
    ramp(zoom, HEATMAP_ZOOM_RANGE, HEATMAP_RADIUS_RANGE)
}

/// Heatmap intensity for a zoom level.
pub fn heatmap_intensity(zoom: f64) -> f64 {
    ramp(zoom, HEATMAP_ZOOM_RANGE, HEATMAP_INTENSITY_RANGE)
}

/// A weighted heatmap sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatmapPoint {
    /// Longitude.
    pub lng: f64,
    /// Latitude.
    pub lat: f64,
    /// Weight in `0..=1`.
    pub weight: f64,
}

/// Heatmap samples for the given places, in input order.
pub fn heatmap_points(places: &[Place]) -> Vec<HeatmapPoint> {
    places
        .iter()
        .map(|place| HeatmapPoint {
            lng: place.lng,
            lat: place.lat,
            weight: heatmap_weight(place.visits_count),
        })
        .collect()
}

/// Logarithmic metaball weight of a place.
///
/// Uses the visit counter, else the number of recorded visits, else one.
pub fn metaball_weight(place: &Place) -> f64 {
    let visits = if place.visits_count > 0 {
        f64::from(place.visits_count)
    } else if place.visits.is_empty() {
        1.0
    } else {
        place.visits.len() as f64
    };
    visits.ln_1p()
}

/// Metaball radius in pixels for a zoom level and weight.
pub fn metaball_radius_px(zoom: f64, weight: f64) -> f64 {
    METABALL_MIN_RADIUS_PX.max(zoom * 6.0 + weight * 12.0)
}

/// Metaball rendering settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetaballSettings {
    /// Map zoom level.
    pub zoom: f64,
    /// Grid columns; rows follow the bounds' aspect ratio.
    pub resolution: usize,
    /// Width in pixels of the canvas the bounds are drawn onto.
    pub canvas_width_px: f64,
    /// Iso-level as a fraction of the field maximum.
    pub threshold_fraction: f64,
}

impl Default for MetaballSettings {
    fn default() -> Self {
        Self {
            zoom: 6.0,
            resolution: METABALL_RESOLUTION,
            canvas_width_px: 1024.0,
            threshold_fraction: METABALL_THRESHOLD_FRACTION,
        }
    }
}

impl MetaballSettings {
    /// Settings at `zoom` with default resolution and canvas.
    pub fn at_zoom(zoom: f64) -> Self {
        Self {
            zoom,
            ..Self::default()
        }
    }

    /// Override the grid columns.
    #[must_use]
    pub const fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }
}

/// Field and iso-lines for the metaball layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaballLayer {
    /// Accumulated field.
    #[serde(skip)]
    pub field: ScalarField,
    /// Iso-level used for extraction.
    pub threshold: f64,
    /// Extracted segments.
    pub segments: Vec<ContourSegment>,
}

/// Weighted points for the metaball field.
///
/// Each point's radius multiplier is its pixel radius over
/// [`METABALL_MIN_RADIUS_PX`], so the field's base radius is the minimum.
pub fn metaball_points(places: &[Place], zoom: f64) -> Vec<WeightedPoint> {
    places
        .iter()
        .map(|place| {
            let weight = metaball_weight(place);
            let scale = metaball_radius_px(zoom, weight) / METABALL_MIN_RADIUS_PX;
            WeightedPoint::new(place.location(), weight).with_radius_scale(scale)
        })
        .collect()
}

/// Build the metaball field over `bounds` and contour it.
///
/// Zero-area bounds are padded so a single place still renders. No places
/// give a blank field and no segments.
///
/// # Examples
/// ```
/// use waymark_core::{BoundingBox, MetaballSettings, Place, render_metaballs};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let places = [Place::new("a", "Maidan", 50.4501, 30.5234)?.with_visits_count(3)];
/// let bounds = BoundingBox::new(29.5, 49.5, 31.5, 51.5)?;
/// let layer = render_metaballs(&places, bounds, MetaballSettings::at_zoom(7.0).with_resolution(40))?;
/// assert!(!layer.segments.is_empty());
/// # Ok(())
/// # }
/// ```
pub fn render_metaballs(
    places: &[Place],
    bounds: BoundingBox,
    settings: MetaballSettings,
) -> Result<MetaballLayer, FieldError> {
    let bounds = if bounds.width() > 0.0 && bounds.height() > 0.0 {
        bounds
    } else {
        bounds.padded(DEGENERATE_PADDING)
    };
    let shape = GridShape::with_aspect(settings.resolution, &bounds)?;
    let degrees_per_px = bounds.width() / settings.canvas_width_px;
    let base_radius = METABALL_MIN_RADIUS_PX * degrees_per_px;
    let points = metaball_points(places, settings.zoom);
    let field = accumulate(&points, bounds, shape, base_radius, &SmoothFalloff)?;
    let threshold = field.relative_threshold(settings.threshold_fraction);
    let segments = if field.is_blank() {
        Vec::new()
    } else {
        extract_contours(&field, threshold)
    };
    Ok(MetaballLayer {
        field,
        threshold,
        segments,
    })
}
