//! Map viewport queries over the visited places.

use serde::Serialize;

use crate::{BoundingBox, Place, RegionSummary, matches_filter, parse_bbox, summarize_by_region};

/// Zoom levels below this render the country overview.
pub const COUNTRY_ZOOM_THRESHOLD: f64 = 6.0;

/// Rendering mode selected by zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Whole-country overview with per-region aggregates.
    Country,
    /// Individual places.
    Detail,
}

impl ViewMode {
    /// Mode for a zoom level. A `NaN` zoom selects [`ViewMode::Detail`].
    pub fn for_zoom(zoom: f64) -> Self {
        if zoom < COUNTRY_ZOOM_THRESHOLD {
            Self::Country
        } else {
            Self::Detail
        }
    }
}

/// Visible extent and zoom of the map.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportQuery {
    /// Visible extent; `None` matches everything.
    pub bbox: Option<BoundingBox>,
    /// Map zoom level.
    pub zoom: f64,
}

impl ViewportQuery {
    /// Query from raw request parameters. A malformed bbox means no filter.
    ///
    /// # Examples
    /// ```
    /// use waymark_core::{ViewMode, ViewportQuery};
    ///
    /// let query = ViewportQuery::from_raw(Some("22,44,41,53"), 7.0);
    /// assert!(query.bbox.is_some());
    /// assert_eq!(query.mode(), ViewMode::Detail);
    /// assert!(ViewportQuery::from_raw(Some("oops"), 3.0).bbox.is_none());
    /// ```
    pub fn from_raw(bbox: Option<&str>, zoom: f64) -> Self {
        Self {
            bbox: parse_bbox(bbox),
            zoom,
        }
    }

    /// Rendering mode for this query.
    pub fn mode(&self) -> ViewMode {
        ViewMode::for_zoom(self.zoom)
    }

    /// Places inside the viewport, in input order.
    pub fn filter<'a>(&self, places: &'a [Place]) -> impl Iterator<Item = &'a Place> {
        let bbox = self.bbox;
        places
            .iter()
            .filter(move |place| matches_filter(bbox.as_ref(), place.location()))
    }

    /// Run the query.
    pub fn run(&self, places: &[Place]) -> Viewport {
        let visible: Vec<Place> = self.filter(places).cloned().collect();
        let mode = self.mode();
        let regions = match mode {
            ViewMode::Country => Some(summarize_by_region(&visible)),
            ViewMode::Detail => None,
        };
        log::debug!(
            "viewport {:?} at zoom {} matched {} of {} places",
            self.bbox,
            self.zoom,
            visible.len(),
            places.len()
        );
        Viewport {
            mode,
            regions,
            places: visible,
        }
    }
}

/// Result of a [`ViewportQuery`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Viewport {
    /// Selected rendering mode.
    pub mode: ViewMode,
    /// Per-region aggregates in country mode: `count` is places and
    /// `weight` is visits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<RegionSummary>>,
    /// Visible places.
    pub places: Vec<Place>,
}
