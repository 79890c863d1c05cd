//! Axis-aligned bounding boxes and viewport filtering.
//!
//! A [`BoundingBox`] is always expressed as `minLng,minLat,maxLng,maxLat`.
//! Containment is inclusive on all four edges.

use std::str::FromStr;

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of components in a bbox query string.
const BBOX_ARITY: usize = 4;

/// Rectangular extent in degrees.
///
/// Invariant: `min_lng <= max_lng` and `min_lat <= max_lat`. Deserialised
/// boxes go through [`BoundingBox::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawBoundingBox")]
pub struct BoundingBox {
    /// Western edge.
    pub min_lng: f64,
    /// Southern edge.
    pub min_lat: f64,
    /// Eastern edge.
    pub max_lng: f64,
    /// Northern edge.
    pub max_lat: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBoundingBox {
    min_lng: f64,
    min_lat: f64,
    max_lng: f64,
    max_lat: f64,
}

impl TryFrom<RawBoundingBox> for BoundingBox {
    type Error = BBoxError;

    fn try_from(raw: RawBoundingBox) -> Result<Self, Self::Error> {
        Self::new(raw.min_lng, raw.min_lat, raw.max_lng, raw.max_lat)
    }
}

/// Reasons a bounding box could not be built or parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BBoxError {
    /// No bbox was supplied.
    #[error("bounding box is missing")]
    Missing,
    /// The query string did not contain exactly four components.
    #[error("bounding box needs 4 comma-separated values, found {found}")]
    WrongArity {
        /// Number of components present.
        found: usize,
    },
    /// A component was not a finite number.
    #[error("bounding box component {index} ({raw:?}) is not a finite number")]
    NotFinite {
        /// Zero-based component position.
        index: usize,
        /// Raw component text.
        raw: String,
    },
    /// Minimum exceeds maximum on at least one axis.
    #[error("bounding box minimum exceeds maximum")]
    Inverted,
}

impl BoundingBox {
    /// Build a box, rejecting non-finite or inverted extents.
    ///
    /// # Examples
    /// ```
    /// use waymark_core::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(10.0, 20.0, 30.0, 40.0)?;
    /// assert_eq!(bbox.max_lat, 40.0);
    /// assert!(BoundingBox::new(30.0, 20.0, 10.0, 40.0).is_err());
    /// # Ok::<(), waymark_core::BBoxError>(())
    /// ```
    pub fn new(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Result<Self, BBoxError> {
        for (index, value) in [min_lng, min_lat, max_lng, max_lat].into_iter().enumerate() {
            if !value.is_finite() {
                return Err(BBoxError::NotFinite {
                    index,
                    raw: value.to_string(),
                });
            }
        }
        if min_lng > max_lng || min_lat > max_lat {
            return Err(BBoxError::Inverted);
        }
        Ok(Self {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        })
    }

    /// Degenerate box covering a single coordinate.
    pub fn from_coord(coord: Coord<f64>) -> Self {
        Self {
            min_lng: coord.x,
            min_lat: coord.y,
            max_lng: coord.x,
            max_lat: coord.y,
        }
    }

    /// Grow the box so it also covers `coord`.
    #[must_use]
    pub fn expand(self, coord: Coord<f64>) -> Self {
        Self {
            min_lng: self.min_lng.min(coord.x),
            min_lat: self.min_lat.min(coord.y),
            max_lng: self.max_lng.max(coord.x),
            max_lat: self.max_lat.max(coord.y),
        }
    }

    /// Grow the box by `margin` degrees on every side.
    #[must_use]
    pub fn padded(self, margin: f64) -> Self {
        Self {
            min_lng: self.min_lng - margin,
            min_lat: self.min_lat - margin,
            max_lng: self.max_lng + margin,
            max_lat: self.max_lat + margin,
        }
    }

    /// Inclusive containment test.
    pub fn contains(&self, coord: Coord<f64>) -> bool {
        coord.x >= self.min_lng
            && coord.x <= self.max_lng
            && coord.y >= self.min_lat
            && coord.y <= self.max_lat
    }

    /// East-west extent in degrees.
    pub fn width(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    /// North-south extent in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

impl FromStr for BoundingBox {
    type Err = BBoxError;

    /// Strict parse of `minLng,minLat,maxLng,maxLat`.
    ///
    /// Use this where a malformed bbox must be rejected, e.g. when the box
    /// gates a write or validation path.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().is_empty() {
            return Err(BBoxError::Missing);
        }
        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        let [min_lng, min_lat, max_lng, max_lat] = parts.as_slice() else {
            return Err(BBoxError::WrongArity { found: parts.len() });
        };
        let mut values = [0.0_f64; BBOX_ARITY];
        for (index, (slot, part)) in values
            .iter_mut()
            .zip([min_lng, min_lat, max_lng, max_lat])
            .enumerate()
        {
            *slot = part
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| BBoxError::NotFinite {
                    index,
                    raw: (*part).to_owned(),
                })?;
        }
        let [a, b, c, d] = values;
        Self::new(a, b, c, d)
    }
}

impl From<BoundingBox> for Rect<f64> {
    fn from(bbox: BoundingBox) -> Self {
        Self::new(
            Coord {
                x: bbox.min_lng,
                y: bbox.min_lat,
            },
            Coord {
                x: bbox.max_lng,
                y: bbox.max_lat,
            },
        )
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        let min = rect.min();
        let max = rect.max();
        Self {
            min_lng: min.x,
            min_lat: min.y,
            max_lng: max.x,
            max_lat: max.y,
        }
    }
}

/// Lenient parse for read queries.
///
/// Returns `None` when the string is absent or malformed; callers treat
/// `None` as "no filter". An inverted box (minimum above maximum on either
/// axis) is malformed too, so it widens to "no filter" rather than matching
/// nothing. Use [`str::parse`] to reject it instead.
///
/// # Examples
/// ```
/// use waymark_core::parse_bbox;
///
/// let bbox = parse_bbox(Some("10,20,30,40")).expect("valid bbox");
/// assert_eq!(bbox.min_lat, 20.0);
/// assert!(parse_bbox(Some("bad")).is_none());
/// assert!(parse_bbox(Some("40,20,30,45")).is_none());
/// assert!(parse_bbox(None).is_none());
/// ```
pub fn parse_bbox(raw: Option<&str>) -> Option<BoundingBox> {
    let raw = raw?;
    match raw.parse::<BoundingBox>() {
        Ok(bbox) => Some(bbox),
        Err(err) => {
            log::debug!("ignoring bbox filter {raw:?}: {err}");
            None
        }
    }
}

/// Containment where an absent box matches everything.
pub fn matches_filter(bbox: Option<&BoundingBox>, coord: Coord<f64>) -> bool {
    bbox.is_none_or(|bbox| bbox.contains(coord))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_four_components() {
        let bbox: BoundingBox = "10,20,30,40".parse().expect("valid bbox");
        assert_eq!(
            bbox,
            BoundingBox {
                min_lng: 10.0,
                min_lat: 20.0,
                max_lng: 30.0,
                max_lat: 40.0,
            }
        );
    }

    #[rstest]
    fn tolerates_whitespace_around_components() {
        let bbox: BoundingBox = " 22.1, 44.3 ,40.2,52.4".parse().expect("valid bbox");
        assert_eq!(bbox.max_lat, 52.4);
    }

    #[rstest]
    #[case("bad", BBoxError::WrongArity { found: 1 })]
    #[case("1,2,3", BBoxError::WrongArity { found: 3 })]
    #[case("1,2,3,4,5", BBoxError::WrongArity { found: 5 })]
    #[case("", BBoxError::Missing)]
    #[case("3,2,1,4", BBoxError::Inverted)]
    fn strict_parse_reports_reason(#[case] raw: &str, #[case] expected: BBoxError) {
        let err = raw.parse::<BoundingBox>().expect_err("should be rejected");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("1,x,3,4", 1)]
    #[case("1,2,NaN,4", 2)]
    #[case("1,2,3,inf", 3)]
    fn strict_parse_rejects_non_finite(#[case] raw: &str, #[case] position: usize) {
        let err = raw.parse::<BoundingBox>().expect_err("should be rejected");
        assert!(matches!(err, BBoxError::NotFinite { index, .. } if index == position));
    }

    #[rstest]
    #[case(None)]
    #[case(Some("bad"))]
    #[case(Some("1,2,3"))]
    #[case(Some("1,2,NaN,4"))]
    fn lenient_parse_yields_none(#[case] raw: Option<&str>) {
        assert!(parse_bbox(raw).is_none());
    }

    #[rstest]
    fn inverted_boxes_widen_to_no_filter() {
        let bbox = parse_bbox(Some("40,20,30,45"));
        assert!(bbox.is_none());
        assert!(matches_filter(bbox.as_ref(), Coord { x: 35.0, y: 30.0 }));
    }

    #[rstest]
    fn deserialises_through_validation() {
        let json = r#"{"minLng": 10.0, "minLat": 20.0, "maxLng": 30.0, "maxLat": 40.0}"#;
        let bbox: BoundingBox = serde_json::from_str(json).expect("valid bbox");
        assert_eq!(bbox, BoundingBox::new(10.0, 20.0, 30.0, 40.0).expect("valid bbox"));
    }

    #[rstest]
    fn deserialising_an_inverted_box_fails() {
        let json = r#"{"minLng": 40.0, "minLat": 20.0, "maxLng": 30.0, "maxLat": 45.0}"#;
        let err = serde_json::from_str::<BoundingBox>(json).expect_err("inverted bbox");
        assert!(err.to_string().contains("minimum exceeds maximum"));
    }

    #[rstest]
    #[case(10.0, 20.0, true)]
    #[case(30.0, 40.0, true)]
    #[case(20.0, 30.0, true)]
    #[case(9.999, 30.0, false)]
    #[case(20.0, 40.001, false)]
    fn containment_is_inclusive(#[case] lng: f64, #[case] lat: f64, #[case] expected: bool) {
        let bbox = BoundingBox::new(10.0, 20.0, 30.0, 40.0).expect("valid bbox");
        assert_eq!(bbox.contains(Coord { x: lng, y: lat }), expected);
    }

    #[rstest]
    fn absent_filter_matches_everything() {
        assert!(matches_filter(None, Coord { x: 179.0, y: -89.0 }));
    }

    #[rstest]
    fn converts_to_and_from_rect() {
        let bbox = BoundingBox::new(-1.0, -2.0, 3.0, 4.0).expect("valid bbox");
        let rect: Rect<f64> = bbox.into();
        assert_eq!(BoundingBox::from(rect), bbox);
    }
}
