//! Bounding box derivation over flat or arbitrarily nested coordinates.

use geo::Coord;
use serde::Deserialize;

use crate::BoundingBox;

/// GeoJSON `coordinates` member of any depth.
///
/// A `Polygon` nests three levels deep and a `MultiPolygon` four; both
/// deserialise into this shape so bounds can be taken without caring which
/// geometry produced the array. Positions carry at least `[lng, lat]`;
/// extra members such as altitude are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NestedCoordinates {
    /// A leaf position `[lng, lat, ...]`.
    Position(Vec<f64>),
    /// A list of deeper coordinate arrays.
    Nested(Vec<NestedCoordinates>),
}

impl NestedCoordinates {
    /// Leaf position as a coordinate, if this is a well-formed position.
    pub fn as_coord(&self) -> Option<Coord<f64>> {
        match self {
            Self::Position(values) => match values.as_slice() {
                [x, y, ..] => Some(Coord { x: *x, y: *y }),
                _ => None,
            },
            Self::Nested(_) => None,
        }
    }

    /// Children of a nested array; empty for positions.
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Position(_) => &[],
            Self::Nested(children) => children,
        }
    }

    /// Flatten into leaf coordinates, depth first, in document order.
    pub fn flatten(&self) -> Vec<Coord<f64>> {
        let mut collected = Vec::new();
        self.collect_into(&mut collected);
        collected
    }

    fn collect_into(&self, collected: &mut Vec<Coord<f64>>) {
        match self {
            Self::Position(_) => collected.extend(self.as_coord()),
            Self::Nested(children) => {
                for child in children {
                    child.collect_into(collected);
                }
            }
        }
    }
}

/// Single-pass min/max reduction over coordinates.
///
/// Returns `None` for an empty input. Non-finite coordinates are skipped.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use waymark_core::{BoundingBox, bounds_of};
///
/// let square = [
///     Coord { x: 0.0, y: 0.0 },
///     Coord { x: 1.0, y: 0.0 },
///     Coord { x: 1.0, y: 1.0 },
///     Coord { x: 0.0, y: 1.0 },
/// ];
/// let bbox = bounds_of(square).expect("non-empty input");
/// assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 1.0, 1.0)?);
/// # Ok::<(), waymark_core::BBoxError>(())
/// ```
pub fn bounds_of<I>(coords: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = Coord<f64>>,
{
    coords
        .into_iter()
        .filter(|c| c.x.is_finite() && c.y.is_finite())
        .fold(None, |acc: Option<BoundingBox>, coord| {
            Some(acc.map_or_else(|| BoundingBox::from_coord(coord), |bbox| bbox.expand(coord)))
        })
}

/// Bounds of a raw GeoJSON coordinate array of any nesting depth.
///
/// # Examples
/// ```
/// use waymark_core::{NestedCoordinates, bounds_of_nested};
///
/// let coords: NestedCoordinates =
///     serde_json::from_str("[[[[0,0],[2,0],[2,1]]],[[[5,5],[6,5],[6,7]]]]")?;
/// let bbox = bounds_of_nested(&coords).expect("coordinates present");
/// assert_eq!((bbox.max_lng, bbox.max_lat), (6.0, 7.0));
/// # Ok::<(), serde_json::Error>(())
/// ```
pub fn bounds_of_nested(coords: &NestedCoordinates) -> Option<BoundingBox> {
    bounds_of(coords.flatten())
}
