//! Country boundary rings and the ray-casting point-in-polygon test.
//!
//! Rings are stored open: the closing vertex GeoJSON repeats at the end is
//! dropped, and the last vertex implicitly connects back to the first.
//! Only outer rings take part in containment; holes are retained so the
//! boundary round-trips but are otherwise ignored.

use std::collections::HashSet;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use thiserror::Error;

use crate::{BoundingBox, InvalidPoint, bounds_of, validate_point};

/// Minimum number of distinct vertices in a ring.
pub const MIN_RING_VERTICES: usize = 3;

/// Errors returned by [`Ring::new`] and [`Boundary::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingError {
    /// The ring had fewer than three distinct vertices.
    #[error("ring needs at least {MIN_RING_VERTICES} distinct vertices, found {found}")]
    TooFewVertices {
        /// Number of distinct vertices present.
        found: usize,
    },
    /// A vertex was `NaN` or infinite.
    #[error("ring vertex {index} is not finite")]
    NonFiniteVertex {
        /// Position of the offending vertex.
        index: usize,
    },
    /// A boundary was built without any polygons.
    #[error("boundary must contain at least one polygon")]
    EmptyBoundary,
}

/// A closed ring of `lng/lat` vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    vertices: Vec<Coord<f64>>,
}

impl Ring {
    /// Validate and construct a ring.
    ///
    /// A trailing vertex equal to the first one is treated as the explicit
    /// closing vertex and dropped.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use waymark_core::Ring;
    ///
    /// let ring = Ring::new(vec![
    ///     Coord { x: 0.0, y: 0.0 },
    ///     Coord { x: 1.0, y: 0.0 },
    ///     Coord { x: 1.0, y: 1.0 },
    ///     Coord { x: 0.0, y: 0.0 },
    /// ])?;
    /// assert_eq!(ring.len(), 3);
    /// # Ok::<(), waymark_core::RingError>(())
    /// ```
    pub fn new(mut vertices: Vec<Coord<f64>>) -> Result<Self, RingError> {
        if let Some(index) = vertices
            .iter()
            .position(|c| !c.x.is_finite() || !c.y.is_finite())
        {
            return Err(RingError::NonFiniteVertex { index });
        }
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        let distinct = count_distinct(&vertices);
        if distinct < MIN_RING_VERTICES {
            return Err(RingError::TooFewVertices { found: distinct });
        }
        Ok(Self { vertices })
    }

    /// Vertices without the closing duplicate.
    pub fn vertices(&self) -> &[Coord<f64>] {
        &self.vertices
    }

    /// Number of stored vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always `false`; a valid ring has at least three vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Ray-casting containment test for this ring.
    pub fn contains(&self, point: Coord<f64>) -> bool {
        ring_contains(&self.vertices, point)
    }

    fn to_line_string(&self) -> LineString<f64> {
        let mut coords = self.vertices.clone();
        if let Some(first) = self.vertices.first() {
            coords.push(*first);
        }
        LineString::new(coords)
    }
}

/// Count distinct vertices, stopping once the minimum is reached.
fn count_distinct(vertices: &[Coord<f64>]) -> usize {
    let mut seen = HashSet::with_capacity(MIN_RING_VERTICES);
    for vertex in vertices {
        // +0.0 and -0.0 compare equal but have different bit patterns.
        let key = ((vertex.x + 0.0).to_bits(), (vertex.y + 0.0).to_bits());
        seen.insert(key);
        if seen.len() >= MIN_RING_VERTICES {
            break;
        }
    }
    seen.len()
}

/// Ray-casting point-in-polygon over an open ring.
///
/// For each edge `(v[j], v[i])`, the inside flag toggles when exactly one
/// endpoint lies strictly above the point's latitude and the edge's
/// longitude at that latitude exceeds the point's longitude. There is no
/// tie-breaking for points on an edge or vertex; such points resolve to the
/// same answer on every call but which answer is unspecified.
///
/// Runs in `O(vertices)` without precomputed indices.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use waymark_core::ring_contains;
///
/// let square = [
///     Coord { x: 0.0, y: 0.0 },
///     Coord { x: 1.0, y: 0.0 },
///     Coord { x: 1.0, y: 1.0 },
///     Coord { x: 0.0, y: 1.0 },
/// ];
/// assert!(ring_contains(&square, Coord { x: 0.5, y: 0.5 }));
/// assert!(!ring_contains(&square, Coord { x: 1.5, y: 0.5 }));
/// ```
pub fn ring_contains(ring: &[Coord<f64>], point: Coord<f64>) -> bool {
    let Some(&last) = ring.last() else {
        return false;
    };
    let mut inside = false;
    let mut previous = last;
    for &current in ring {
        let crosses = (current.y > point.y) != (previous.y > point.y);
        if crosses {
            let edge_x = (previous.x - current.x) * (point.y - current.y)
                / (previous.y - current.y)
                + current.x;
            if point.x < edge_x {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

/// One polygon of a boundary: an outer ring and optional holes.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPolygon {
    /// Outer ring.
    pub exterior: Ring,
    /// Hole rings, unused by containment.
    pub holes: Vec<Ring>,
}

/// A country outline made of one or more polygons.
///
/// Consumers hold a loaded boundary by reference; it is immutable once
/// built.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    name: String,
    polygons: Vec<BoundaryPolygon>,
}

impl Boundary {
    /// Construct a boundary, requiring at least one polygon.
    pub fn new(name: impl Into<String>, polygons: Vec<BoundaryPolygon>) -> Result<Self, RingError> {
        if polygons.is_empty() {
            return Err(RingError::EmptyBoundary);
        }
        Ok(Self {
            name: name.into(),
            polygons,
        })
    }

    /// Convenience constructor for a single outer ring.
    pub fn from_ring(name: impl Into<String>, ring: Ring) -> Self {
        Self {
            name: name.into(),
            polygons: vec![BoundaryPolygon {
                exterior: ring,
                holes: Vec::new(),
            }],
        }
    }

    /// Human readable name of the boundary's feature.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Polygons making up the boundary.
    pub fn polygons(&self) -> &[BoundaryPolygon] {
        &self.polygons
    }

    /// `true` when any outer ring encloses `point`.
    ///
    /// `point` must already be validated; see [`Boundary::contains_lat_lng`].
    pub fn contains(&self, point: Coord<f64>) -> bool {
        self.polygons
            .iter()
            .any(|polygon| polygon.exterior.contains(point))
    }

    /// Validate a latitude/longitude pair and test it against the boundary.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use waymark_core::{Boundary, Ring};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let ring = Ring::new(vec![
    ///     Coord { x: 0.0, y: 0.0 },
    ///     Coord { x: 10.0, y: 0.0 },
    ///     Coord { x: 10.0, y: 10.0 },
    ///     Coord { x: 0.0, y: 10.0 },
    /// ])?;
    /// let boundary = Boundary::from_ring("square", ring);
    /// assert!(boundary.contains_lat_lng(5.0, 5.0)?);
    /// assert!(boundary.contains_lat_lng(f64::NAN, 5.0).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn contains_lat_lng(&self, lat: f64, lng: f64) -> Result<bool, InvalidPoint> {
        let point = validate_point(lat, lng)?;
        Ok(self.contains(point))
    }

    /// Iterate over every vertex of every ring, holes included.
    pub fn vertices(&self) -> impl Iterator<Item = Coord<f64>> + '_ {
        self.polygons.iter().flat_map(|polygon| {
            std::iter::once(&polygon.exterior)
                .chain(polygon.holes.iter())
                .flat_map(|ring| ring.vertices().iter().copied())
        })
    }

    /// Axis-aligned bounds over all vertices.
    pub fn bounds(&self) -> BoundingBox {
        // `Boundary` always holds at least one ring with three vertices.
        bounds_of(self.vertices()).unwrap_or_else(|| BoundingBox::from_coord(Coord::zero()))
    }

    /// Convert into a `geo` multipolygon with explicitly closed rings.
    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(
            self.polygons
                .iter()
                .map(|polygon| {
                    Polygon::new(
                        polygon.exterior.to_line_string(),
                        polygon.holes.iter().map(Ring::to_line_string).collect(),
                    )
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn coord(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[fixture]
    fn unit_square() -> Ring {
        Ring::new(vec![
            coord(0.0, 0.0),
            coord(1.0, 0.0),
            coord(1.0, 1.0),
            coord(0.0, 1.0),
        ])
        .expect("valid square")
    }

    #[fixture]
    fn concave_l() -> Ring {
        Ring::new(vec![
            coord(0.0, 0.0),
            coord(4.0, 0.0),
            coord(4.0, 1.0),
            coord(1.0, 1.0),
            coord(1.0, 4.0),
            coord(0.0, 4.0),
        ])
        .expect("valid L shape")
    }

    #[rstest]
    fn drops_explicit_closing_vertex() {
        let ring = Ring::new(vec![
            coord(0.0, 0.0),
            coord(1.0, 0.0),
            coord(0.0, 1.0),
            coord(0.0, 0.0),
        ])
        .expect("valid triangle");
        assert_eq!(ring.len(), 3);
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![coord(0.0, 0.0), coord(1.0, 1.0)])]
    #[case(vec![coord(0.0, 0.0), coord(1.0, 1.0), coord(0.0, 0.0), coord(1.0, 1.0)])]
    fn rejects_degenerate_rings(#[case] vertices: Vec<Coord<f64>>) {
        let err = Ring::new(vertices).expect_err("degenerate ring");
        assert!(matches!(err, RingError::TooFewVertices { .. }));
    }

    #[rstest]
    fn rejects_non_finite_vertices() {
        let err = Ring::new(vec![coord(0.0, 0.0), coord(f64::NAN, 1.0), coord(1.0, 0.0)])
            .expect_err("NaN vertex");
        assert_eq!(err, RingError::NonFiniteVertex { index: 1 });
    }

    #[rstest]
    #[case(0.5, 0.5, true)]
    #[case(0.01, 0.99, true)]
    #[case(-0.5, 0.5, false)]
    #[case(0.5, 1.5, false)]
    #[case(2.0, 2.0, false)]
    fn square_containment(
        unit_square: Ring,
        #[case] x: f64,
        #[case] y: f64,
        #[case] expected: bool,
    ) {
        assert_eq!(unit_square.contains(coord(x, y)), expected);
    }

    #[rstest]
    #[case(0.5, 3.0, true)]
    #[case(3.0, 0.5, true)]
    #[case(3.0, 3.0, false)]
    #[case(1.5, 1.5, false)]
    fn concave_containment(
        concave_l: Ring,
        #[case] x: f64,
        #[case] y: f64,
        #[case] expected: bool,
    ) {
        assert_eq!(concave_l.contains(coord(x, y)), expected);
    }

    #[rstest]
    fn vertex_points_resolve_deterministically(unit_square: Ring) {
        for vertex in unit_square.vertices().to_vec() {
            let first = unit_square.contains(vertex);
            let second = unit_square.contains(vertex);
            assert_eq!(first, second, "vertex {vertex:?} flipped between calls");
        }
    }

    #[rstest]
    fn empty_slice_contains_nothing() {
        assert!(!ring_contains(&[], coord(0.0, 0.0)));
    }

    #[rstest]
    fn multi_polygon_boundary_checks_every_outer_ring(unit_square: Ring) {
        let far = Ring::new(vec![
            coord(10.0, 10.0),
            coord(11.0, 10.0),
            coord(11.0, 11.0),
        ])
        .expect("valid triangle");
        let boundary = Boundary::new(
            "islands",
            vec![
                BoundaryPolygon {
                    exterior: unit_square,
                    holes: Vec::new(),
                },
                BoundaryPolygon {
                    exterior: far,
                    holes: Vec::new(),
                },
            ],
        )
        .expect("valid boundary");
        assert!(boundary.contains(coord(0.5, 0.5)));
        assert!(boundary.contains(coord(10.8, 10.2)));
        assert!(!boundary.contains(coord(5.0, 5.0)));
    }

    #[rstest]
    fn holes_do_not_affect_containment(unit_square: Ring) {
        let hole = Ring::new(vec![
            coord(0.25, 0.25),
            coord(0.75, 0.25),
            coord(0.75, 0.75),
            coord(0.25, 0.75),
        ])
        .expect("valid hole");
        let boundary = Boundary::new(
            "donut",
            vec![BoundaryPolygon {
                exterior: unit_square,
                holes: vec![hole],
            }],
        )
        .expect("valid boundary");
        assert!(boundary.contains(coord(0.5, 0.5)));
    }

    #[rstest]
    fn boundary_requires_polygons() {
        let err = Boundary::new("nothing", Vec::new()).expect_err("empty boundary");
        assert_eq!(err, RingError::EmptyBoundary);
    }

    #[rstest]
    fn invalid_point_is_rejected_before_ray_casting(unit_square: Ring) {
        let boundary = Boundary::from_ring("square", unit_square);
        let err = boundary
            .contains_lat_lng(0.5, f64::INFINITY)
            .expect_err("infinite longitude");
        assert!(matches!(err, InvalidPoint::NonFinite { .. }));
    }

    #[rstest]
    fn multi_polygon_conversion_closes_rings(unit_square: Ring) {
        let boundary = Boundary::from_ring("square", unit_square);
        let multi = boundary.to_multi_polygon();
        let exterior = multi.0[0].exterior();
        assert_eq!(exterior.0.len(), 5);
        assert_eq!(exterior.0.first(), exterior.0.last());
    }
}
