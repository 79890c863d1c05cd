//! Marching-squares iso-line extraction over a [`ScalarField`].
//!
//! Each 2x2 block of nodes forms a cell. Corners at or above the threshold
//! set a bit in a 4-bit mask:
//!
//! | Corner       | Node             | Bit |
//! |--------------|------------------|-----|
//! | top-left     | `(row, col)`     | 8   |
//! | top-right    | `(row, col+1)`   | 4   |
//! | bottom-right | `(row+1, col+1)` | 2   |
//! | bottom-left  | `(row+1, col)`   | 1   |
//!
//! Segments join edge midpoints. The saddle masks 5 and 10 always keep the
//! two above-threshold corners apart: each one is cut off by its own
//! segment, so mask 5 yields top-right and bottom-left caps and mask 10
//! yields top-left and bottom-right caps. Joining the two above-threshold
//! corners instead would be equally valid.

use geo::Coord;
use serde::{Serialize, Serializer};

use crate::ScalarField;

/// One edge of an extracted iso-line, in `lng/lat`.
///
/// Serialises as `{"start": [lng, lat], "end": [lng, lat]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContourSegment {
    /// First endpoint.
    #[serde(serialize_with = "serialize_position")]
    pub start: Coord<f64>,
    /// Second endpoint.
    #[serde(serialize_with = "serialize_position")]
    pub end: Coord<f64>,
}

fn serialize_position<S: Serializer>(coord: &Coord<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    [coord.x, coord.y].serialize(serializer)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    /// Fractional `(row, col)` offset of the edge midpoint within its cell.
    const fn midpoint(self) -> (f64, f64) {
        match self {
            Self::Top => (0.0, 0.5),
            Self::Right => (0.5, 1.0),
            Self::Bottom => (1.0, 0.5),
            Self::Left => (0.5, 0.0),
        }
    }
}

const TOP_LEFT: u8 = 0b1000;
const TOP_RIGHT: u8 = 0b0100;
const BOTTOM_RIGHT: u8 = 0b0010;
const BOTTOM_LEFT: u8 = 0b0001;

/// Edge pairs crossed by the iso-line for a cell mask.
fn edges_for_mask(mask: u8) -> &'static [(Edge, Edge)] {
    use Edge::{Bottom, Left, Right, Top};
    match mask {
        1 | 14 => &[(Left, Bottom)],
        2 | 13 => &[(Bottom, Right)],
        3 | 12 => &[(Left, Right)],
        4 | 11 => &[(Top, Right)],
        5 => &[(Top, Right), (Bottom, Left)],
        6 | 9 => &[(Top, Bottom)],
        7 | 8 => &[(Left, Top)],
        10 => &[(Left, Top), (Right, Bottom)],
        _ => &[],
    }
}

/// Corner mask for the cell whose top-left node is `(row, col)`.
fn cell_mask(field: &ScalarField, row: usize, col: usize, threshold: f64) -> u8 {
    let above = |r: usize, c: usize, bit: u8| {
        field
            .get(r, c)
            .filter(|value| *value >= threshold)
            .map_or(0, |_| bit)
    };
    above(row, col, TOP_LEFT)
        | above(row, col + 1, TOP_RIGHT)
        | above(row + 1, col + 1, BOTTOM_RIGHT)
        | above(row + 1, col, BOTTOM_LEFT)
}

/// Extract unconnected iso-line segments at `threshold`.
///
/// Uniform fields (all below or all at/above the threshold) produce no
/// segments. A `NaN` threshold treats every corner as below it.
///
/// # Examples
/// ```
/// use waymark_core::{BoundingBox, GridShape, ScalarField, extract_contours};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bounds = BoundingBox::new(0.0, 0.0, 1.0, 1.0)?;
/// let shape = GridShape::new(2, 2)?;
/// // Only the top-left corner is hot.
/// let field = ScalarField::from_values(bounds, shape, vec![1.0, 0.0, 0.0, 0.0])
///     .ok_or("length mismatch")?;
/// let segments = extract_contours(&field, 0.5);
/// assert_eq!(segments.len(), 1);
/// # Ok(())
/// # }
/// ```
pub fn extract_contours(field: &ScalarField, threshold: f64) -> Vec<ContourSegment> {
    let mut segments = Vec::new();
    for row in 0..field.rows().saturating_sub(1) {
        for col in 0..field.cols().saturating_sub(1) {
            let mask = cell_mask(field, row, col, threshold);
            for (from, to) in edges_for_mask(mask) {
                segments.push(ContourSegment {
                    start: edge_coord(field, row, col, *from),
                    end: edge_coord(field, row, col, *to),
                });
            }
        }
    }
    log::debug!(
        "extracted {} contour segments at threshold {threshold}",
        segments.len()
    );
    segments
}

fn edge_coord(field: &ScalarField, row: usize, col: usize, edge: Edge) -> Coord<f64> {
    let (row_offset, col_offset) = edge.midpoint();
    field.grid_to_coord(index(row) + row_offset, index(col) + col_offset)
}

fn index(value: usize) -> f64 {
    value as f64
}
