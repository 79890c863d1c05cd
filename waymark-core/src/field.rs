//! Weighted scalar fields sampled on a regular grid.
//!
//! The grid covers a [`BoundingBox`] with `rows x cols` sample nodes. Node
//! `(0, 0)` sits on the north-west corner and node `(rows - 1, cols - 1)` on
//! the south-east corner, so rows advance southwards and columns eastwards.
//! Distances are planar in the `lng/lat` plane, measured in degrees.
//!
//! Accumulation is `O(points x nodes)`. Grids stay small (about 120 x 120)
//! and point sets modest, so no spatial index is used. Points are iterated
//! in the outer loop and nodes in row-major order in the inner loop, which
//! fixes the floating-point summation order for identical input.

use geo::Coord;
use serde::Serialize;
use thiserror::Error;

use crate::BoundingBox;

/// Smallest grid dimension that still forms a cell.
pub const MIN_GRID_NODES: usize = 2;

/// Largest grid dimension accepted on either axis.
pub const MAX_GRID_NODES: usize = 1024;

/// Errors returned while shaping or filling a field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// A grid dimension was below [`MIN_GRID_NODES`].
    #[error("grid must be at least {MIN_GRID_NODES}x{MIN_GRID_NODES} nodes, got {rows}x{cols}")]
    GridTooSmall {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },
    /// A grid dimension exceeded [`MAX_GRID_NODES`].
    #[error("grid may be at most {MAX_GRID_NODES}x{MAX_GRID_NODES} nodes, got {rows}x{cols}")]
    GridTooLarge {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },
    /// The base radius was zero, negative or non-finite.
    #[error("base radius must be positive and finite, got {radius}")]
    InvalidRadius {
        /// Offending radius.
        radius: f64,
    },
    /// A point carried a non-finite weight, radius multiplier or location.
    #[error("point {index} has a non-finite weight, radius or location")]
    InvalidPoint {
        /// Position of the offending point in the input.
        index: usize,
    },
}

/// Number of sample nodes along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    rows: usize,
    cols: usize,
}

impl GridShape {
    /// Validate a grid shape.
    ///
    /// # Errors
    /// Returns [`FieldError::GridTooSmall`] or [`FieldError::GridTooLarge`]
    /// when either dimension falls outside
    /// `MIN_GRID_NODES..=MAX_GRID_NODES`.
    pub fn new(rows: usize, cols: usize) -> Result<Self, FieldError> {
        if rows < MIN_GRID_NODES || cols < MIN_GRID_NODES {
            return Err(FieldError::GridTooSmall { rows, cols });
        }
        if rows > MAX_GRID_NODES || cols > MAX_GRID_NODES {
            return Err(FieldError::GridTooLarge { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// Shape whose column count is fixed and whose row count follows the
    /// aspect ratio of `bounds`, mirroring a canvas of the same proportions.
    ///
    /// The derived row count is clamped into
    /// `MIN_GRID_NODES..=MAX_GRID_NODES`, so a thin strip still yields a
    /// bounded grid.
    ///
    /// # Errors
    /// Fails when `cols` itself is outside the accepted range.
    pub fn with_aspect(cols: usize, bounds: &BoundingBox) -> Result<Self, FieldError> {
        let width = bounds.width();
        let rows = if width > 0.0 {
            let ratio = bounds.height() / width;
            float_to_count(ratio * count_to_float(cols))
        } else {
            cols
        };
        Self::new(rows.clamp(MIN_GRID_NODES, MAX_GRID_NODES), cols)
    }

    /// Total number of nodes.
    pub const fn nodes(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    /// Rows of nodes.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Columns of nodes.
    pub const fn cols(&self) -> usize {
        self.cols
    }
}

/// Distance falloff applied to each point's contribution.
pub trait Kernel {
    /// Weight multiplier for `ratio = distance / radius`.
    ///
    /// Must return `1.0` at `0.0` and exactly `0.0` for `ratio >= 1.0`.
    fn falloff(&self, ratio: f64) -> f64;
}

/// `(1 - t)^2` inside the radius, zero outside.
///
/// Decays smoothly to zero at the radius so there is no hard cutoff ring.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SmoothFalloff;

impl Kernel for SmoothFalloff {
    fn falloff(&self, ratio: f64) -> f64 {
        if !(0.0..1.0).contains(&ratio) {
            return 0.0;
        }
        let t = 1.0 - ratio;
        t * t
    }
}

/// A point feeding the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedPoint {
    /// Location in `lng/lat`.
    pub location: Coord<f64>,
    /// Contribution at distance zero.
    pub weight: f64,
    /// Multiplier applied to the base radius for this point.
    pub radius_scale: f64,
}

impl WeightedPoint {
    /// Point with the base radius.
    pub const fn new(location: Coord<f64>, weight: f64) -> Self {
        Self {
            location,
            weight,
            radius_scale: 1.0,
        }
    }

    /// Override the radius multiplier.
    #[must_use]
    pub const fn with_radius_scale(mut self, radius_scale: f64) -> Self {
        self.radius_scale = radius_scale;
        self
    }

    fn is_valid(&self) -> bool {
        self.location.x.is_finite()
            && self.location.y.is_finite()
            && self.weight.is_finite()
            && self.radius_scale.is_finite()
            && self.radius_scale > 0.0
    }
}

/// Accumulated weights over a grid of nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarField {
    bounds: BoundingBox,
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl ScalarField {
    /// Zero-filled field over `bounds`.
    pub fn zeros(bounds: BoundingBox, shape: GridShape) -> Self {
        Self {
            bounds,
            rows: shape.rows,
            cols: shape.cols,
            values: vec![0.0; shape.nodes()],
        }
    }

    /// Field from row-major values; `None` when the length does not match.
    pub fn from_values(bounds: BoundingBox, shape: GridShape, values: Vec<f64>) -> Option<Self> {
        (values.len() == shape.nodes()).then_some(Self {
            bounds,
            rows: shape.rows,
            cols: shape.cols,
            values,
        })
    }

    /// Geographic extent covered by the nodes.
    pub const fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Rows of nodes.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Columns of nodes.
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major node values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at a node, `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.values.get(row * self.cols + col).copied()
    }

    /// Longitude step between adjacent columns.
    pub fn cell_width(&self) -> f64 {
        self.bounds.width() / count_to_float(self.cols - 1)
    }

    /// Latitude step between adjacent rows.
    pub fn cell_height(&self) -> f64 {
        self.bounds.height() / count_to_float(self.rows - 1)
    }

    /// Map fractional grid indices to a `lng/lat` coordinate.
    pub fn grid_to_coord(&self, row: f64, col: f64) -> Coord<f64> {
        Coord {
            x: self.bounds.min_lng + col * self.cell_width(),
            y: self.bounds.max_lat - row * self.cell_height(),
        }
    }

    /// Coordinate of a node.
    pub fn node_coord(&self, row: usize, col: usize) -> Coord<f64> {
        self.grid_to_coord(count_to_float(row), count_to_float(col))
    }

    /// Largest node value, `0.0` for an all-zero field.
    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// `true` when nothing contributed to the field.
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|value| *value == 0.0)
    }

    /// Threshold at `fraction` of the maximum value.
    pub fn relative_threshold(&self, fraction: f64) -> f64 {
        self.max_value() * fraction
    }
}

/// Sum point contributions onto a grid.
///
/// Each node receives `point.weight * kernel(distance / radius)` from every
/// point, where `radius = base_radius * point.radius_scale`. An empty point
/// set yields an all-zero field.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use waymark_core::{BoundingBox, GridShape, SmoothFalloff, WeightedPoint, accumulate};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bounds = BoundingBox::new(0.0, 0.0, 4.0, 4.0)?;
/// let shape = GridShape::new(5, 5)?;
/// let points = [WeightedPoint::new(Coord { x: 2.0, y: 2.0 }, 1.0)];
/// let field = accumulate(&points, bounds, shape, 1.5, &SmoothFalloff)?;
/// assert_eq!(field.get(2, 2), Some(1.0));
/// assert_eq!(field.get(0, 0), Some(0.0));
/// # Ok(())
/// # }
/// ```
pub fn accumulate<K: Kernel + ?Sized>(
    points: &[WeightedPoint],
    bounds: BoundingBox,
    shape: GridShape,
    base_radius: f64,
    kernel: &K,
) -> Result<ScalarField, FieldError> {
    if !base_radius.is_finite() || base_radius <= 0.0 {
        return Err(FieldError::InvalidRadius {
            radius: base_radius,
        });
    }
    if let Some(index) = points.iter().position(|point| !point.is_valid()) {
        return Err(FieldError::InvalidPoint { index });
    }

    let mut field = ScalarField::zeros(bounds, shape);
    let node_coords: Vec<Coord<f64>> = (0..shape.rows)
        .flat_map(|row| (0..shape.cols).map(move |col| (row, col)))
        .map(|(row, col)| field.node_coord(row, col))
        .collect();

    for point in points {
        let radius = base_radius * point.radius_scale;
        for (value, node) in field.values.iter_mut().zip(&node_coords) {
            let distance = (node.x - point.location.x).hypot(node.y - point.location.y);
            *value += point.weight * kernel.falloff(distance / radius);
        }
    }
    log::debug!(
        "accumulated {} points onto a {}x{} grid",
        points.len(),
        shape.rows,
        shape.cols
    );
    Ok(field)
}

fn count_to_float(count: usize) -> f64 {
    count as f64
}

fn float_to_count(value: f64) -> usize {
    if value.is_finite() && value > 0.0 {
        value.round() as usize
    } else {
        0
    }
}
