//! Test-only fixtures shared by unit, behaviour and downstream crate tests.

use chrono::{DateTime, TimeZone, Utc};
use geo::Coord;

use crate::{Boundary, Place, Ring, Visit};

/// Coarse Ukraine outline as `(lng, lat)` pairs, closed.
///
/// Roughly 30 vertices: good enough for city-scale inside/outside checks,
/// useless for anything near the border.
pub const UKRAINE_OUTLINE: &[(f64, f64)] = &[
    (22.15, 48.40),
    (22.70, 49.05),
    (24.00, 50.40),
    (23.60, 51.55),
    (25.30, 51.90),
    (27.80, 51.60),
    (30.20, 51.50),
    (30.55, 51.25),
    (31.80, 52.10),
    (33.80, 52.35),
    (35.40, 50.60),
    (38.20, 50.00),
    (40.10, 49.60),
    (39.70, 47.80),
    (38.20, 47.10),
    (37.40, 47.00),
    (35.10, 46.20),
    (33.50, 46.00),
    (31.50, 46.60),
    (30.75, 46.50),
    (29.60, 45.40),
    (28.20, 45.50),
    (28.70, 46.90),
    (28.00, 48.20),
    (26.60, 48.30),
    (24.80, 47.70),
    (22.90, 47.95),
    (22.15, 48.40),
];

/// Kyiv as `(lat, lng)`.
pub const KYIV: (f64, f64) = (50.4501, 30.5234);
/// Warsaw as `(lat, lng)`.
pub const WARSAW: (f64, f64) = (52.2297, 21.0122);

fn coords(pairs: &[(f64, f64)]) -> Vec<Coord<f64>> {
    pairs.iter().map(|&(x, y)| Coord { x, y }).collect()
}

/// Boundary built from [`UKRAINE_OUTLINE`].
///
/// # Panics
/// Never in practice; the outline is a valid ring.
pub fn ukraine_boundary() -> Boundary {
    let ring = Ring::new(coords(UKRAINE_OUTLINE)).expect("outline is a valid ring");
    Boundary::from_ring("Ukraine", ring)
}

/// Axis-aligned square boundary spanning `min..=max` on both axes.
///
/// # Panics
/// Panics if `min >= max`.
pub fn square_boundary(min: f64, max: f64) -> Boundary {
    let ring = Ring::new(coords(&[(min, min), (max, min), (max, max), (min, max)]))
        .expect("square is a valid ring");
    Boundary::from_ring("square", ring)
}

/// Noon UTC on the given day.
///
/// # Panics
/// Panics on an impossible date.
pub fn noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .expect("valid calendar date")
}

/// A handful of places across Ukraine with visits recorded.
///
/// # Panics
/// Never in practice; coordinates are valid.
pub fn sample_places() -> Vec<Place> {
    let mut maidan = Place::new("maidan", "Maidan Nezalezhnosti", 50.4501, 30.5234)
        .expect("valid place")
        .with_region("Kyiv")
        .with_address("Maidan Nezalezhnosti, Kyiv, 01001")
        .with_tags(["square", "history"]);
    maidan.record_visit(Visit::new("v1", noon(2024, 3, 2), Some(9), "first time"));
    maidan.record_visit(Visit::new("v2", noon(2024, 5, 9), None, ""));

    let mut rynok = Place::new("rynok", "Rynok Square", 49.8419, 24.0316)
        .expect("valid place")
        .with_region("Lviv")
        .with_city("Lviv")
        .with_tags(["square", "old-town"]);
    rynok.record_visit(Visit::new("v3", noon(2024, 3, 20), Some(8), ""));

    let mut opera = Place::new("opera", "Odesa Opera", 46.4853, 30.7411)
        .expect("valid place")
        .with_region("Odesa")
        .with_address("Tchaikovsky Ln 1, Odesa, 65000")
        .with_tags(["theatre"]);
    opera.record_visit(Visit::new("v4", noon(2024, 7, 14), Some(10), "ballet"));

    vec![maidan, rynok, opera]
}
