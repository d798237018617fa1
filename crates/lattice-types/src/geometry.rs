//! Coordinates for cell spaces and points for continuous spaces.
//!
//! [`Coord`] addresses a cell by `(x, y)` = `(column, row)`. Components are
//! signed so that offsets and out-of-range probes (`x = -1`) are
//! representable; whether a coordinate lies on a grid is the grid's call.
//!
//! [`Point`] is a real-valued position in a continuous space.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Integer cell coordinate: `x` is the column, `y` is the row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct Coord {
    /// Column index.
    pub x: i64,
    /// Row index.
    pub y: i64,
}

impl Coord {
    /// Create a coordinate from a column and a row.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Shift the coordinate by `(dx, dy)`, returning `None` on overflow.
    pub const fn offset(self, dx: i64, dy: i64) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }
}

impl From<(i64, i64)> for Coord {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

impl core::fmt::Display for Coord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Real-valued position in a continuous space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Point {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Point {
    /// Create a point from its components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both components are finite (not NaN or infinite).
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl core::fmt::Display for Point {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Shape of a cell neighborhood.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum NeighborhoodKind {
    /// All cells within the radius, diagonals included. Beyond radius 1 the
    /// square is trimmed to a disc by Euclidean offset length.
    #[default]
    Moore,
    /// Orthogonal offsets only; no cell with both `dx != 0` and `dy != 0`.
    VonNeumann,
}
