//! Error types for the `lattice-space` crate.
//!
//! All fallible operations in this crate return [`SpaceError`]. None of
//! them are retried or swallowed internally; they surface to the caller,
//! which decides whether the run continues.

use lattice_types::{AgentId, Coord, Point};

/// A position in either kind of space, carried by errors for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    /// A cell coordinate in a grid.
    Cell(Coord),
    /// A real-valued point in a continuous space.
    Point(Point),
}

impl From<Coord> for Position {
    fn from(coord: Coord) -> Self {
        Self::Cell(coord)
    }
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Self::Point(point)
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Cell(coord) => write!(f, "cell {coord}"),
            Self::Point(point) => write!(f, "point {point}"),
        }
    }
}

/// Errors that can occur during space operations.
#[derive(Debug, thiserror::Error)]
pub enum SpaceError {
    /// A position lies outside a non-toroidal space.
    #[error("{0} is out of bounds")]
    OutOfBounds(Position),

    /// A single-occupancy cell already holds an agent.
    #[error("cell {coord} is already occupied by {occupant}")]
    CellOccupied {
        /// The contested cell.
        coord: Coord,
        /// The agent currently holding the cell.
        occupant: AgentId,
    },

    /// A random empty cell was requested but every cell is occupied.
    #[error("grid is full: no empty cells remain")]
    GridFull,

    /// The agent is not present in the space (or not in its recorded cell).
    #[error("agent {0} is not in this space")]
    AgentNotFound(AgentId),

    /// The agent is already placed; use a move instead.
    #[error("agent {agent} is already placed at {position}")]
    AlreadyPlaced {
        /// The agent.
        agent: AgentId,
        /// Where the agent currently sits.
        position: Position,
    },

    /// The space was constructed with unusable dimensions.
    #[error("invalid space dimensions: {reason}")]
    InvalidDimensions {
        /// Explanation of what is wrong with the dimensions.
        reason: String,
    },
}
