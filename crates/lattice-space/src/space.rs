//! The placement interface shared by every space.
//!
//! The model layer is generic over a [`Space`] so it can detach an agent
//! from whatever space it lives in when the agent is removed, without
//! knowing whether positions are cells or points.

use lattice_types::{AgentId, Coord, Point};

use crate::cell::Cell;
use crate::continuous::ContinuousSpace;
use crate::error::SpaceError;
use crate::grid::Grid;
use crate::single::SingleGrid;

/// A container that places agents at positions and remembers where they are.
///
/// Every space keeps its own agent-to-position index; the position it
/// reports for an agent is always the one it was last placed or moved to.
pub trait Space {
    /// Position type: [`Coord`] for grids, [`Point`] for continuous space.
    type Position: Copy + core::fmt::Debug;

    /// Place a new agent, returning the position actually used.
    ///
    /// # Errors
    ///
    /// Propagates the placement failure of the concrete space.
    fn place(&mut self, agent: AgentId, pos: Self::Position)
    -> Result<Self::Position, SpaceError>;

    /// Move a placed agent, returning the position actually used.
    ///
    /// # Errors
    ///
    /// Propagates the move failure of the concrete space.
    fn move_agent(
        &mut self,
        agent: AgentId,
        pos: Self::Position,
    ) -> Result<Self::Position, SpaceError>;

    /// Remove an agent, returning its last position.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::AgentNotFound`] if the agent is not placed.
    fn remove(&mut self, agent: AgentId) -> Result<Self::Position, SpaceError>;

    /// Current position of `agent`, if placed.
    fn position_of(&self, agent: AgentId) -> Option<Self::Position>;

    /// Whether `agent` is placed.
    fn contains(&self, agent: AgentId) -> bool {
        self.position_of(agent).is_some()
    }

    /// Number of placed agents.
    fn agent_count(&self) -> usize;
}

impl<C: Cell> Space for Grid<C> {
    type Position = Coord;

    fn place(&mut self, agent: AgentId, pos: Coord) -> Result<Coord, SpaceError> {
        Self::place(self, agent, pos)
    }

    fn move_agent(&mut self, agent: AgentId, pos: Coord) -> Result<Coord, SpaceError> {
        Self::move_agent(self, agent, pos)
    }

    fn remove(&mut self, agent: AgentId) -> Result<Coord, SpaceError> {
        Self::remove(self, agent)
    }

    fn position_of(&self, agent: AgentId) -> Option<Coord> {
        Self::position_of(self, agent)
    }

    fn agent_count(&self) -> usize {
        Self::agent_count(self)
    }
}

impl Space for SingleGrid {
    type Position = Coord;

    fn place(&mut self, agent: AgentId, pos: Coord) -> Result<Coord, SpaceError> {
        Self::place(self, agent, pos)
    }

    fn move_agent(&mut self, agent: AgentId, pos: Coord) -> Result<Coord, SpaceError> {
        Self::move_agent(self, agent, pos)
    }

    fn remove(&mut self, agent: AgentId) -> Result<Coord, SpaceError> {
        Self::remove(self, agent)
    }

    fn position_of(&self, agent: AgentId) -> Option<Coord> {
        Self::position_of(self, agent)
    }

    fn agent_count(&self) -> usize {
        Self::agent_count(self)
    }
}

impl Space for ContinuousSpace {
    type Position = Point;

    fn place(&mut self, agent: AgentId, pos: Point) -> Result<Point, SpaceError> {
        Self::place(self, agent, pos)
    }

    fn move_agent(&mut self, agent: AgentId, pos: Point) -> Result<Point, SpaceError> {
        Self::move_agent(self, agent, pos)
    }

    fn remove(&mut self, agent: AgentId) -> Result<Point, SpaceError> {
        Self::remove(self, agent)
    }

    fn position_of(&self, agent: AgentId) -> Option<Point> {
        Self::position_of(self, agent)
    }

    fn agent_count(&self) -> usize {
        Self::agent_count(self)
    }
}
