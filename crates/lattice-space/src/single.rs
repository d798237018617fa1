//! Single-occupancy grid with free-cell tracking.
//!
//! [`SingleGrid`] is a [`Grid`] of [`Slot`] cells plus a [`FreeCells`]
//! index. Every placement, move, and removal updates both together, so the
//! free set and the occupied set always partition the grid.

use lattice_types::{AgentId, Coord, NeighborhoodKind};
use rand::Rng;
use tracing::{trace, warn};

use crate::cell::Slot;
use crate::error::SpaceError;
use crate::free_cells::FreeCells;
use crate::grid::Grid;

/// A grid where each cell holds at most one agent and empty cells can be
/// drawn at random.
#[derive(Debug, Clone)]
pub struct SingleGrid {
    /// The underlying cells and position index.
    grid: Grid<Slot>,
    /// Every cell not holding an agent.
    free: FreeCells,
}

impl SingleGrid {
    /// Create an empty grid of `width` columns and `height` rows.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: u32, height: u32, torus: bool) -> Result<Self, SpaceError> {
        let grid = Grid::new(width, height, torus)?;
        Ok(Self {
            grid,
            free: FreeCells::all(width, height),
        })
    }

    /// Read-only view of the underlying grid.
    pub const fn grid(&self) -> &Grid<Slot> {
        &self.grid
    }

    /// Number of columns.
    pub const fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Number of rows.
    pub const fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Whether the grid wraps at its edges.
    pub const fn is_torus(&self) -> bool {
        self.grid.is_torus()
    }

    /// Number of agents currently placed.
    pub fn agent_count(&self) -> usize {
        self.grid.agent_count()
    }

    /// Whether `pos` lies outside the grid.
    pub fn out_of_bounds(&self, pos: Coord) -> bool {
        self.grid.out_of_bounds(pos)
    }

    /// Bring `pos` onto the grid; see [`Grid::torus_adjust`].
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::OutOfBounds`] on a bounded grid.
    pub fn torus_adjust(&self, pos: Coord) -> Result<Coord, SpaceError> {
        self.grid.torus_adjust(pos)
    }

    /// The agent at `pos`, if any.
    pub fn occupant(&self, pos: Coord) -> Option<AgentId> {
        self.grid.cell(pos).and_then(Slot::occupant)
    }

    /// Whether the cell at `pos` is empty.
    pub fn is_cell_empty(&self, pos: Coord) -> bool {
        self.grid.is_cell_empty(pos)
    }

    /// The recorded cell of `agent`, if placed.
    pub fn position_of(&self, agent: AgentId) -> Option<Coord> {
        self.grid.position_of(agent)
    }

    /// Whether `agent` is placed on this grid.
    pub fn contains(&self, agent: AgentId) -> bool {
        self.grid.contains(agent)
    }

    // -------------------------------------------------------------------
    // Free cells
    // -------------------------------------------------------------------

    /// Whether at least one cell is empty.
    pub fn exists_empty_cells(&self) -> bool {
        !self.free.is_empty()
    }

    /// Number of empty cells.
    pub fn empty_count(&self) -> usize {
        self.free.len()
    }

    /// Iterate over the empty cells (no particular order).
    pub fn empties(&self) -> impl Iterator<Item = Coord> + '_ {
        self.free.iter()
    }

    /// A uniformly chosen empty cell.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::GridFull`] if every cell is occupied.
    pub fn find_random_empty<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Coord, SpaceError> {
        self.free.choose(rng).ok_or(SpaceError::GridFull)
    }

    // -------------------------------------------------------------------
    // Placement
    // -------------------------------------------------------------------

    /// Place a new agent at `pos`; see [`Grid::place`].
    ///
    /// # Errors
    ///
    /// [`SpaceError::OutOfBounds`], [`SpaceError::AlreadyPlaced`] or
    /// [`SpaceError::CellOccupied`].
    pub fn place(&mut self, agent: AgentId, pos: Coord) -> Result<Coord, SpaceError> {
        let at = self.grid.place(agent, pos)?;
        self.claim(at);
        trace!(%agent, pos = %at, free = self.free.len(), "agent placed");
        Ok(at)
    }

    /// Place a new agent at `pos`, or at a random empty cell when `pos` is
    /// `None`.
    ///
    /// # Errors
    ///
    /// [`SpaceError::GridFull`] when no position is given and the grid has
    /// no empty cell, plus the errors of [`place`](Self::place).
    pub fn position_agent<R: Rng + ?Sized>(
        &mut self,
        agent: AgentId,
        pos: Option<Coord>,
        rng: &mut R,
    ) -> Result<Coord, SpaceError> {
        let target = match pos {
            Some(pos) => pos,
            None => self.find_random_empty(rng)?,
        };
        self.place(agent, target)
    }

    /// Move a placed agent to `pos`; see [`Grid::move_agent`].
    ///
    /// # Errors
    ///
    /// [`SpaceError::AgentNotFound`], [`SpaceError::OutOfBounds`] or
    /// [`SpaceError::CellOccupied`]. The grid is unchanged on error.
    pub fn move_agent(&mut self, agent: AgentId, pos: Coord) -> Result<Coord, SpaceError> {
        let from = self
            .grid
            .position_of(agent)
            .ok_or(SpaceError::AgentNotFound(agent))?;
        let to = self.grid.move_agent(agent, pos)?;
        if from != to {
            self.release(from);
            self.claim(to);
        }
        Ok(to)
    }

    /// Move a placed agent to a uniformly chosen empty cell.
    ///
    /// # Errors
    ///
    /// [`SpaceError::GridFull`] if no cell is empty, or
    /// [`SpaceError::AgentNotFound`] if the agent is not placed.
    pub fn move_to_empty<R: Rng + ?Sized>(
        &mut self,
        agent: AgentId,
        rng: &mut R,
    ) -> Result<Coord, SpaceError> {
        if !self.contains(agent) {
            return Err(SpaceError::AgentNotFound(agent));
        }
        let target = self.find_random_empty(rng)?;
        self.move_agent(agent, target)
    }

    /// Remove an agent, returning the freed cell.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::AgentNotFound`] if the agent is not placed.
    pub fn remove(&mut self, agent: AgentId) -> Result<Coord, SpaceError> {
        let from = self.grid.remove(agent)?;
        self.release(from);
        trace!(%agent, pos = %from, free = self.free.len(), "agent removed");
        Ok(from)
    }

    /// Take `pos` out of the free index after it became occupied.
    ///
    /// Returns `false`, and logs, if the cell was not listed as free.
    fn claim(&mut self, pos: Coord) -> bool {
        let listed = self.free.remove(pos);
        if !listed {
            warn!(pos = %pos, "occupied cell was missing from the free index");
        }
        listed
    }

    /// Put `pos` back in the free index after it was vacated.
    ///
    /// Returns `false`, and logs, if the cell was already listed as free.
    fn release(&mut self, pos: Coord) -> bool {
        let fresh = self.free.insert(pos);
        if !fresh {
            warn!(pos = %pos, "vacated cell was already in the free index");
        }
        fresh
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Coordinates around `pos`; see [`Grid::neighborhood`].
    pub fn neighborhood(
        &self,
        pos: Coord,
        kind: NeighborhoodKind,
        include_center: bool,
        radius: u32,
    ) -> Vec<Coord> {
        self.grid.neighborhood(pos, kind, include_center, radius)
    }

    /// Agents around `pos`; see [`Grid::neighbors`].
    pub fn neighbors(
        &self,
        pos: Coord,
        kind: NeighborhoodKind,
        include_center: bool,
        radius: u32,
    ) -> impl Iterator<Item = AgentId> + Clone + '_ {
        self.grid.neighbors(pos, kind, include_center, radius)
    }

    /// Iterate over `(occupant, x, y)` for every cell, row by row.
    pub fn coord_iter(&self) -> impl Iterator<Item = (Option<AgentId>, i64, i64)> + '_ {
        self.grid
            .coord_iter()
            .map(|(cell, x, y)| (cell.occupant(), x, y))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn id(n: u64) -> AgentId {
        AgentId::new(n)
    }

    /// Check the occupancy partition against a full scan of the grid.
    fn assert_partition(g: &SingleGrid) {
        let mut occupied = 0_usize;
        for (occupant, x, y) in g.coord_iter() {
            let pos = Coord::new(x, y);
            match occupant {
                Some(agent) => {
                    occupied = occupied.saturating_add(1);
                    assert!(!g.free.contains(pos), "{pos} occupied but listed free");
                    assert_eq!(g.position_of(agent), Some(pos));
                }
                None => assert!(g.free.contains(pos), "{pos} empty but not listed free"),
            }
        }
        assert_eq!(occupied, g.agent_count());
        let total = usize::try_from(u64::from(g.width()) * u64::from(g.height())).unwrap();
        assert_eq!(g.empty_count().saturating_add(occupied), total);
    }

    #[test]
    fn new_grid_is_all_free() {
        let g = SingleGrid::new(4, 3, false).unwrap();
        assert_eq!(g.empty_count(), 12);
        assert!(g.exists_empty_cells());
        assert_partition(&g);
    }

    #[test]
    fn place_and_remove_update_free_cells() {
        let mut g = SingleGrid::new(3, 3, false).unwrap();
        g.place(id(1), Coord::new(1, 1)).unwrap();
        assert_eq!(g.empty_count(), 8);
        assert_eq!(g.occupant(Coord::new(1, 1)), Some(id(1)));
        assert_partition(&g);

        g.remove(id(1)).unwrap();
        assert_eq!(g.empty_count(), 9);
        assert_partition(&g);
    }

    #[test]
    fn free_index_mismatch_is_reported_and_repaired() {
        let mut g = SingleGrid::new(3, 3, false).unwrap();
        let pos = Coord::new(2, 0);

        // Listed-free cell claimed once, then a second claim finds it gone.
        assert!(g.claim(pos));
        assert!(!g.claim(pos));
        assert!(g.release(pos));
        assert!(!g.release(pos));
        assert_partition(&g);

        // A cell dropped from the index out of band still places cleanly.
        assert!(g.free.remove(pos));
        g.place(id(1), pos).unwrap();
        assert_partition(&g);
        g.remove(id(1)).unwrap();
        assert_partition(&g);
    }

    #[test]
    fn occupied_cell_rejects_second_agent() {
        let mut g = SingleGrid::new(2, 2, false).unwrap();
        g.place(id(1), Coord::new(0, 0)).unwrap();
        assert!(matches!(
            g.place(id(2), Coord::new(0, 0)),
            Err(SpaceError::CellOccupied { .. })
        ));
        assert_partition(&g);
    }

    #[test]
    fn full_grid_reports_grid_full() {
        let mut g = SingleGrid::new(2, 1, false).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        g.position_agent(id(1), None, &mut rng).unwrap();
        g.position_agent(id(2), None, &mut rng).unwrap();
        assert!(!g.exists_empty_cells());
        assert!(matches!(
            g.find_random_empty(&mut rng),
            Err(SpaceError::GridFull)
        ));
        assert!(matches!(
            g.position_agent(id(3), None, &mut rng),
            Err(SpaceError::GridFull)
        ));
        assert_partition(&g);
    }

    #[test]
    fn move_to_empty_vacates_old_cell() {
        let mut g = SingleGrid::new(3, 3, true).unwrap();
        let mut rng = SmallRng::seed_from_u64(11);
        g.place(id(1), Coord::new(0, 0)).unwrap();
        let to = g.move_to_empty(id(1), &mut rng).unwrap();
        assert_ne!(to, Coord::new(0, 0));
        assert!(g.is_cell_empty(Coord::new(0, 0)));
        assert_eq!(g.position_of(id(1)), Some(to));
        assert_partition(&g);
    }

    #[test]
    fn failed_move_keeps_free_set() {
        let mut g = SingleGrid::new(3, 1, false).unwrap();
        g.place(id(1), Coord::new(0, 0)).unwrap();
        g.place(id(2), Coord::new(1, 0)).unwrap();
        assert!(g.move_agent(id(1), Coord::new(1, 0)).is_err());
        assert!(g.move_agent(id(1), Coord::new(5, 0)).is_err());
        assert_eq!(g.position_of(id(1)), Some(Coord::new(0, 0)));
        assert_partition(&g);
    }

    #[test]
    fn random_operation_sequences_preserve_partition() {
        let mut rng = SmallRng::seed_from_u64(2024);
        let mut g = SingleGrid::new(5, 4, true).unwrap();
        for step in 0..2000_u64 {
            let agent = id(rng.random_range(0..30));
            let pos = Coord::new(rng.random_range(-3..8), rng.random_range(-3..7));
            // Errors are expected (occupied cells, unplaced agents); the
            // invariant must hold either way.
            let _ = match rng.random_range(0..4) {
                0 => g.place(agent, pos),
                1 => g.move_agent(agent, pos),
                2 => g.remove(agent),
                _ => g.move_to_empty(agent, &mut rng),
            };
            assert!(g.empty_count() <= 20, "step {step}");
            assert_partition(&g);
        }
    }
}
