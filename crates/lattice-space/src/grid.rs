//! Rectangular cell space with optional toroidal wrap.
//!
//! A [`Grid`] is a `width × height` array of cells stored row-major
//! (`index = y * width + x`). The cell type decides occupancy:
//!
//! - `Grid<Slot>` (the default, also just `Grid`) holds at most one agent
//!   per cell.
//! - [`MultiGrid`] (`Grid<Bucket>`) holds a set of agents per cell.
//!
//! The grid also owns the position index for every placed agent. An agent's
//! recorded position always equals the coordinate of the cell that contains
//! it: both are written by the same call and no other path mutates either.
//!
//! # Wrap
//!
//! On a toroidal grid every coordinate is reduced modulo the grid extent per
//! axis, so `(-1, 0)` on a 5-wide grid is `(4, 0)`. On a bounded grid such a
//! coordinate is rejected with [`SpaceError::OutOfBounds`].

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use lattice_types::{AgentId, Coord, NeighborhoodKind};

use crate::cell::{Bucket, Cell, Slot};
use crate::error::SpaceError;
use crate::neighborhood;

/// A grid whose cells each hold a set of agents.
pub type MultiGrid = Grid<Bucket>;

/// A rectangular grid of cells with a per-agent position index.
#[derive(Debug, Clone)]
pub struct Grid<C = Slot> {
    /// Number of columns.
    width: u32,
    /// Number of rows.
    height: u32,
    /// Whether opposite edges are joined.
    torus: bool,
    /// Cell storage, row-major.
    cells: Vec<C>,
    /// Current cell of every placed agent.
    positions: BTreeMap<AgentId, Coord>,
}

impl<C: Cell> Grid<C> {
    /// Create an empty grid of `width` columns and `height` rows.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::InvalidDimensions`] if either dimension is zero
    /// or the cell count does not fit in memory addressing.
    pub fn new(width: u32, height: u32, torus: bool) -> Result<Self, SpaceError> {
        if width == 0 || height == 0 {
            return Err(SpaceError::InvalidDimensions {
                reason: format!("grid must be at least 1x1, got {width}x{height}"),
            });
        }
        let count = u64::from(width)
            .checked_mul(u64::from(height))
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| SpaceError::InvalidDimensions {
                reason: format!("{width}x{height} cells exceed addressable memory"),
            })?;
        let mut cells = Vec::with_capacity(count);
        cells.resize_with(count, C::default);
        Ok(Self {
            width,
            height,
            torus,
            cells,
            positions: BTreeMap::new(),
        })
    }

    /// Number of columns.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Whether the grid wraps at its edges.
    pub const fn is_torus(&self) -> bool {
        self.torus
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of agents currently placed.
    pub fn agent_count(&self) -> usize {
        self.positions.len()
    }

    // -------------------------------------------------------------------
    // Coordinates
    // -------------------------------------------------------------------

    /// Whether `pos` lies outside `[0, width) × [0, height)`.
    ///
    /// Wrap is not applied: on a torus `(-1, 0)` is still reported as out
    /// of bounds even though [`torus_adjust`](Self::torus_adjust) accepts it.
    pub fn out_of_bounds(&self, pos: Coord) -> bool {
        pos.x < 0
            || pos.y < 0
            || pos.x >= i64::from(self.width)
            || pos.y >= i64::from(self.height)
    }

    /// Bring `pos` onto the grid.
    ///
    /// In-bounds coordinates are returned unchanged. On a torus the others
    /// wrap per axis; on a bounded grid they are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::OutOfBounds`] for an off-grid coordinate on a
    /// non-toroidal grid.
    pub fn torus_adjust(&self, pos: Coord) -> Result<Coord, SpaceError> {
        if !self.out_of_bounds(pos) {
            return Ok(pos);
        }
        if !self.torus {
            return Err(SpaceError::OutOfBounds(pos.into()));
        }
        Ok(self.wrap(pos))
    }

    /// Wrap both axes modulo the grid extent.
    fn wrap(&self, pos: Coord) -> Coord {
        Coord::new(
            pos.x.rem_euclid(i64::from(self.width)),
            pos.y.rem_euclid(i64::from(self.height)),
        )
    }

    /// Row-major storage index of an in-bounds coordinate.
    pub(crate) fn index(&self, pos: Coord) -> Option<usize> {
        cell_index(self.width, self.height, pos)
    }

    // -------------------------------------------------------------------
    // Cell access
    // -------------------------------------------------------------------

    /// The cell at `pos`, or `None` if `pos` is off the grid.
    pub fn cell(&self, pos: Coord) -> Option<&C> {
        self.index(pos).and_then(|i| self.cells.get(i))
    }

    /// Whether the cell at `pos` holds no agents.
    ///
    /// Off-grid coordinates hold nothing and report `true`.
    pub fn is_cell_empty(&self, pos: Coord) -> bool {
        self.cell(pos).is_none_or(Cell::is_empty)
    }

    /// The recorded cell of `agent`, if it is placed.
    pub fn position_of(&self, agent: AgentId) -> Option<Coord> {
        self.positions.get(&agent).copied()
    }

    /// Whether `agent` is placed on this grid.
    pub fn contains(&self, agent: AgentId) -> bool {
        self.positions.contains_key(&agent)
    }

    /// Iterate over every cell with its coordinate, row by row.
    ///
    /// Yields `(content, x, y)`; this is the enumeration consumed by
    /// visualizers.
    pub fn coord_iter(&self) -> impl Iterator<Item = (&C, i64, i64)> + '_ {
        let width = i64::from(self.width);
        (0..i64::from(self.height)).flat_map(move |y| {
            (0..width).filter_map(move |x| self.cell(Coord::new(x, y)).map(|c| (c, x, y)))
        })
    }

    /// Iterate over all placed agents and their cells.
    pub fn placements(&self) -> impl Iterator<Item = (AgentId, Coord)> + '_ {
        self.positions.iter().map(|(&agent, &pos)| (agent, pos))
    }

    // -------------------------------------------------------------------
    // Placement
    // -------------------------------------------------------------------

    /// Place a new agent at `pos` and record its position.
    ///
    /// Returns the coordinate actually used (wrapped on a torus).
    ///
    /// # Errors
    ///
    /// - [`SpaceError::OutOfBounds`] if `pos` is off a bounded grid.
    /// - [`SpaceError::AlreadyPlaced`] if the agent is already on the grid.
    /// - [`SpaceError::CellOccupied`] if the cell is single-occupancy and
    ///   taken.
    pub fn place(&mut self, agent: AgentId, pos: Coord) -> Result<Coord, SpaceError> {
        let target = self.torus_adjust(pos)?;
        if let Some(current) = self.position_of(agent) {
            return Err(SpaceError::AlreadyPlaced {
                agent,
                position: current.into(),
            });
        }
        let cell = self.cell_mut(target)?;
        if let Some(occupant) = cell.blocker(agent) {
            return Err(SpaceError::CellOccupied {
                coord: target,
                occupant,
            });
        }
        cell.insert(agent);
        self.positions.insert(agent, target);
        Ok(target)
    }

    /// Move a placed agent to `pos`.
    ///
    /// The destination is fully validated before the source cell is
    /// touched, so on error the grid is unchanged. Returns the coordinate
    /// actually used. Moving onto the agent's own cell is a no-op.
    ///
    /// # Errors
    ///
    /// - [`SpaceError::AgentNotFound`] if the agent is not placed.
    /// - [`SpaceError::OutOfBounds`] if `pos` is off a bounded grid.
    /// - [`SpaceError::CellOccupied`] if the destination is single-occupancy
    ///   and taken by another agent.
    pub fn move_agent(&mut self, agent: AgentId, pos: Coord) -> Result<Coord, SpaceError> {
        let from = self
            .position_of(agent)
            .ok_or(SpaceError::AgentNotFound(agent))?;
        let to = self.torus_adjust(pos)?;
        if from == to {
            return Ok(to);
        }

        // Validate destination and source before mutating either.
        if let Some(occupant) = self.cell(to).and_then(|c| c.blocker(agent)) {
            return Err(SpaceError::CellOccupied { coord: to, occupant });
        }
        if !self.cell(from).is_some_and(|c| c.contains(agent)) {
            return Err(SpaceError::AgentNotFound(agent));
        }

        self.cell_mut(from)?.remove(agent);
        self.cell_mut(to)?.insert(agent);
        self.positions.insert(agent, to);
        Ok(to)
    }

    /// Remove an agent from the grid, returning the cell it vacated.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::AgentNotFound`] if the agent is not placed or
    /// is not a member of its recorded cell.
    pub fn remove(&mut self, agent: AgentId) -> Result<Coord, SpaceError> {
        let from = self
            .position_of(agent)
            .ok_or(SpaceError::AgentNotFound(agent))?;
        if !self.cell_mut(from)?.remove(agent) {
            return Err(SpaceError::AgentNotFound(agent));
        }
        self.positions.remove(&agent);
        Ok(from)
    }

    fn cell_mut(&mut self, pos: Coord) -> Result<&mut C, SpaceError> {
        self.index(pos)
            .and_then(|i| self.cells.get_mut(i))
            .ok_or(SpaceError::OutOfBounds(pos.into()))
    }

    // -------------------------------------------------------------------
    // Neighborhood queries
    // -------------------------------------------------------------------

    /// Coordinates in the neighborhood of `pos`.
    ///
    /// Offsets come from [`neighborhood::offsets`]. Each is applied to `pos`
    /// and then wrapped on a torus or discarded when off a bounded grid.
    /// Duplicates, which wrap produces when an axis is shorter than
    /// `2 * radius + 1`, are dropped keeping the first occurrence.
    ///
    /// Offsets are only generated inside a window per axis, so the cost is
    /// bounded by the grid size whatever the radius. On a bounded grid the
    /// window is the part of the grid within reach. On a torus `|d|` is
    /// capped at the axis extent: every wrapped cell the radius reaches is
    /// still reached by some offset in that range, and the shape test runs
    /// on that offset.
    pub fn neighborhood(
        &self,
        pos: Coord,
        kind: NeighborhoodKind,
        include_center: bool,
        radius: u32,
    ) -> Vec<Coord> {
        let xs = self.window(pos.x, self.width, radius);
        let ys = self.window(pos.y, self.height, radius);
        self.resolve(
            pos,
            neighborhood::offsets(kind, include_center, radius, xs, ys),
        )
    }

    /// Offsets along one axis worth generating around `origin`.
    fn window(&self, origin: i64, extent: u32, radius: u32) -> RangeInclusive<i64> {
        let r = i64::from(radius);
        let extent = i64::from(extent);
        if self.torus {
            let reach = r.min(extent);
            return reach.saturating_neg()..=reach;
        }
        let lo = origin.saturating_neg().max(r.saturating_neg());
        let hi = extent
            .saturating_sub(1)
            .saturating_sub(origin)
            .min(r);
        lo..=hi
    }

    /// Agents in the neighborhood of `pos`.
    ///
    /// The coordinates are computed up front; the returned iterator then
    /// walks their non-empty cells lazily. It holds a shared borrow of the
    /// grid, so no agent can move while it is alive. Clone it to restart.
    pub fn neighbors(
        &self,
        pos: Coord,
        kind: NeighborhoodKind,
        include_center: bool,
        radius: u32,
    ) -> impl Iterator<Item = AgentId> + Clone + '_ {
        let coords = self.neighborhood(pos, kind, include_center, radius);
        self.cell_list_contents(coords)
    }

    /// Agents in the given cells, skipping empty and off-grid cells.
    pub fn cell_list_contents(
        &self,
        cells: Vec<Coord>,
    ) -> impl Iterator<Item = AgentId> + Clone + '_ {
        cells
            .into_iter()
            .filter_map(move |pos| self.cell(pos))
            .filter(|cell| !cell.is_empty())
            .flat_map(|cell| cell.agents())
    }

    /// Coordinates of the `(2 * rx + 1) × (2 * ry + 1)` block around `pos`,
    /// center included, with the same wrap and dedup rules as
    /// [`neighborhood`](Self::neighborhood).
    pub(crate) fn block(&self, pos: Coord, rx: u32, ry: u32) -> Vec<Coord> {
        self.resolve(pos, neighborhood::block_offsets(rx, ry))
    }

    fn resolve(&self, pos: Coord, offsets: Vec<(i64, i64)>) -> Vec<Coord> {
        let mut seen = BTreeSet::new();
        let mut coords = Vec::with_capacity(offsets.len());
        for (dx, dy) in offsets {
            let Some(candidate) = pos.offset(dx, dy) else {
                continue;
            };
            let resolved = if self.torus {
                self.wrap(candidate)
            } else if self.out_of_bounds(candidate) {
                continue;
            } else {
                candidate
            };
            if seen.insert(resolved) {
                coords.push(resolved);
            }
        }
        coords
    }
}

/// Row-major index of `pos` in a `width × height` grid, or `None` if the
/// coordinate is off the grid.
pub(crate) fn cell_index(width: u32, height: u32, pos: Coord) -> Option<usize> {
    let x = u64::try_from(pos.x).ok()?;
    let y = u64::try_from(pos.y).ok()?;
    if x >= u64::from(width) || y >= u64::from(height) {
        return None;
    }
    let flat = y.checked_mul(u64::from(width))?.checked_add(x)?;
    usize::try_from(flat).ok()
}
