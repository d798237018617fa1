//! Index of empty cells for single-occupancy grids.
//!
//! Empty coordinates live in a dense vector; a second vector, addressed by
//! the cell's row-major index, stores where each coordinate sits in the
//! first. Removal swaps the last entry into the hole, so insert, remove,
//! membership, and uniform random choice are all O(1).

use lattice_types::Coord;
use rand::Rng;

use crate::grid::cell_index;

/// The set of currently empty cells of a grid.
#[derive(Debug, Clone)]
pub struct FreeCells {
    /// Grid width, for row-major indexing.
    width: u32,
    /// Grid height, for bounds checks.
    height: u32,
    /// Empty coordinates in arbitrary order.
    entries: Vec<Coord>,
    /// For each cell index, its position in `entries` when empty.
    slot_of: Vec<Option<usize>>,
}

impl FreeCells {
    /// An index in which every cell of a `width × height` grid is empty.
    ///
    /// Cells are listed column by column (`x` outer, `y` inner).
    pub fn all(width: u32, height: u32) -> Self {
        let mut free = Self {
            width,
            height,
            entries: Vec::new(),
            slot_of: Vec::new(),
        };
        let count = u64::from(width)
            .checked_mul(u64::from(height))
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        free.entries.reserve(count);
        free.slot_of.resize(count, None);
        for x in 0..i64::from(width) {
            for y in 0..i64::from(height) {
                let _ = free.insert(Coord::new(x, y));
            }
        }
        free
    }

    /// Number of empty cells.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no empty cell remains.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `pos` is currently empty.
    pub fn contains(&self, pos: Coord) -> bool {
        self.slot(pos).is_some()
    }

    /// Mark `pos` as empty. Returns `false` if it already was, or if it is
    /// off the grid.
    pub fn insert(&mut self, pos: Coord) -> bool {
        let Some(index) = cell_index(self.width, self.height, pos) else {
            return false;
        };
        let at = self.entries.len();
        match self.slot_of.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(at);
                self.entries.push(pos);
                true
            }
            _ => false,
        }
    }

    /// Mark `pos` as occupied. Returns `false` if it was not empty.
    pub fn remove(&mut self, pos: Coord) -> bool {
        let Some(index) = cell_index(self.width, self.height, pos) else {
            return false;
        };
        let Some(at) = self.slot_of.get_mut(index).and_then(Option::take) else {
            return false;
        };
        self.entries.swap_remove(at);
        // The former last entry now sits at `at`; repoint it.
        if let Some(&moved) = self.entries.get(at)
            && let Some(moved_index) = cell_index(self.width, self.height, moved)
            && let Some(slot) = self.slot_of.get_mut(moved_index)
        {
            *slot = Some(at);
        }
        true
    }

    /// A uniformly chosen empty cell, or `None` if the grid is full.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Coord> {
        if self.entries.is_empty() {
            return None;
        }
        let at = rng.random_range(0..self.entries.len());
        self.entries.get(at).copied()
    }

    /// Iterate over the empty cells in internal order.
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.entries.iter().copied()
    }

    fn slot(&self, pos: Coord) -> Option<usize> {
        cell_index(self.width, self.height, pos)
            .and_then(|index| self.slot_of.get(index).copied().flatten())
    }
}
