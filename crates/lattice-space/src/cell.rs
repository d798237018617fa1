//! Cell contents for grid spaces.
//!
//! A [`Cell`] is the value stored at each grid coordinate. Two kinds exist:
//!
//! - [`Slot`] -- holds at most one agent; used by [`Grid`] and
//!   [`SingleGrid`].
//! - [`Bucket`] -- holds a set of agents; used by [`MultiGrid`].
//!
//! [`Grid`]: crate::grid::Grid
//! [`SingleGrid`]: crate::single::SingleGrid
//! [`MultiGrid`]: crate::grid::MultiGrid

use std::collections::BTreeSet;

use lattice_types::AgentId;

/// Storage behaviour of a single grid cell.
///
/// The default value is the empty cell.
pub trait Cell: Default + core::fmt::Debug + Clone {
    /// Whether the cell holds no agents.
    fn is_empty(&self) -> bool;

    /// Return the agent that prevents `agent` from entering, if any.
    ///
    /// Single-occupancy cells report their current occupant; multi-occupancy
    /// cells never block.
    fn blocker(&self, agent: AgentId) -> Option<AgentId>;

    /// Insert an agent. Callers check [`blocker`](Cell::blocker) first.
    fn insert(&mut self, agent: AgentId);

    /// Remove an agent, returning whether it was present.
    fn remove(&mut self, agent: AgentId) -> bool;

    /// Whether the agent is in this cell.
    fn contains(&self, agent: AgentId) -> bool;

    /// Number of agents in this cell.
    fn len(&self) -> usize;

    /// Iterate over the agents in this cell.
    fn agents(&self) -> impl Iterator<Item = AgentId> + Clone + '_;
}

/// A cell that holds at most one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slot(Option<AgentId>);

impl Slot {
    /// The agent in this slot, if any.
    pub const fn occupant(&self) -> Option<AgentId> {
        self.0
    }
}

impl Cell for Slot {
    fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    fn blocker(&self, agent: AgentId) -> Option<AgentId> {
        self.0.filter(|&occupant| occupant != agent)
    }

    fn insert(&mut self, agent: AgentId) {
        self.0 = Some(agent);
    }

    fn remove(&mut self, agent: AgentId) -> bool {
        if self.0 == Some(agent) {
            self.0 = None;
            true
        } else {
            false
        }
    }

    fn contains(&self, agent: AgentId) -> bool {
        self.0 == Some(agent)
    }

    fn len(&self) -> usize {
        usize::from(self.0.is_some())
    }

    fn agents(&self) -> impl Iterator<Item = AgentId> + Clone + '_ {
        self.0.into_iter()
    }
}

/// A cell that holds any number of distinct agents.
///
/// Backed by an ordered set so enumeration is deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket(BTreeSet<AgentId>);

impl Bucket {
    /// Borrow the underlying agent set.
    pub const fn as_set(&self) -> &BTreeSet<AgentId> {
        &self.0
    }
}

impl Cell for Bucket {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn blocker(&self, _agent: AgentId) -> Option<AgentId> {
        None
    }

    fn insert(&mut self, agent: AgentId) {
        self.0.insert(agent);
    }

    fn remove(&mut self, agent: AgentId) -> bool {
        self.0.remove(&agent)
    }

    fn contains(&self, agent: AgentId) -> bool {
        self.0.contains(&agent)
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn agents(&self) -> impl Iterator<Item = AgentId> + Clone + '_ {
        self.0.iter().copied()
    }
}
