//! Type-safe agent identifier.
//!
//! Agents are numbered sequentially by the owning model rather than drawn
//! from a random source, so two runs with the same seed allocate the same
//! identifiers in the same order. Ordered collections keyed by [`AgentId`]
//! therefore iterate identically across replays.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Unique identifier for an agent in the simulation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct AgentId(pub u64);

impl AgentId {
    /// Create an identifier from a raw sequence number.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the inner sequence number.
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// Return the identifier that follows this one, or `None` on overflow.
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }
}

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

impl From<u64> for AgentId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<AgentId> for u64 {
    fn from(id: AgentId) -> Self {
        id.0
    }
}
