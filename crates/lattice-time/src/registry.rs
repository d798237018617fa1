//! The ordered list of agents a scheduler activates.

use std::collections::BTreeMap;

use lattice_types::AgentId;
use rand::Rng;
use rand::seq::SliceRandom;

/// Agents registered with a scheduler, in activation order.
///
/// An id may appear more than once, in which case it is activated once per
/// occurrence. A multiplicity count is kept alongside the order so that
/// membership checks during a tick do not scan the list.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Activation order.
    order: Vec<AgentId>,
    /// Number of occurrences of each id in `order`.
    counts: BTreeMap<AgentId, usize>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `agent` to the end of the activation order.
    pub fn add(&mut self, agent: AgentId) {
        self.order.push(agent);
        let count = self.counts.entry(agent).or_default();
        *count = count.saturating_add(1);
    }

    /// Remove every occurrence of `agent`, returning how many there were.
    pub fn remove(&mut self, agent: AgentId) -> usize {
        let Some(count) = self.counts.remove(&agent) else {
            return 0;
        };
        self.order.retain(|&registered| registered != agent);
        count
    }

    /// Whether `agent` is registered at least once.
    pub fn contains(&self, agent: AgentId) -> bool {
        self.counts.contains_key(&agent)
    }

    /// Number of registrations, counting duplicates.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The activation order.
    pub fn as_slice(&self) -> &[AgentId] {
        &self.order
    }

    /// A copy of the current activation order, for iterating while the
    /// live registry changes.
    pub fn snapshot(&self) -> Vec<AgentId> {
        self.order.clone()
    }

    /// Shuffle the activation order uniformly.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order.shuffle(rng);
    }
}
