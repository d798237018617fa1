//! What an agent sees while it acts.

use std::collections::BTreeMap;

use lattice_space::Space;
use lattice_time::{Registry, TickClock};
use lattice_types::AgentId;
use rand::rngs::StdRng;

use crate::agent::AgentError;

/// Agent store plus the id allocator.
#[derive(Debug, Clone)]
pub(crate) struct Population<A> {
    /// Every live agent, except the one currently acting.
    pub(crate) agents: BTreeMap<AgentId, A>,
    /// Next id to hand out.
    pub(crate) next_id: AgentId,
}

impl<A> Population<A> {
    pub(crate) const fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
            next_id: AgentId::new(0),
        }
    }

    /// Allocate a fresh id and store `agent` under it.
    pub(crate) fn insert(&mut self, agent: A) -> Result<AgentId, AgentError> {
        let id = self.next_id;
        self.next_id = id.next().ok_or(AgentError::IdsExhausted)?;
        self.agents.insert(id, agent);
        Ok(id)
    }
}

/// The model as seen from inside one agent's activation.
///
/// The acting agent is lent out of the store for the duration of the call,
/// so [`agent`](Self::agent) and [`others`](Self::others) never return it.
pub struct AgentContext<'m, A, S> {
    /// The acting agent.
    id: AgentId,
    /// The model's space.
    space: &'m mut S,
    /// Every other agent.
    population: &'m mut Population<A>,
    /// The model's random source.
    rng: &'m mut StdRng,
    /// The schedule's live registry.
    registry: &'m mut Registry,
    /// Counters as of this activation.
    clock: &'m TickClock,
    /// Whether the acting agent retired itself.
    retired_self: bool,
}

impl<'m, A, S: Space> AgentContext<'m, A, S> {
    pub(crate) const fn new(
        id: AgentId,
        space: &'m mut S,
        population: &'m mut Population<A>,
        rng: &'m mut StdRng,
        registry: &'m mut Registry,
        clock: &'m TickClock,
    ) -> Self {
        Self {
            id,
            space,
            population,
            rng,
            registry,
            clock,
            retired_self: false,
        }
    }

    /// Id of the acting agent.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// The space.
    pub const fn space(&self) -> &S {
        &*self.space
    }

    /// The space, for moves.
    pub const fn space_mut(&mut self) -> &mut S {
        &mut *self.space
    }

    /// Position of the acting agent, if placed.
    pub fn position(&self) -> Option<S::Position> {
        self.space.position_of(self.id)
    }

    /// Another agent by id.
    pub fn agent(&self, id: AgentId) -> Option<&A> {
        self.population.agents.get(&id)
    }

    /// Every other agent, in id order.
    pub fn others(&self) -> impl Iterator<Item = (AgentId, &A)> + '_ {
        self.population.agents.iter().map(|(&id, agent)| (id, agent))
    }

    /// The model's random source.
    pub const fn rng(&mut self) -> &mut StdRng {
        &mut *self.rng
    }

    /// The space and random source together, for random placement.
    pub const fn space_and_rng(&mut self) -> (&mut S, &mut StdRng) {
        (&mut *self.space, &mut *self.rng)
    }

    /// Agents currently registered with the schedule.
    pub fn scheduled(&self) -> &[AgentId] {
        self.registry.as_slice()
    }

    /// Completed ticks.
    pub const fn steps(&self) -> u64 {
        self.clock.steps()
    }

    /// Simulated time at this point of the tick.
    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    /// Add a new agent to the model and the schedule.
    ///
    /// The newcomer is not placed in the space and is first activated on
    /// the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::IdsExhausted`] if no id remains.
    pub fn spawn(&mut self, agent: A) -> Result<AgentId, AgentError> {
        let id = self.population.insert(agent)?;
        self.registry.add(id);
        Ok(id)
    }

    /// Remove an agent (possibly the acting one) from the schedule, the
    /// space, and the model.
    ///
    /// A retired agent that has not acted yet this tick is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownAgent`] if `id` is not alive.
    pub fn retire(&mut self, id: AgentId) -> Result<(), AgentError> {
        if id == self.id {
            if self.retired_self {
                return Err(AgentError::UnknownAgent(id));
            }
            self.retired_self = true;
        } else if self.population.agents.remove(&id).is_none() {
            return Err(AgentError::UnknownAgent(id));
        }
        let _ = self.registry.remove(id);
        if self.space.contains(id) {
            let _ = self.space.remove(id)?;
        }
        Ok(())
    }

    /// Whether the acting agent retired itself.
    pub(crate) const fn retired_self(&self) -> bool {
        self.retired_self
    }
}
