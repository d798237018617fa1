//! The scheduler interface and the base, in-order scheduler.

use lattice_types::AgentId;
use tracing::trace;

use crate::activation::{Activate, Activation, Stage};
use crate::clock::TickClock;
use crate::error::ScheduleError;
use crate::registry::Registry;

/// Activation regime over a registry of agents.
///
/// A scheduler decides the order in which agents act and how a tick is
/// split into phases; it never creates or destroys agents.
pub trait Scheduler {
    /// The live registry.
    fn registry(&self) -> &Registry;

    /// Mutable access to the live registry.
    fn registry_mut(&mut self) -> &mut Registry;

    /// The step and time counters.
    fn clock(&self) -> &TickClock;

    /// Run one tick, activating agents through `model`.
    ///
    /// # Errors
    ///
    /// The first activation error aborts the tick and is returned; the
    /// counters keep their pre-tick values.
    fn step<M: Activate + ?Sized>(&mut self, model: &mut M) -> Result<(), ScheduleError>;

    /// Named stages of a tick, for regimes that have them.
    fn stages(&self) -> &[Stage] {
        &[]
    }

    /// Register `agent` at the end of the activation order.
    fn add(&mut self, agent: AgentId) {
        self.registry_mut().add(agent);
    }

    /// Unregister every occurrence of `agent`, returning how many there were.
    fn remove(&mut self, agent: AgentId) -> usize {
        self.registry_mut().remove(agent)
    }

    /// Registered agents in activation order.
    fn agents(&self) -> &[AgentId] {
        self.registry().as_slice()
    }

    /// Number of registrations.
    fn get_agent_count(&self) -> usize {
        self.registry().len()
    }

    /// Completed ticks.
    fn steps(&self) -> u64 {
        self.clock().steps()
    }

    /// Simulated time.
    fn time(&self) -> f64 {
        self.clock().time()
    }
}

/// Activate every agent in a snapshot of the registry taken now.
///
/// Agents unregistered by an earlier activation in the same phase are
/// skipped; agents registered during the phase wait for the next one.
pub(crate) fn run_phase<M: Activate + ?Sized>(
    registry: &mut Registry,
    clock: &TickClock,
    model: &mut M,
    activation: Activation<'_>,
) -> Result<(), ScheduleError> {
    for agent in registry.snapshot() {
        if !registry.contains(agent) {
            trace!(%agent, %activation, "skipping agent removed mid-tick");
            continue;
        }
        model.activate(agent, activation, registry, clock)?;
    }
    Ok(())
}

/// Activates each agent once per tick, in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct BaseScheduler {
    /// Registered agents.
    registry: Registry,
    /// Tick counters.
    clock: TickClock,
}

impl BaseScheduler {
    /// An empty scheduler at step 0.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for BaseScheduler {
    fn registry(&self) -> &Registry {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    fn clock(&self) -> &TickClock {
        &self.clock
    }

    fn step<M: Activate + ?Sized>(&mut self, model: &mut M) -> Result<(), ScheduleError> {
        run_phase(&mut self.registry, &self.clock, model, Activation::Step)?;
        self.clock.advance()?;
        Ok(())
    }
}
