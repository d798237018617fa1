//! Simultaneous activation: everyone decides, then everyone commits.
//!
//! No agent's commit is visible to any other agent's decide within the
//! same tick, which emulates all agents acting at once.

use crate::activation::{Activate, Activation};
use crate::clock::TickClock;
use crate::error::ScheduleError;
use crate::registry::Registry;
use crate::scheduler::{Scheduler, run_phase};

/// Two-phase scheduler: every agent runs [`Activation::Decide`], then every
/// agent runs [`Activation::Commit`].
#[derive(Debug, Clone, Default)]
pub struct SimultaneousScheduler {
    /// Registered agents.
    registry: Registry,
    /// Tick counters.
    clock: TickClock,
}

impl SimultaneousScheduler {
    /// An empty scheduler at step 0.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for SimultaneousScheduler {
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
        run_phase(&mut self.registry, &self.clock, model, Activation::Decide)?;
        run_phase(&mut self.registry, &self.clock, model, Activation::Commit)?;
        self.clock.advance()?;
        Ok(())
    }
}
