//! Random activation: a fresh uniform order every tick.

use crate::activation::{Activate, Activation};
use crate::clock::TickClock;
use crate::error::ScheduleError;
use crate::registry::Registry;
use crate::scheduler::{Scheduler, run_phase};

/// Activates each agent once per tick, in an order reshuffled at the start
/// of every tick with the model's random source.
#[derive(Debug, Clone, Default)]
pub struct RandomScheduler {
    /// Registered agents; the stored order is the last shuffle.
    registry: Registry,
    /// Tick counters.
    clock: TickClock,
}

impl RandomScheduler {
    /// An empty scheduler at step 0.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for RandomScheduler {
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
        self.registry.shuffle(model.rng());
        run_phase(&mut self.registry, &self.clock, model, Activation::Step)?;
        self.clock.advance()?;
        Ok(())
    }
}
