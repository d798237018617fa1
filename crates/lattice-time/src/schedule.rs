//! A scheduler chosen at run time.

use crate::activation::{Activate, Stage};
use crate::clock::TickClock;
use crate::error::ScheduleError;
use crate::random::RandomScheduler;
use crate::registry::Registry;
use crate::scheduler::{BaseScheduler, Scheduler};
use crate::simultaneous::SimultaneousScheduler;
use crate::staged::StagedScheduler;

/// Any of the activation regimes, selected from configuration.
#[derive(Debug, Clone)]
pub enum Schedule {
    /// In insertion order.
    Base(BaseScheduler),
    /// Reshuffled every tick.
    Random(RandomScheduler),
    /// Decide phase, then commit phase.
    Simultaneous(SimultaneousScheduler),
    /// Named stages in sequence.
    Staged(StagedScheduler),
}

impl Schedule {
    /// Short regime name for logs.
    pub const fn regime(&self) -> &'static str {
        match self {
            Self::Base(_) => "base",
            Self::Random(_) => "random",
            Self::Simultaneous(_) => "simultaneous",
            Self::Staged(_) => "staged",
        }
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::Random(RandomScheduler::new())
    }
}

impl From<BaseScheduler> for Schedule {
    fn from(scheduler: BaseScheduler) -> Self {
        Self::Base(scheduler)
    }
}

impl From<RandomScheduler> for Schedule {
    fn from(scheduler: RandomScheduler) -> Self {
        Self::Random(scheduler)
    }
}

impl From<SimultaneousScheduler> for Schedule {
    fn from(scheduler: SimultaneousScheduler) -> Self {
        Self::Simultaneous(scheduler)
    }
}

impl From<StagedScheduler> for Schedule {
    fn from(scheduler: StagedScheduler) -> Self {
        Self::Staged(scheduler)
    }
}

impl Scheduler for Schedule {
    fn registry(&self) -> &Registry {
        match self {
            Self::Base(s) => s.registry(),
            Self::Random(s) => s.registry(),
            Self::Simultaneous(s) => s.registry(),
            Self::Staged(s) => s.registry(),
        }
    }

    fn registry_mut(&mut self) -> &mut Registry {
        match self {
            Self::Base(s) => s.registry_mut(),
            Self::Random(s) => s.registry_mut(),
            Self::Simultaneous(s) => s.registry_mut(),
            Self::Staged(s) => s.registry_mut(),
        }
    }

    fn clock(&self) -> &TickClock {
        match self {
            Self::Base(s) => s.clock(),
            Self::Random(s) => s.clock(),
            Self::Simultaneous(s) => s.clock(),
            Self::Staged(s) => s.clock(),
        }
    }

    fn stages(&self) -> &[Stage] {
        match self {
            Self::Base(s) => s.stages(),
            Self::Random(s) => s.stages(),
            Self::Simultaneous(s) => s.stages(),
            Self::Staged(s) => s.stages(),
        }
    }

    fn step<M: Activate + ?Sized>(&mut self, model: &mut M) -> Result<(), ScheduleError> {
        match self {
            Self::Base(s) => s.step(model),
            Self::Random(s) => s.step(model),
            Self::Simultaneous(s) => s.step(model),
            Self::Staged(s) => s.step(model),
        }
    }
}
