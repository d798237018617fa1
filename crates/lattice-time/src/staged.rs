//! Staged activation: a tick is a sequence of named stages.
//!
//! Every agent runs stage 1, then every agent runs stage 2, and so on.
//! Time advances by `1 / stage_count` after each stage and the step counter
//! by one after the last, so after `k` ticks both read `k`.

use crate::activation::{Activate, Activation, Stage};
use crate::clock::TickClock;
use crate::error::ScheduleError;
use crate::registry::Registry;
use crate::scheduler::{Scheduler, run_phase};

/// Stage list used when none is given.
pub const DEFAULT_STAGE: &str = "step";

/// Scheduler that splits each tick into ordered stages.
#[derive(Debug, Clone)]
pub struct StagedScheduler {
    /// Registered agents.
    registry: Registry,
    /// Tick and stage counters.
    clock: TickClock,
    /// Stages in execution order.
    stages: Vec<Stage>,
    /// Shuffle the registry once at the start of each tick.
    shuffle: bool,
    /// Shuffle the registry again after each stage.
    shuffle_between_stages: bool,
}

impl Default for StagedScheduler {
    fn default() -> Self {
        Self {
            registry: Registry::new(),
            clock: TickClock::single(),
            stages: vec![Stage {
                index: 0,
                name: DEFAULT_STAGE.to_owned(),
            }],
            shuffle: false,
            shuffle_between_stages: false,
        }
    }
}

impl StagedScheduler {
    /// Build a scheduler running `stage_names` in order each tick.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidConfig`] if the list is empty or a
    /// name is blank.
    pub fn new<I, N>(
        stage_names: I,
        shuffle: bool,
        shuffle_between_stages: bool,
    ) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let stages: Vec<Stage> = stage_names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Stage {
                index,
                name: name.into(),
            })
            .collect();
        if stages.is_empty() {
            return Err(ScheduleError::InvalidConfig {
                reason: "staged activation needs at least one stage".to_owned(),
            });
        }
        if let Some(blank) = stages.iter().find(|stage| stage.name.trim().is_empty()) {
            return Err(ScheduleError::InvalidConfig {
                reason: format!("stage {} has an empty name", blank.index),
            });
        }
        let stage_count = u64::try_from(stages.len()).map_err(|_err| {
            ScheduleError::InvalidConfig {
                reason: "stage count exceeds u64 range".to_owned(),
            }
        })?;
        Ok(Self {
            registry: Registry::new(),
            clock: TickClock::with_stages(stage_count)?,
            stages,
            shuffle,
            shuffle_between_stages,
        })
    }

    /// Whether the registry is shuffled at the start of each tick.
    pub const fn shuffles(&self) -> bool {
        self.shuffle
    }

    /// Whether the registry is shuffled after each stage.
    pub const fn shuffles_between_stages(&self) -> bool {
        self.shuffle_between_stages
    }

    fn run_stages<M: Activate + ?Sized>(&mut self, model: &mut M) -> Result<(), ScheduleError> {
        if self.shuffle {
            self.registry.shuffle(model.rng());
        }
        for stage in &self.stages {
            run_phase(
                &mut self.registry,
                &self.clock,
                model,
                Activation::Stage(stage),
            )?;
            if self.shuffle_between_stages {
                self.registry.shuffle(model.rng());
            }
            self.clock.complete_stage()?;
        }
        self.clock.complete_tick()?;
        Ok(())
    }
}

impl Scheduler for StagedScheduler {
    fn registry(&self) -> &Registry {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    fn clock(&self) -> &TickClock {
        &self.clock
    }

    fn stages(&self) -> &[Stage] {
        &self.stages
    }

    fn step<M: Activate + ?Sized>(&mut self, model: &mut M) -> Result<(), ScheduleError> {
        let before = self.clock;
        let outcome = self.run_stages(model);
        if outcome.is_err() {
            self.clock = before;
        }
        outcome
    }
}
