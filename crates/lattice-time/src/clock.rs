//! Step and time counters shared by every scheduler.
//!
//! Time is never accumulated as a float. The clock counts completed stages
//! as an integer and derives `time = completed_stages / stages_per_tick`,
//! so after `k` full ticks time is exactly `k` whatever the stage count.
//!
//! All counter updates use checked arithmetic.

use crate::error::ScheduleError;

/// Tick and stage counters for one schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickClock {
    /// Completed ticks.
    steps: u64,
    /// Completed stages across all ticks.
    completed_stages: u64,
    /// Stages that make up one tick (at least 1).
    stages_per_tick: u64,
}

impl Default for TickClock {
    fn default() -> Self {
        Self::single()
    }
}

impl TickClock {
    /// A clock whose ticks have a single stage.
    pub const fn single() -> Self {
        Self {
            steps: 0,
            completed_stages: 0,
            stages_per_tick: 1,
        }
    }

    /// A clock whose ticks are divided into `stages_per_tick` stages.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidConfig`] if `stages_per_tick` is 0.
    pub fn with_stages(stages_per_tick: u64) -> Result<Self, ScheduleError> {
        if stages_per_tick == 0 {
            return Err(ScheduleError::InvalidConfig {
                reason: "a tick needs at least one stage".to_owned(),
            });
        }
        Ok(Self {
            steps: 0,
            completed_stages: 0,
            stages_per_tick,
        })
    }

    /// Completed ticks.
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Completed stages across all ticks.
    pub const fn completed_stages(&self) -> u64 {
        self.completed_stages
    }

    /// Stages per tick.
    pub const fn stages_per_tick(&self) -> u64 {
        self.stages_per_tick
    }

    /// Simulated time: completed stages divided by stages per tick.
    // Counters stay far below 2^53 in any realistic run.
    #[allow(clippy::cast_precision_loss)]
    pub fn time(&self) -> f64 {
        self.completed_stages as f64 / self.stages_per_tick as f64
    }

    /// Record one completed stage.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::CounterOverflow`] if the stage counter is
    /// exhausted.
    pub fn complete_stage(&mut self) -> Result<(), ScheduleError> {
        self.completed_stages = self
            .completed_stages
            .checked_add(1)
            .ok_or(ScheduleError::CounterOverflow)?;
        Ok(())
    }

    /// Record one completed tick. Stages are counted separately.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::CounterOverflow`] if the step counter is
    /// exhausted.
    pub fn complete_tick(&mut self) -> Result<u64, ScheduleError> {
        self.steps = self
            .steps
            .checked_add(1)
            .ok_or(ScheduleError::CounterOverflow)?;
        Ok(self.steps)
    }

    /// Record a whole tick at once: all of its stages, then the tick.
    ///
    /// Either both counters advance or neither does.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::CounterOverflow`] if either counter is
    /// exhausted.
    pub fn advance(&mut self) -> Result<u64, ScheduleError> {
        let completed_stages = self
            .completed_stages
            .checked_add(self.stages_per_tick)
            .ok_or(ScheduleError::CounterOverflow)?;
        let steps = self
            .steps
            .checked_add(1)
            .ok_or(ScheduleError::CounterOverflow)?;
        self.completed_stages = completed_stages;
        self.steps = steps;
        Ok(steps)
    }
}
