//! What a scheduler asks of the model when it activates an agent.

use lattice_types::AgentId;
use rand::RngCore;

use crate::clock::TickClock;
use crate::error::ScheduleError;
use crate::registry::Registry;

/// A named stage of a staged schedule.
///
/// Stage names are resolved once, when the schedule is built; `index` is
/// the stage's position in the schedule's stage list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    /// Position in the stage list.
    pub index: usize,
    /// Behaviour name the model maps to an agent callback.
    pub name: String,
}

/// The behaviour a scheduler requests for one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation<'a> {
    /// The single per-tick behaviour.
    Step,
    /// Simultaneous phase 1: observe and record an intended change.
    Decide,
    /// Simultaneous phase 2: apply the recorded change.
    Commit,
    /// One stage of a staged tick.
    Stage(&'a Stage),
}

impl Activation<'_> {
    /// Name used in logs and errors.
    pub fn name(&self) -> &str {
        match self {
            Self::Step => "step",
            Self::Decide => "decide",
            Self::Commit => "commit",
            Self::Stage(stage) => &stage.name,
        }
    }
}

impl core::fmt::Display for Activation<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// The model side of a schedule: runs agent behaviours and supplies
/// randomness.
pub trait Activate {
    /// Run `activation` for `agent`.
    ///
    /// `registry` is the schedule's live registry; the agent may add or
    /// remove registrations through it. `clock` shows the counters as they
    /// stand at this point of the tick.
    ///
    /// # Errors
    ///
    /// Any error aborts the rest of the tick.
    fn activate(
        &mut self,
        agent: AgentId,
        activation: Activation<'_>,
        registry: &mut Registry,
        clock: &TickClock,
    ) -> Result<(), ScheduleError>;

    /// The random source used for shuffling.
    fn rng(&mut self) -> &mut dyn RngCore;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_activation_uses_stage_name() {
        let stage = Stage {
            index: 2,
            name: "harvest".to_owned(),
        };
        assert_eq!(Activation::Stage(&stage).name(), "harvest");
        assert_eq!(Activation::Decide.to_string(), "decide");
    }
}
