//! A recording model for scheduler tests.

use lattice_types::AgentId;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::activation::{Activate, Activation};
use crate::clock::TickClock;
use crate::error::ScheduleError;
use crate::registry::Registry;

pub(crate) const fn id(n: u64) -> AgentId {
    AgentId::new(n)
}

/// One observed activation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub agent: AgentId,
    pub activation: String,
    pub steps: u64,
    pub time: f64,
}

#[derive(Debug, thiserror::Error)]
#[error("scripted failure")]
struct Scripted;

/// Records every activation and optionally mutates the registry or fails.
pub(crate) struct Recorder {
    pub calls: Vec<Call>,
    rng: SmallRng,
    removals: Vec<(AgentId, AgentId)>,
    additions: Vec<(AgentId, AgentId)>,
    failing: Option<AgentId>,
}

impl Recorder {
    pub fn new(seed: u64) -> Self {
        Self {
            calls: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
            removals: Vec::new(),
            additions: Vec::new(),
            failing: None,
        }
    }

    /// When `trigger` is activated, unregister `target`.
    pub fn remove_when(&mut self, trigger: AgentId, target: AgentId) {
        self.removals.push((trigger, target));
    }

    /// When `trigger` is activated, register `target`.
    pub fn add_when(&mut self, trigger: AgentId, target: AgentId) {
        self.additions.push((trigger, target));
    }

    pub fn fail_on(&mut self, agent: AgentId) {
        self.failing = Some(agent);
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn agents_activated(&self) -> Vec<AgentId> {
        self.calls.iter().map(|call| call.agent).collect()
    }

    pub fn count(&self, agent: AgentId, activation: &str) -> usize {
        self.calls
            .iter()
            .filter(|call| call.agent == agent && call.activation == activation)
            .count()
    }
}

impl Activate for Recorder {
    fn activate(
        &mut self,
        agent: AgentId,
        activation: Activation<'_>,
        registry: &mut Registry,
        clock: &TickClock,
    ) -> Result<(), ScheduleError> {
        self.calls.push(Call {
            agent,
            activation: activation.name().to_owned(),
            steps: clock.steps(),
            time: clock.time(),
        });
        if self.failing == Some(agent) {
            return Err(ScheduleError::AgentFailed {
                agent,
                activation: activation.name().to_owned(),
                source: Box::new(Scripted),
            });
        }
        for &(trigger, target) in &self.removals {
            if trigger == agent {
                let _ = registry.remove(target);
            }
        }
        for &(trigger, target) in &self.additions {
            if trigger == agent {
                registry.add(target);
            }
        }
        Ok(())
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }
}
