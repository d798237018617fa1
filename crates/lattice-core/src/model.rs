//! The model: agents, their space, their schedule, and one random source.
//!
//! A [`Model`] owns everything a run needs and is the [`Activate`]
//! collaborator its schedule calls back into. During an activation the
//! acting agent is taken out of the store, handed an [`AgentContext`] over
//! the rest of the model, and put back afterwards (unless it retired
//! itself).
//!
//! The random source is a [`StdRng`] seeded at construction. Shuffles,
//! random placement, and agent behaviour all draw from it, so a run is
//! reproducible from its seed.

use lattice_space::Space;
use lattice_time::{Activate, Activation, Registry, ScheduleError, Scheduler, TickClock};
use lattice_types::AgentId;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::agent::{Agent, AgentError, StageFn, resolve_stage};
use crate::context::{AgentContext, Population};
use crate::error::ModelError;

/// Outcome of [`Model::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Ticks executed by this call.
    pub ticks_run: u64,
    /// Schedule step counter after the run.
    pub steps: u64,
    /// Schedule time after the run.
    pub time: f64,
    /// Live agents after the run.
    pub agents: usize,
    /// Whether the stop condition ended the run before `max_steps`.
    pub stopped_early: bool,
}

/// An agent population in a space, driven by a schedule.
pub struct Model<A, S, Sch> {
    /// Where agents are.
    space: S,
    /// When agents act.
    schedule: Sch,
    /// The agents themselves.
    population: Population<A>,
    /// The single random source.
    rng: StdRng,
    /// Stage callbacks indexed like `schedule.stages()`.
    stages: Vec<Option<StageFn<A, S>>>,
}

impl<A, S, Sch> Model<A, S, Sch>
where
    A: Agent<S>,
    S: Space,
    Sch: Scheduler,
{
    /// Build an empty model.
    ///
    /// Stage names of a staged schedule are resolved against
    /// [`Agent::stages`] here; a name without a callback fails with
    /// [`ScheduleError::UnsupportedAgent`] the first time it runs.
    pub fn new(space: S, schedule: Sch, seed: u64) -> Self {
        let table = A::stages();
        let stages = schedule
            .stages()
            .iter()
            .map(|stage| resolve_stage(&table, &stage.name))
            .collect();
        Self {
            space,
            schedule,
            population: Population::new(),
            rng: StdRng::seed_from_u64(seed),
            stages,
        }
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// The space.
    pub const fn space(&self) -> &S {
        &self.space
    }

    /// The space, for placement.
    pub const fn space_mut(&mut self) -> &mut S {
        &mut self.space
    }

    /// The space and random source together, for random placement.
    pub const fn space_and_rng(&mut self) -> (&mut S, &mut StdRng) {
        (&mut self.space, &mut self.rng)
    }

    /// The schedule.
    pub const fn schedule(&self) -> &Sch {
        &self.schedule
    }

    /// The random source.
    pub const fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Completed ticks.
    pub fn steps(&self) -> u64 {
        self.schedule.steps()
    }

    /// Simulated time.
    pub fn time(&self) -> f64 {
        self.schedule.time()
    }

    /// Number of live agents.
    pub fn agent_count(&self) -> usize {
        self.population.agents.len()
    }

    /// An agent by id.
    pub fn agent(&self, id: AgentId) -> Option<&A> {
        self.population.agents.get(&id)
    }

    /// An agent by id, mutably.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut A> {
        self.population.agents.get_mut(&id)
    }

    /// Every live agent, in id order.
    pub fn agents(&self) -> impl Iterator<Item = (AgentId, &A)> + '_ {
        self.population.agents.iter().map(|(&id, agent)| (id, agent))
    }

    // -------------------------------------------------------------------
    // Population
    // -------------------------------------------------------------------

    /// Add an agent to the model and the end of the schedule.
    ///
    /// The agent is not placed in the space.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IdsExhausted`] if no id remains.
    pub fn add_agent(&mut self, agent: A) -> Result<AgentId, ModelError> {
        let id = self
            .population
            .insert(agent)
            .map_err(|_err| ModelError::IdsExhausted)?;
        self.schedule.add(id);
        trace!(agent = %id, "agent added");
        Ok(id)
    }

    /// Remove an agent from the schedule (every registration), the space,
    /// and the model, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownAgent`] if `id` is not alive.
    pub fn remove_agent(&mut self, id: AgentId) -> Result<A, ModelError> {
        let agent = self
            .population
            .agents
            .remove(&id)
            .ok_or(ModelError::UnknownAgent(id))?;
        let _ = self.schedule.remove(id);
        if self.space.contains(id) {
            let _ = self.space.remove(id)?;
        }
        trace!(agent = %id, "agent removed");
        Ok(agent)
    }

    // -------------------------------------------------------------------
    // Running
    // -------------------------------------------------------------------

    /// Run one tick of the schedule.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Schedule`] if an activation failed; the tick is
    /// abandoned and the counters are not advanced.
    pub fn step(&mut self) -> Result<(), ModelError> {
        let Self {
            space,
            schedule,
            population,
            rng,
            stages,
        } = self;
        let mut activator = Activator {
            space,
            population,
            rng,
            stages,
        };
        schedule.step(&mut activator)?;
        debug!(
            steps = schedule.steps(),
            time = schedule.time(),
            agents = population.agents.len(),
            "tick complete"
        );
        Ok(())
    }

    /// Run up to `max_steps` ticks.
    ///
    /// # Errors
    ///
    /// Propagates the first failing tick.
    pub fn run(&mut self, max_steps: u64) -> Result<RunSummary, ModelError> {
        self.run_until(max_steps, |_| false)
    }

    /// Run up to `max_steps` ticks, stopping early once `done` returns true.
    ///
    /// `done` is checked before every tick, so a model that is already done
    /// runs zero ticks.
    ///
    /// # Errors
    ///
    /// Propagates the first failing tick.
    pub fn run_until<F>(&mut self, max_steps: u64, mut done: F) -> Result<RunSummary, ModelError>
    where
        F: FnMut(&Self) -> bool,
    {
        info!(max_steps, agents = self.agent_count(), "run starting");
        let mut ticks_run: u64 = 0;
        let mut stopped_early = false;
        while ticks_run < max_steps {
            if done(self) {
                stopped_early = true;
                break;
            }
            if let Err(err) = self.step() {
                warn!(steps = self.steps(), error = %err, "run stopped on error");
                return Err(err);
            }
            ticks_run = ticks_run.saturating_add(1);
        }
        let summary = RunSummary {
            ticks_run,
            steps: self.steps(),
            time: self.time(),
            agents: self.agent_count(),
            stopped_early,
        };
        info!(
            ticks_run = summary.ticks_run,
            steps = summary.steps,
            agents = summary.agents,
            stopped_early = summary.stopped_early,
            "run finished"
        );
        Ok(summary)
    }
}

impl<A, S: Space, Sch: core::fmt::Debug> core::fmt::Debug for Model<A, S, Sch> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Model")
            .field("agents", &self.population.agents.len())
            .field("placed", &self.space.agent_count())
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

/// The model's side of one tick: everything except the schedule.
struct Activator<'m, A, S> {
    /// The space.
    space: &'m mut S,
    /// The agent store.
    population: &'m mut Population<A>,
    /// The random source.
    rng: &'m mut StdRng,
    /// Resolved stage callbacks.
    stages: &'m [Option<StageFn<A, S>>],
}

impl<A: Agent<S>, S: Space> Activate for Activator<'_, A, S> {
    fn activate(
        &mut self,
        agent: AgentId,
        activation: Activation<'_>,
        registry: &mut Registry,
        clock: &TickClock,
    ) -> Result<(), ScheduleError> {
        let Some(mut acting) = self.population.agents.remove(&agent) else {
            return Err(ScheduleError::UnknownAgent(agent));
        };
        let mut ctx = AgentContext::new(
            agent,
            &mut *self.space,
            &mut *self.population,
            &mut *self.rng,
            registry,
            clock,
        );
        let outcome = match activation {
            Activation::Step => acting.step(&mut ctx),
            Activation::Decide => acting.decide(&mut ctx),
            Activation::Commit => acting.commit(&mut ctx),
            Activation::Stage(stage) => match self.stages.get(stage.index).copied().flatten() {
                Some(callback) => callback(&mut acting, &mut ctx),
                None => Err(AgentError::unsupported(stage.name.as_str())),
            },
        };
        let retired = ctx.retired_self();
        if !retired {
            self.population.agents.insert(agent, acting);
        }
        trace!(%agent, %activation, retired, ok = outcome.is_ok(), "activated");
        outcome.map_err(|err| match err {
            AgentError::Unsupported { activation: name } => ScheduleError::UnsupportedAgent {
                agent,
                activation: name,
            },
            other => ScheduleError::AgentFailed {
                agent,
                activation: activation.name().to_owned(),
                source: Box::new(other),
            },
        })
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.rng
    }
}
