//! Integration tests for models driven by each activation regime.
//!
//! Each test builds a small model over a real space and schedule and checks
//! the ordering and atomicity guarantees agents observe.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::BTreeSet;

use lattice_core::{Agent, AgentContext, AgentError, Model, ModelError, StageTable};
use lattice_space::{Bounds, ContinuousSpace, MultiGrid, SingleGrid};
use lattice_time::{
    BaseScheduler, RandomScheduler, ScheduleError, Scheduler, SimultaneousScheduler,
    StagedScheduler,
};
use lattice_types::{AgentId, Coord, NeighborhoodKind, Point};

// ---------------------------------------------------------------------------
// Simultaneous: swap
// ---------------------------------------------------------------------------

/// Takes the value of its partner, via decide/commit.
#[derive(Debug)]
struct Swapper {
    partner: AgentId,
    value: i32,
    next: Option<i32>,
}

impl Agent<MultiGrid> for Swapper {
    fn decide(&mut self, ctx: &mut AgentContext<'_, Self, MultiGrid>) -> Result<(), AgentError> {
        let partner = ctx
            .agent(self.partner)
            .ok_or(AgentError::UnknownAgent(self.partner))?;
        self.next = Some(partner.value);
        Ok(())
    }

    fn commit(&mut self, _ctx: &mut AgentContext<'_, Self, MultiGrid>) -> Result<(), AgentError> {
        if let Some(next) = self.next.take() {
            self.value = next;
        }
        Ok(())
    }
}

#[test]
fn simultaneous_swap_exchanges_values() {
    let mut model = Model::new(
        MultiGrid::new(2, 2, false).unwrap(),
        SimultaneousScheduler::new(),
        0,
    );
    let a = model
        .add_agent(Swapper {
            partner: AgentId::new(1),
            value: 1,
            next: None,
        })
        .unwrap();
    let b = model
        .add_agent(Swapper {
            partner: AgentId::new(0),
            value: 2,
            next: None,
        })
        .unwrap();

    model.step().unwrap();
    assert_eq!(model.agent(a).map(|s| s.value), Some(2));
    assert_eq!(model.agent(b).map(|s| s.value), Some(1));

    model.step().unwrap();
    assert_eq!(model.agent(a).map(|s| s.value), Some(1));
    assert_eq!(model.steps(), 2);
}

#[test]
fn swapper_without_step_is_unsupported_under_base() {
    let mut model = Model::new(MultiGrid::new(1, 1, false).unwrap(), BaseScheduler::new(), 0);
    let a = model
        .add_agent(Swapper {
            partner: AgentId::new(0),
            value: 0,
            next: None,
        })
        .unwrap();
    let err = model.step().unwrap_err();
    assert!(matches!(
        err,
        ModelError::Schedule(ScheduleError::UnsupportedAgent { agent, .. }) if agent == a
    ));
    // A failed activation still returns the agent to the store.
    assert!(model.agent(a).is_some());
}

// ---------------------------------------------------------------------------
// Staged: counting stages
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Staged {
    log: Vec<(&'static str, u64, f64)>,
}

type StagedCtx<'m> = AgentContext<'m, Staged, MultiGrid>;

fn record(agent: &mut Staged, ctx: &StagedCtx<'_>, stage: &'static str) {
    agent.log.push((stage, ctx.steps(), ctx.time()));
}

fn sense(agent: &mut Staged, ctx: &mut StagedCtx<'_>) -> Result<(), AgentError> {
    record(agent, ctx, "sense");
    Ok(())
}

fn think(agent: &mut Staged, ctx: &mut StagedCtx<'_>) -> Result<(), AgentError> {
    record(agent, ctx, "think");
    Ok(())
}

fn act(agent: &mut Staged, ctx: &mut StagedCtx<'_>) -> Result<(), AgentError> {
    record(agent, ctx, "act");
    Ok(())
}

impl Agent<MultiGrid> for Staged {
    fn step(&mut self, ctx: &mut StagedCtx<'_>) -> Result<(), AgentError> {
        record(self, ctx, "step");
        Ok(())
    }

    fn stages() -> StageTable<Self, MultiGrid> {
        StageTable::new()
            .with("sense", sense)
            .with("think", think)
            .with("act", act)
    }
}

#[test]
fn staged_four_stages_five_ticks() {
    let schedule = StagedScheduler::new(["sense", "think", "act", "step"], true, true).unwrap();
    let mut model = Model::new(MultiGrid::new(3, 3, true).unwrap(), schedule, 9);
    let ids: Vec<AgentId> = (0..4)
        .map(|_| model.add_agent(Staged::default()).unwrap())
        .collect();

    let summary = model.run(5).unwrap();
    assert_eq!(summary.steps, 5);
    assert_eq!(summary.time.to_bits(), 5.0_f64.to_bits());

    for id in ids {
        let log = &model.agent(id).unwrap().log;
        for stage in ["sense", "think", "act", "step"] {
            assert_eq!(log.iter().filter(|(s, _, _)| *s == stage).count(), 5);
        }
        // Stage k of tick t sees time t + k/4.
        for (i, &(_, steps, time)) in log.iter().enumerate() {
            let i = u32::try_from(i).unwrap();
            let expected = f64::from(i / 4) + f64::from(i % 4) / 4.0;
            assert_eq!(steps, u64::from(i / 4));
            assert!((time - expected).abs() < 1e-12);
        }
    }
}

// ---------------------------------------------------------------------------
// Mid-tick removal and addition
// ---------------------------------------------------------------------------

/// Retires its target on its first activation, or spawns a child.
#[derive(Debug, Default)]
struct Reaper {
    target: Option<AgentId>,
    spawn: bool,
    activations: u32,
}

impl Agent<MultiGrid> for Reaper {
    fn step(&mut self, ctx: &mut AgentContext<'_, Self, MultiGrid>) -> Result<(), AgentError> {
        self.activations = self.activations.saturating_add(1);
        if let Some(target) = self.target.take() {
            ctx.retire(target)?;
        }
        if self.spawn {
            self.spawn = false;
            let child = ctx.spawn(Self::default())?;
            let _ = ctx.space_mut().place(child, Coord::new(0, 0))?;
        }
        Ok(())
    }
}

#[test]
fn agent_retired_before_its_turn_never_acts() {
    let mut model = Model::new(MultiGrid::new(2, 2, false).unwrap(), BaseScheduler::new(), 0);
    let first = model
        .add_agent(Reaper {
            target: Some(AgentId::new(2)),
            ..Reaper::default()
        })
        .unwrap();
    let second = model.add_agent(Reaper::default()).unwrap();
    let victim = model.add_agent(Reaper::default()).unwrap();
    let _ = model.space_mut().place(victim, Coord::new(1, 1)).unwrap();

    model.step().unwrap();
    assert!(model.agent(victim).is_none());
    assert!(!model.space().contains(victim));
    assert!(!model.schedule().agents().contains(&victim));
    assert_eq!(model.agent(first).map(|r| r.activations), Some(1));
    assert_eq!(model.agent(second).map(|r| r.activations), Some(1));
}

#[test]
fn agent_can_retire_itself() {
    let mut model = Model::new(MultiGrid::new(2, 2, false).unwrap(), BaseScheduler::new(), 0);
    let lonely = model
        .add_agent(Reaper {
            target: Some(AgentId::new(0)),
            ..Reaper::default()
        })
        .unwrap();
    model.step().unwrap();
    assert!(model.agent(lonely).is_none());
    assert_eq!(model.agent_count(), 0);
    assert_eq!(model.schedule().get_agent_count(), 0);
}

#[test]
fn spawned_agent_waits_for_next_tick() {
    let mut model = Model::new(MultiGrid::new(2, 2, false).unwrap(), RandomScheduler::new(), 3);
    let parent = model
        .add_agent(Reaper {
            spawn: true,
            ..Reaper::default()
        })
        .unwrap();
    model.step().unwrap();
    assert_eq!(model.agent_count(), 2);
    let child = AgentId::new(1);
    assert_eq!(model.agent(child).map(|r| r.activations), Some(0));
    assert_eq!(model.space().position_of(child), Some(Coord::new(0, 0)));

    model.step().unwrap();
    assert_eq!(model.agent(child).map(|r| r.activations), Some(1));
    assert_eq!(model.agent(parent).map(|r| r.activations), Some(2));
}

#[test]
fn retiring_unknown_agent_aborts_tick() {
    let mut model = Model::new(MultiGrid::new(2, 2, false).unwrap(), BaseScheduler::new(), 0);
    let _ = model
        .add_agent(Reaper {
            target: Some(AgentId::new(99)),
            ..Reaper::default()
        })
        .unwrap();
    let err = model.step().unwrap_err();
    assert!(matches!(
        err,
        ModelError::Schedule(ScheduleError::AgentFailed { .. })
    ));
    assert_eq!(model.steps(), 0);
}

// ---------------------------------------------------------------------------
// Random activation on a single grid
// ---------------------------------------------------------------------------

/// Jumps to a random empty cell every tick.
#[derive(Debug, Default)]
struct Hopper {
    hops: u32,
}

impl Agent<SingleGrid> for Hopper {
    fn step(&mut self, ctx: &mut AgentContext<'_, Self, SingleGrid>) -> Result<(), AgentError> {
        let id = ctx.id();
        let (space, rng) = ctx.space_and_rng();
        if space.exists_empty_cells() {
            let _ = space.move_to_empty(id, rng)?;
            self.hops = self.hops.saturating_add(1);
        }
        Ok(())
    }
}

fn hopper_model(seed: u64) -> Model<Hopper, SingleGrid, RandomScheduler> {
    let mut model = Model::new(SingleGrid::new(6, 6, true).unwrap(), RandomScheduler::new(), seed);
    for _ in 0..20 {
        let id = model.add_agent(Hopper::default()).unwrap();
        let (space, rng) = model.space_and_rng();
        let _ = space.position_agent(id, None, rng).unwrap();
    }
    model
}

#[test]
fn random_activation_runs_everyone_once_per_tick() {
    let mut model = hopper_model(17);
    for tick in 1..=8_u32 {
        model.step().unwrap();
        for (_, hopper) in model.agents() {
            assert_eq!(hopper.hops, tick);
        }
        assert_eq!(model.space().empty_count(), 36 - 20);
    }
}

#[test]
fn same_seed_same_trajectory() {
    let positions = |seed| {
        let mut model = hopper_model(seed);
        model.run(10).unwrap();
        model
            .agents()
            .map(|(id, _)| model.space().position_of(id))
            .collect::<Vec<_>>()
    };
    assert_eq!(positions(5), positions(5));
}

// ---------------------------------------------------------------------------
// Continuous space neighbors from inside an agent
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Counter {
    seen: BTreeSet<AgentId>,
}

impl Agent<ContinuousSpace> for Counter {
    fn step(
        &mut self,
        ctx: &mut AgentContext<'_, Self, ContinuousSpace>,
    ) -> Result<(), AgentError> {
        let here = ctx.position().ok_or(AgentError::UnknownAgent(ctx.id()))?;
        self.seen = ctx
            .space()
            .neighbors_within(here, 1.5, false)?
            .into_iter()
            .collect();
        Ok(())
    }
}

#[test]
fn continuous_agents_see_neighbors_across_the_seam() {
    let space = ContinuousSpace::new(Bounds::from_origin(10.0, 10.0), true, 5, 5).unwrap();
    let mut model = Model::new(space, BaseScheduler::new(), 0);
    let spots = [Point::new(0.5, 0.5), Point::new(9.5, 9.5), Point::new(5.0, 5.0)];
    let mut ids = Vec::new();
    for spot in spots {
        let id = model.add_agent(Counter::default()).unwrap();
        let _ = model.space_mut().place(id, spot).unwrap();
        ids.push(id);
    }
    model.step().unwrap();

    let seen = |n: usize| model.agent(ids[n]).map(|c| c.seen.clone()).unwrap();
    assert_eq!(seen(0), [ids[1]].into_iter().collect());
    assert_eq!(seen(1), [ids[0]].into_iter().collect());
    assert!(seen(2).is_empty());
}

#[test]
fn grid_neighbors_inside_agents_use_moore_shape() {
    let mut grid = MultiGrid::new(3, 3, true).unwrap();
    let center = AgentId::new(0);
    let _ = grid.place(center, Coord::new(0, 0)).unwrap();
    let _ = grid.place(AgentId::new(1), Coord::new(2, 2)).unwrap();
    let _ = grid.place(AgentId::new(2), Coord::new(1, 0)).unwrap();
    let around: BTreeSet<AgentId> = grid
        .neighbors(Coord::new(0, 0), NeighborhoodKind::Moore, false, 1)
        .collect();
    assert_eq!(around, [AgentId::new(1), AgentId::new(2)].into_iter().collect());
}
