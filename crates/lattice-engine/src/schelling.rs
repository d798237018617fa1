//! Schelling segregation on a single-occupancy grid.
//!
//! Each agent belongs to one of two groups and is happy when at least
//! `homophily` of its Moore neighbors share its group. Unhappy agents jump
//! to a random empty cell. The run ends early once everyone is happy.
//!
//! The agent supports every regime: `step` decides and moves at once,
//! while `decide` and `commit` split the two for simultaneous activation.

use lattice_core::config::ModelConfig;
use lattice_core::{Agent, AgentContext, AgentError, Model, ModelError};
use lattice_space::SingleGrid;
use lattice_time::Schedule;
use lattice_types::{Coord, NeighborhoodKind};
use rand::Rng;
use serde::Serialize;
use tracing::info;

/// One resident.
#[derive(Debug, Clone)]
pub struct Resident {
    /// Whether the resident belongs to the minority group.
    minority: bool,
    /// Like neighbors needed to stay.
    homophily: u32,
    /// Outcome of the last decision.
    happy: bool,
}

impl Resident {
    /// A resident of the given group, initially unhappy.
    pub const fn new(minority: bool, homophily: u32) -> Self {
        Self {
            minority,
            homophily,
            happy: false,
        }
    }

    /// Whether the last decision found enough like neighbors.
    pub const fn is_happy(&self) -> bool {
        self.happy
    }

    fn evaluate(&self, ctx: &AgentContext<'_, Self, SingleGrid>) -> Result<bool, AgentError> {
        let pos = ctx.position().ok_or(AgentError::UnknownAgent(ctx.id()))?;
        let alike = ctx
            .space()
            .neighbors(pos, NeighborhoodKind::Moore, false, 1)
            .filter_map(|neighbor| ctx.agent(neighbor))
            .filter(|neighbor| neighbor.minority == self.minority)
            .count();
        Ok(u32::try_from(alike).unwrap_or(u32::MAX) >= self.homophily)
    }

    fn relocate(ctx: &mut AgentContext<'_, Self, SingleGrid>) -> Result<(), AgentError> {
        let id = ctx.id();
        let (space, rng) = ctx.space_and_rng();
        if space.exists_empty_cells() {
            let _ = space.move_to_empty(id, rng)?;
        }
        Ok(())
    }
}

impl Agent<SingleGrid> for Resident {
    fn step(&mut self, ctx: &mut AgentContext<'_, Self, SingleGrid>) -> Result<(), AgentError> {
        self.happy = self.evaluate(ctx)?;
        if !self.happy {
            Self::relocate(ctx)?;
        }
        Ok(())
    }

    fn decide(&mut self, ctx: &mut AgentContext<'_, Self, SingleGrid>) -> Result<(), AgentError> {
        self.happy = self.evaluate(ctx)?;
        Ok(())
    }

    fn commit(&mut self, ctx: &mut AgentContext<'_, Self, SingleGrid>) -> Result<(), AgentError> {
        if !self.happy {
            Self::relocate(ctx)?;
        }
        Ok(())
    }
}

/// A segregation model.
pub type SchellingModel = Model<Resident, SingleGrid, Schedule>;

/// Build a model and fill each cell with probability `density`.
///
/// Cells are visited row by row; each drawn resident is in the minority with
/// probability `minority_fraction`.
///
/// # Errors
///
/// Propagates placement and id-allocation failures.
pub fn build(
    space: SingleGrid,
    schedule: Schedule,
    seed: u64,
    params: &ModelConfig,
) -> Result<SchellingModel, ModelError> {
    let mut model = Model::new(space, schedule, seed);
    let cells: Vec<Coord> = model
        .space()
        .coord_iter()
        .map(|(_, x, y)| Coord::new(x, y))
        .collect();
    for pos in cells {
        if !model.rng().random_bool(params.density) {
            continue;
        }
        let minority = model.rng().random_bool(params.minority_fraction);
        let id = model.add_agent(Resident::new(minority, params.homophily))?;
        let _ = model.space_mut().place(id, pos)?;
    }
    info!(
        residents = model.agent_count(),
        empty = model.space().empty_count(),
        "schelling model populated"
    );
    Ok(model)
}

/// Whether every resident was happy at its last decision.
///
/// An empty model, or one that has not stepped yet, is not done.
pub fn all_happy(model: &SchellingModel) -> bool {
    model.steps() > 0
        && model.agent_count() > 0
        && model.agents().all(|(_, resident)| resident.is_happy())
}

/// Model-specific part of the run report.
#[derive(Debug, Clone, Serialize)]
pub struct SchellingReport {
    /// Residents placed.
    pub residents: usize,
    /// Residents happy after the last tick.
    pub happy: usize,
    /// Residents in the minority group.
    pub minority: usize,
}

impl SchellingReport {
    /// Summarize the current state of `model`.
    pub fn of(model: &SchellingModel) -> Self {
        let residents = model.agent_count();
        let happy = model.agents().filter(|(_, r)| r.is_happy()).count();
        let minority = model.agents().filter(|(_, r)| r.minority).count();
        Self {
            residents,
            happy,
            minority,
        }
    }
}
