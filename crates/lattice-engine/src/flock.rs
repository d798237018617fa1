//! Flocking in continuous space.
//!
//! Each bird looks at the birds within `vision` and steers toward their
//! center (cohesion), along their mean heading (alignment), and away from
//! any closer than `separation`. It then moves `speed` along its heading.
//! On a bounded plane a bird that would leave turns around instead.

use lattice_core::config::ModelConfig;
use lattice_core::{Agent, AgentContext, AgentError, Model, ModelError};
use lattice_space::ContinuousSpace;
use lattice_time::Schedule;
use lattice_types::Point;
use rand::Rng;
use serde::Serialize;
use tracing::info;

/// Weight of the separation term relative to cohesion and alignment.
const SEPARATION_WEIGHT: f64 = 1.5;

/// Weight of the cohesion term.
const COHESION_WEIGHT: f64 = 0.03;

/// A 2-D vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Heading {
    /// x component.
    pub dx: f64,
    /// y component.
    pub dy: f64,
}

impl Heading {
    /// Unit vector at `angle` radians.
    pub fn from_angle(angle: f64) -> Self {
        Self {
            dx: angle.cos(),
            dy: angle.sin(),
        }
    }

    fn length(self) -> f64 {
        self.dx.hypot(self.dy)
    }

    /// This vector scaled to length 1, or unchanged if it is zero.
    fn normalized(self) -> Self {
        let len = self.length();
        if len > f64::EPSILON {
            Self {
                dx: self.dx / len,
                dy: self.dy / len,
            }
        } else {
            self
        }
    }
}

/// One bird.
#[derive(Debug, Clone)]
pub struct Bird {
    /// Current unit heading.
    heading: Heading,
    /// Heading chosen in the decide phase.
    next: Option<Heading>,
    /// Distance per tick.
    speed: f64,
    /// Neighbor radius.
    vision: f64,
    /// Minimum comfortable distance.
    separation: f64,
}

impl Bird {
    /// A bird flying along `heading`.
    pub fn new(heading: Heading, params: &ModelConfig) -> Self {
        Self {
            heading: heading.normalized(),
            next: None,
            speed: params.speed,
            vision: params.vision,
            separation: params.separation,
        }
    }

    /// Current heading.
    pub const fn heading(&self) -> Heading {
        self.heading
    }

    /// New heading from the neighbors in view.
    fn steer(
        &self,
        ctx: &AgentContext<'_, Self, ContinuousSpace>,
    ) -> Result<Heading, AgentError> {
        let here = ctx.position().ok_or(AgentError::UnknownAgent(ctx.id()))?;
        let space = ctx.space();
        let mut cohesion = Heading::default();
        let mut alignment = Heading::default();
        let mut repulsion = Heading::default();
        let mut seen = 0_u32;

        for neighbor in space.neighbors_within(here, self.vision, false)? {
            let (Some(bird), Some(there)) = (ctx.agent(neighbor), space.position_of(neighbor))
            else {
                continue;
            };
            let offset = displacement(space, here, there);
            cohesion.dx += offset.dx;
            cohesion.dy += offset.dy;
            alignment.dx += bird.heading.dx;
            alignment.dy += bird.heading.dy;
            if offset.length() < self.separation {
                repulsion.dx -= offset.dx;
                repulsion.dy -= offset.dy;
            }
            seen = seen.saturating_add(1);
        }
        if seen == 0 {
            return Ok(self.heading);
        }
        let n = f64::from(seen);
        let alignment = Heading {
            dx: alignment.dx / n,
            dy: alignment.dy / n,
        }
        .normalized();
        Ok(Heading {
            dx: self.heading.dx
                + alignment.dx
                + COHESION_WEIGHT * cohesion.dx / n
                + SEPARATION_WEIGHT * repulsion.dx,
            dy: self.heading.dy
                + alignment.dy
                + COHESION_WEIGHT * cohesion.dy / n
                + SEPARATION_WEIGHT * repulsion.dy,
        }
        .normalized())
    }

    /// Move one tick along the current heading.
    fn advance(
        &mut self,
        ctx: &mut AgentContext<'_, Self, ContinuousSpace>,
    ) -> Result<(), AgentError> {
        let id = ctx.id();
        let here = ctx.position().ok_or(AgentError::UnknownAgent(id))?;
        let target = Point::new(
            here.x + self.heading.dx * self.speed,
            here.y + self.heading.dy * self.speed,
        );
        let space = ctx.space_mut();
        if !space.is_torus() && space.out_of_bounds(target) {
            self.heading = Heading {
                dx: -self.heading.dx,
                dy: -self.heading.dy,
            };
            return Ok(());
        }
        let _ = space.move_agent(id, target)?;
        Ok(())
    }
}

impl Agent<ContinuousSpace> for Bird {
    fn step(
        &mut self,
        ctx: &mut AgentContext<'_, Self, ContinuousSpace>,
    ) -> Result<(), AgentError> {
        self.heading = self.steer(ctx)?;
        self.advance(ctx)
    }

    fn decide(
        &mut self,
        ctx: &mut AgentContext<'_, Self, ContinuousSpace>,
    ) -> Result<(), AgentError> {
        self.next = Some(self.steer(ctx)?);
        Ok(())
    }

    fn commit(
        &mut self,
        ctx: &mut AgentContext<'_, Self, ContinuousSpace>,
    ) -> Result<(), AgentError> {
        if let Some(next) = self.next.take() {
            self.heading = next;
        }
        self.advance(ctx)
    }
}

/// Shortest vector from `from` to `to`, wrapping on a torus.
fn displacement(space: &ContinuousSpace, from: Point, to: Point) -> Heading {
    let mut dx = to.x - from.x;
    let mut dy = to.y - from.y;
    if space.is_torus() {
        let bounds = space.bounds();
        dx = wrap_delta(dx, bounds.width());
        dy = wrap_delta(dy, bounds.height());
    }
    Heading { dx, dy }
}

fn wrap_delta(delta: f64, span: f64) -> f64 {
    if delta > span / 2.0 {
        delta - span
    } else if delta < -span / 2.0 {
        delta + span
    } else {
        delta
    }
}

/// A flocking model.
pub type FlockModel = Model<Bird, ContinuousSpace, Schedule>;

/// Build a model with `params.agents` birds at uniform random positions and
/// headings.
///
/// # Errors
///
/// Propagates placement and id-allocation failures.
pub fn build(
    space: ContinuousSpace,
    schedule: Schedule,
    seed: u64,
    params: &ModelConfig,
) -> Result<FlockModel, ModelError> {
    let mut model = Model::new(space, schedule, seed);
    let bounds = model.space().bounds();
    for _ in 0..params.agents {
        let rng = model.rng();
        let at = Point::new(
            rng.random_range(bounds.x_min..bounds.x_max),
            rng.random_range(bounds.y_min..bounds.y_max),
        );
        let heading = Heading::from_angle(rng.random_range(0.0..std::f64::consts::TAU));
        let id = model.add_agent(Bird::new(heading, params))?;
        let _ = model.space_mut().place(id, at)?;
    }
    info!(birds = model.agent_count(), "flock model populated");
    Ok(model)
}

/// Model-specific part of the run report.
#[derive(Debug, Clone, Serialize)]
pub struct FlockReport {
    /// Birds in the model.
    pub birds: usize,
    /// Length of the mean heading: 1 when all birds fly the same way, near 0
    /// when headings are scattered.
    pub alignment: f64,
}

impl FlockReport {
    /// Summarize the current state of `model`.
    pub fn of(model: &FlockModel) -> Self {
        let birds = model.agent_count();
        let sum = model
            .agents()
            .fold(Heading::default(), |acc, (_, bird)| Heading {
                dx: acc.dx + bird.heading.dx,
                dy: acc.dy + bird.heading.dy,
            });
        let alignment = u32::try_from(birds)
            .ok()
            .filter(|&n| n > 0)
            .map_or(0.0, |n| sum.length() / f64::from(n));
        Self { birds, alignment }
    }
}
