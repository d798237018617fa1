//! Continuous 2-D space with a coarse grid as broad-phase index.
//!
//! Agents sit at real-valued [`Point`]s inside `[x_min, x_max) ×
//! [y_min, y_max)`. To avoid scanning every agent on a radius query, the
//! plane is cut into `grid_width × grid_height` buckets held in a
//! [`MultiGrid`]; an agent's bucket is always
//! `floor((pos - min) / cell_size)`, recomputed from its point on every
//! placement and move.
//!
//! # Neighbor queries
//!
//! [`ContinuousSpace::neighbors_within`] works in two phases:
//!
//! 1. **Broad phase** -- collect the agents in every bucket of the block
//!    `ceil(radius / cell_width)` columns by `ceil(radius / cell_height)`
//!    rows around the query's bucket. The block is never trimmed at its
//!    corners, so nothing within `radius` can be missed.
//! 2. **Exact phase** -- keep the candidates whose true distance (minimum
//!    image on a torus) is at most `radius`.

use std::collections::BTreeMap;

use lattice_types::{AgentId, Coord, Point};

use crate::error::SpaceError;
use crate::grid::MultiGrid;

/// Axis-aligned extent of a continuous space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Smallest x coordinate (inclusive).
    pub x_min: f64,
    /// Largest x coordinate (exclusive).
    pub x_max: f64,
    /// Smallest y coordinate (inclusive).
    pub y_min: f64,
    /// Largest y coordinate (exclusive).
    pub y_max: f64,
}

impl Bounds {
    /// Bounds `[0, x_max) × [0, y_max)`.
    pub const fn from_origin(x_max: f64, y_max: f64) -> Self {
        Self {
            x_min: 0.0,
            x_max,
            y_min: 0.0,
            y_max,
        }
    }

    /// Horizontal span.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Vertical span.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// A bounded, optionally toroidal, real-coordinate plane.
#[derive(Debug, Clone)]
pub struct ContinuousSpace {
    /// Extent of the plane.
    bounds: Bounds,
    /// Whether opposite edges are joined.
    torus: bool,
    /// Width of one broad-phase bucket.
    cell_width: f64,
    /// Height of one broad-phase bucket.
    cell_height: f64,
    /// Broad-phase index: each agent sits in the bucket covering its point.
    index: MultiGrid,
    /// Exact position of every placed agent.
    positions: BTreeMap<AgentId, Point>,
}

impl ContinuousSpace {
    /// Create an empty space over `bounds` with a `grid_width × grid_height`
    /// broad-phase index.
    ///
    /// More buckets make moves slightly costlier and radius queries cheaper.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::InvalidDimensions`] if a span is not a positive
    /// finite number or a bucket count is zero.
    pub fn new(
        bounds: Bounds,
        torus: bool,
        grid_width: u32,
        grid_height: u32,
    ) -> Result<Self, SpaceError> {
        let (width, height) = (bounds.width(), bounds.height());
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SpaceError::InvalidDimensions {
                reason: format!(
                    "continuous space spans must be positive and finite, got {width} x {height}"
                ),
            });
        }
        let index = MultiGrid::new(grid_width, grid_height, torus)?;
        Ok(Self {
            bounds,
            torus,
            cell_width: width / f64::from(grid_width),
            cell_height: height / f64::from(grid_height),
            index,
            positions: BTreeMap::new(),
        })
    }

    /// Extent of the plane.
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Whether the plane wraps at its edges.
    pub const fn is_torus(&self) -> bool {
        self.torus
    }

    /// Size `(width, height)` of one broad-phase bucket.
    pub const fn cell_size(&self) -> (f64, f64) {
        (self.cell_width, self.cell_height)
    }

    /// Number of agents currently placed.
    pub fn agent_count(&self) -> usize {
        self.positions.len()
    }

    /// The exact position of `agent`, if placed.
    pub fn position_of(&self, agent: AgentId) -> Option<Point> {
        self.positions.get(&agent).copied()
    }

    /// Whether `agent` is placed in this space.
    pub fn contains(&self, agent: AgentId) -> bool {
        self.positions.contains_key(&agent)
    }

    /// Iterate over `(agent, x, y)` for every placed agent.
    pub fn agents(&self) -> impl Iterator<Item = (AgentId, f64, f64)> + '_ {
        self.positions.iter().map(|(&agent, p)| (agent, p.x, p.y))
    }

    // -------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------

    /// Whether `pos` lies outside `[x_min, x_max) × [y_min, y_max)`.
    ///
    /// Non-finite points are always out of bounds.
    pub fn out_of_bounds(&self, pos: Point) -> bool {
        let b = &self.bounds;
        !(pos.x >= b.x_min && pos.x < b.x_max && pos.y >= b.y_min && pos.y < b.y_max)
    }

    /// Bring `pos` into the plane.
    ///
    /// In-bounds points are returned unchanged; on a torus the others wrap
    /// modulo the span of each axis.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::OutOfBounds`] for an outside point on a
    /// non-toroidal plane, or for a non-finite point.
    pub fn torus_adjust(&self, pos: Point) -> Result<Point, SpaceError> {
        if !self.out_of_bounds(pos) {
            return Ok(pos);
        }
        if !self.torus || !pos.is_finite() {
            return Err(SpaceError::OutOfBounds(pos.into()));
        }
        let b = &self.bounds;
        Ok(Point::new(
            wrap_axis(pos.x, b.x_min, b.width()),
            wrap_axis(pos.y, b.y_min, b.height()),
        ))
    }

    /// Euclidean distance between two points.
    ///
    /// On a torus each axis uses the shorter way round:
    /// `min(|Δ|, span - |Δ|)`.
    pub fn distance(&self, a: Point, b: Point) -> f64 {
        let mut dx = (a.x - b.x).abs();
        let mut dy = (a.y - b.y).abs();
        if self.torus {
            dx = dx.min(self.bounds.width() - dx);
            dy = dy.min(self.bounds.height() - dy);
        }
        dx.hypot(dy)
    }

    /// Broad-phase bucket of an in-bounds point.
    fn bucket_of(&self, pos: Point) -> Coord {
        Coord::new(
            bucket_index(
                (pos.x - self.bounds.x_min) / self.cell_width,
                self.index.width(),
            ),
            bucket_index(
                (pos.y - self.bounds.y_min) / self.cell_height,
                self.index.height(),
            ),
        )
    }

    // -------------------------------------------------------------------
    // Placement
    // -------------------------------------------------------------------

    /// Place a new agent at `pos`, returning the point actually used
    /// (wrapped on a torus).
    ///
    /// # Errors
    ///
    /// [`SpaceError::OutOfBounds`] or [`SpaceError::AlreadyPlaced`].
    pub fn place(&mut self, agent: AgentId, pos: Point) -> Result<Point, SpaceError> {
        let at = self.torus_adjust(pos)?;
        if let Some(current) = self.position_of(agent) {
            return Err(SpaceError::AlreadyPlaced {
                agent,
                position: current.into(),
            });
        }
        self.index.place(agent, self.bucket_of(at))?;
        self.positions.insert(agent, at);
        Ok(at)
    }

    /// Move a placed agent to `pos`, returning the point actually used.
    ///
    /// # Errors
    ///
    /// [`SpaceError::AgentNotFound`] or [`SpaceError::OutOfBounds`]; the
    /// space is unchanged on error.
    pub fn move_agent(&mut self, agent: AgentId, pos: Point) -> Result<Point, SpaceError> {
        if !self.contains(agent) {
            return Err(SpaceError::AgentNotFound(agent));
        }
        let at = self.torus_adjust(pos)?;
        self.index.move_agent(agent, self.bucket_of(at))?;
        self.positions.insert(agent, at);
        Ok(at)
    }

    /// Remove an agent, returning its last position.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::AgentNotFound`] if the agent is not placed.
    pub fn remove(&mut self, agent: AgentId) -> Result<Point, SpaceError> {
        let last = self
            .position_of(agent)
            .ok_or(SpaceError::AgentNotFound(agent))?;
        self.index.remove(agent)?;
        self.positions.remove(&agent);
        Ok(last)
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Agents whose distance from `pos` is at most `radius`.
    ///
    /// An agent exactly at `pos` is kept only when `include_center` is set.
    /// A negative or NaN radius matches nothing. The result is a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::OutOfBounds`] if `pos` is outside a
    /// non-toroidal plane.
    pub fn neighbors_within(
        &self,
        pos: Point,
        radius: f64,
        include_center: bool,
    ) -> Result<Vec<AgentId>, SpaceError> {
        let center = self.torus_adjust(pos)?;
        if radius.is_nan() || radius < 0.0 {
            return Ok(Vec::new());
        }
        let rx = bucket_radius(radius, self.cell_width, self.index.width());
        let ry = bucket_radius(radius, self.cell_height, self.index.height());
        let buckets = self.index.block(self.bucket_of(center), rx, ry);

        let neighbors = self
            .index
            .cell_list_contents(buckets)
            .filter(|agent| {
                self.position_of(*agent).is_some_and(|p| {
                    let d = self.distance(center, p);
                    d <= radius && (include_center || d > 0.0)
                })
            })
            .collect();
        Ok(neighbors)
    }
}

/// Wrap `value` into `[min, min + span)`.
fn wrap_axis(value: f64, min: f64, span: f64) -> f64 {
    let offset = (value - min).rem_euclid(span);
    // rem_euclid can round up to exactly `span` for tiny negative inputs.
    if offset >= span { min } else { min + offset }
}

/// Bucket index for a scaled coordinate, clamped to `[0, buckets)`.
// Clamped to [0, u32::MAX - 1] and integral, so the cast is exact.
#[allow(clippy::cast_possible_truncation)]
fn bucket_index(scaled: f64, buckets: u32) -> i64 {
    let top = f64::from(buckets.saturating_sub(1));
    scaled.floor().clamp(0.0, top) as i64
}

/// Number of buckets a radius spans along one axis, capped at the axis
/// length (a wider block only revisits the same buckets).
// 0 <= cells < buckets <= u32::MAX and integral past the early return.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bucket_radius(radius: f64, cell: f64, buckets: u32) -> u32 {
    let cells = (radius / cell).ceil();
    if !cells.is_finite() || cells >= f64::from(buckets) {
        return buckets;
    }
    cells.max(0.0) as u32
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    const EPSILON: f64 = 1e-9;

    fn id(n: u64) -> AgentId {
        AgentId::new(n)
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn space(torus: bool) -> ContinuousSpace {
        ContinuousSpace::new(Bounds::from_origin(10.0, 10.0), torus, 5, 5).unwrap()
    }

    #[test]
    fn invalid_bounds_rejected() {
        assert!(ContinuousSpace::new(Bounds::from_origin(0.0, 10.0), false, 5, 5).is_err());
        assert!(ContinuousSpace::new(Bounds::from_origin(10.0, f64::NAN), false, 5, 5).is_err());
        assert!(ContinuousSpace::new(Bounds::from_origin(10.0, 10.0), false, 0, 5).is_err());
    }

    #[test]
    fn torus_distance_uses_minimum_image() {
        let s = space(true);
        let d = s.distance(p(0.0, 0.0), p(9.0, 9.0));
        assert!((d - 2.0_f64.sqrt()).abs() < EPSILON);
    }

    #[test]
    fn bounded_distance_is_plain_euclidean() {
        let s = space(false);
        let d = s.distance(p(0.0, 0.0), p(9.0, 9.0));
        assert!((d - 162.0_f64.sqrt()).abs() < EPSILON);
    }

    #[test]
    fn torus_adjust_wraps_each_axis() {
        let s = ContinuousSpace::new(
            Bounds {
                x_min: -5.0,
                x_max: 5.0,
                y_min: 0.0,
                y_max: 2.0,
            },
            true,
            2,
            2,
        )
        .unwrap();
        let q = s.torus_adjust(p(6.0, -0.5)).unwrap();
        assert!((q.x - -4.0).abs() < EPSILON);
        assert!((q.y - 1.5).abs() < EPSILON);
        let edge = s.torus_adjust(p(5.0, 2.0)).unwrap();
        assert!((edge.x - -5.0).abs() < EPSILON);
        assert!(edge.y.abs() < EPSILON);
    }

    #[test]
    fn torus_adjust_rejects_outside_bounded_plane() {
        let s = space(false);
        assert!(matches!(
            s.torus_adjust(p(10.0, 1.0)),
            Err(SpaceError::OutOfBounds(_))
        ));
        assert!(s.torus_adjust(p(9.99, 0.0)).is_ok());
    }

    #[test]
    fn non_finite_points_are_rejected_even_on_torus() {
        let s = space(true);
        assert!(s.torus_adjust(p(f64::NAN, 1.0)).is_err());
        assert!(s.torus_adjust(p(1.0, f64::INFINITY)).is_err());
    }

    #[test]
    fn place_and_move_keep_bucket_in_sync() {
        let mut s = space(false);
        s.place(id(1), p(1.0, 1.0)).unwrap();
        assert_eq!(s.index.position_of(id(1)), Some(Coord::new(0, 0)));
        s.move_agent(id(1), p(9.5, 4.1)).unwrap();
        assert_eq!(s.index.position_of(id(1)), Some(Coord::new(4, 2)));
        assert_eq!(s.position_of(id(1)), Some(p(9.5, 4.1)));
    }

    #[test]
    fn failed_move_leaves_agent_in_place() {
        let mut s = space(false);
        s.place(id(1), p(1.0, 1.0)).unwrap();
        assert!(s.move_agent(id(1), p(11.0, 1.0)).is_err());
        assert_eq!(s.position_of(id(1)), Some(p(1.0, 1.0)));
        assert_eq!(s.index.position_of(id(1)), Some(Coord::new(0, 0)));
    }

    #[test]
    fn remove_clears_both_indexes() {
        let mut s = space(true);
        s.place(id(1), p(3.0, 3.0)).unwrap();
        s.remove(id(1)).unwrap();
        assert!(!s.contains(id(1)));
        assert!(!s.index.contains(id(1)));
        assert!(matches!(s.remove(id(1)), Err(SpaceError::AgentNotFound(_))));
    }

    #[test]
    fn neighbors_within_respects_include_center() {
        let mut s = space(false);
        s.place(id(1), p(5.0, 5.0)).unwrap();
        s.place(id(2), p(6.0, 5.0)).unwrap();
        s.place(id(3), p(8.0, 8.0)).unwrap();

        let with: BTreeSet<AgentId> = s
            .neighbors_within(p(5.0, 5.0), 1.5, true)
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(with, [id(1), id(2)].into_iter().collect());

        let without = s.neighbors_within(p(5.0, 5.0), 1.5, false).unwrap();
        assert_eq!(without, vec![id(2)]);
    }

    #[test]
    fn neighbors_within_sees_across_the_seam() {
        let mut s = space(true);
        s.place(id(1), p(0.2, 0.2)).unwrap();
        s.place(id(2), p(9.8, 9.8)).unwrap();
        let found = s.neighbors_within(p(0.2, 0.2), 1.0, false).unwrap();
        assert_eq!(found, vec![id(2)]);
    }

    #[test]
    fn negative_radius_matches_nothing() {
        let mut s = space(false);
        s.place(id(1), p(5.0, 5.0)).unwrap();
        assert!(s.neighbors_within(p(5.0, 5.0), -1.0, true).unwrap().is_empty());
        assert!(s.neighbors_within(p(5.0, 5.0), f64::NAN, true).unwrap().is_empty());
    }

    fn brute_force(s: &ContinuousSpace, center: Point, radius: f64) -> BTreeSet<AgentId> {
        s.agents()
            .filter(|&(_, x, y)| s.distance(center, p(x, y)) <= radius)
            .map(|(agent, _, _)| agent)
            .collect()
    }

    #[test]
    fn broad_phase_has_no_false_negatives() {
        let mut rng = SmallRng::seed_from_u64(7);
        // Square, wide, and tall buckets; bounded and toroidal.
        for &(gw, gh) in &[(10_u32, 10_u32), (3, 17), (20, 2), (1, 1), (50, 50)] {
            for torus in [false, true] {
                let mut s =
                    ContinuousSpace::new(Bounds::from_origin(30.0, 20.0), torus, gw, gh).unwrap();
                for n in 0..200 {
                    let at = p(rng.random_range(0.0..30.0), rng.random_range(0.0..20.0));
                    s.place(id(n), at).unwrap();
                }
                for _ in 0..40 {
                    let center = p(rng.random_range(0.0..30.0), rng.random_range(0.0..20.0));
                    let radius = rng.random_range(0.0..12.0);
                    let fast: BTreeSet<AgentId> = s
                        .neighbors_within(center, radius, true)
                        .unwrap()
                        .into_iter()
                        .collect();
                    assert_eq!(
                        fast,
                        brute_force(&s, center, radius),
                        "grid {gw}x{gh} torus={torus} radius={radius}"
                    );
                }
            }
        }
    }

    #[test]
    fn bucket_radius_caps_at_axis_length() {
        assert_eq!(bucket_radius(3.0, 1.0, 10), 3);
        assert_eq!(bucket_radius(2.5, 1.0, 10), 3);
        assert_eq!(bucket_radius(100.0, 1.0, 10), 10);
        assert_eq!(bucket_radius(0.0, 1.0, 10), 0);
    }
}
