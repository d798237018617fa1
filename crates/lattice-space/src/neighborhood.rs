//! Offset patterns for cell neighborhoods.
//!
//! These functions produce relative `(dx, dy)` offsets only. Resolving them
//! against a concrete grid (wrapping on a torus, discarding off-grid cells,
//! removing duplicates) is done by [`Grid`](crate::grid::Grid).
//!
//! Offsets are emitted row by row: `dy` is the outer loop and `dx` the inner
//! one, both ascending.
//!
//! Callers pass a window per axis so that the work done is bounded by the
//! grid, not by the radius. [`full`] is the unclipped window.

use std::ops::RangeInclusive;

use lattice_types::NeighborhoodKind;

/// The window `[-radius, radius]`.
pub fn full(radius: u32) -> RangeInclusive<i64> {
    let r = i64::from(radius);
    r.saturating_neg()..=r
}

/// Offsets of a neighborhood of the given shape and radius whose `dx` lies
/// in `xs` and `dy` in `ys`.
///
/// - The origin is skipped unless `include_center` is set.
/// - [`NeighborhoodKind::VonNeumann`] skips every diagonal offset.
/// - [`NeighborhoodKind::Moore`] with `radius > 1` skips offsets whose
///   Euclidean length exceeds `radius`, trimming the square to a disc.
///
/// Both windows are intersected with [`full`]`(radius)`, so a window never
/// admits an offset the radius would reject.
pub fn offsets(
    kind: NeighborhoodKind,
    include_center: bool,
    radius: u32,
    xs: RangeInclusive<i64>,
    ys: RangeInclusive<i64>,
) -> Vec<(i64, i64)> {
    let r = i64::from(radius);
    let r_squared = u64::from(radius).saturating_mul(u64::from(radius));
    let xs = clip(xs, r);
    let ys = clip(ys, r);
    let mut result = Vec::new();
    for dy in ys {
        for dx in xs.clone() {
            if dx == 0 && dy == 0 && !include_center {
                continue;
            }
            match kind {
                NeighborhoodKind::VonNeumann => {
                    if dx != 0 && dy != 0 {
                        continue;
                    }
                }
                NeighborhoodKind::Moore => {
                    if radius > 1 && squared_length(dx, dy) > r_squared {
                        continue;
                    }
                }
            }
            result.push((dx, dy));
        }
    }
    result
}

/// Offsets of the full rectangle `[-rx, rx] × [-ry, ry]`, origin included.
///
/// Used as the broad phase of continuous-space queries, where trimming the
/// corners could drop candidates that are within range.
pub fn block_offsets(rx: u32, ry: u32) -> Vec<(i64, i64)> {
    let rx = i64::from(rx);
    let ry = i64::from(ry);
    let mut result = Vec::new();
    for dy in ry.saturating_neg()..=ry {
        for dx in rx.saturating_neg()..=rx {
            result.push((dx, dy));
        }
    }
    result
}

fn clip(window: RangeInclusive<i64>, r: i64) -> RangeInclusive<i64> {
    let (lo, hi) = window.into_inner();
    lo.max(r.saturating_neg())..=hi.min(r)
}

fn squared_length(dx: i64, dy: i64) -> u64 {
    let ax = dx.unsigned_abs();
    let ay = dy.unsigned_abs();
    ax.saturating_mul(ax).saturating_add(ay.saturating_mul(ay))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moore_radius_one_has_eight_offsets() {
        let o = offsets(NeighborhoodKind::Moore, false, 1, full(1), full(1));
        assert_eq!(o.len(), 8);
        assert!(!o.contains(&(0, 0)));
        assert!(o.contains(&(-1, -1)));
    }

    #[test]
    fn von_neumann_radius_one_has_four_offsets() {
        let o = offsets(NeighborhoodKind::VonNeumann, false, 1, full(1), full(1));
        assert_eq!(o, vec![(0, -1), (-1, 0), (1, 0), (0, 1)]);
    }

    #[test]
    fn include_center_adds_origin() {
        let o = offsets(NeighborhoodKind::Moore, true, 1, full(1), full(1));
        assert_eq!(o.len(), 9);
        assert!(o.contains(&(0, 0)));
    }

    #[test]
    fn moore_radius_two_trims_corners() {
        // (2, 2) has length sqrt(8) > 2; (2, 1) has length sqrt(5) > 2;
        // (2, 0) has length exactly 2 and stays.
        let o = offsets(NeighborhoodKind::Moore, false, 2, full(2), full(2));
        assert!(!o.contains(&(2, 2)));
        assert!(!o.contains(&(2, 1)));
        assert!(o.contains(&(2, 0)));
        assert!(o.contains(&(1, 1)));
        assert_eq!(o.len(), 12);
    }

    #[test]
    fn von_neumann_radius_two_is_a_cross() {
        let o = offsets(NeighborhoodKind::VonNeumann, false, 2, full(2), full(2));
        assert_eq!(o.len(), 8);
        assert!(o.iter().all(|&(dx, dy)| dx == 0 || dy == 0));
    }

    #[test]
    fn radius_zero_is_center_or_nothing() {
        assert!(offsets(NeighborhoodKind::Moore, false, 0, full(0), full(0)).is_empty());
        assert_eq!(offsets(NeighborhoodKind::Moore, true, 0, full(0), full(0)), vec![(0, 0)]);
    }

    #[test]
    fn window_clips_without_changing_the_shape() {
        let o = offsets(NeighborhoodKind::Moore, false, 2, 0..=5, -1..=0);
        assert_eq!(o, vec![(0, -1), (1, -1), (1, 0), (2, 0)]);
    }

    #[test]
    fn huge_radius_is_bounded_by_the_window() {
        let o = offsets(NeighborhoodKind::Moore, true, u32::MAX, -1..=1, -1..=1);
        assert_eq!(o.len(), 9);
        let empty = offsets(NeighborhoodKind::VonNeumann, false, u32::MAX, 3..=1, 0..=0);
        assert!(empty.is_empty());
    }

    #[test]
    fn block_is_full_rectangle() {
        let o = block_offsets(2, 1);
        assert_eq!(o.len(), 15);
        assert!(o.contains(&(2, 1)));
        assert!(o.contains(&(-2, -1)));
        assert!(o.contains(&(0, 0)));
    }
}
