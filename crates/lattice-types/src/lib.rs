//! Shared type definitions for the Lattice simulation kernel.
//!
//! Types defined here are used by every other crate in the workspace and
//! flow downstream to `TypeScript` via `ts-rs` for the grid visualizer.
//!
//! # Modules
//!
//! - [`ids`] -- Sequential agent identifiers
//! - [`geometry`] -- Cell coordinates, continuous points, neighborhood shapes

pub mod geometry;
pub mod ids;

pub use geometry::{Coord, NeighborhoodKind, Point};
pub use ids::AgentId;
