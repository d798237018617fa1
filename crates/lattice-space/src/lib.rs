//! Spaces for the Lattice simulation kernel.
//!
//! A space stores where agents are and answers neighbor queries. It never
//! owns agents; it holds their [`AgentId`]s and an index from each agent to
//! its current position, which the model treats as the agent's position.
//!
//! # Modules
//!
//! - [`cell`] -- Per-cell storage: [`Slot`] holds at most one agent,
//!   [`Bucket`] holds any number.
//! - [`continuous`] -- [`ContinuousSpace`], real-valued positions with a
//!   coarse [`MultiGrid`] as broad-phase index.
//! - [`error`] -- Error types for space operations.
//! - [`free_cells`] -- O(1) index of the empty cells of a [`SingleGrid`].
//! - [`grid`] -- [`Grid`] and [`MultiGrid`]: rectangular, optionally
//!   toroidal lattices with Moore and von Neumann neighborhoods.
//! - [`neighborhood`] -- Offset generation for neighborhood shapes.
//! - [`single`] -- [`SingleGrid`], a grid that tracks its empty cells.
//! - [`space`] -- The [`Space`] placement trait shared by all of the above.
//!
//! [`AgentId`]: lattice_types::AgentId

pub mod cell;
pub mod continuous;
pub mod error;
pub mod free_cells;
pub mod grid;
pub mod neighborhood;
pub mod single;
pub mod space;

// Re-export primary types at crate root.
pub use cell::{Bucket, Cell, Slot};
pub use continuous::{Bounds, ContinuousSpace};
pub use error::{Position, SpaceError};
pub use free_cells::FreeCells;
pub use grid::{Grid, MultiGrid};
pub use single::SingleGrid;
pub use space::Space;
