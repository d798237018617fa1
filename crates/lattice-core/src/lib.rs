//! Agents, models, and run configuration for the Lattice simulation kernel.
//!
//! This crate joins a space from `lattice-space` and a schedule from
//! `lattice-time` into a runnable [`Model`].
//!
//! # Modules
//!
//! - [`agent`] -- The [`Agent`] trait, [`AgentError`], and [`StageTable`].
//! - [`config`] -- YAML configuration and builders for spaces and schedules.
//! - [`context`] -- [`AgentContext`], the model as seen by an acting agent.
//! - [`error`] -- Error types for model operations.
//! - [`model`] -- [`Model`] and the run loop.

pub mod agent;
pub mod config;
pub mod context;
pub mod error;
pub mod model;

// Re-export primary types at crate root.
pub use agent::{Agent, AgentError, StageFn, StageTable};
pub use config::{ConfigError, SimulationConfig};
pub use context::AgentContext;
pub use error::ModelError;
pub use model::{Model, RunSummary};
