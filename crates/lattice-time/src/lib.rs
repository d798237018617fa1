//! Activation scheduling for the Lattice simulation kernel.
//!
//! A scheduler owns an ordered registry of agent ids and a tick clock. Each
//! call to [`Scheduler::step`] runs one tick, asking the model (through the
//! [`Activate`] trait) to run a behaviour for each registered agent in an
//! order and phase structure defined by the regime.
//!
//! Every phase iterates a snapshot of the registry taken when the phase
//! starts. Agents removed before their turn are skipped; agents added
//! during a tick are first activated on the next one. An activation error
//! aborts the tick and leaves the counters where they were.
//!
//! # Modules
//!
//! - [`activation`] -- [`Activation`] kinds, [`Stage`], and the [`Activate`]
//!   trait the model implements.
//! - [`clock`] -- [`TickClock`]: step counter and integer-derived time.
//! - [`error`] -- Error types for scheduling.
//! - [`random`] -- [`RandomScheduler`], reshuffled every tick.
//! - [`registry`] -- [`Registry`], the ordered agent list.
//! - [`schedule`] -- [`Schedule`], a run-time choice of regime.
//! - [`scheduler`] -- The [`Scheduler`] trait and [`BaseScheduler`].
//! - [`simultaneous`] -- [`SimultaneousScheduler`], decide then commit.
//! - [`staged`] -- [`StagedScheduler`], named stages per tick.

pub mod activation;
pub mod clock;
pub mod error;
pub mod random;
pub mod registry;
pub mod schedule;
pub mod scheduler;
pub mod simultaneous;
pub mod staged;

#[cfg(test)]
mod testing;

// Re-export primary types at crate root.
pub use activation::{Activate, Activation, Stage};
pub use clock::TickClock;
pub use error::ScheduleError;
pub use random::RandomScheduler;
pub use registry::Registry;
pub use schedule::Schedule;
pub use scheduler::{BaseScheduler, Scheduler};
pub use simultaneous::SimultaneousScheduler;
pub use staged::{DEFAULT_STAGE, StagedScheduler};
