//! Error types for the `lattice-core` crate.

use lattice_space::SpaceError;
use lattice_time::ScheduleError;
use lattice_types::AgentId;

/// Errors that can occur while building or running a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A space operation failed.
    #[error("space error: {0}")]
    Space(#[from] SpaceError),

    /// A tick was aborted or the schedule was misconfigured.
    #[error("schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// The id does not name a live agent.
    #[error("no such agent: {0}")]
    UnknownAgent(AgentId),

    /// No further agent ids can be allocated.
    #[error("agent id space exhausted")]
    IdsExhausted,
}
