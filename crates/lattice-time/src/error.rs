//! Error types for the `lattice-time` crate.

use lattice_types::AgentId;

/// Errors that can occur while building or stepping a schedule.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// The agent has no behaviour for the requested activation.
    #[error("agent {agent} does not support activation `{activation}`")]
    UnsupportedAgent {
        /// The agent that was activated.
        agent: AgentId,
        /// Name of the activation or stage.
        activation: String,
    },

    /// The agent's behaviour returned an error; the tick was aborted.
    #[error("agent {agent} failed during `{activation}`")]
    AgentFailed {
        /// The agent that failed.
        agent: AgentId,
        /// Name of the activation or stage.
        activation: String,
        /// The underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A registered id has no agent behind it.
    #[error("no agent registered under {0}")]
    UnknownAgent(AgentId),

    /// The schedule was configured with unusable values.
    #[error("invalid schedule configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },

    /// The step or stage counter would overflow.
    #[error("schedule counter overflow: cannot advance beyond u64::MAX")]
    CounterOverflow,
}
