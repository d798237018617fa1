//! The agent capability contract.
//!
//! An agent implements whichever behaviours its schedule will ask for.
//! Every behaviour receives the agent itself plus an [`AgentContext`] that
//! exposes the rest of the model for the duration of the call.
//!
//! Staged schedules name their stages with strings. The model resolves
//! those names once, when it is built, against the agent's [`StageTable`];
//! the names `step`, `decide`, and `commit` fall back to the trait methods
//! of the same name when the table does not override them.

use lattice_space::SpaceError;
use lattice_types::AgentId;

use crate::context::AgentContext;

/// Errors raised by agent behaviours.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The agent has no behaviour for this activation.
    #[error("behaviour `{activation}` is not implemented")]
    Unsupported {
        /// Name of the activation or stage.
        activation: String,
    },

    /// A space operation made by the agent failed.
    #[error("space operation failed: {0}")]
    Space(#[from] SpaceError),

    /// The agent referred to an agent that does not exist.
    #[error("no such agent: {0}")]
    UnknownAgent(AgentId),

    /// No further agent ids can be allocated.
    #[error("agent id space exhausted")]
    IdsExhausted,

    /// Domain-specific failure reported by the agent.
    #[error("{reason}")]
    Behaviour {
        /// What went wrong.
        reason: String,
    },
}

impl AgentError {
    /// Shorthand for [`AgentError::Unsupported`].
    pub fn unsupported(activation: impl Into<String>) -> Self {
        Self::Unsupported {
            activation: activation.into(),
        }
    }
}

/// A stage callback: `fn(agent, context)`.
pub type StageFn<A, S> = fn(&mut A, &mut AgentContext<'_, A, S>) -> Result<(), AgentError>;

/// Named stage callbacks an agent type offers to staged schedules.
pub struct StageTable<A, S> {
    /// Callbacks in registration order.
    entries: Vec<(&'static str, StageFn<A, S>)>,
}

impl<A, S> StageTable<A, S> {
    /// A table with no entries.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add (or replace) the callback for `name`.
    #[must_use]
    pub fn with(mut self, name: &'static str, callback: StageFn<A, S>) -> Self {
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, callback));
        self
    }

    /// The callback registered for `name`.
    pub fn get(&self, name: &str) -> Option<StageFn<A, S>> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|&(_, callback)| callback)
    }

    /// Number of registered stages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no stage is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A, S> Default for StageTable<A, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, S> core::fmt::Debug for StageTable<A, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

/// Behaviour of an agent living in a space of type `S`.
///
/// All behaviours default to [`AgentError::Unsupported`], so an agent only
/// implements what its schedule uses: `step` for base and random
/// activation, `decide` and `commit` for simultaneous activation, and
/// [`stages`](Agent::stages) for staged activation.
pub trait Agent<S>: Sized {
    /// Single-phase behaviour.
    fn step(&mut self, _ctx: &mut AgentContext<'_, Self, S>) -> Result<(), AgentError> {
        Err(AgentError::unsupported("step"))
    }

    /// First phase of simultaneous activation: observe and record intent.
    fn decide(&mut self, _ctx: &mut AgentContext<'_, Self, S>) -> Result<(), AgentError> {
        Err(AgentError::unsupported("decide"))
    }

    /// Second phase of simultaneous activation: apply the recorded intent.
    fn commit(&mut self, _ctx: &mut AgentContext<'_, Self, S>) -> Result<(), AgentError> {
        Err(AgentError::unsupported("commit"))
    }

    /// Named stage callbacks for staged activation.
    fn stages() -> StageTable<Self, S> {
        StageTable::new()
    }
}

/// Resolve one stage name to a callback.
///
/// The agent's table wins; otherwise the built-in behaviour names map to
/// the trait methods.
pub(crate) fn resolve_stage<A: Agent<S>, S>(
    table: &StageTable<A, S>,
    name: &str,
) -> Option<StageFn<A, S>> {
    table.get(name).or_else(|| match name {
        "step" => Some(A::step as StageFn<A, S>),
        "decide" => Some(A::decide as StageFn<A, S>),
        "commit" => Some(A::commit as StageFn<A, S>),
        _ => None,
    })
}
