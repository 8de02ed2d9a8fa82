//! Error types for the fable-core crate.
//!
//! [`EngineError`] is what callers of the
//! [`EnvironmentRegistry`](crate::registry::EnvironmentRegistry) see. Every
//! variant is recoverable; none of them leaves an environment half-updated.

use fable_agents::AgentError;
use fable_types::{AgentId, EnvironmentId, RejectionReason};
use fable_world::WorldError;

use crate::clock::ClockError;
use crate::config::ConfigError;

/// Errors returned by environment and registry operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No environment is registered under this handle.
    #[error("unknown environment: {0}")]
    UnknownEnvironment(EnvironmentId),

    /// No agent is registered under this handle in the environment.
    #[error("unknown agent: {0}")]
    UnknownAgent(AgentId),

    /// The action failed validation and nothing changed.
    #[error("action by agent {agent} rejected: {reason}")]
    Rejected {
        /// The submitting agent.
        agent: AgentId,
        /// Why it was rejected.
        reason: RejectionReason,
    },

    /// A grid operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// An agent operation failed outside validation.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        source: AgentError,
    },

    /// The day clock could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// Configuration could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A thread panicked while holding an environment lock.
    #[error("environment state lock poisoned")]
    StatePoisoned,
}

impl EngineError {
    /// Attribute an [`AgentError`] raised while acting for `agent`.
    pub fn from_agent(agent: AgentId, err: AgentError) -> Self {
        match err {
            AgentError::Rejected(reason) => Self::Rejected { agent, reason },
            AgentError::AgentNotFound(id) => Self::UnknownAgent(id),
            AgentError::World { source } => Self::World { source },
        }
    }

    /// The caller-facing rejection kind, if this error is one.
    ///
    /// Grid access outside the bounds maps to
    /// [`RejectionReason::OutOfBounds`].
    pub const fn rejection(&self) -> Option<RejectionReason> {
        match self {
            Self::Rejected { reason, .. } => Some(*reason),
            Self::World {
                source: WorldError::OutOfBounds { .. },
            } => Some(RejectionReason::OutOfBounds),
            _ => None,
        }
    }
}

impl From<AgentError> for EngineError {
    fn from(source: AgentError) -> Self {
        Self::Agent { source }
    }
}
