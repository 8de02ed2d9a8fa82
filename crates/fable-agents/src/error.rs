//! Error types for the fable-agents crate.
//!
//! All operations that can fail return typed errors rather than panicking.

use fable_types::{AgentId, RejectionReason};
use fable_world::WorldError;

/// Errors that can occur during agent operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// The action failed validation. Nothing was changed.
    #[error("action rejected: {0}")]
    Rejected(RejectionReason),

    /// Agent with the given ID is not in the registry.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// A grid operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

impl From<RejectionReason> for AgentError {
    fn from(reason: RejectionReason) -> Self {
        Self::Rejected(reason)
    }
}
