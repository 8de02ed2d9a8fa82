//! Shared type definitions for the Fable grid ecosystem.
//!
//! This crate is the single source of truth for the data that crosses crate
//! boundaries: identifiers, seasons, agent kinds, action requests, and the
//! read-only views handed to the transport shell.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for environments and agents
//! - [`enums`] -- Seasons, agent kinds, action types, rejection reasons
//! - [`actions`] -- Action requests and the outcome returned after processing
//! - [`structs`] -- Agent state, cell state, snapshots, and the day-advanced event

pub mod actions;
pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::{Action, ActionOutcome};
pub use enums::{ActionType, AgentKind, RejectionReason, Season};
pub use ids::{AgentId, EnvironmentId, ParseHandleError};
pub use structs::{
    ActionCosts, AgentState, CellState, DayAdvanced, EnvironmentSnapshot, Perception, Position,
};
