//! Agent state and action processing for the Fable grid ecosystem.
//!
//! This crate is the logic layer for agents: registering them, deciding
//! whether a requested action is legal, and applying it to the agent and
//! the grid. It does no locking and knows nothing about days or seasons;
//! the environment in `fable-core` wraps it in a turn barrier.
//!
//! # Modules
//!
//! - [`actions`] -- Validation, execution, and energy costs.
//! - [`agent`] -- The per-environment agent registry ([`AgentRegistry`]).
//! - [`config`] -- Per-kind starting profiles ([`AgentProfile`], [`AgentDefaults`]).
//! - [`error`] -- Error types for agent operations ([`AgentError`]).

pub mod actions;
pub mod agent;
pub mod config;
pub mod error;

// Re-export primary types at crate root for convenience.
pub use actions::processor::{Applied, process_action};
pub use agent::{AgentRegistry, AgentSpec};
pub use config::{AgentDefaults, AgentProfile};
pub use error::AgentError;
