//! Day clock, turn barrier, and environment orchestration for the Fable
//! grid ecosystem.
//!
//! An environment's day only advances once every registered agent has
//! acted exactly once. This crate owns that rule and the single lock that
//! makes it hold under concurrent submissions.
//!
//! # Modules
//!
//! - [`barrier`] -- [`TurnBarrier`]: counts completed actions per day.
//! - [`clock`] -- [`DayClock`]: day within the season, season, total days.
//! - [`config`] -- Configuration loading from `fable-config.yaml`.
//! - [`environment`] -- [`Environment`]: one grid, its agents, its RNG.
//! - [`error`] -- [`EngineError`], the caller-facing error type.
//! - [`perception`] -- What an agent can see of its own cell.
//! - [`registry`] -- [`EnvironmentRegistry`]: the entry point for the
//!   transport shell, including the day-advanced broadcast.
//!
//! [`TurnBarrier`]: barrier::TurnBarrier
//! [`DayClock`]: clock::DayClock
//! [`Environment`]: environment::Environment
//! [`EngineError`]: error::EngineError
//! [`EnvironmentRegistry`]: registry::EnvironmentRegistry

pub mod barrier;
pub mod clock;
pub mod config;
pub mod environment;
pub mod error;
pub mod perception;
pub mod registry;

pub use environment::{Environment, EnvironmentParams, WorldSettings};
pub use error::EngineError;
pub use registry::EnvironmentRegistry;
