//! Action validation, execution, and costs.
//!
//! Every request runs the same pipeline: the turn check, the capability
//! check, the action-specific preconditions, then execution. Validation is
//! read-only, so a rejection at any stage leaves the agent and the grid
//! exactly as they were.
//!
//! # Submodules
//!
//! - [`costs`] -- Energy cost per action type and the clamped debit.
//! - [`validation`] -- The three-stage validation pipeline.
//! - [`handlers`] -- Execution logic for each action.
//! - [`processor`] -- Validation and execution as one call.

pub mod costs;
pub mod handlers;
pub mod processor;
pub mod validation;
