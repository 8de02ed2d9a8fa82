//! Validation and execution as a single step.

use fable_types::{Action, AgentState, CellState};
use fable_world::Grid;
use tracing::debug;

use crate::actions::{handlers, validation};
use crate::error::AgentError;

/// State after an action was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// The agent after the action (`acted` is now `true`).
    pub agent: AgentState,
    /// The cell the agent occupies after the action.
    pub cell: CellState,
}

/// Validate `action` for `agent` and, if legal, apply it.
///
/// # Errors
///
/// Returns [`AgentError::Rejected`] with the first failing stage's reason.
/// The agent and the grid are unchanged on every error path.
pub fn process_action(
    action: Action,
    agent: &mut AgentState,
    grid: &mut Grid,
) -> Result<Applied, AgentError> {
    if let Err(reason) = validation::validate_action(action, agent, grid) {
        debug!(agent_id = %agent.agent_id, ?action, %reason, "Action rejected");
        return Err(AgentError::Rejected(reason));
    }
    handlers::execute(action, agent, grid)?;
    let cell = grid.cell_state(agent.position.row, agent.position.col)?;
    debug!(
        agent_id = %agent.agent_id,
        ?action,
        energy = agent.energy,
        position = %agent.position,
        "Action applied"
    );
    Ok(Applied {
        agent: agent.clone(),
        cell,
    })
}
