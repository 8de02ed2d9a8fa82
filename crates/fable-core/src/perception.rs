//! What an agent can see of the cell it stands on.
//!
//! Foragers see both food pools since they harvest newly food. Vocalists
//! never harvest, so they only see what is in storage.

use fable_types::{AgentState, Perception};
use fable_world::Cell;

use crate::clock::DayClock;

/// Build the perception of `agent` standing on `cell`.
pub fn perceive(agent: &AgentState, cell: &Cell, clock: &DayClock) -> Perception {
    Perception {
        agent_id: agent.agent_id,
        kind: agent.kind,
        position: agent.position,
        energy: agent.energy,
        acted: agent.acted,
        stored_food: cell.stored_food(),
        newly_food: agent.kind.sees_newly_food().then(|| cell.newly_food()),
        day: clock.day(),
        season: clock.season(),
    }
}
