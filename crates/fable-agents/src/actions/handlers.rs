//! Execution handlers for agent actions.
//!
//! Each handler assumes the action has already passed the validation
//! pipeline. It applies the grid effect first (the only step that can
//! fail), then the energy change, then marks the agent as having acted.

use fable_types::{Action, AgentState};
use fable_world::Grid;

use crate::actions::{costs, validation};
use crate::error::AgentError;

/// Apply a validated action to the agent and the grid.
///
/// # Errors
///
/// Returns [`AgentError::World`] if a grid operation fails, or
/// [`AgentError::Rejected`] if a move turns out to be illegal. In both
/// cases nothing has been modified.
pub fn execute(action: Action, agent: &mut AgentState, grid: &mut Grid) -> Result<(), AgentError> {
    let cost = costs::energy_cost(action.action_type(), &agent.costs);
    match action {
        Action::Move { d_row, d_col } => execute_move(agent, grid, d_row, d_col, cost)?,
        Action::Eat => execute_eat(agent, grid, cost)?,
        Action::Forage => execute_forage(agent, grid, cost)?,
        Action::Idle | Action::Vocalize => {
            agent.energy = costs::debit(agent.energy, cost);
        }
    }
    agent.acted = true;
    Ok(())
}

fn execute_move(
    agent: &mut AgentState,
    grid: &Grid,
    d_row: i32,
    d_col: i32,
    cost: u32,
) -> Result<(), AgentError> {
    agent.position = validation::move_destination(agent.position, d_row, d_col, grid)?;
    agent.energy = costs::debit(agent.energy, cost);
    Ok(())
}

/// Eat one stored unit: gain the cell's intrinsic energy, then pay the cost.
fn execute_eat(agent: &mut AgentState, grid: &mut Grid, cost: u32) -> Result<(), AgentError> {
    let gain = grid.mutate(agent.position.row, agent.position.col, |cell| {
        let gain = cell.intrinsic_energy();
        cell.consume_one().map(|()| gain)
    })??;
    agent.energy = costs::debit(agent.energy.saturating_add(gain), cost);
    Ok(())
}

fn execute_forage(agent: &mut AgentState, grid: &mut Grid, cost: u32) -> Result<(), AgentError> {
    grid.mutate(agent.position.row, agent.position.col, fable_world::Cell::harvest_one)??;
    agent.energy = costs::debit(agent.energy, cost);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fable_types::{ActionCosts, AgentId, AgentKind, Position};
    use fable_world::CellEnergyRange;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn setup(kind: AgentKind, energy: u32) -> (AgentState, Grid) {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let grid = Grid::new(3, 3, CellEnergyRange { min: 5, max: 5 }, &mut rng).unwrap();
        let agent = AgentState {
            agent_id: AgentId::new(),
            kind,
            position: Position::new(0, 0),
            energy,
            max_energy: 100,
            costs: ActionCosts {
                be_cost: 1,
                eat_cost: 2,
                move_cost: 3,
                forage_cost: 2,
                vocalize_cost: 2,
            },
            acted: false,
        };
        (agent, grid)
    }

    #[test]
    fn forage_moves_food_into_storage() {
        let (mut agent, mut grid) = setup(AgentKind::Forager, 10);
        grid.mutate(0, 0, |c| c.produce(3)).unwrap().unwrap();
        execute(Action::Forage, &mut agent, &mut grid).unwrap();
        let cell = grid.get(0, 0).unwrap();
        assert_eq!(cell.newly_food(), 2);
        assert_eq!(cell.stored_food(), 1);
        assert_eq!(agent.energy, 8);
        assert!(agent.acted);
    }

    #[test]
    fn eat_adds_intrinsic_energy_then_debits() {
        let (mut agent, mut grid) = setup(AgentKind::Vocalist, 10);
        grid.mutate(0, 0, |c| {
            c.produce(1).unwrap();
            c.harvest_one().unwrap();
        })
        .unwrap();
        execute(Action::Eat, &mut agent, &mut grid).unwrap();
        // 10 + 5 - 2
        assert_eq!(agent.energy, 13);
        assert_eq!(grid.get(0, 0).unwrap().stored_food(), 0);
    }

    #[test]
    fn eat_with_zero_energy_still_gains() {
        let (mut agent, mut grid) = setup(AgentKind::Forager, 0);
        grid.mutate(0, 0, |c| {
            c.produce(1).unwrap();
            c.harvest_one().unwrap();
        })
        .unwrap();
        execute(Action::Eat, &mut agent, &mut grid).unwrap();
        assert_eq!(agent.energy, 3);
    }

    #[test]
    fn move_updates_position_and_clamps_energy() {
        let (mut agent, mut grid) = setup(AgentKind::Forager, 2);
        execute(Action::Move { d_row: 1, d_col: 1 }, &mut agent, &mut grid).unwrap();
        assert_eq!(agent.position, Position::new(1, 1));
        assert_eq!(agent.energy, 0);
    }

    #[test]
    fn vocalize_debits_vocalize_cost() {
        let (mut agent, mut grid) = setup(AgentKind::Vocalist, 10);
        execute(Action::Vocalize, &mut agent, &mut grid).unwrap();
        assert_eq!(agent.energy, 8);
        execute(Action::Idle, &mut agent, &mut grid).unwrap();
        assert_eq!(agent.energy, 7);
    }

    #[test]
    fn failed_eat_changes_nothing() {
        let (mut agent, mut grid) = setup(AgentKind::Forager, 10);
        let before = (agent.clone(), grid.clone());
        assert!(execute(Action::Eat, &mut agent, &mut grid).is_err());
        assert_eq!((agent, grid), before);
    }
}
