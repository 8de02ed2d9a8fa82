//! Action validation pipeline.
//!
//! The pipeline runs 3 stages in order:
//! 1. Turn -- has the agent already acted today?
//! 2. Capability -- is the action in the agent kind's capability set?
//! 3. Preconditions -- movement rules, food availability.
//!
//! Each stage returns `Ok(())` on success or a [`RejectionReason`] on failure.
//! Nothing here mutates state.

use fable_types::{Action, AgentState, Position, RejectionReason};
use fable_world::{Cell, Grid};

/// Validate an action through the full pipeline.
pub fn validate_action(
    action: Action,
    agent: &AgentState,
    grid: &Grid,
) -> Result<(), RejectionReason> {
    // Stage 1: one action per agent per day
    if agent.acted {
        return Err(RejectionReason::AlreadyActed);
    }

    // Stage 2: capability membership
    if !agent.kind.supports(action.action_type()) {
        return Err(RejectionReason::UnsupportedAction);
    }

    // Stage 3: action-specific preconditions
    validate_preconditions(action, agent, grid)
}

/// Stage 3: preconditions for each action.
fn validate_preconditions(
    action: Action,
    agent: &AgentState,
    grid: &Grid,
) -> Result<(), RejectionReason> {
    match action {
        Action::Move { d_row, d_col } => {
            move_destination(agent.position, d_row, d_col, grid).map(|_| ())
        }
        Action::Eat => {
            if occupied_cell(agent, grid)?.stored_food() == 0 {
                return Err(RejectionReason::EmptyResource);
            }
            Ok(())
        }
        Action::Forage => {
            if occupied_cell(agent, grid)?.newly_food() == 0 {
                return Err(RejectionReason::EmptyResource);
            }
            Ok(())
        }
        Action::Idle | Action::Vocalize => Ok(()),
    }
}

/// Compute where a move lands, or why it is illegal.
///
/// Each delta component must be in `-1..=1` and the destination must lie on
/// the grid. Both failures are [`RejectionReason::InvalidMove`].
pub fn move_destination(
    from: Position,
    d_row: i32,
    d_col: i32,
    grid: &Grid,
) -> Result<Position, RejectionReason> {
    if d_row.unsigned_abs() > 1 || d_col.unsigned_abs() > 1 {
        return Err(RejectionReason::InvalidMove);
    }
    let (Some(row), Some(col)) = (
        from.row.checked_add_signed(d_row),
        from.col.checked_add_signed(d_col),
    ) else {
        return Err(RejectionReason::InvalidMove);
    };
    if !grid.contains(row, col) {
        return Err(RejectionReason::InvalidMove);
    }
    Ok(Position::new(row, col))
}

/// The cell the agent stands on.
fn occupied_cell<'g>(agent: &AgentState, grid: &'g Grid) -> Result<&'g Cell, RejectionReason> {
    grid.get(agent.position.row, agent.position.col)
        .map_err(|_err| RejectionReason::OutOfBounds)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fable_types::{ActionCosts, AgentId, AgentKind};
    use fable_world::CellEnergyRange;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn grid() -> Grid {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        Grid::new(3, 3, CellEnergyRange::default(), &mut rng).unwrap()
    }

    fn agent(kind: AgentKind, row: u32, col: u32) -> AgentState {
        AgentState {
            agent_id: AgentId::new(),
            kind,
            position: Position::new(row, col),
            energy: 10,
            max_energy: 10,
            costs: ActionCosts::default(),
            acted: false,
        }
    }

    #[test]
    fn already_acted_checked_first() {
        let mut a = agent(AgentKind::Vocalist, 0, 0);
        a.acted = true;
        // Forage is also unsupported, but the turn check wins.
        assert_eq!(
            validate_action(Action::Forage, &a, &grid()),
            Err(RejectionReason::AlreadyActed)
        );
    }

    #[test]
    fn capability_checked_before_preconditions() {
        let a = agent(AgentKind::Vocalist, 0, 0);
        assert_eq!(
            validate_action(Action::Forage, &a, &grid()),
            Err(RejectionReason::UnsupportedAction)
        );
        let f = agent(AgentKind::Forager, 0, 0);
        assert_eq!(
            validate_action(Action::Vocalize, &f, &grid()),
            Err(RejectionReason::UnsupportedAction)
        );
    }

    #[test]
    fn empty_cell_rejects_eat_and_forage() {
        let f = agent(AgentKind::Forager, 1, 1);
        let g = grid();
        assert_eq!(validate_action(Action::Eat, &f, &g), Err(RejectionReason::EmptyResource));
        assert_eq!(validate_action(Action::Forage, &f, &g), Err(RejectionReason::EmptyResource));
    }

    #[test]
    fn food_present_allows_eat_and_forage() {
        let f = agent(AgentKind::Forager, 1, 1);
        let mut g = grid();
        g.mutate(1, 1, |c| {
            c.produce(2).unwrap();
            c.harvest_one().unwrap();
        })
        .unwrap();
        assert!(validate_action(Action::Eat, &f, &g).is_ok());
        assert!(validate_action(Action::Forage, &f, &g).is_ok());
    }

    #[test]
    fn move_rules() {
        let g = grid();
        let centre = Position::new(1, 1);
        assert_eq!(move_destination(centre, 1, -1, &g), Ok(Position::new(2, 0)));
        assert_eq!(move_destination(centre, 0, 0, &g), Ok(centre));
        assert_eq!(move_destination(centre, 2, 0, &g), Err(RejectionReason::InvalidMove));
        assert_eq!(move_destination(centre, 0, -2, &g), Err(RejectionReason::InvalidMove));
    }

    #[test]
    fn move_off_either_edge_is_invalid() {
        let g = grid();
        assert_eq!(
            move_destination(Position::new(0, 0), -1, 0, &g),
            Err(RejectionReason::InvalidMove)
        );
        assert_eq!(
            move_destination(Position::new(2, 2), 0, 1, &g),
            Err(RejectionReason::InvalidMove)
        );
    }

    #[test]
    fn idle_and_vocalize_always_pass() {
        let v = agent(AgentKind::Vocalist, 2, 2);
        assert!(validate_action(Action::Idle, &v, &grid()).is_ok());
        assert!(validate_action(Action::Vocalize, &v, &grid()).is_ok());
    }
}
