//! Core entity structs: agents, cells, snapshots, and notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{AgentKind, Season};
use crate::ids::{AgentId, EnvironmentId};

/// A `(row, col)` coordinate on the grid.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    /// Zero-based row index.
    pub row: u32,
    /// Zero-based column index.
    pub col: u32,
}

impl Position {
    /// Construct a position.
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Per-action energy costs carried by every agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCosts {
    /// Cost of idling through a day.
    pub be_cost: u32,
    /// Cost debited after eating.
    pub eat_cost: u32,
    /// Cost of a successful move.
    pub move_cost: u32,
    /// Cost of a successful forage. Only foragers ever pay it.
    pub forage_cost: u32,
    /// Cost of vocalizing. Only vocalists ever pay it.
    pub vocalize_cost: u32,
}

/// Mutable state of a registered agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    /// The agent's handle.
    pub agent_id: AgentId,
    /// Capability variant.
    pub kind: AgentKind,
    /// Current cell.
    pub position: Position,
    /// Current energy. Debits clamp at zero.
    pub energy: u32,
    /// Soft ceiling the agent aims for. Informational only.
    pub max_energy: u32,
    /// Action costs.
    pub costs: ActionCosts,
    /// Whether the agent has used its turn for the current day.
    pub acted: bool,
}

/// Read-only view of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellState {
    /// Cell coordinate.
    pub position: Position,
    /// Food present but not yet harvested.
    pub newly_food: u32,
    /// Harvested food available for eating.
    pub stored_food: u32,
    /// Energy gained per unit of stored food eaten here.
    pub intrinsic_energy: u32,
    /// Whether this cell's depletion already triggered a reseed attempt.
    pub seeded: bool,
}

/// Read-only snapshot of an environment, for rendering by the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    /// The environment's handle.
    pub environment_id: EnvironmentId,
    /// Grid height in rows.
    pub height: u32,
    /// Grid width in columns.
    pub width: u32,
    /// Days per season.
    pub cycle: u32,
    /// Day within the current season, in `[0, cycle)`.
    pub day: u32,
    /// Active season.
    pub season: Season,
    /// Total day ticks since the environment was created.
    pub days_elapsed: u64,
    /// All cells in row-major order.
    pub cells: Vec<CellState>,
    /// All registered agents, ordered by id.
    pub agents: Vec<AgentState>,
}

impl EnvironmentSnapshot {
    /// Sum of newly food across the grid.
    pub fn total_newly_food(&self) -> u64 {
        self.cells
            .iter()
            .map(|c| u64::from(c.newly_food))
            .fold(0, u64::saturating_add)
    }

    /// Sum of stored food across the grid.
    pub fn total_stored_food(&self) -> u64 {
        self.cells
            .iter()
            .map(|c| u64::from(c.stored_food))
            .fold(0, u64::saturating_add)
    }
}

/// Notification emitted each time an environment's day advances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAdvanced {
    /// The environment whose day advanced.
    pub environment_id: EnvironmentId,
    /// New day within the season.
    pub day: u32,
    /// Season after the advance.
    pub season: Season,
    /// Whether this advance rolled over into a new season.
    pub season_changed: bool,
    /// Total day ticks since creation, including this one.
    pub days_elapsed: u64,
    /// Depleted cells that triggered a reseed attempt during this tick.
    pub sources_examined: u32,
    /// Cells that received new food during this tick.
    pub cells_reseeded: u32,
    /// Wall-clock time the tick completed.
    pub at: DateTime<Utc>,
}

/// What an agent can observe about the cell it stands on.
///
/// Foragers see both food pools; vocalists only see stored food.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perception {
    /// The observing agent.
    pub agent_id: AgentId,
    /// The agent's kind.
    pub kind: AgentKind,
    /// The agent's cell.
    pub position: Position,
    /// The agent's energy.
    pub energy: u32,
    /// Whether the agent has already acted today.
    pub acted: bool,
    /// Stored food on the cell.
    pub stored_food: u32,
    /// Newly food on the cell, when the agent's kind can see it.
    pub newly_food: Option<u32>,
    /// Day within the season.
    pub day: u32,
    /// Active season.
    pub season: Season,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(newly: u32, stored: u32) -> CellState {
        CellState {
            position: Position::new(0, 0),
            newly_food: newly,
            stored_food: stored,
            intrinsic_energy: 3,
            seeded: false,
        }
    }

    #[test]
    fn costs_serialize_under_action_names() {
        let costs = ActionCosts {
            be_cost: 1,
            eat_cost: 1,
            move_cost: 2,
            forage_cost: 3,
            vocalize_cost: 4,
        };
        let json = serde_json::to_value(costs).unwrap_or_default();
        assert_eq!(json["forage_cost"], 3);
        assert_eq!(json["vocalize_cost"], 4);
        assert!(json.get("special_cost").is_none());
    }

    #[test]
    fn snapshot_totals_sum_cells() {
        let snapshot = EnvironmentSnapshot {
            environment_id: EnvironmentId::new(),
            height: 1,
            width: 3,
            cycle: 4,
            day: 0,
            season: Season::Spring,
            days_elapsed: 0,
            cells: vec![cell(2, 1), cell(0, 4), cell(5, 0)],
            agents: Vec::new(),
        };
        assert_eq!(snapshot.total_newly_food(), 7);
        assert_eq!(snapshot.total_stored_food(), 5);
    }

    #[test]
    fn position_display() {
        assert_eq!(Position::new(2, 7).to_string(), "(2, 7)");
    }
}
