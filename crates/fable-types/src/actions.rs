//! Action request and outcome types exchanged between the shell and the engine.

use serde::{Deserialize, Serialize};

use crate::enums::ActionType;
use crate::structs::{AgentState, CellState, DayAdvanced};

/// An action an agent asks to perform for the current day.
///
/// Each variant corresponds to one [`ActionType`] and carries the data
/// needed to validate and apply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Step by `(d_row, d_col)`, each component in `-1..=1`.
    Move {
        /// Row delta.
        d_row: i32,
        /// Column delta.
        d_col: i32,
    },
    /// Eat one unit of stored food on the occupied cell.
    Eat,
    /// Do nothing.
    Idle,
    /// Move one unit of newly food into storage on the occupied cell.
    Forage,
    /// Sing.
    Vocalize,
}

impl Action {
    /// Return the parameter-free kind of this action.
    pub const fn action_type(self) -> ActionType {
        match self {
            Self::Move { .. } => ActionType::Move,
            Self::Eat => ActionType::Eat,
            Self::Idle => ActionType::Idle,
            Self::Forage => ActionType::Forage,
            Self::Vocalize => ActionType::Vocalize,
        }
    }
}

/// Result of a successfully processed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// The acting agent immediately after the action was applied (so
    /// `acted` is `true` even if the same submission then advanced the day).
    pub agent: AgentState,
    /// The cell the agent occupies after the action, before any day tick.
    pub cell: CellState,
    /// Present when this action completed the day's turn barrier.
    pub day_advanced: Option<DayAdvanced>,
}
