//! Enumeration types for the Fable grid ecosystem.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// A season in the cyclic year: Spring, Summer, Fall, Winter, then Spring again.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// First season of the year; every environment starts here.
    #[default]
    Spring,
    /// Second season.
    Summer,
    /// Third season.
    Fall,
    /// Last season before the year wraps.
    Winter,
}

impl Season {
    /// All seasons in cycle order.
    pub const ALL: [Self; 4] = [Self::Spring, Self::Summer, Self::Fall, Self::Winter];

    /// Return the cyclic successor of this season.
    pub const fn next(self) -> Self {
        match self {
            Self::Spring => Self::Summer,
            Self::Summer => Self::Fall,
            Self::Fall => Self::Winter,
            Self::Winter => Self::Spring,
        }
    }

    /// Lowercase name, matching the configuration keys.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Fall => "fall",
            Self::Winter => "winter",
        }
    }
}

impl core::fmt::Display for Season {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Agent kinds and actions
// ---------------------------------------------------------------------------

/// The discrete actions an agent can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Step to one of the eight neighbouring cells (or stay put).
    Move,
    /// Consume one unit of stored food on the occupied cell.
    Eat,
    /// Spend the day doing nothing.
    Idle,
    /// Harvest one unit of newly food into storage on the occupied cell.
    Forage,
    /// Sing the day away.
    Vocalize,
}

/// Capability set of a forager.
const FORAGER_ACTIONS: [ActionType; 4] = [
    ActionType::Move,
    ActionType::Eat,
    ActionType::Idle,
    ActionType::Forage,
];

/// Capability set of a vocalist.
const VOCALIST_ACTIONS: [ActionType; 4] = [
    ActionType::Move,
    ActionType::Eat,
    ActionType::Idle,
    ActionType::Vocalize,
];

/// The two agent variants. Action legality is decided by membership in the
/// kind's capability set rather than by per-kind behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Harvesting agent: move, eat, idle, forage.
    Forager,
    /// Non-harvesting agent: move, eat, idle, vocalize.
    Vocalist,
}

impl AgentKind {
    /// Return the set of actions this kind may perform.
    pub const fn capabilities(self) -> &'static [ActionType] {
        match self {
            Self::Forager => &FORAGER_ACTIONS,
            Self::Vocalist => &VOCALIST_ACTIONS,
        }
    }

    /// Whether `action` is in this kind's capability set.
    pub fn supports(self, action: ActionType) -> bool {
        self.capabilities().contains(&action)
    }

    /// Whether agents of this kind can see newly food on their cell.
    pub const fn sees_newly_food(self) -> bool {
        matches!(self, Self::Forager)
    }
}

impl core::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Forager => f.write_str("forager"),
            Self::Vocalist => f.write_str("vocalist"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

/// Why an action request was refused. Every rejection leaves the environment
/// exactly as it was before the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// A coordinate lies outside the grid.
    OutOfBounds,
    /// The move delta or its destination violates the movement rules.
    InvalidMove,
    /// The agent already used its turn for the current day.
    AlreadyActed,
    /// The action is not in the agent kind's capability set.
    UnsupportedAction,
    /// The occupied cell has no food of the required sort.
    EmptyResource,
}

impl core::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Self::OutOfBounds => "coordinate outside the grid",
            Self::InvalidMove => "invalid move",
            Self::AlreadyActed => "agent already acted today",
            Self::UnsupportedAction => "action not supported by this agent kind",
            Self::EmptyResource => "no food available on this cell",
        };
        f.write_str(text)
    }
}
