//! Scripted players for the demo run.
//!
//! Each player looks at its own cell and picks one action per day using a
//! short priority list. Survival comes first: a hungry agent eats when
//! there is stored food, an exhausted one idles. After that foragers
//! harvest and vocalists sing, and a forager on an empty cell wanders.

use std::sync::Arc;

use fable_core::EnvironmentRegistry;
use fable_types::{
    Action, AgentId, AgentKind, DayAdvanced, EnvironmentId, Perception, RejectionReason,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::error::AppError;

/// Energy at or below which an agent eats whenever it can.
const HUNGRY_ENERGY: u32 = 60;

/// Energy at or below which an agent with nothing to eat stays put.
const EXHAUSTED_ENERGY: u32 = 5;

/// Pick today's action from what the agent can see.
pub fn decide<R: Rng>(perception: &Perception, rng: &mut R) -> Action {
    if perception.energy <= HUNGRY_ENERGY && perception.stored_food > 0 {
        return Action::Eat;
    }
    if perception.energy <= EXHAUSTED_ENERGY {
        return Action::Idle;
    }
    match perception.kind {
        AgentKind::Forager => match perception.newly_food {
            Some(newly) if newly > 0 => Action::Forage,
            _ => wander(rng),
        },
        AgentKind::Vocalist => Action::Vocalize,
    }
}

/// A random step to one of the eight neighbours. Steps off the grid are
/// rejected by the engine and the caller falls back to idling.
fn wander<R: Rng>(rng: &mut R) -> Action {
    loop {
        let d_row = rng.random_range(-1..=1);
        let d_col = rng.random_range(-1..=1);
        if d_row != 0 || d_col != 0 {
            return Action::Move { d_row, d_col };
        }
    }
}

/// Per-player tallies reported when the run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStats {
    /// Actions the engine accepted as chosen.
    pub accepted: u64,
    /// Chosen actions that were rejected and replaced by idling.
    pub fallbacks: u64,
}

/// Everything one player task needs.
#[derive(Debug)]
pub struct Player {
    /// Shared registry.
    pub registry: Arc<EnvironmentRegistry>,
    /// Environment the agent lives in.
    pub env_id: EnvironmentId,
    /// The agent this task plays.
    pub agent_id: AgentId,
    /// Day-advanced events, subscribed before any action was submitted.
    pub events: broadcast::Receiver<DayAdvanced>,
    /// Decision randomness.
    pub rng: ChaCha8Rng,
}

impl Player {
    /// Act once per day until `days` day ticks have elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Engine`] if the environment or the agent
    /// disappears.
    pub async fn run(mut self, days: u64) -> Result<PlayerStats, AppError> {
        let mut stats = PlayerStats::default();
        loop {
            self.act(&mut stats)?;
            if !self.wait_for_next_day(days).await {
                return Ok(stats);
            }
        }
    }

    fn act(&mut self, stats: &mut PlayerStats) -> Result<(), AppError> {
        let perception = self.registry.perceive(self.env_id, self.agent_id)?;
        let action = decide(&perception, &mut self.rng);
        match self.registry.submit(self.env_id, self.agent_id, action) {
            Ok(_) => stats.accepted = stats.accepted.saturating_add(1),
            Err(err) => match err.rejection() {
                Some(RejectionReason::AlreadyActed) => {}
                Some(reason) => {
                    debug!(agent_id = %self.agent_id, ?action, %reason, "Falling back to idle");
                    stats.fallbacks = stats.fallbacks.saturating_add(1);
                    self.registry.submit(self.env_id, self.agent_id, Action::Idle)?;
                }
                None => return Err(err.into()),
            },
        }
        Ok(())
    }

    /// Wait for this environment's next day. Returns `false` once the run
    /// is over.
    async fn wait_for_next_day(&mut self, days: u64) -> bool {
        loop {
            match self.events.recv().await {
                Ok(event) if event.environment_id == self.env_id => {
                    return event.days_elapsed < days;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(agent_id = %self.agent_id, skipped, "Player fell behind day events");
                    return true;
                }
                Err(RecvError::Closed) => return false,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use fable_types::{Position, Season};
    use rand::SeedableRng;

    use super::*;

    fn perception(kind: AgentKind, energy: u32, stored: u32, newly: u32) -> Perception {
        Perception {
            agent_id: AgentId::new(),
            kind,
            position: Position::new(0, 0),
            energy,
            acted: false,
            stored_food: stored,
            newly_food: kind.sees_newly_food().then_some(newly),
            day: 0,
            season: Season::Spring,
        }
    }

    #[test]
    fn hungry_agent_eats_stored_food() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for kind in [AgentKind::Forager, AgentKind::Vocalist] {
            assert_eq!(decide(&perception(kind, 30, 2, 4), &mut rng), Action::Eat);
        }
    }

    #[test]
    fn well_fed_forager_harvests() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let p = perception(AgentKind::Forager, 90, 2, 4);
        assert_eq!(decide(&p, &mut rng), Action::Forage);
    }

    #[test]
    fn forager_on_empty_cell_wanders() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let p = perception(AgentKind::Forager, 90, 0, 0);
        for _ in 0..20 {
            match decide(&p, &mut rng) {
                Action::Move { d_row, d_col } => {
                    assert!((-1..=1).contains(&d_row) && (-1..=1).contains(&d_col));
                    assert!(d_row != 0 || d_col != 0);
                }
                other => panic!("expected a move, got {other:?}"),
            }
        }
    }

    #[test]
    fn vocalist_sings() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let p = perception(AgentKind::Vocalist, 90, 0, 0);
        assert_eq!(decide(&p, &mut rng), Action::Vocalize);
    }

    #[test]
    fn exhausted_agent_with_no_food_idles() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let p = perception(AgentKind::Forager, 3, 0, 5);
        assert_eq!(decide(&p, &mut rng), Action::Idle);
    }
}
