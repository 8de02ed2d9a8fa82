//! The environment registry: the engine's external interface.
//!
//! An [`EnvironmentRegistry`] owns every live environment, each behind its
//! own [`Mutex`]. Operations on different environments never contend;
//! operations on the same environment serialize on that one lock, which is
//! held for the full validate-apply-count-tick sequence of a submission.
//!
//! Day-advanced events are published on a [`tokio::sync::broadcast`]
//! channel while the environment lock is still held, so subscribers see
//! each environment's days in order.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};

use fable_agents::{AgentDefaults, AgentSpec};
use fable_types::{
    Action, ActionOutcome, AgentId, AgentKind, AgentState, DayAdvanced, EnvironmentId,
    EnvironmentSnapshot, Perception, Position,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::environment::{Environment, EnvironmentParams, WorldSettings};
use crate::error::EngineError;

/// Capacity of the day-advanced broadcast channel. Slow subscribers that
/// fall further behind than this see a lag error and skip ahead.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

type SharedEnvironment = Arc<Mutex<Environment>>;

/// Owner of every live environment.
#[derive(Debug)]
pub struct EnvironmentRegistry {
    environments: RwLock<BTreeMap<EnvironmentId, SharedEnvironment>>,
    seeder: Mutex<ChaCha8Rng>,
    settings: WorldSettings,
    default_params: EnvironmentParams,
    agent_defaults: AgentDefaults,
    events: broadcast::Sender<DayAdvanced>,
}

impl EnvironmentRegistry {
    /// Create an empty registry from loaded configuration. `world.seed`
    /// seeds the master RNG that environments without an explicit seed
    /// derive theirs from.
    pub fn new(config: &SimulationConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            environments: RwLock::new(BTreeMap::new()),
            seeder: Mutex::new(ChaCha8Rng::seed_from_u64(config.world.seed)),
            settings: config.world_settings(),
            default_params: config.default_params(),
            agent_defaults: config.agents,
            events,
        }
    }

    /// Subscribe to day-advanced events from every environment.
    pub fn subscribe(&self) -> broadcast::Receiver<DayAdvanced> {
        self.events.subscribe()
    }

    /// Starting profiles used by [`register_kind`](Self::register_kind)
    /// and [`join`](Self::join).
    pub const fn agent_defaults(&self) -> &AgentDefaults {
        &self.agent_defaults
    }

    /// Create an environment and return its handle.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::World`] or [`EngineError::Clock`] for unusable
    /// parameters and [`EngineError::StatePoisoned`] if a lock is poisoned.
    pub fn create_environment(&self, params: EnvironmentParams) -> Result<EnvironmentId, EngineError> {
        let seed = match params.seed {
            Some(seed) => seed,
            None => self.next_seed()?,
        };
        let env = Environment::create(params, seed, self.settings)?;
        let id = env.id();
        let Ok(mut environments) = self.environments.write() else {
            return Err(EngineError::StatePoisoned);
        };
        environments.insert(id, Arc::new(Mutex::new(env)));
        Ok(id)
    }

    /// Create an environment with the configured default dimensions.
    ///
    /// # Errors
    ///
    /// See [`create_environment`](Self::create_environment).
    pub fn create_default_environment(&self) -> Result<EnvironmentId, EngineError> {
        self.create_environment(self.default_params)
    }

    /// Register an agent with explicit starting values. `position: None`
    /// places it on a random cell.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownEnvironment`] for an unknown handle
    /// and [`EngineError::World`] for an explicit position off the grid.
    pub fn register_agent(
        &self,
        env_id: EnvironmentId,
        spec: AgentSpec,
        position: Option<Position>,
    ) -> Result<AgentState, EngineError> {
        self.with_environment(env_id, |env| env.register_agent(spec, position))
    }

    /// Register an agent of `kind` with its configured profile on a random
    /// cell.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownEnvironment`] for an unknown handle.
    pub fn register_kind(&self, env_id: EnvironmentId, kind: AgentKind) -> Result<AgentState, EngineError> {
        let spec = self.agent_defaults.profile(kind).spec(kind);
        self.register_agent(env_id, spec, None)
    }

    /// Place a newcomer. Picks uniformly among the existing environments
    /// plus one extra slot that creates a new default environment, so the
    /// first join always creates one. The kind follows
    /// [`Environment::join_kind`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownEnvironment`] if the chosen
    /// environment is torn down concurrently, or any creation error.
    pub fn join(&self) -> Result<(EnvironmentId, AgentState), EngineError> {
        let ids = self.environment_ids()?;
        let pick = {
            let Ok(mut seeder) = self.seeder.lock() else {
                return Err(EngineError::StatePoisoned);
            };
            seeder.random_range(0..=ids.len())
        };
        let env_id = match ids.get(pick) {
            Some(id) => *id,
            None => self.create_default_environment()?,
        };
        let agent = self.with_environment(env_id, |env| {
            let kind = env.join_kind();
            env.register_agent(self.agent_defaults.profile(kind).spec(kind), None)
        })?;
        Ok((env_id, agent))
    }

    /// Submit one action for one agent.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownEnvironment`],
    /// [`EngineError::UnknownAgent`], or [`EngineError::Rejected`]. A
    /// rejected action changes nothing.
    pub fn submit(
        &self,
        env_id: EnvironmentId,
        agent_id: AgentId,
        action: Action,
    ) -> Result<ActionOutcome, EngineError> {
        self.with_environment(env_id, |env| {
            let outcome = env.submit(agent_id, action)?;
            if let Some(event) = &outcome.day_advanced {
                self.publish(event);
            }
            Ok(outcome)
        })
    }

    /// Read-only view of an environment.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownEnvironment`] for an unknown handle.
    pub fn snapshot(&self, env_id: EnvironmentId) -> Result<EnvironmentSnapshot, EngineError> {
        self.with_environment(env_id, |env| Ok(env.snapshot()))
    }

    /// What an agent can see of its cell.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownEnvironment`] or
    /// [`EngineError::UnknownAgent`].
    pub fn perceive(&self, env_id: EnvironmentId, agent_id: AgentId) -> Result<Perception, EngineError> {
        self.with_environment(env_id, |env| env.perceive(agent_id))
    }

    /// Remove an agent, advancing the day if it was the last one still
    /// owing an action.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownEnvironment`] or
    /// [`EngineError::UnknownAgent`].
    pub fn remove_agent(&self, env_id: EnvironmentId, agent_id: AgentId) -> Result<AgentState, EngineError> {
        self.with_environment(env_id, |env| {
            let (removed, advanced) = env.remove_agent(agent_id)?;
            if let Some(event) = &advanced {
                self.publish(event);
            }
            Ok(removed)
        })
    }

    /// Remove an environment and every agent in it, returning its final
    /// snapshot. Callers already inside a submission finish against the
    /// detached environment; nothing can reach it afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownEnvironment`] for an unknown handle.
    pub fn teardown(&self, env_id: EnvironmentId) -> Result<EnvironmentSnapshot, EngineError> {
        let env = {
            let Ok(mut environments) = self.environments.write() else {
                return Err(EngineError::StatePoisoned);
            };
            environments
                .remove(&env_id)
                .ok_or(EngineError::UnknownEnvironment(env_id))?
        };
        let Ok(env) = env.lock() else {
            return Err(EngineError::StatePoisoned);
        };
        let snapshot = env.snapshot();
        info!(
            environment_id = %env_id,
            agents = snapshot.agents.len(),
            days_elapsed = snapshot.days_elapsed,
            "Environment torn down"
        );
        Ok(snapshot)
    }

    /// Handles of every live environment, in id order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StatePoisoned`] if the map lock is poisoned.
    pub fn environment_ids(&self) -> Result<Vec<EnvironmentId>, EngineError> {
        let Ok(environments) = self.environments.read() else {
            return Err(EngineError::StatePoisoned);
        };
        Ok(environments.keys().copied().collect())
    }

    fn environment(&self, env_id: EnvironmentId) -> Result<SharedEnvironment, EngineError> {
        let Ok(environments) = self.environments.read() else {
            return Err(EngineError::StatePoisoned);
        };
        environments
            .get(&env_id)
            .cloned()
            .ok_or(EngineError::UnknownEnvironment(env_id))
    }

    /// Run `f` under the environment's lock. The map lock is released
    /// first so one busy environment never blocks another.
    fn with_environment<T>(
        &self,
        env_id: EnvironmentId,
        f: impl FnOnce(&mut Environment) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let env = self.environment(env_id)?;
        let Ok(mut guard) = env.lock() else {
            return Err(EngineError::StatePoisoned);
        };
        f(&mut guard)
    }

    fn next_seed(&self) -> Result<u64, EngineError> {
        let Ok(mut seeder) = self.seeder.lock() else {
            return Err(EngineError::StatePoisoned);
        };
        Ok(seeder.random())
    }

    fn publish(&self, event: &DayAdvanced) {
        // No subscribers is not an error.
        let receivers = self.events.send(event.clone()).unwrap_or(0);
        debug!(
            environment_id = %event.environment_id,
            day = event.day,
            receivers,
            "Published day-advanced event"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registry() -> EnvironmentRegistry {
        EnvironmentRegistry::new(&SimulationConfig::default())
    }

    #[test]
    fn unknown_environment_is_reported() {
        let registry = registry();
        let ghost = EnvironmentId::new();
        let err = registry.snapshot(ghost).unwrap_err();
        assert!(matches!(err, EngineError::UnknownEnvironment(id) if id == ghost));
    }

    #[test]
    fn create_and_snapshot() {
        let registry = registry();
        let id = registry
            .create_environment(EnvironmentParams::new(4, 3, 2))
            .unwrap();
        let snapshot = registry.snapshot(id).unwrap();
        assert_eq!(snapshot.environment_id, id);
        assert_eq!((snapshot.height, snapshot.width, snapshot.cycle), (4, 3, 2));
        assert_eq!(registry.environment_ids().unwrap(), vec![id]);
    }

    #[test]
    fn register_kind_uses_profile() {
        let registry = registry();
        let id = registry.create_default_environment().unwrap();
        let agent = registry.register_kind(id, AgentKind::Vocalist).unwrap();
        assert_eq!(agent.kind, AgentKind::Vocalist);
        assert_eq!(agent.energy, 90);
        assert_eq!(agent.max_energy, 100);
    }

    #[test]
    fn first_join_creates_an_environment() {
        let registry = registry();
        let (env_id, agent) = registry.join().unwrap();
        assert_eq!(registry.environment_ids().unwrap(), vec![env_id]);
        assert_eq!(agent.kind, AgentKind::Forager);
    }

    #[test]
    fn teardown_forgets_environment() {
        let registry = registry();
        let id = registry.create_default_environment().unwrap();
        let agent = registry.register_kind(id, AgentKind::Forager).unwrap();
        let last = registry.teardown(id).unwrap();
        assert_eq!(last.agents.len(), 1);
        assert!(matches!(
            registry.submit(id, agent.agent_id, Action::Idle),
            Err(EngineError::UnknownEnvironment(_))
        ));
        assert!(matches!(registry.teardown(id), Err(EngineError::UnknownEnvironment(_))));
    }

    #[test]
    fn day_advance_is_broadcast() {
        let registry = registry();
        let mut rx = registry.subscribe();
        let id = registry.create_default_environment().unwrap();
        let agent = registry.register_kind(id, AgentKind::Vocalist).unwrap();
        registry.submit(id, agent.agent_id, Action::Vocalize).unwrap();
        let event = rx.try_recv().unwrap();
        assert_eq!(event.environment_id, id);
        assert_eq!(event.day, 1);
    }
}
