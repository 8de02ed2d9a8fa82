//! One environment: a grid, its agents, its clock, and its RNG.
//!
//! An [`Environment`] is the single shared-mutation domain for everything
//! that happens on one grid. It is not synchronized itself; the
//! [`EnvironmentRegistry`](crate::registry::EnvironmentRegistry) keeps each
//! one behind its own mutex and holds that mutex for the whole
//! validate-apply-count-tick sequence of a submission.
//!
//! Every random draw (cell energies, genesis, reseeding, agent placement)
//! comes from the environment's own [`ChaCha8Rng`], so a fixed seed and a
//! fixed sequence of calls always produce the same evolution.

use chrono::Utc;
use fable_agents::{AgentRegistry, AgentSpec, process_action};
use fable_types::{
    Action, ActionOutcome, AgentId, AgentKind, AgentState, DayAdvanced, EnvironmentId,
    EnvironmentSnapshot, Perception, Position,
};
use fable_world::{CellEnergyRange, DistributionStrategy, Grid, SeasonCaps, WorldError, distribute};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::barrier::TurnBarrier;
use crate::clock::DayClock;
use crate::error::EngineError;
use crate::perception;

/// Dimensions and seed for a new environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentParams {
    /// Grid rows.
    pub height: u32,
    /// Grid columns.
    pub width: u32,
    /// Days per season.
    pub cycle: u32,
    /// RNG seed. `None` lets the registry derive one from its master seed.
    pub seed: Option<u64>,
}

impl EnvironmentParams {
    /// Parameters with no explicit seed.
    pub const fn new(height: u32, width: u32, cycle: u32) -> Self {
        Self {
            height,
            width,
            cycle,
            seed: None,
        }
    }

    /// Pin the RNG seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// World rules shared by every environment a registry creates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldSettings {
    /// Per-season production caps.
    pub caps: SeasonCaps,
    /// Range cell intrinsic energy is drawn from.
    pub cell_energy: CellEnergyRange,
    /// Redistribution policy run on every day tick.
    pub distribution: DistributionStrategy,
}

/// A single grid ecosystem.
#[derive(Debug, Clone)]
pub struct Environment {
    id: EnvironmentId,
    grid: Grid,
    agents: AgentRegistry,
    clock: DayClock,
    barrier: TurnBarrier,
    settings: WorldSettings,
    rng: ChaCha8Rng,
}

impl Environment {
    /// Create an environment and run genesis seeding under the spring cap.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::World`] for zero dimensions or bad settings,
    /// and [`EngineError::Clock`] for a zero cycle.
    pub fn create(
        params: EnvironmentParams,
        seed: u64,
        settings: WorldSettings,
    ) -> Result<Self, EngineError> {
        settings.caps.validate()?;
        let clock = DayClock::new(params.cycle)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grid = Grid::new(params.height, params.width, settings.cell_energy, &mut rng)?;
        let genesis = grid.genesis(settings.caps.cap(clock.season()), &mut rng)?;

        let env = Self::from_parts(grid, clock, settings, rng);
        info!(
            environment_id = %env.id,
            height = params.height,
            width = params.width,
            cycle = params.cycle,
            seed,
            budget = genesis.budget,
            cells_filled = genesis.cells_filled,
            units_placed = genesis.units_placed,
            "Environment created"
        );
        Ok(env)
    }

    /// Assemble an environment from existing parts with no agents. No
    /// genesis seeding runs; the grid is taken as is.
    pub fn from_parts(grid: Grid, clock: DayClock, settings: WorldSettings, rng: ChaCha8Rng) -> Self {
        Self {
            id: EnvironmentId::new(),
            grid,
            agents: AgentRegistry::new(),
            clock,
            barrier: TurnBarrier::new(),
            settings,
            rng,
        }
    }

    /// This environment's handle.
    pub const fn id(&self) -> EnvironmentId {
        self.id
    }

    /// The grid.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The registered agents.
    pub const fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    /// The day clock.
    pub const fn clock(&self) -> &DayClock {
        &self.clock
    }

    /// Completed actions counted toward the current day.
    pub const fn acted_count(&self) -> usize {
        self.barrier.acted()
    }

    /// World rules in force.
    pub const fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    /// Register an agent at `position`, or at a uniformly random cell when
    /// `position` is `None`.
    ///
    /// A new agent has not acted. If it joins mid-day it is counted from
    /// the next barrier check on.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::World`] with [`WorldError::OutOfBounds`] for
    /// an explicit position off the grid.
    pub fn register_agent(
        &mut self,
        spec: AgentSpec,
        position: Option<Position>,
    ) -> Result<AgentState, EngineError> {
        let position = match position {
            Some(pos) if self.grid.contains(pos.row, pos.col) => pos,
            Some(pos) => {
                return Err(WorldError::OutOfBounds {
                    row: pos.row,
                    col: pos.col,
                    height: self.grid.height(),
                    width: self.grid.width(),
                }
                .into());
            }
            None => self.random_position(),
        };
        let state = self.agents.register(spec, position);
        info!(
            environment_id = %self.id,
            agent_id = %state.agent_id,
            kind = %state.kind,
            position = %state.position,
            energy = state.energy,
            "Agent registered"
        );
        Ok(state)
    }

    /// The kind the join policy assigns next: a vocalist while vocalists
    /// are outnumbered by foragers, otherwise a forager.
    pub fn join_kind(&self) -> AgentKind {
        if self.agents.count_kind(AgentKind::Vocalist) < self.agents.count_kind(AgentKind::Forager) {
            AgentKind::Vocalist
        } else {
            AgentKind::Forager
        }
    }

    /// Remove an agent. If everyone still registered has already acted,
    /// the day advances and the event is returned alongside the final
    /// state of the removed agent.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownAgent`] for an unknown id.
    pub fn remove_agent(
        &mut self,
        agent_id: AgentId,
    ) -> Result<(AgentState, Option<DayAdvanced>), EngineError> {
        let removed = self
            .agents
            .remove(agent_id)
            .map_err(|e| EngineError::from_agent(agent_id, e))?;
        if removed.acted {
            self.barrier.forget();
        }
        info!(environment_id = %self.id, %agent_id, "Agent removed");
        let advanced = if self.barrier.check(self.agents.len()) {
            Some(self.advance_day()?)
        } else {
            None
        };
        Ok((removed, advanced))
    }

    /// Validate and apply one action, count it toward the turn barrier, and
    /// run the day tick if it was the last one outstanding.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownAgent`] for an unknown id and
    /// [`EngineError::Rejected`] when validation fails. Nothing changes
    /// on either path.
    pub fn submit(&mut self, agent_id: AgentId, action: Action) -> Result<ActionOutcome, EngineError> {
        let agent = self
            .agents
            .get_mut(agent_id)
            .map_err(|e| EngineError::from_agent(agent_id, e))?;
        let applied = process_action(action, agent, &mut self.grid)
            .map_err(|e| EngineError::from_agent(agent_id, e))?;

        let released = self.barrier.record(self.agents.len());
        let day_advanced = if released {
            Some(self.advance_day()?)
        } else {
            debug_assert_eq!(
                self.barrier.acted(),
                self.agents.acted_count(),
                "barrier count diverged from agent flags"
            );
            None
        };

        Ok(ActionOutcome {
            agent: applied.agent,
            cell: applied.cell,
            day_advanced,
        })
    }

    /// Read-only view for rendering.
    pub fn snapshot(&self) -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            environment_id: self.id,
            height: self.grid.height(),
            width: self.grid.width(),
            cycle: self.clock.cycle(),
            day: self.clock.day(),
            season: self.clock.season(),
            days_elapsed: self.clock.days_elapsed(),
            cells: self.grid.cell_states(),
            agents: self.agents.states(),
        }
    }

    /// What `agent_id` can see of its current cell.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownAgent`] for an unknown id.
    pub fn perceive(&self, agent_id: AgentId) -> Result<Perception, EngineError> {
        let agent = self
            .agents
            .get(agent_id)
            .map_err(|e| EngineError::from_agent(agent_id, e))?;
        let cell = self.grid.get(agent.position.row, agent.position.col)?;
        Ok(perception::perceive(agent, cell, &self.clock))
    }

    /// The day tick: clear every agent's turn, redistribute food under the
    /// current season's cap, then advance the clock. When the season
    /// changes, newly food above the new cap is dropped.
    fn advance_day(&mut self) -> Result<DayAdvanced, EngineError> {
        self.agents.reset_acted();
        let season = self.clock.season();
        let report = distribute(
            &mut self.grid,
            &self.settings.distribution,
            self.settings.caps.cap(season),
            season,
            &mut self.rng,
        )?;
        let season_changed = self.clock.advance()?;

        if season_changed {
            let next = self.clock.season();
            let trimmed = self.grid.trim_to(self.settings.caps.cap(next));
            info!(
                environment_id = %self.id,
                from = %season,
                to = %next,
                trimmed,
                "Season changed"
            );
        }

        debug!(
            environment_id = %self.id,
            day = self.clock.day(),
            season = %self.clock.season(),
            days_elapsed = self.clock.days_elapsed(),
            sources = report.sources_examined,
            reseeded = report.cells_reseeded,
            "Day advanced"
        );

        Ok(DayAdvanced {
            environment_id: self.id,
            day: self.clock.day(),
            season: self.clock.season(),
            season_changed,
            days_elapsed: self.clock.days_elapsed(),
            sources_examined: report.sources_examined,
            cells_reseeded: report.cells_reseeded,
            at: Utc::now(),
        })
    }

    fn random_position(&mut self) -> Position {
        let row = self.rng.random_range(0..self.grid.height());
        let col = self.rng.random_range(0..self.grid.width());
        Position::new(row, col)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fable_agents::AgentProfile;
    use fable_types::{RejectionReason, Season};

    use super::*;

    fn empty_env(height: u32, width: u32, cycle: u32) -> Environment {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let grid = Grid::new(height, width, CellEnergyRange::default(), &mut rng).unwrap();
        let clock = DayClock::new(cycle).unwrap();
        Environment::from_parts(grid, clock, WorldSettings::default(), rng)
    }

    fn spec(kind: AgentKind) -> AgentSpec {
        AgentProfile::default().spec(kind)
    }

    #[test]
    fn create_runs_genesis_under_spring_cap() {
        let params = EnvironmentParams::new(6, 6, 3);
        let env = Environment::create(params, 11, WorldSettings::default()).unwrap();
        let cap = WorldSettings::default().caps.cap(Season::Spring);
        let snapshot = env.snapshot();
        assert_eq!(snapshot.cells.len(), 36);
        assert!(snapshot.cells.iter().all(|c| c.newly_food <= cap));
        assert!(snapshot.cells.iter().all(|c| c.stored_food == 0 && !c.seeded));
        assert_eq!(snapshot.season, Season::Spring);
        assert_eq!(snapshot.day, 0);
    }

    #[test]
    fn create_rejects_zero_cycle() {
        let params = EnvironmentParams::new(3, 3, 0);
        let err = Environment::create(params, 1, WorldSettings::default()).unwrap_err();
        assert!(matches!(err, EngineError::Clock { .. }));
    }

    #[test]
    fn create_rejects_zero_dimension() {
        let params = EnvironmentParams::new(0, 3, 2);
        let err = Environment::create(params, 1, WorldSettings::default()).unwrap_err();
        assert!(matches!(err, EngineError::World { .. }));
    }

    #[test]
    fn explicit_position_must_be_on_grid() {
        let mut env = empty_env(3, 3, 2);
        let err = env
            .register_agent(spec(AgentKind::Forager), Some(Position::new(3, 0)))
            .unwrap_err();
        assert_eq!(err.rejection(), Some(RejectionReason::OutOfBounds));
        assert!(env.agents().is_empty());
    }

    #[test]
    fn random_position_is_on_grid() {
        let mut env = empty_env(2, 3, 2);
        for _ in 0..20 {
            let agent = env.register_agent(spec(AgentKind::Forager), None).unwrap();
            assert!(agent.position.row < 2 && agent.position.col < 3);
        }
    }

    #[test]
    fn join_kind_balances_vocalists_against_foragers() {
        let mut env = empty_env(3, 3, 2);
        assert_eq!(env.join_kind(), AgentKind::Forager);
        env.register_agent(spec(AgentKind::Forager), None).unwrap();
        assert_eq!(env.join_kind(), AgentKind::Vocalist);
        env.register_agent(spec(AgentKind::Vocalist), None).unwrap();
        assert_eq!(env.join_kind(), AgentKind::Forager);
    }

    #[test]
    fn last_action_advances_day_and_resets_turns() {
        let mut env = empty_env(3, 3, 5);
        let a = env.register_agent(spec(AgentKind::Vocalist), None).unwrap();
        let b = env.register_agent(spec(AgentKind::Vocalist), None).unwrap();

        let first = env.submit(a.agent_id, Action::Idle).unwrap();
        assert!(first.day_advanced.is_none());
        assert_eq!(env.acted_count(), 1);

        let second = env.submit(b.agent_id, Action::Vocalize).unwrap();
        let event = second.day_advanced.unwrap();
        assert_eq!(event.day, 1);
        assert_eq!(event.days_elapsed, 1);
        assert!(!event.season_changed);
        assert_eq!(env.acted_count(), 0);
        assert!(env.agents().iter().all(|a| !a.acted));
    }

    #[test]
    fn mid_day_joiner_must_act_before_the_day_closes() {
        let mut env = empty_env(3, 3, 5);
        let a = env.register_agent(spec(AgentKind::Vocalist), None).unwrap();
        let b = env.register_agent(spec(AgentKind::Vocalist), None).unwrap();
        assert!(env.submit(a.agent_id, Action::Idle).unwrap().day_advanced.is_none());

        let c = env.register_agent(spec(AgentKind::Forager), None).unwrap();
        assert!(env.submit(b.agent_id, Action::Idle).unwrap().day_advanced.is_none());
        assert_eq!(env.acted_count(), 2);
        assert_eq!(env.clock().days_elapsed(), 0);

        let event = env.submit(c.agent_id, Action::Idle).unwrap().day_advanced.unwrap();
        assert_eq!(event.days_elapsed, 1);
        assert_eq!(env.acted_count(), 0);
    }

    #[test]
    fn rejected_action_does_not_count() {
        let mut env = empty_env(3, 3, 5);
        let a = env.register_agent(spec(AgentKind::Vocalist), None).unwrap();
        let _b = env.register_agent(spec(AgentKind::Vocalist), None).unwrap();
        let err = env.submit(a.agent_id, Action::Forage).unwrap_err();
        assert_eq!(err.rejection(), Some(RejectionReason::UnsupportedAction));
        assert_eq!(env.acted_count(), 0);
        assert!(!env.agents().get(a.agent_id).unwrap().acted);
    }

    #[test]
    fn unknown_agent_is_reported() {
        let mut env = empty_env(3, 3, 5);
        let ghost = AgentId::new();
        let err = env.submit(ghost, Action::Idle).unwrap_err();
        assert!(matches!(err, EngineError::UnknownAgent(id) if id == ghost));
    }

    #[test]
    fn removing_the_last_laggard_advances_the_day() {
        let mut env = empty_env(3, 3, 5);
        let a = env.register_agent(spec(AgentKind::Vocalist), None).unwrap();
        let b = env.register_agent(spec(AgentKind::Vocalist), None).unwrap();
        env.submit(a.agent_id, Action::Idle).unwrap();

        let (removed, advanced) = env.remove_agent(b.agent_id).unwrap();
        assert_eq!(removed.agent_id, b.agent_id);
        assert_eq!(advanced.unwrap().day, 1);
        assert!(!env.agents().get(a.agent_id).unwrap().acted);
    }

    #[test]
    fn removing_an_agent_that_acted_releases_its_count() {
        let mut env = empty_env(3, 3, 5);
        let a = env.register_agent(spec(AgentKind::Vocalist), None).unwrap();
        let b = env.register_agent(spec(AgentKind::Vocalist), None).unwrap();
        let c = env.register_agent(spec(AgentKind::Vocalist), None).unwrap();
        env.submit(a.agent_id, Action::Idle).unwrap();

        let (_, advanced) = env.remove_agent(a.agent_id).unwrap();
        assert!(advanced.is_none());
        assert_eq!(env.acted_count(), 0);

        assert!(env.submit(b.agent_id, Action::Idle).unwrap().day_advanced.is_none());
        assert!(env.submit(c.agent_id, Action::Idle).unwrap().day_advanced.is_some());
    }

    #[test]
    fn removing_everyone_never_advances() {
        let mut env = empty_env(3, 3, 5);
        let a = env.register_agent(spec(AgentKind::Vocalist), None).unwrap();
        let (_, advanced) = env.remove_agent(a.agent_id).unwrap();
        assert!(advanced.is_none());
        assert_eq!(env.clock().days_elapsed(), 0);
    }

    #[test]
    fn season_change_trims_food_to_new_cap() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut grid = Grid::new(1, 1, CellEnergyRange::default(), &mut rng).unwrap();
        // Summer cap is 7; fall is 5.
        grid.mutate(0, 0, |c| c.produce(7)).unwrap().unwrap();
        let clock = DayClock::from_parts(0, 1, Season::Summer, 0).unwrap();
        let mut env = Environment::from_parts(grid, clock, WorldSettings::default(), rng);
        let a = env.register_agent(spec(AgentKind::Vocalist), None).unwrap();

        let event = env.submit(a.agent_id, Action::Idle).unwrap().day_advanced.unwrap();
        assert!(event.season_changed);
        assert_eq!(event.season, Season::Fall);
        assert_eq!(env.grid().get(0, 0).unwrap().newly_food(), 5);
    }

    #[test]
    fn perceive_reports_current_cell() {
        let mut env = empty_env(2, 2, 3);
        let a = env
            .register_agent(spec(AgentKind::Forager), Some(Position::new(1, 1)))
            .unwrap();
        let p = env.perceive(a.agent_id).unwrap();
        assert_eq!(p.position, Position::new(1, 1));
        assert_eq!(p.newly_food, Some(0));
        assert_eq!(p.stored_food, 0);
        assert!(!p.acted);
    }

    #[test]
    fn same_seed_same_world() {
        let params = EnvironmentParams::new(5, 5, 2);
        let a = Environment::create(params, 77, WorldSettings::default()).unwrap();
        let b = Environment::create(params, 77, WorldSettings::default()).unwrap();
        assert_eq!(a.snapshot().cells, b.snapshot().cells);
    }
}
