//! Agent registration and lookup.
//!
//! The [`AgentRegistry`] owns every agent record of one environment, keyed
//! by [`AgentId`]. Agents live exactly as long as their registry: tearing
//! down the environment drops them.

use std::collections::BTreeMap;

use fable_types::{ActionCosts, AgentId, AgentKind, AgentState, Position};

use crate::error::AgentError;

/// What the caller supplies to register an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSpec {
    /// Capability variant.
    pub kind: AgentKind,
    /// Initial energy.
    pub energy: u32,
    /// Soft energy ceiling.
    pub max_energy: u32,
    /// Per-action costs.
    pub costs: ActionCosts,
}

/// Agent records of a single environment.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<AgentId, AgentState>,
}

impl AgentRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
        }
    }

    /// Register a new agent at `position`. The caller is responsible for
    /// checking that `position` lies on the grid.
    pub fn register(&mut self, spec: AgentSpec, position: Position) -> AgentState {
        let state = AgentState {
            agent_id: AgentId::new(),
            kind: spec.kind,
            position,
            energy: spec.energy,
            max_energy: spec.max_energy,
            costs: spec.costs,
            acted: false,
        };
        self.agents.insert(state.agent_id, state.clone());
        state
    }

    /// Remove an agent and return its final state.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an unknown id.
    pub fn remove(&mut self, agent_id: AgentId) -> Result<AgentState, AgentError> {
        self.agents
            .remove(&agent_id)
            .ok_or(AgentError::AgentNotFound(agent_id))
    }

    /// Borrow an agent.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an unknown id.
    pub fn get(&self, agent_id: AgentId) -> Result<&AgentState, AgentError> {
        self.agents
            .get(&agent_id)
            .ok_or(AgentError::AgentNotFound(agent_id))
    }

    /// Mutably borrow an agent.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an unknown id.
    pub fn get_mut(&mut self, agent_id: AgentId) -> Result<&mut AgentState, AgentError> {
        self.agents
            .get_mut(&agent_id)
            .ok_or(AgentError::AgentNotFound(agent_id))
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether no agents are registered.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of registered agents of `kind`.
    pub fn count_kind(&self, kind: AgentKind) -> usize {
        self.agents.values().filter(|a| a.kind == kind).count()
    }

    /// Number of agents that have acted today.
    pub fn acted_count(&self) -> usize {
        self.agents.values().filter(|a| a.acted).count()
    }

    /// Clear every agent's `acted` flag for a new day.
    pub fn reset_acted(&mut self) {
        for agent in self.agents.values_mut() {
            agent.acted = false;
        }
    }

    /// Iterate agents in id order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentState> {
        self.agents.values()
    }

    /// Clone every agent's state, in id order.
    pub fn states(&self) -> Vec<AgentState> {
        self.agents.values().cloned().collect()
    }
}
