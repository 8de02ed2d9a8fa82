//! Starting profiles for newly registered agents.
//!
//! A profile bundles the initial energy, the soft energy ceiling, and the
//! per-action costs. The defaults match a modest survival economy: every
//! action costs 1 or 2 energy and agents start at 90 of 100.

use fable_types::{ActionCosts, AgentKind};
use serde::{Deserialize, Serialize};

use crate::agent::AgentSpec;

/// Starting energy and costs for one kind of agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Soft energy ceiling (default: 100).
    #[serde(default = "default_max_energy")]
    pub max_energy: u32,

    /// Initial energy (default: 90).
    #[serde(default = "default_energy")]
    pub energy: u32,

    /// Cost of idling (default: 1).
    #[serde(default = "default_be_cost")]
    pub be_cost: u32,

    /// Cost debited after eating (default: 1).
    #[serde(default = "default_eat_cost")]
    pub eat_cost: u32,

    /// Cost of moving (default: 2).
    #[serde(default = "default_move_cost")]
    pub move_cost: u32,

    /// Cost of foraging (default: 2).
    #[serde(default = "default_kind_cost")]
    pub forage_cost: u32,

    /// Cost of vocalizing (default: 2).
    #[serde(default = "default_kind_cost")]
    pub vocalize_cost: u32,
}

impl AgentProfile {
    /// The cost table this profile describes.
    pub const fn costs(&self) -> ActionCosts {
        ActionCosts {
            be_cost: self.be_cost,
            eat_cost: self.eat_cost,
            move_cost: self.move_cost,
            forage_cost: self.forage_cost,
            vocalize_cost: self.vocalize_cost,
        }
    }

    /// Turn this profile into a registration request for `kind`.
    pub const fn spec(&self, kind: AgentKind) -> AgentSpec {
        AgentSpec {
            kind,
            energy: self.energy,
            max_energy: self.max_energy,
            costs: self.costs(),
        }
    }
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            max_energy: default_max_energy(),
            energy: default_energy(),
            be_cost: default_be_cost(),
            eat_cost: default_eat_cost(),
            move_cost: default_move_cost(),
            forage_cost: default_kind_cost(),
            vocalize_cost: default_kind_cost(),
        }
    }
}

/// Profiles for both agent kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDefaults {
    /// Profile applied to new foragers.
    #[serde(default)]
    pub forager: AgentProfile,
    /// Profile applied to new vocalists.
    #[serde(default)]
    pub vocalist: AgentProfile,
}

impl AgentDefaults {
    /// Profile for `kind`.
    pub const fn profile(&self, kind: AgentKind) -> &AgentProfile {
        match kind {
            AgentKind::Forager => &self.forager,
            AgentKind::Vocalist => &self.vocalist,
        }
    }
}

const fn default_max_energy() -> u32 {
    100
}

const fn default_energy() -> u32 {
    90
}

const fn default_be_cost() -> u32 {
    1
}

const fn default_eat_cost() -> u32 {
    1
}

const fn default_move_cost() -> u32 {
    2
}

const fn default_kind_cost() -> u32 {
    2
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let profile = AgentProfile::default();
        assert_eq!(profile.energy, 90);
        assert_eq!(profile.max_energy, 100);
        assert_eq!(profile.costs().move_cost, 2);
    }

    #[test]
    fn kind_specific_cost_keys() {
        let yaml = "forager:\n  forage_cost: 5\nvocalist:\n  vocalize_cost: 3\n  energy: 40\n";
        let defaults: AgentDefaults = serde_yml::from_str(yaml).unwrap();
        assert_eq!(defaults.profile(AgentKind::Forager).forage_cost, 5);
        assert_eq!(defaults.profile(AgentKind::Vocalist).vocalize_cost, 3);
        assert_eq!(defaults.profile(AgentKind::Vocalist).forage_cost, 2);
        assert_eq!(defaults.vocalist.energy, 40);
        assert_eq!(defaults.forager.energy, 90);
    }

    #[test]
    fn spec_carries_kind_and_costs() {
        let spec = AgentProfile::default().spec(AgentKind::Vocalist);
        assert_eq!(spec.kind, AgentKind::Vocalist);
        assert_eq!(spec.energy, 90);
        assert_eq!(spec.costs.vocalize_cost, 2);
    }
}
