//! Energy costs per action type.
//!
//! Costs live on the agent rather than in a global table, so two agents of
//! the same kind may pay different prices. All debits clamp at zero: an
//! agent is never driven below empty, and the engine never removes an agent
//! for running out.

use fable_types::{ActionCosts, ActionType};

/// Return the energy an action costs under `costs`.
pub const fn energy_cost(action: ActionType, costs: &ActionCosts) -> u32 {
    match action {
        ActionType::Move => costs.move_cost,
        ActionType::Eat => costs.eat_cost,
        ActionType::Idle => costs.be_cost,
        ActionType::Forage => costs.forage_cost,
        ActionType::Vocalize => costs.vocalize_cost,
    }
}

/// Subtract `cost` from `energy`, clamping at zero.
pub const fn debit(energy: u32, cost: u32) -> u32 {
    energy.saturating_sub(cost)
}
