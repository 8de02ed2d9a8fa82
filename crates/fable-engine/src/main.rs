//! Demo engine binary for the Fable grid ecosystem.
//!
//! Provisions one environment, registers a handful of scripted agents, and
//! runs each agent on its own tokio task. Every task acts once per day and
//! then waits for the day-advanced broadcast, so the turn barrier is
//! exercised by genuinely concurrent submissions.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `FABLE_CONFIG` or `fable-config.yaml`
//! 3. Create the environment registry and one environment
//! 4. Register the demo foragers and vocalists
//! 5. Spawn one player task per agent
//! 6. Log day-advanced events until the configured day count
//! 7. Tear the environment down and log its final state

mod error;
mod player;

use std::path::PathBuf;
use std::sync::Arc;

use fable_core::EnvironmentRegistry;
use fable_core::config::SimulationConfig;
use fable_types::AgentKind;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;
use crate::player::Player;

/// Environment variable naming the configuration file.
const CONFIG_ENV_VAR: &str = "FABLE_CONFIG";

/// Configuration file used when `FABLE_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "fable-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration is invalid or any environment
/// operation fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("fable-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        seed = config.world.seed,
        height = config.world.height,
        width = config.world.width,
        cycle = config.world.cycle,
        days = config.demo.days,
        "Configuration loaded"
    );

    // 3. Registry and environment.
    let registry = Arc::new(EnvironmentRegistry::new(&config));
    let env_id = registry.create_default_environment()?;

    // 4. Demo agents.
    let kinds = std::iter::repeat_n(AgentKind::Forager, count(config.demo.foragers))
        .chain(std::iter::repeat_n(AgentKind::Vocalist, count(config.demo.vocalists)));
    let mut agents = Vec::new();
    for kind in kinds {
        agents.push(registry.register_kind(env_id, kind)?);
    }

    if agents.is_empty() || config.demo.days == 0 {
        warn!("Nothing to run: demo has no agents or no days");
        registry.teardown(env_id)?;
        return Ok(());
    }

    // 5. Player tasks. Every receiver is subscribed before the first
    //    submission so no task can miss a day.
    let mut monitor = registry.subscribe();
    let mut handles = Vec::with_capacity(agents.len());
    for (offset, agent) in (0_u64..).zip(&agents) {
        let player = Player {
            registry: Arc::clone(&registry),
            env_id,
            agent_id: agent.agent_id,
            events: registry.subscribe(),
            rng: ChaCha8Rng::seed_from_u64(config.world.seed.wrapping_add(offset)),
        };
        handles.push(tokio::spawn(player.run(config.demo.days)));
    }
    info!(agents = agents.len(), "Player tasks started");

    // 6. Log days as they pass.
    loop {
        match monitor.recv().await {
            Ok(event) => {
                info!(
                    day = event.day,
                    season = %event.season,
                    days_elapsed = event.days_elapsed,
                    reseeded = event.cells_reseeded,
                    "Day advanced"
                );
                if event.days_elapsed >= config.demo.days {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "Monitor fell behind"),
            Err(RecvError::Closed) => break,
        }
    }

    for handle in handles {
        let stats = handle.await.map_err(AppError::from)??;
        debug!(accepted = stats.accepted, fallbacks = stats.fallbacks, "Player finished");
    }

    // 7. Teardown.
    let last = registry.teardown(env_id)?;
    info!(
        days_elapsed = last.days_elapsed,
        season = %last.season,
        newly_food = last.total_newly_food(),
        stored_food = last.total_stored_food(),
        mean_energy = mean_energy(&last.agents),
        "Simulation complete"
    );
    debug!(snapshot = %serde_json::to_string(&last).map_err(AppError::from)?, "Final snapshot");

    Ok(())
}

/// Load configuration from `FABLE_CONFIG`, or `fable-config.yaml` in the
/// working directory. A missing file falls back to defaults.
fn load_config() -> Result<SimulationConfig, AppError> {
    let path = std::env::var(CONFIG_ENV_VAR)
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        Ok(SimulationConfig::from_file(&path)?)
    } else {
        warn!(path = %path.display(), "Config file not found, using defaults");
        let mut config = SimulationConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}

fn count(n: u32) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

fn mean_energy(agents: &[fable_types::AgentState]) -> u64 {
    let total = agents
        .iter()
        .map(|a| u64::from(a.energy))
        .fold(0, u64::saturating_add);
    let n = u64::try_from(agents.len()).unwrap_or(u64::MAX);
    total.checked_div(n).unwrap_or(0)
}
