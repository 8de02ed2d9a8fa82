//! Depletion-triggered food redistribution, run once per day tick.
//!
//! Food does not regrow where it was eaten. When a cell's newly food hits
//! zero, that depletion causes food to appear somewhere else on the grid.
//! A cell only triggers once per depletion: it is marked `seeded` when it
//! triggers, and the flag is cleared only when some reseed lands on it.
//!
//! Two policies are available and are never mixed:
//!
//! - [`DistributionStrategy::RandomTarget`] (default): each source cell
//!   makes up to `height + width` uniform draws over the whole grid and
//!   seeds the first target with spare capacity with `[1, spare]` units.
//!   If every draw hits a full cell the source stays seeded and unfed, so
//!   total grid food can shrink over time. That is accepted behaviour.
//! - [`DistributionStrategy::NeighborSpread`]: each source seeds a
//!   shuffled subset of its eight neighbours, bounded per season by a seed
//!   count and by a grid-wide fill-percentage ceiling. A source is only
//!   marked seeded if it managed to seed at least one neighbour.

use fable_types::{Position, Season};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;
use crate::grid::Grid;
use crate::season::SeasonTable;

/// Offsets of the eight neighbouring cells.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Per-season parameters for [`DistributionStrategy::NeighborSpread`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadParams {
    /// Maximum neighbours a single source may seed.
    pub seeds: SeasonTable<u32>,
    /// Stop seeding once this percentage of cells hold newly food.
    pub fill_pct: SeasonTable<u32>,
}

impl Default for SpreadParams {
    fn default() -> Self {
        Self {
            seeds: SeasonTable {
                spring: 4,
                summer: 3,
                fall: 2,
                winter: 1,
            },
            fill_pct: SeasonTable {
                spring: 50,
                summer: 70,
                fall: 40,
                winter: 30,
            },
        }
    }
}

/// Which redistribution policy an environment uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum DistributionStrategy {
    /// Seed one random grid cell per depleted source.
    #[default]
    RandomTarget,
    /// Seed neighbours of each depleted source.
    NeighborSpread(SpreadParams),
}

/// What one distribution pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DistributionReport {
    /// Depleted, unseeded cells that triggered a reseed attempt.
    pub sources_examined: u32,
    /// Successful seedings (a cell seeded twice counts twice).
    pub cells_reseeded: u32,
    /// Total newly food added.
    pub units_added: u64,
}

impl DistributionReport {
    fn record_seed(&mut self, amount: u32) {
        self.cells_reseeded = self.cells_reseeded.saturating_add(1);
        self.units_added = self.units_added.saturating_add(u64::from(amount));
    }
}

/// Run one redistribution pass over the whole grid, row-major.
///
/// `cap` is the active season's production cap and `season` selects the
/// neighbour-spread parameters.
///
/// # Errors
///
/// Returns [`WorldError::ArithmeticOverflow`] if food accounting overflows.
pub fn distribute<R: Rng>(
    grid: &mut Grid,
    strategy: &DistributionStrategy,
    cap: u32,
    season: Season,
    rng: &mut R,
) -> Result<DistributionReport, WorldError> {
    let report = match strategy {
        DistributionStrategy::RandomTarget => random_target(grid, cap, rng)?,
        DistributionStrategy::NeighborSpread(params) => {
            neighbor_spread(grid, params, cap, season, rng)?
        }
    };
    debug!(
        sources = report.sources_examined,
        reseeded = report.cells_reseeded,
        units = report.units_added,
        "Distribution pass complete"
    );
    Ok(report)
}

fn random_target<R: Rng>(
    grid: &mut Grid,
    cap: u32,
    rng: &mut R,
) -> Result<DistributionReport, WorldError> {
    let mut report = DistributionReport::default();
    let attempts = grid.height().saturating_add(grid.width());
    let positions: Vec<Position> = grid.positions().collect();

    for source in positions {
        let triggers = grid.mutate(source.row, source.col, |cell| {
            let triggers = cell.is_reseed_source();
            if triggers {
                cell.mark_seeded();
            }
            triggers
        })?;
        if !triggers {
            continue;
        }
        report.sources_examined = report.sources_examined.saturating_add(1);

        for _ in 0..attempts {
            let row = rng.random_range(0..grid.height());
            let col = rng.random_range(0..grid.width());
            let spare = grid.get(row, col)?.remaining_capacity(cap);
            if spare == 0 {
                continue;
            }
            let amount = rng.random_range(1..=spare);
            seed_cell(grid, row, col, amount)?;
            report.record_seed(amount);
            break;
        }
    }
    Ok(report)
}

fn neighbor_spread<R: Rng>(
    grid: &mut Grid,
    params: &SpreadParams,
    cap: u32,
    season: Season,
    rng: &mut R,
) -> Result<DistributionReport, WorldError> {
    let mut report = DistributionReport::default();
    let max_seeds = usize::try_from(params.seeds.get(season)).unwrap_or(usize::MAX);
    let ceiling = params.fill_pct.get(season);
    let positions: Vec<Position> = grid.positions().collect();

    for source in positions {
        if !grid.get(source.row, source.col)?.is_reseed_source() {
            continue;
        }
        report.sources_examined = report.sources_examined.saturating_add(1);

        let mut open = Vec::with_capacity(NEIGHBOR_OFFSETS.len());
        for (d_row, d_col) in NEIGHBOR_OFFSETS {
            let (Some(row), Some(col)) = (
                source.row.checked_add_signed(d_row),
                source.col.checked_add_signed(d_col),
            ) else {
                continue;
            };
            if grid.contains(row, col) && grid.get(row, col)?.remaining_capacity(cap) > 0 {
                open.push(Position::new(row, col));
            }
        }
        open.shuffle(rng);

        let mut seeded_any = false;
        for target in open.into_iter().take(max_seeds) {
            if fill_reached(grid, ceiling) {
                break;
            }
            let spare = grid.get(target.row, target.col)?.remaining_capacity(cap);
            let amount = rng.random_range(1..=spare);
            seed_cell(grid, target.row, target.col, amount)?;
            report.record_seed(amount);
            seeded_any = true;
        }
        if seeded_any {
            grid.mutate(source.row, source.col, |cell| cell.mark_seeded())?;
        }
    }
    Ok(report)
}

/// Add `amount` newly food to a cell and make it eligible to trigger again.
fn seed_cell(grid: &mut Grid, row: u32, col: u32, amount: u32) -> Result<(), WorldError> {
    grid.mutate(row, col, |cell| {
        cell.produce(amount)?;
        cell.clear_seeded();
        Ok(())
    })?
}

/// Whether at least `ceiling` percent of cells currently hold newly food.
fn fill_reached(grid: &Grid, ceiling: u32) -> bool {
    let filled = u64::try_from(grid.filled_cells()).unwrap_or(u64::MAX);
    let total = u64::try_from(grid.len()).unwrap_or(u64::MAX);
    filled.saturating_mul(100) >= u64::from(ceiling).saturating_mul(total)
}
