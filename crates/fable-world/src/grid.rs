//! The grid store: a bounded `height x width` matrix of food cells.
//!
//! Cells are stored row-major; a cell's position is implied by its index.
//! Food quantities only change through [`Grid::mutate`] and the [`Cell`]
//! methods it exposes. Nothing is recomputed implicitly.
//!
//! # Genesis seeding
//!
//! [`Grid::genesis`] runs once when an environment is created. It draws a
//! budget uniformly from `[1, height * width]`, then scans row-major. Each
//! cell below the season cap gets a fair coin flip; on heads the budget
//! drops by one and the cell gains a uniform `[0, cap - newly]` units. The
//! scan stops the moment the budget hits zero, so the initial layout is
//! sparse and its mass is bounded by the budget draw.

use fable_types::{CellState, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;

/// Largest grid [`Grid::new`] will allocate (4096 x 4096 cells).
pub const MAX_CELLS: usize = 1 << 24;

/// Inclusive range that per-cell intrinsic energy is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellEnergyRange {
    /// Smallest energy value (at least 1).
    pub min: u32,
    /// Largest energy value.
    pub max: u32,
}

impl CellEnergyRange {
    /// Check that `1 <= min <= max`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] otherwise.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.min == 0 || self.min > self.max {
            return Err(WorldError::InvalidConfig {
                reason: format!(
                    "cell energy range [{}, {}] must satisfy 1 <= min <= max",
                    self.min, self.max
                ),
            });
        }
        Ok(())
    }
}

impl Default for CellEnergyRange {
    fn default() -> Self {
        Self { min: 1, max: 10 }
    }
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    newly_food: u32,
    stored_food: u32,
    intrinsic_energy: u32,
    seeded: bool,
}

impl Cell {
    /// An empty cell with the given (permanent) intrinsic energy.
    pub const fn new(intrinsic_energy: u32) -> Self {
        Self {
            newly_food: 0,
            stored_food: 0,
            intrinsic_energy,
            seeded: false,
        }
    }

    /// Food present but not yet harvested.
    pub const fn newly_food(&self) -> u32 {
        self.newly_food
    }

    /// Harvested food available for eating.
    pub const fn stored_food(&self) -> u32 {
        self.stored_food
    }

    /// Energy an agent gains per unit eaten here. Fixed at creation.
    pub const fn intrinsic_energy(&self) -> u32 {
        self.intrinsic_energy
    }

    /// Whether this cell's depletion already triggered a reseed attempt.
    pub const fn seeded(&self) -> bool {
        self.seeded
    }

    /// Room left under `cap` for newly food. Zero when at or above the cap.
    pub const fn remaining_capacity(&self, cap: u32) -> u32 {
        cap.saturating_sub(self.newly_food)
    }

    /// Add newly produced food.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ArithmeticOverflow`] on overflow.
    pub fn produce(&mut self, quantity: u32) -> Result<(), WorldError> {
        self.newly_food = self
            .newly_food
            .checked_add(quantity)
            .ok_or(WorldError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Move one unit of newly food into storage.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ArithmeticOverflow`] if there is no newly food
    /// or storage would overflow. The cell is untouched on error.
    pub fn harvest_one(&mut self) -> Result<(), WorldError> {
        let newly = self
            .newly_food
            .checked_sub(1)
            .ok_or(WorldError::ArithmeticOverflow)?;
        let stored = self
            .stored_food
            .checked_add(1)
            .ok_or(WorldError::ArithmeticOverflow)?;
        self.newly_food = newly;
        self.stored_food = stored;
        Ok(())
    }

    /// Remove one unit of stored food.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ArithmeticOverflow`] if storage is empty.
    pub fn consume_one(&mut self) -> Result<(), WorldError> {
        self.stored_food = self
            .stored_food
            .checked_sub(1)
            .ok_or(WorldError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Drop newly food above `cap`, returning how much was removed.
    pub fn trim_to(&mut self, cap: u32) -> u32 {
        let excess = self.newly_food.saturating_sub(cap);
        self.newly_food = self.newly_food.min(cap);
        excess
    }

    /// Record that this cell's depletion has triggered a reseed attempt.
    pub const fn mark_seeded(&mut self) {
        self.seeded = true;
    }

    /// Make the cell eligible to trigger a reseed once it next empties.
    pub const fn clear_seeded(&mut self) {
        self.seeded = false;
    }

    /// Whether this cell should trigger a reseed on the next tick.
    pub const fn is_reseed_source(&self) -> bool {
        self.newly_food == 0 && !self.seeded
    }
}

/// Outcome of genesis seeding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenesisReport {
    /// The budget drawn from `[1, height * width]`.
    pub budget: u64,
    /// Cells that won the coin flip and spent budget.
    pub cells_filled: u32,
    /// Total newly food placed.
    pub units_placed: u64,
}

/// Row-major matrix of [`Cell`]s with bounds-checked access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    height: u32,
    width: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Allocate an empty grid. Every cell starts with no food, unseeded, and
    /// an intrinsic energy drawn uniformly from `energy`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either dimension is zero,
    /// the grid would exceed [`MAX_CELLS`], or the cells cannot be
    /// allocated, and [`WorldError::InvalidConfig`] for a bad energy range.
    pub fn new<R: Rng>(
        height: u32,
        width: u32,
        energy: CellEnergyRange,
        rng: &mut R,
    ) -> Result<Self, WorldError> {
        energy.validate()?;
        let count = cell_count(height, width)?;
        let mut cells: Vec<Cell> = Vec::new();
        cells
            .try_reserve_exact(count)
            .map_err(|_err| WorldError::InvalidDimensions { height, width })?;
        cells.extend((0..count).map(|_| Cell::new(rng.random_range(energy.min..=energy.max))));
        Ok(Self {
            height,
            width,
            cells,
        })
    }

    /// Grid height in rows.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Grid width in columns.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells (never true for a constructed grid).
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `(row, col)` lies on the grid.
    pub const fn contains(&self, row: u32, col: u32) -> bool {
        row < self.height && col < self.width
    }

    /// Borrow the cell at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] for coordinates off the grid.
    pub fn get(&self, row: u32, col: u32) -> Result<&Cell, WorldError> {
        let idx = self.index(row, col)?;
        self.cells.get(idx).ok_or_else(|| self.out_of_bounds(row, col))
    }

    /// Apply `f` to the cell at `(row, col)` and return its result.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] for coordinates off the grid.
    pub fn mutate<T>(
        &mut self,
        row: u32,
        col: u32,
        f: impl FnOnce(&mut Cell) -> T,
    ) -> Result<T, WorldError> {
        let idx = self.index(row, col)?;
        let oob = self.out_of_bounds(row, col);
        self.cells.get_mut(idx).map(f).ok_or(oob)
    }

    /// Read-only view of the cell at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] for coordinates off the grid.
    pub fn cell_state(&self, row: u32, col: u32) -> Result<CellState, WorldError> {
        self.get(row, col)
            .map(|cell| to_state(Position::new(row, col), cell))
    }

    /// Views of every cell, row-major.
    pub fn cell_states(&self) -> Vec<CellState> {
        self.positions()
            .zip(self.cells.iter())
            .map(|(pos, cell)| to_state(pos, cell))
            .collect()
    }

    /// Every coordinate on the grid, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |col| Position::new(row, col)))
    }

    /// Number of cells currently holding newly food.
    pub fn filled_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.newly_food > 0).count()
    }

    /// Total newly food across the grid.
    pub fn total_newly_food(&self) -> u64 {
        self.cells
            .iter()
            .map(|c| u64::from(c.newly_food))
            .fold(0, u64::saturating_add)
    }

    /// Trim every cell to `cap`, returning the total removed.
    pub fn trim_to(&mut self, cap: u32) -> u64 {
        self.cells
            .iter_mut()
            .map(|c| u64::from(c.trim_to(cap)))
            .fold(0, u64::saturating_add)
    }

    /// Sparse randomized initial food placement under `cap`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ArithmeticOverflow`] if food accounting overflows.
    pub fn genesis<R: Rng>(
        &mut self,
        cap: u32,
        rng: &mut R,
    ) -> Result<GenesisReport, WorldError> {
        let total = u64::from(self.height)
            .checked_mul(u64::from(self.width))
            .ok_or(WorldError::ArithmeticOverflow)?;
        let mut report = GenesisReport {
            budget: rng.random_range(1..=total),
            ..GenesisReport::default()
        };
        let mut budget = report.budget;

        for cell in &mut self.cells {
            if budget == 0 {
                break;
            }
            if cell.newly_food == cap {
                continue;
            }
            if !rng.random_bool(0.5) {
                continue;
            }
            budget = budget.saturating_sub(1);
            let headroom = cell.remaining_capacity(cap);
            let quantity = rng.random_range(0..=headroom);
            cell.produce(quantity)?;
            report.cells_filled = report.cells_filled.saturating_add(1);
            report.units_placed = report.units_placed.saturating_add(u64::from(quantity));
        }

        debug!(
            budget = report.budget,
            cells_filled = report.cells_filled,
            units_placed = report.units_placed,
            "Genesis seeding complete"
        );
        Ok(report)
    }

    /// Row-major index of `(row, col)`.
    fn index(&self, row: u32, col: u32) -> Result<usize, WorldError> {
        if !self.contains(row, col) {
            return Err(self.out_of_bounds(row, col));
        }
        let row = usize::try_from(row).map_err(|_err| WorldError::ArithmeticOverflow)?;
        let col = usize::try_from(col).map_err(|_err| WorldError::ArithmeticOverflow)?;
        let width = usize::try_from(self.width).map_err(|_err| WorldError::ArithmeticOverflow)?;
        row.checked_mul(width)
            .and_then(|base| base.checked_add(col))
            .ok_or(WorldError::ArithmeticOverflow)
    }

    const fn out_of_bounds(&self, row: u32, col: u32) -> WorldError {
        WorldError::OutOfBounds {
            row,
            col,
            height: self.height,
            width: self.width,
        }
    }
}

/// Validate dimensions and return the cell count.
fn cell_count(height: u32, width: u32) -> Result<usize, WorldError> {
    let invalid = WorldError::InvalidDimensions { height, width };
    if height == 0 || width == 0 {
        return Err(invalid);
    }
    let h = usize::try_from(height).map_err(|_err| invalid.clone())?;
    let w = usize::try_from(width).map_err(|_err| invalid.clone())?;
    h.checked_mul(w)
        .filter(|count| *count <= MAX_CELLS)
        .ok_or(invalid)
}

const fn to_state(position: Position, cell: &Cell) -> CellState {
    CellState {
        position,
        newly_food: cell.newly_food,
        stored_food: cell.stored_food,
        intrinsic_energy: cell.intrinsic_energy,
        seeded: cell.seeded,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn make_grid(height: u32, width: u32) -> Grid {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        Grid::new(height, width, CellEnergyRange::default(), &mut rng).unwrap()
    }

    #[test]
    fn new_grid_is_empty_and_unseeded() {
        let grid = make_grid(4, 3);
        assert_eq!(grid.len(), 12);
        for state in grid.cell_states() {
            assert_eq!(state.newly_food, 0);
            assert_eq!(state.stored_food, 0);
            assert!(!state.seeded);
            assert!((1..=10).contains(&state.intrinsic_energy));
        }
    }

    #[test]
    fn zero_dimension_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = Grid::new(0, 5, CellEnergyRange::default(), &mut rng);
        assert!(matches!(result, Err(WorldError::InvalidDimensions { .. })));
    }

    #[test]
    fn oversized_grid_rejected_without_allocating() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = Grid::new(u32::MAX, u32::MAX, CellEnergyRange::default(), &mut rng);
        assert!(matches!(result, Err(WorldError::InvalidDimensions { .. })));
        let result = Grid::new(100_000, 100_000, CellEnergyRange::default(), &mut rng);
        assert!(matches!(result, Err(WorldError::InvalidDimensions { .. })));
    }

    #[test]
    fn grid_at_cell_ceiling_boundary() {
        assert_eq!(cell_count(4096, 4096).unwrap(), MAX_CELLS);
        assert!(matches!(
            cell_count(4096, 4097),
            Err(WorldError::InvalidDimensions { height: 4096, width: 4097 })
        ));
    }

    #[test]
    fn bad_energy_range_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let range = CellEnergyRange { min: 6, max: 2 };
        assert!(Grid::new(2, 2, range, &mut rng).is_err());
    }

    #[test]
    fn out_of_bounds_access_fails() {
        let mut grid = make_grid(3, 3);
        assert!(matches!(
            grid.get(3, 0),
            Err(WorldError::OutOfBounds { row: 3, col: 0, .. })
        ));
        assert!(grid.mutate(0, 3, |c| c.produce(1)).is_err());
        assert!(grid.get(2, 2).is_ok());
    }

    #[test]
    fn positions_are_row_major() {
        let grid = make_grid(2, 3);
        let states = grid.cell_states();
        assert_eq!(states[0].position, Position::new(0, 0));
        assert_eq!(states[2].position, Position::new(0, 2));
        assert_eq!(states[3].position, Position::new(1, 0));
    }

    #[test]
    fn mutate_only_touches_target() {
        let mut grid = make_grid(3, 3);
        grid.mutate(1, 2, |c| c.produce(4)).unwrap().unwrap();
        assert_eq!(grid.get(1, 2).unwrap().newly_food(), 4);
        assert_eq!(grid.total_newly_food(), 4);
        assert_eq!(grid.filled_cells(), 1);
    }

    #[test]
    fn harvest_moves_one_unit() {
        let mut cell = Cell::new(3);
        cell.produce(2).unwrap();
        cell.harvest_one().unwrap();
        assert_eq!(cell.newly_food(), 1);
        assert_eq!(cell.stored_food(), 1);
    }

    #[test]
    fn harvest_on_empty_cell_leaves_it_unchanged() {
        let mut cell = Cell::new(3);
        assert!(cell.harvest_one().is_err());
        assert_eq!(cell, Cell::new(3));
        assert!(cell.consume_one().is_err());
    }

    #[test]
    fn trim_removes_excess_only() {
        let mut cell = Cell::new(1);
        cell.produce(7).unwrap();
        assert_eq!(cell.trim_to(5), 2);
        assert_eq!(cell.newly_food(), 5);
        assert_eq!(cell.trim_to(5), 0);
    }

    #[test]
    fn genesis_respects_cap_and_budget() {
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut grid = Grid::new(5, 5, CellEnergyRange::default(), &mut rng).unwrap();
            let report = grid.genesis(6, &mut rng).unwrap();
            assert!((1..=25).contains(&report.budget));
            assert!(u64::from(report.cells_filled) <= report.budget);
            assert_eq!(report.units_placed, grid.total_newly_food());
            for state in grid.cell_states() {
                assert!(state.newly_food <= 6);
                assert!(!state.seeded);
            }
        }
    }

    #[test]
    fn genesis_is_reproducible() {
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut grid = Grid::new(6, 4, CellEnergyRange::default(), &mut rng).unwrap();
            grid.genesis(7, &mut rng).unwrap();
            grid
        };
        assert_eq!(run(99), run(99));
    }
}
