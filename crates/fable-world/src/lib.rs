//! Grid cells, seasonal production caps, and food distribution for the
//! Fable grid ecosystem.
//!
//! This crate models the physical world an environment owns: a bounded
//! `height x width` grid of food cells, the per-season ceiling on how much
//! newly food a cell may hold, and the algorithms that place food on the
//! grid at creation time and after cells run dry.
//!
//! Nothing here draws its own randomness. Every randomized operation takes
//! the caller's RNG so a whole environment can run off one seeded source.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid operations.
//! - [`season`] -- [`SeasonCaps`] and the generic per-season [`SeasonTable`].
//! - [`grid`] -- [`Cell`] and [`Grid`], including genesis seeding.
//! - [`distribution`] -- Depletion-triggered reseeding strategies.

pub mod distribution;
pub mod error;
pub mod grid;
pub mod season;

// Re-export primary types at crate root.
pub use distribution::{DistributionReport, DistributionStrategy, SpreadParams, distribute};
pub use error::WorldError;
pub use grid::{Cell, CellEnergyRange, GenesisReport, Grid, MAX_CELLS};
pub use season::{SeasonCaps, SeasonTable};
