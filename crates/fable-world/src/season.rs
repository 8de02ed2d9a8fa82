//! Seasonal production caps.
//!
//! Each season maps to a positive `production_cap`: the most newly food a
//! single cell may hold while that season is active. The mapping is pure
//! configuration; cyclic advancement lives on [`Season::next`].

use fable_types::Season;
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// One value per season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonTable<T> {
    /// Value during spring.
    pub spring: T,
    /// Value during summer.
    pub summer: T,
    /// Value during fall.
    pub fall: T,
    /// Value during winter.
    pub winter: T,
}

impl<T: Copy> SeasonTable<T> {
    /// Look up the value for `season`.
    pub const fn get(&self, season: Season) -> T {
        match season {
            Season::Spring => self.spring,
            Season::Summer => self.summer,
            Season::Fall => self.fall,
            Season::Winter => self.winter,
        }
    }
}

/// Season to production-cap mapping.
///
/// Defaults are 6 / 7 / 5 / 2 units for spring, summer, fall and winter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonCaps(SeasonTable<u32>);

impl SeasonCaps {
    /// Build a cap table, rejecting any season with a zero cap.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] if a cap is zero.
    pub fn new(table: SeasonTable<u32>) -> Result<Self, WorldError> {
        let caps = Self(table);
        caps.validate()?;
        Ok(caps)
    }

    /// Check that every season has a positive cap. Needed after
    /// deserialization, which bypasses [`SeasonCaps::new`].
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] naming the first zero cap.
    pub fn validate(&self) -> Result<(), WorldError> {
        match Season::ALL.into_iter().find(|s| self.cap(*s) == 0) {
            Some(season) => Err(WorldError::InvalidConfig {
                reason: format!("production cap for {season} must be positive"),
            }),
            None => Ok(()),
        }
    }

    /// Maximum newly food a cell may hold during `season`.
    pub const fn cap(&self, season: Season) -> u32 {
        self.0.get(season)
    }
}

impl Default for SeasonCaps {
    fn default() -> Self {
        Self(SeasonTable {
            spring: 6,
            summer: 7,
            fall: 5,
            winter: 2,
        })
    }
}
