//! Day clock for a single environment.
//!
//! The clock tracks the day `t` within the current season, the active
//! season, and the total number of day ticks since creation. The season
//! changes exactly when `t` wraps from `cycle - 1` back to 0.

use fable_types::Season;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Day counter would overflow.
    #[error("day counter overflow: cannot advance beyond u64::MAX")]
    DayOverflow,

    /// Invalid clock parameters (e.g. zero days per season).
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Seasonal day counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayClock {
    /// Day within the current season, in `[0, cycle)`.
    day: u32,

    /// Days per season.
    cycle: u32,

    /// The active season.
    season: Season,

    /// Day ticks since the environment was created.
    days_elapsed: u64,
}

impl DayClock {
    /// Create a clock at day 0 of spring.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `cycle` is zero.
    pub fn new(cycle: u32) -> Result<Self, ClockError> {
        Self::from_parts(0, cycle, Season::Spring, 0)
    }

    /// Create a clock from explicit parameters (useful for testing and
    /// state restoration).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `cycle` is zero or
    /// `day >= cycle`.
    pub fn from_parts(
        day: u32,
        cycle: u32,
        season: Season,
        days_elapsed: u64,
    ) -> Result<Self, ClockError> {
        if cycle == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "cycle must be at least 1".to_owned(),
            });
        }
        if day >= cycle {
            return Err(ClockError::InvalidConfig {
                reason: format!("day {day} must be below cycle {cycle}"),
            });
        }
        Ok(Self {
            day,
            cycle,
            season,
            days_elapsed,
        })
    }

    /// Advance by one day. Returns `true` if the season changed.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::DayOverflow`] if the total day count would
    /// exceed `u64::MAX`. The clock is unchanged on error.
    pub fn advance(&mut self) -> Result<bool, ClockError> {
        let days_elapsed = self
            .days_elapsed
            .checked_add(1)
            .ok_or(ClockError::DayOverflow)?;
        let next_day = self.day.saturating_add(1);
        self.days_elapsed = days_elapsed;
        if next_day >= self.cycle {
            self.day = 0;
            self.season = self.season.next();
            return Ok(true);
        }
        self.day = next_day;
        Ok(false)
    }

    /// Day within the current season.
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Days per season.
    pub const fn cycle(&self) -> u32 {
        self.cycle
    }

    /// The active season.
    pub const fn season(&self) -> Season {
        self.season
    }

    /// Day ticks since creation.
    pub const fn days_elapsed(&self) -> u64 {
        self.days_elapsed
    }

    /// Day ticks remaining until the next season change.
    pub const fn ticks_until_season_change(&self) -> u32 {
        self.cycle.saturating_sub(self.day)
    }
}
