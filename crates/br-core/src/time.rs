//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter.  One tick is one
//! simulation step; every brain is ticked exactly once per step.  The
//! time-of-day used by activity schedules is derived from the tick:
//!
//!   day_time = (start_day_time + tick) % day_length_ticks
//!
//! Integer ticks keep all duration, expiry, and cooldown arithmetic exact.

use std::fmt;

use crate::{CoreError, CoreResult};

/// Ticks in one simulated day.
pub const DAY_LENGTH_TICKS: u64 = 24_000;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tracks the current tick and maps it onto the day cycle.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Day time at tick 0.
    pub start_day_time: u64,
    /// Length of one day in ticks.
    pub day_length_ticks: u64,
    /// The current tick: advanced by `SimClock::advance()` each step.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(start_day_time: u64, day_length_ticks: u64) -> Self {
        debug_assert!(day_length_ticks > 0, "day_length_ticks must be > 0");
        Self {
            start_day_time,
            day_length_ticks,
            current_tick: Tick::ZERO,
        }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Position within the current day, in `[0, day_length_ticks)`.
    #[inline]
    pub fn day_time(&self) -> u64 {
        self.day_time_at(self.current_tick)
    }

    #[inline]
    pub fn day_time_at(&self, tick: Tick) -> u64 {
        (self.start_day_time + tick.0) % self.day_length_ticks
    }

    /// Zero-based index of the current day.
    #[inline]
    pub fn day(&self) -> u64 {
        (self.start_day_time + self.current_tick.0) / self.day_length_ticks
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (day {} @ {})", self.current_tick, self.day(), self.day_time())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically built in code or deserialized (with the `serde` feature) by the
/// application and passed to the simulation builder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Total ticks to simulate.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical runs.
    pub seed: u64,

    /// Ticks per day.  Default: 24 000.
    pub day_length_ticks: u64,

    /// Day time at tick 0 (0 = sunrise).
    pub start_day_time: u64,

    /// Take a brain snapshot every N ticks.  0 disables snapshots.
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_ticks:           DAY_LENGTH_TICKS,
            seed:                  0,
            day_length_ticks:      DAY_LENGTH_TICKS,
            start_day_time:        0,
            output_interval_ticks: 0,
        }
    }
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Reject configurations the clock cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.day_length_ticks == 0 {
            return Err(CoreError::Config("day_length_ticks must be > 0".into()));
        }
        Ok(())
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start_day_time, self.day_length_ticks)
    }
}
