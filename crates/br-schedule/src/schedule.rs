//! `Schedule`: which activity a brain should be in at a given time of day.
//!
//! # Cycle model
//!
//! Entries are stored sorted by `start_offset_ticks`.  For a day time `d`,
//! the position within the cycle is `d % cycle_ticks` and the active entry is
//! the one with the largest `start_offset_ticks` ≤ that position.  If the
//! position falls before the first entry (villager days start at offset 10,
//! not 0), the last entry of the previous cycle is still active.

use br_core::DAY_LENGTH_TICKS;

use crate::{Activity, ScheduleError, ScheduleResult};

/// One transition in a schedule.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleEntry {
    pub start_offset_ticks: u64,
    pub activity:           Activity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    /// Entries, sorted ascending by `start_offset_ticks`.
    entries: Vec<ScheduleEntry>,
    pub cycle_ticks: u64,
}

impl Schedule {
    /// Construct a schedule, sorting `entries` by start offset.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `cycle_ticks == 0` or if any entry starts at
    /// or after `cycle_ticks`.  Use [`try_new`](Self::try_new) for untrusted
    /// input.
    pub fn new(mut entries: Vec<ScheduleEntry>, cycle_ticks: u64) -> Self {
        debug_assert!(cycle_ticks > 0, "cycle_ticks must be > 0");
        debug_assert!(
            entries.iter().all(|e| e.start_offset_ticks < cycle_ticks),
            "all start_offset_ticks must be < cycle_ticks"
        );
        entries.sort_by_key(|e| e.start_offset_ticks);
        Self { entries, cycle_ticks }
    }

    /// Validating constructor used by the CSV loader.
    pub fn try_new(name: &str, entries: Vec<ScheduleEntry>, cycle_ticks: u64) -> ScheduleResult<Self> {
        let invalid = |reason: String| ScheduleError::Invalid { name: name.to_owned(), reason };
        if cycle_ticks == 0 {
            return Err(invalid("cycle_ticks must be > 0".into()));
        }
        if let Some(e) = entries.iter().find(|e| e.start_offset_ticks >= cycle_ticks) {
            return Err(invalid(format!(
                "offset {} is outside the {cycle_ticks}-tick cycle",
                e.start_offset_ticks
            )));
        }
        Ok(Self::new(entries, cycle_ticks))
    }

    /// Fluent construction: `Schedule::builder(24000).at(10, Idle).at(2000, Work).build()`.
    pub fn builder(cycle_ticks: u64) -> ScheduleBuilder {
        ScheduleBuilder { entries: Vec::new(), cycle_ticks }
    }

    /// A schedule with no entries; `activity_at` always answers `None`.
    pub fn empty() -> Self {
        Self { entries: Vec::new(), cycle_ticks: 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    // ── Built-ins ─────────────────────────────────────────────────────────

    /// Adult villager day: idle, work, meet at the bell, idle, sleep.
    pub fn villager_default() -> Self {
        Self::builder(DAY_LENGTH_TICKS)
            .at(10, Activity::Idle)
            .at(2_000, Activity::Work)
            .at(9_000, Activity::Meet)
            .at(11_000, Activity::Idle)
            .at(12_000, Activity::Rest)
            .build()
    }

    /// Baby villager day: alternating play and idle, then sleep.
    pub fn villager_baby() -> Self {
        Self::builder(DAY_LENGTH_TICKS)
            .at(10, Activity::Idle)
            .at(3_000, Activity::Play)
            .at(6_000, Activity::Idle)
            .at(10_000, Activity::Play)
            .at(12_000, Activity::Rest)
            .build()
    }

    /// Work by day, rest by night.
    pub fn simple() -> Self {
        Self::builder(DAY_LENGTH_TICKS)
            .at(5_000, Activity::Work)
            .at(11_000, Activity::Rest)
            .build()
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    /// The activity scheduled at `day_time`, or `None` for an empty schedule.
    pub fn activity_at(&self, day_time: u64) -> Option<Activity> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = self.entry_idx_at(day_time % self.cycle_ticks);
        Some(self.entries[idx].activity)
    }

    /// Ticks from `day_time` until the next transition, or `None` if empty.
    ///
    /// A single-entry schedule changes once per cycle.
    pub fn next_change(&self, day_time: u64) -> Option<u64> {
        if self.entries.is_empty() {
            return None;
        }
        let pos = day_time % self.cycle_ticks;
        let cur = self.entry_idx_at(pos);
        let next = (cur + 1) % self.entries.len();
        let next_offset = self.entries[next].start_offset_ticks;

        let ticks = if next_offset > pos {
            next_offset - pos
        } else {
            self.cycle_ticks - pos + next_offset
        };
        Some(ticks.max(1))
    }

    fn entry_idx_at(&self, pos: u64) -> usize {
        let idx = self.entries.partition_point(|e| e.start_offset_ticks <= pos);
        if idx == 0 { self.entries.len() - 1 } else { idx - 1 }
    }
}

// ── ScheduleBuilder ───────────────────────────────────────────────────────────

pub struct ScheduleBuilder {
    entries:     Vec<ScheduleEntry>,
    cycle_ticks: u64,
}

impl ScheduleBuilder {
    pub fn at(mut self, start_offset_ticks: u64, activity: Activity) -> Self {
        self.entries.push(ScheduleEntry { start_offset_ticks, activity });
        self
    }

    pub fn build(self) -> Schedule {
        Schedule::new(self.entries, self.cycle_ticks)
    }
}
