//! CSV schedule loader.
//!
//! # CSV format
//!
//! One row per schedule entry.  All rows of one schedule must share the same
//! `cycle_ticks` value.
//!
//! ```csv
//! schedule,start_offset_ticks,activity,cycle_ticks
//! farmer,10,idle,24000
//! farmer,2000,work,24000
//! farmer,12000,rest,24000
//! guard,0,fight,24000
//! ```
//!
//! `activity` is a lower-case [`Activity`] name.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::{Activity, Schedule, ScheduleEntry, ScheduleError, ScheduleResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ScheduleRecord {
    schedule:           String,
    start_offset_ticks: u64,
    activity:           String,
    cycle_ticks:        u64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load named schedules from a CSV file.
pub fn load_schedules_csv(path: &Path) -> ScheduleResult<HashMap<String, Schedule>> {
    let file = std::fs::File::open(path).map_err(ScheduleError::Io)?;
    load_schedules_reader(file)
}

/// Like [`load_schedules_csv`] but accepts any `Read` source.
pub fn load_schedules_reader<R: Read>(reader: R) -> ScheduleResult<HashMap<String, Schedule>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut by_name: HashMap<String, (u64, Vec<ScheduleEntry>)> = HashMap::new();

    for result in csv_reader.deserialize::<ScheduleRecord>() {
        let row = result.map_err(|e| ScheduleError::Parse(e.to_string()))?;
        let activity: Activity = row.activity.parse()?;
        let (cycle, entries) = by_name
            .entry(row.schedule.clone())
            .or_insert_with(|| (row.cycle_ticks, Vec::new()));
        if *cycle != row.cycle_ticks {
            return Err(ScheduleError::Invalid {
                name:   row.schedule,
                reason: format!("mixed cycle_ticks {} and {}", cycle, row.cycle_ticks),
            });
        }
        entries.push(ScheduleEntry { start_offset_ticks: row.start_offset_ticks, activity });
    }

    by_name
        .into_iter()
        .map(|(name, (cycle, entries))| {
            let schedule = Schedule::try_new(&name, entries, cycle)?;
            Ok((name, schedule))
        })
        .collect()
}
