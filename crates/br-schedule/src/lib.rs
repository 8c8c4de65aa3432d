//! `br-schedule`: activities, day schedules, and CSV loading.
//!
//! # Crate layout
//!
//! | Module        | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`activity`]  | `Activity`: the named modes a brain switches between  |
//! | [`schedule`]  | `Schedule`, `ScheduleEntry`, built-in villager days     |
//! | [`loader`]    | `load_schedules_csv`, `load_schedules_reader`          |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                   |
//!
//! # Cycle model (summary)
//!
//! A `Schedule` is a cyclic list of `(start_offset_ticks, Activity)` over a
//! `cycle_ticks` period, evaluated against the clock's day time:
//!
//! ```text
//! pos               = day_time % cycle_ticks
//! current_activity  = last entry whose start_offset_ticks ≤ pos
//! ```

pub mod activity;
pub mod error;
pub mod loader;
pub mod schedule;


pub use activity::Activity;
pub use error::{ScheduleError, ScheduleResult};
pub use loader::{load_schedules_csv, load_schedules_reader};
pub use schedule::{Schedule, ScheduleEntry};
