//! `br-behavior`: the behavior scheduler.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | [`context`]  | `BrainContext<'a>`: everything a hook may read or write        |
//! | [`behavior`] | `Behavior` trait, `Status`, `EntryCondition`                    |
//! | [`task`]     | `Task` hooks and the `Timed<T>` lifecycle helper                |
//! | [`shuffle`]  | `ShufflingList`: weight-biased random ordering                 |
//! | [`gate`]     | `GateBehavior`, `RunOne`, order and running policies            |
//! | [`trigger`]  | `Trigger`, `OneShot`, `TriggerGate`                             |
//! | [`builder`]  | memory-query DSL: `declare`, `present`, `absent`, `registered`  |
//! | [`sensor`]   | `Sensor` trait and `ScheduledSensor`                            |
//! | [`brain`]    | `Brain`, `BrainBuilder`                                         |
//! | [`error`]    | `BehaviorError`, `BehaviorResult<T>`                            |
//!
//! # Lifecycle (summary)
//!
//! ```text
//!             try_start (entry ok && extra check ok)
//!   Stopped ─────────────────────────────────────────▶ Running
//!      ▲                                                 │
//!      └──── do_stop ◀── tick_or_stop (timed out or !can_still_use)
//! ```
//!
//! The three public transitions are the only way hooks run.  A brain calls at
//! most one transition per behavior per tick, so at most one hook runs.

pub mod behavior;
pub mod brain;
pub mod builder;
pub mod context;
pub mod error;
pub mod gate;
pub mod sensor;
pub mod shuffle;
pub mod task;
pub mod trigger;


pub use behavior::{Behavior, EntryCondition, Status};
pub use brain::{Brain, BrainBuilder, SCHEDULE_CHECK_INTERVAL};
pub use builder::{absent, declare, present, registered, sequence, trigger_if, Absent, Present, Query, Registered};
pub use context::BrainContext;
pub use error::{BehaviorError, BehaviorResult};
pub use gate::{GateBehavior, OrderPolicy, RunOne, RunningPolicy};
pub use sensor::{ScheduledSensor, Sensor, DEFAULT_SCAN_RATE};
pub use shuffle::ShufflingList;
pub use task::{Task, Timed, DEFAULT_DURATION};
pub use trigger::{trigger_fn, FnTrigger, OneShot, Trigger, TriggerGate};
