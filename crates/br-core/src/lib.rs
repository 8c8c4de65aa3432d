//! `br-core`: foundational types for the `brain_sim` agent-AI framework.
//!
//! This crate is a dependency of every other `br-*` crate.  It has no `br-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                                 |
//! |-----------|----------------------------------------------------------|
//! | [`ids`]   | `AgentId`, `MemoryId`, `ItemId`                          |
//! | [`geo`]   | `BlockPos` (integer grid cell), `Vec3` (continuous point) |
//! | [`time`]  | `Tick`, `SimClock`, `SimConfig`                          |
//! | [`rng`]   | `AgentRng` (per-agent), `SimRng` (global)                |
//! | [`error`] | `CoreError`, `CoreResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{BlockPos, Vec3};
pub use ids::{AgentId, ItemId, MemoryId};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, SimConfig, Tick, DAY_LENGTH_TICKS};
