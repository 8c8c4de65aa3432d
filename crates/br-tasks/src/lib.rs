//! `br-tasks`: the stock behavior library.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                         |
//! |---------------|------------------------------------------------------------------|
//! | [`movement`]  | walk/look sinks, strolls, look-target pickers, `DoNothing`       |
//! | [`cooldown`]  | `CountDownCooldownTicks`                                         |
//! | [`poi`]       | `AcquirePoi` with retry backoff, `ValidateNearbyPoi`             |
//! | [`pairing`]   | reciprocal locks: `AnimalMakeLove`, `TradeWithVillager`          |
//! | [`rest`]      | `SleepInBed`, `wake_up`, `JumpOnBed`                             |
//! | [`work`]      | `HarvestFarmland`                                                |
//! | [`combat`]    | target selection, `melee_attack`, `CrossbowAttack`               |
//! | [`ram`]       | goat `PrepareRam` / `RamTarget`                                  |
//! | [`panic`]     | `panic_trigger`, `calm_down`, `flee`                             |
//! | [`sensors`]   | nearest entities / hostile, nearest bed, hurt-by                 |
//! | [`archetype`] | complete brains and layouts for villagers, goats, pillagers, ... |
//!
//! Behaviors communicate only through memory.  Anything that moves the agent
//! writes `WALK_TARGET`; anything that turns its head writes `LOOK_TARGET`;
//! the two sinks in [`movement`] are the only code that turns those into
//! world commands.

pub mod archetype;
pub mod combat;
pub mod cooldown;
pub mod movement;
pub mod pairing;
pub mod panic;
pub mod poi;
pub mod ram;
pub mod rest;
pub mod sensors;
pub mod work;

#[cfg(test)]
mod tests;

pub use archetype::Archetype;
pub use combat::{CrossbowAttack, CrossbowState};
pub use cooldown::CountDownCooldownTicks;
pub use movement::{DoNothing, LookAtTargetSink, MoveToTargetSink};
pub use pairing::{AnimalMakeLove, TradeWithVillager};
pub use poi::{AcquirePoi, Backoff, ValidateNearbyPoi};
pub use ram::{PrepareRam, RamTarget};
pub use rest::{JumpOnBed, SleepInBed};
pub use sensors::{HurtBySensor, NearestBedSensor, NearestLivingEntitiesSensor};
pub use work::HarvestFarmland;
