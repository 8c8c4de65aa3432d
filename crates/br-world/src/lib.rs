//! `br-world`: the simulated world as seen by brains.
//!
//! Brains never mutate the world directly.  They read it through the
//! object-safe [`World`] trait and queue [`WorldCommand`]s, which the sim
//! driver applies after each agent's brain tick.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                |
//! |-------------|---------------------------------------------------------|
//! | [`entity`]  | `EntityKind`, `EntityInfo`                               |
//! | [`block`]   | `BlockKind`, `PoiKind`                                   |
//! | [`path`]    | `Path` and the straight-line planner                     |
//! | [`command`] | `WorldCommand`                                           |
//! | [`world`]   | the `World` trait                                        |
//! | [`flat`]    | `FlatWorld`, an in-memory flat world with an R-tree      |
//! | [`error`]   | `WorldError`, `WorldResult`                              |

pub mod block;
pub mod command;
pub mod entity;
pub mod error;
pub mod flat;
pub mod path;
pub mod world;


pub use block::{BlockKind, PoiKind, CROP_MAX_AGE};
pub use command::WorldCommand;
pub use entity::{EntityInfo, EntityKind};
pub use error::{WorldError, WorldResult};
pub use flat::FlatWorld;
pub use path::Path;
pub use world::World;
