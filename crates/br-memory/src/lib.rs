//! `br-memory`: the per-agent blackboard of the `brain_sim` framework.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`module`]   | `MemoryModule<T>` typed key, `ModuleKey`, `MemoryStatus`    |
//! | [`store`]    | `MemoryStore`: type-erased slots with optional expiry      |
//! | [`layout`]   | `MemoryLayout`: the module set declared for an archetype   |
//! | [`bank`]     | `MemoryBank`: one store per agent, indexed by `AgentId`    |
//! | [`catalog`]  | Standard modules (`WALK_TARGET`, `HOME`, …) and value types |
//!
//! # Contract
//!
//! Every module an agent touches must be declared in its layout before the
//! store is instantiated.  Reading or writing an undeclared module panics;
//! `has` on an undeclared module simply answers `false`.  An empty slot is a
//! normal result (`None`), never an error.

pub mod bank;
pub mod catalog;
pub mod layout;
pub mod module;
pub mod store;

#[cfg(test)]
mod tests;

pub use bank::MemoryBank;
pub use catalog::{PositionTracker, WalkTarget};
pub use layout::MemoryLayout;
pub use module::{MemoryModule, MemoryStatus, ModuleKey};
pub use store::MemoryStore;
