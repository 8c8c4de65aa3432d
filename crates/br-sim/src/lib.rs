//! `br-sim`: tick loop driver for the brain_sim framework.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   memories.advance_all(tick)  (every store sees the same tick)
//!   for agent with a brain, ascending AgentId:
//!     dead  → stop every running behavior (once)
//!     alive → brain.tick  (sweep, sensors, activity, behaviors)
//!             apply the agent's buffered commands to the world
//!   world.step(tick)       (movement, growth)
//! ```
//!
//! Commands are applied right after the agent that issued them, so later
//! agents in the same tick already see the effects.  Agents never run in
//! parallel: paired behaviors write into each other's stores.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use br_core::SimConfig;
//! use br_sim::{NoopObserver, SimBuilder};
//! use br_world::FlatWorld;
//!
//! let mut world = FlatWorld::new(7);
//! let goat = world.spawn(EntityKind::Goat, Vec3::new(0.5, 64.0, 0.5));
//! let a = br_tasks::archetype::goat()?;
//! let mut sim = SimBuilder::new(config, world).brain(goat, a.layout, a.brain).build()?;
//! sim.run(&mut NoopObserver);
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickSummary};
pub use sim::Sim;
