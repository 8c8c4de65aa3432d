//! Fluent builder for constructing a [`Sim`].

use std::collections::BTreeMap;

use tracing::debug;

use br_behavior::Brain;
use br_core::{AgentId, SimConfig};
use br_memory::{MemoryBank, MemoryLayout};
use br_world::World;

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<W>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: total ticks, seed, day length, …
/// - `W: World`: already populated with every entity that starts the run
///
/// # Optional inputs
///
/// | Method                         | Default                                    |
/// |--------------------------------|--------------------------------------------|
/// | `.brain(agent, layout, brain)` | Entity stays brainless with an empty store |
///
/// Each layout is extended with [`Brain::required_keys`] (activity
/// requirements, erase-on-exit sets, sensor outputs) before the store is
/// created.
///
/// # Example
///
/// ```rust,ignore
/// let a = br_tasks::archetype::villager()?;
/// let mut sim = SimBuilder::new(config, world)
///     .brain(villager_id, a.layout, a.brain)
///     .build()?;
/// sim.run(&mut NoopObserver);
/// ```
pub struct SimBuilder<W: World> {
    config:    SimConfig,
    world:     W,
    brains:    BTreeMap<AgentId, (MemoryLayout, Brain)>,
    duplicate: Option<AgentId>,
}

impl<W: World> SimBuilder<W> {
    pub fn new(config: SimConfig, world: W) -> Self {
        Self { config, world, brains: BTreeMap::new(), duplicate: None }
    }

    /// Give `agent` a brain.  Giving the same agent two brains fails at
    /// [`build`](Self::build).
    pub fn brain(mut self, agent: AgentId, layout: MemoryLayout, brain: Brain) -> Self {
        if self.brains.insert(agent, (layout, brain)).is_some() {
            self.duplicate.get_or_insert(agent);
        }
        self
    }

    /// Validate inputs, install every brain's memory store, and return a
    /// ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<W>> {
        self.config.validate()?;
        if let Some(agent) = self.duplicate {
            return Err(SimError::DuplicateBrain(agent));
        }

        let count = self.world.entity_count();
        if let Some(&agent) = self.brains.keys().find(|a| a.index() >= count) {
            return Err(SimError::AgentOutOfRange { agent, count });
        }

        let mut memories = MemoryBank::new(count);
        let mut brains: Vec<Option<Brain>> = (0..count).map(|_| None).collect();
        let with_brain = self.brains.len();
        for (agent, (mut layout, brain)) in self.brains {
            brain.extend_layout(&mut layout);
            memories.install(agent, layout.instantiate());
            brains[agent.index()] = Some(brain);
        }

        debug!(entities = count, brains = with_brain, seed = self.config.seed, "sim built");
        Ok(Sim::new(self.config, self.world, memories, brains))
    }
}
