//! The per-agent, per-tick context handed to every hook.

use br_core::{AgentId, AgentRng, Tick, Vec3};
use br_memory::{MemoryBank, MemoryStore, PositionTracker};
use br_schedule::Activity;
use br_world::{EntityInfo, World, WorldCommand};

/// Everything a behavior may touch while its agent's brain is ticking.
///
/// Built by the sim driver once per agent per tick.  The world is read-only;
/// changes to it go through [`issue`](Self::issue) and are applied after the
/// brain tick returns.  Memory writes are immediate, including writes into a
/// partner's store.
pub struct BrainContext<'a> {
    pub tick:     Tick,
    pub day_time: u64,
    pub agent:    AgentId,
    /// The brain's current non-core activity, kept up to date by the brain.
    pub activity: Option<Activity>,
    pub world:    &'a dyn World,
    pub memories: &'a mut MemoryBank,
    pub rng:      &'a mut AgentRng,
    pub commands: &'a mut Vec<WorldCommand>,
    /// Activity a behavior asked to switch to; applied at the end of the
    /// brain tick.
    pub requested_activity: Option<Activity>,
}

impl<'a> BrainContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tick:     Tick,
        day_time: u64,
        agent:    AgentId,
        world:    &'a dyn World,
        memories: &'a mut MemoryBank,
        rng:      &'a mut AgentRng,
        commands: &'a mut Vec<WorldCommand>,
    ) -> Self {
        Self {
            tick,
            day_time,
            agent,
            activity: None,
            world,
            memories,
            rng,
            commands,
            requested_activity: None,
        }
    }

    // ── Memory ────────────────────────────────────────────────────────────

    /// This agent's store.
    #[inline]
    pub fn memory(&self) -> &MemoryStore {
        self.memories.store(self.agent)
    }

    #[inline]
    pub fn memory_mut(&mut self) -> &mut MemoryStore {
        self.memories.store_mut(self.agent)
    }

    /// Another agent's store, for reading a partner's state.
    #[inline]
    pub fn memory_of(&self, other: AgentId) -> Option<&MemoryStore> {
        self.memories.get(other)
    }

    /// Another agent's store, for reciprocal writes.
    #[inline]
    pub fn memory_of_mut(&mut self, other: AgentId) -> Option<&mut MemoryStore> {
        self.memories.get_mut(other)
    }

    // ── World ─────────────────────────────────────────────────────────────

    /// Queue a command for the world.
    #[inline]
    pub fn issue(&mut self, command: WorldCommand) {
        self.commands.push(command);
    }

    #[inline]
    pub fn info(&self) -> Option<EntityInfo> {
        self.world.entity(self.agent)
    }

    #[inline]
    pub fn position(&self) -> Option<Vec3> {
        self.world.position(self.agent)
    }

    /// Where a tracker currently points; `None` for dead or unknown entities.
    pub fn resolve(&self, tracker: PositionTracker) -> Option<Vec3> {
        match tracker {
            PositionTracker::Block(pos) => Some(pos.bottom_center()),
            PositionTracker::Entity(id) => self
                .world
                .entity(id)
                .filter(|e| e.alive)
                .map(|e| e.position),
        }
    }

    /// Ask the brain to switch to `activity` once this tick's behaviors ran.
    pub fn request_activity(&mut self, activity: Activity) {
        self.requested_activity = Some(activity);
    }
}
