//! The `World` trait.
//!
//! # Pluggability
//!
//! `br-sim` drives brains against any `World`, so applications can plug in
//! their own engine (voxel worlds, A* planners, networked servers) without
//! touching the scheduler.  The trait is object safe: brains hold it as
//! `&dyn World`.

use br_core::{AgentId, BlockPos, Tick, Vec3};

use crate::{BlockKind, EntityInfo, Path, PoiKind, WorldCommand};

/// Default ticks a crossbow takes to charge.
pub const DEFAULT_CHARGE_TICKS: u32 = 25;

pub trait World {
    /// Snapshot of one entity, or `None` if the id was never spawned.
    fn entity(&self, id: AgentId) -> Option<EntityInfo>;

    /// Number of entity slots (alive or dead).
    fn entity_count(&self) -> usize;

    #[inline]
    fn position(&self, id: AgentId) -> Option<Vec3> {
        self.entity(id).map(|e| e.position)
    }

    #[inline]
    fn is_alive(&self, id: AgentId) -> bool {
        self.entity(id).is_some_and(|e| e.alive)
    }

    /// Plan a path for `agent` to within `tolerance` blocks of `target`.
    ///
    /// `None` means no path could be planned at all (too far, unknown agent).
    /// A returned path may still be unreachable; check [`Path::can_reach`].
    fn path_to(&self, agent: AgentId, target: BlockPos, tolerance: u32) -> Option<Path>;

    /// Living entities within `radius` of `center`, closest first.
    fn entities_near(&self, center: Vec3, radius: f64) -> Vec<AgentId>;

    fn block_at(&self, pos: BlockPos) -> BlockKind;

    /// Unclaimed POIs of `kind` within `radius` blocks of `center`, closest
    /// first.
    fn find_pois(&self, kind: PoiKind, center: BlockPos, radius: u32) -> Vec<BlockPos>;

    /// Ticks `agent` needs to charge its crossbow.
    fn charge_duration(&self, _agent: AgentId) -> u32 {
        DEFAULT_CHARGE_TICKS
    }

    /// The entity that most recently hurt `agent`.
    fn last_attacker(&self, agent: AgentId) -> Option<AgentId>;

    /// Apply one command.  Commands naming missing or dead entities are
    /// ignored.
    fn apply(&mut self, command: WorldCommand);

    /// Advance world-owned state (movement, growth) after all brains ran.
    fn step(&mut self, _tick: Tick) {}
}
