//! Standard memory modules and their value types.
//!
//! Ids are assigned here once and never reused; application crates that add
//! their own modules should start at 1000.

use br_core::{AgentId, BlockPos, Tick, Vec3};

use crate::{MemoryModule, ModuleKey};

// ── Value types ───────────────────────────────────────────────────────────────

/// Something a brain can point at: a fixed block or a (moving) entity.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PositionTracker {
    Block(BlockPos),
    Entity(AgentId),
}

impl From<BlockPos> for PositionTracker {
    fn from(pos: BlockPos) -> Self {
        PositionTracker::Block(pos)
    }
}

impl From<AgentId> for PositionTracker {
    fn from(id: AgentId) -> Self {
        PositionTracker::Entity(id)
    }
}

/// Where to walk, how fast, and how close counts as arrived (in blocks).
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalkTarget {
    pub target:       PositionTracker,
    pub speed:        f32,
    pub close_enough: u32,
}

impl WalkTarget {
    pub fn new(target: impl Into<PositionTracker>, speed: f32, close_enough: u32) -> Self {
        Self { target: target.into(), speed, close_enough }
    }
}

// ── Modules ───────────────────────────────────────────────────────────────────

pub const WALK_TARGET: MemoryModule<WalkTarget> = MemoryModule::new(0, "walk_target");
pub const LOOK_TARGET: MemoryModule<PositionTracker> = MemoryModule::new(1, "look_target");
pub const ATTACK_TARGET: MemoryModule<AgentId> = MemoryModule::new(2, "attack_target");
pub const ATTACK_COOLING_DOWN: MemoryModule<bool> = MemoryModule::new(3, "attack_cooling_down");
pub const HOME: MemoryModule<BlockPos> = MemoryModule::new(4, "home");
pub const JOB_SITE: MemoryModule<BlockPos> = MemoryModule::new(5, "job_site");
pub const MEETING_POINT: MemoryModule<BlockPos> = MemoryModule::new(6, "meeting_point");
pub const BREED_TARGET: MemoryModule<AgentId> = MemoryModule::new(7, "breed_target");
pub const INTERACTION_TARGET: MemoryModule<AgentId> = MemoryModule::new(8, "interaction_target");
/// Nearby living entities, closest first.
pub const NEAREST_LIVING_ENTITIES: MemoryModule<Vec<AgentId>> =
    MemoryModule::new(9, "nearest_living_entities");
pub const HURT_BY_ENTITY: MemoryModule<AgentId> = MemoryModule::new(10, "hurt_by_entity");
pub const LAST_SLEPT: MemoryModule<Tick> = MemoryModule::new(11, "last_slept");
pub const LAST_WOKEN: MemoryModule<Tick> = MemoryModule::new(12, "last_woken");
pub const CANT_REACH_WALK_TARGET_SINCE: MemoryModule<Tick> =
    MemoryModule::new(13, "cant_reach_walk_target_since");
pub const NEAREST_BED: MemoryModule<BlockPos> = MemoryModule::new(14, "nearest_bed");
pub const RAM_TARGET: MemoryModule<Vec3> = MemoryModule::new(15, "ram_target");
/// Ticks left before the next ram; counted down by `CountDownCooldownTicks`.
pub const RAM_COOLDOWN_TICKS: MemoryModule<i32> = MemoryModule::new(16, "ram_cooldown_ticks");
pub const GAZE_COOLDOWN_TICKS: MemoryModule<i32> = MemoryModule::new(17, "gaze_cooldown_ticks");
pub const IS_PANICKING: MemoryModule<bool> = MemoryModule::new(18, "is_panicking");
pub const LAST_WORKED_AT_POI: MemoryModule<Tick> = MemoryModule::new(19, "last_worked_at_poi");
pub const NEAREST_HOSTILE: MemoryModule<AgentId> = MemoryModule::new(20, "nearest_hostile");

/// Every module above.
pub const ALL: &[ModuleKey] = &[
    WALK_TARGET.key(),
    LOOK_TARGET.key(),
    ATTACK_TARGET.key(),
    ATTACK_COOLING_DOWN.key(),
    HOME.key(),
    JOB_SITE.key(),
    MEETING_POINT.key(),
    BREED_TARGET.key(),
    INTERACTION_TARGET.key(),
    NEAREST_LIVING_ENTITIES.key(),
    HURT_BY_ENTITY.key(),
    LAST_SLEPT.key(),
    LAST_WOKEN.key(),
    CANT_REACH_WALK_TARGET_SINCE.key(),
    NEAREST_BED.key(),
    RAM_TARGET.key(),
    RAM_COOLDOWN_TICKS.key(),
    GAZE_COOLDOWN_TICKS.key(),
    IS_PANICKING.key(),
    LAST_WORKED_AT_POI.key(),
    NEAREST_HOSTILE.key(),
];
