//! Walking and looking.
//!
//! Two sinks turn `WALK_TARGET` and `LOOK_TARGET` into world commands; the
//! triggers below only ever write those two modules.

use br_behavior::{absent, declare, present, BrainContext, EntryCondition, Task, Timed, Trigger};
use br_core::{AgentId, BlockPos, Tick, Vec3};
use br_memory::catalog::{
    CANT_REACH_WALK_TARGET_SINCE, LOOK_TARGET, NEAREST_LIVING_ENTITIES, WALK_TARGET,
};
use br_memory::{MemoryModule, PositionTracker, WalkTarget};
use br_world::{EntityKind, Path, WorldCommand};

/// Horizontal random-stroll radius in blocks.
pub const STROLL_SPREAD: i32 = 10;

// ── Helpers ───────────────────────────────────────────────────────────────────

pub(crate) fn horizontal_manhattan(a: BlockPos, b: BlockPos) -> u32 {
    a.x.abs_diff(b.x) + a.z.abs_diff(b.z)
}

/// Whether the agent stands within `walk.close_enough` of its walk target.
pub(crate) fn reached(ctx: &BrainContext<'_>, walk: &WalkTarget) -> bool {
    match (ctx.position(), ctx.resolve(walk.target)) {
        (Some(me), Some(target)) => horizontal_manhattan(me.block_pos(), target.block_pos()) <= walk.close_enough,
        _ => false,
    }
}

/// Distance from the agent to another living entity.
pub(crate) fn distance_to(ctx: &BrainContext<'_>, other: AgentId) -> Option<f64> {
    let me = ctx.position()?;
    let them = ctx.resolve(PositionTracker::Entity(other))?;
    Some(me.distance(them))
}

/// Point both sinks at a living entity.
pub(crate) fn walk_and_look_at(ctx: &mut BrainContext<'_>, other: AgentId, speed: f32, close_enough: u32) {
    let store = ctx.memory_mut();
    store.set(WALK_TARGET, WalkTarget::new(other, speed, close_enough));
    store.set(LOOK_TARGET, PositionTracker::Entity(other));
}

// ── MoveToTargetSink ──────────────────────────────────────────────────────────

/// Follows `WALK_TARGET` until it is reached, replanning when an entity
/// target moves or the path runs out.
///
/// An unreachable target records `CANT_REACH_WALK_TARGET_SINCE` and drops
/// the walk target.
#[derive(Default)]
pub struct MoveToTargetSink {
    path:        Option<Path>,
    speed:       f32,
    last_target: Option<BlockPos>,
    give_up:     bool,
}

impl MoveToTargetSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timed() -> Timed<Self> {
        Timed::new(Self::new()).with_duration(150, 250)
    }

    fn plan(&mut self, ctx: &mut BrainContext<'_>, walk: &WalkTarget) -> bool {
        let Some(target) = ctx.resolve(walk.target).map(Vec3::block_pos) else {
            return false;
        };
        match ctx.world.path_to(ctx.agent, target, walk.close_enough) {
            Some(path) if path.can_reach() => {
                ctx.memory_mut().erase(CANT_REACH_WALK_TARGET_SINCE);
                self.path = Some(path);
                self.speed = walk.speed;
                self.last_target = Some(target);
                true
            }
            _ => {
                let now = ctx.tick;
                let store = ctx.memory_mut();
                if !store.has_value(CANT_REACH_WALK_TARGET_SINCE) {
                    store.set(CANT_REACH_WALK_TARGET_SINCE, now);
                }
                false
            }
        }
    }

    fn issue_move(&self, ctx: &mut BrainContext<'_>) {
        if let Some(path) = &self.path {
            let agent = ctx.agent;
            ctx.issue(WorldCommand::MoveTo { agent, path: path.clone(), speed: self.speed });
        }
    }
}

impl Task for MoveToTargetSink {
    fn name(&self) -> &str {
        "move_to_target_sink"
    }

    fn entry_condition(&self) -> EntryCondition {
        EntryCondition::new()
            .present(WALK_TARGET)
            .registered(CANT_REACH_WALK_TARGET_SINCE)
    }

    fn check_extra_start_conditions(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        let Some(walk) = ctx.memory().get(WALK_TARGET).copied() else {
            return false;
        };
        let was_reached = reached(ctx, &walk);
        if !was_reached && self.plan(ctx, &walk) {
            return true;
        }
        let store = ctx.memory_mut();
        store.erase(WALK_TARGET);
        if was_reached {
            store.erase(CANT_REACH_WALK_TARGET_SINCE);
        }
        false
    }

    fn can_still_use(&self, ctx: &BrainContext<'_>) -> bool {
        if self.give_up || self.path.is_none() {
            return false;
        }
        ctx.memory().get(WALK_TARGET).is_some_and(|walk| !reached(ctx, walk))
    }

    fn start(&mut self, ctx: &mut BrainContext<'_>) {
        self.issue_move(ctx);
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(walk) = ctx.memory().get(WALK_TARGET).copied() else {
            return;
        };
        let target = ctx.resolve(walk.target).map(Vec3::block_pos);
        let target_moved = match (target, self.last_target) {
            (Some(now), Some(before)) => now.dist_sqr(before) > 4,
            _ => true,
        };
        let idle = ctx.info().is_some_and(|e| !e.moving);
        if target_moved || idle || walk.speed != self.speed {
            if self.plan(ctx, &walk) {
                self.issue_move(ctx);
            } else {
                self.give_up = true;
            }
        }
    }

    fn stop(&mut self, ctx: &mut BrainContext<'_>) {
        let agent = ctx.agent;
        ctx.issue(WorldCommand::StopMoving { agent });
        ctx.memory_mut().erase(WALK_TARGET);
        self.path = None;
        self.last_target = None;
        self.give_up = false;
    }
}

// ── LookAtTargetSink ──────────────────────────────────────────────────────────

/// Turns toward `LOOK_TARGET` every tick while it resolves.
#[derive(Default)]
pub struct LookAtTargetSink;

impl LookAtTargetSink {
    pub fn timed() -> Timed<Self> {
        Timed::new(Self).with_duration(45, 90)
    }
}

impl Task for LookAtTargetSink {
    fn name(&self) -> &str {
        "look_at_target_sink"
    }

    fn entry_condition(&self) -> EntryCondition {
        EntryCondition::new().present(LOOK_TARGET)
    }

    fn can_still_use(&self, ctx: &BrainContext<'_>) -> bool {
        ctx.memory()
            .get(LOOK_TARGET)
            .is_some_and(|&t| ctx.resolve(t).is_some())
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(&tracker) = ctx.memory().get(LOOK_TARGET) else { return };
        if let Some(target) = ctx.resolve(tracker) {
            let agent = ctx.agent;
            ctx.issue(WorldCommand::LookAt { agent, target });
        }
    }

    fn stop(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.memory_mut().erase(LOOK_TARGET);
    }
}

// ── Target pickers ────────────────────────────────────────────────────────────

/// Look at the closest sensed entity of a matching kind within
/// `max_distance`.
pub fn set_entity_look_target(filter: fn(EntityKind) -> bool, max_distance: f64) -> impl Trigger {
    declare(
        "set_entity_look_target",
        (absent(LOOK_TARGET), present(NEAREST_LIVING_ENTITIES)),
        move |ctx, (look, nearest)| {
            let Some(me) = ctx.position() else { return false };
            let found = nearest.get().iter().copied().find(|&id| {
                ctx.world
                    .entity(id)
                    .is_some_and(|e| e.alive && filter(e.kind) && e.position.closer_than(me, max_distance))
            });
            match found {
                Some(id) => {
                    look.set(ctx, PositionTracker::Entity(id));
                    true
                }
                None => false,
            }
        },
    )
}

/// Pick a random spot within [`STROLL_SPREAD`] blocks and walk there.
pub fn random_stroll(speed: f32) -> impl Trigger {
    declare("random_stroll", (absent(WALK_TARGET),), move |ctx, (walk,)| {
        let Some(me) = ctx.position() else { return false };
        let (dx, dz) = ctx.rng.horizontal_offset(STROLL_SPREAD);
        if dx == 0 && dz == 0 {
            return false;
        }
        walk.set(ctx, WalkTarget::new(me.block_pos().offset(dx, 0, dz), speed, 0));
        true
    })
}

/// Walk toward whatever the agent is looking at.
pub fn set_walk_target_from_look_target(speed: f32, close_enough: u32) -> impl Trigger {
    declare(
        "set_walk_target_from_look_target",
        (present(LOOK_TARGET), absent(WALK_TARGET)),
        move |ctx, (look, walk)| {
            walk.set(ctx, WalkTarget::new(*look.get(), speed, close_enough));
            true
        },
    )
}

/// Cooldown between two strolls toward the same POI.
pub const POI_STROLL_COOLDOWN: u64 = 80;

/// Head back to the POI stored in `poi` once the agent wandered farther than
/// `max_distance` blocks from it.
pub fn stroll_to_poi(poi: MemoryModule<BlockPos>, speed: f32, close_enough: u32, max_distance: f64) -> impl Trigger {
    let mut next_ok = Tick::ZERO;
    declare("stroll_to_poi", (present(poi), absent(WALK_TARGET)), move |ctx, (site, walk)| {
        let Some(me) = ctx.position() else { return false };
        let target = *site.get();
        if ctx.tick <= next_ok || target.closer_to_center_than(me, max_distance) {
            return false;
        }
        next_ok = ctx.tick + POI_STROLL_COOLDOWN;
        walk.set(ctx, WalkTarget::new(target, speed, close_enough));
        true
    })
}

/// Stand still.
pub struct DoNothing;

impl DoNothing {
    pub fn timed(min: u64, max: u64) -> Timed<Self> {
        Timed::new(DoNothing).with_duration(min, max)
    }
}

impl Task for DoNothing {
    fn name(&self) -> &str {
        "do_nothing"
    }

    fn can_still_use(&self, _ctx: &BrainContext<'_>) -> bool {
        true
    }
}

